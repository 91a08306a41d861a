use axum::{
    extract::State,
    response::{Html, IntoResponse},
    Extension, Json,
};

use crate::domain::AuthContext;
use crate::interfaces::graphql::AccountSchema;

/// `POST /graphql`
pub async fn graphql_handler(
    State(schema): State<AccountSchema>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    Json(schema.execute(request.data(auth)).await)
}

/// `GET /graphql`
pub async fn graphiql() -> impl IntoResponse {
    Html(
        async_graphql::http::GraphiQLSource::build()
            .endpoint("/graphql")
            .finish(),
    )
}
