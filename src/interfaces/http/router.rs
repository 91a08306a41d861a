//! HTTP router: GraphQL endpoint, health check and Prometheus metrics

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::application::UserResolvers;
use crate::infrastructure::crypto::JwtAuthPayloadIssuer;
use crate::interfaces::graphql::{build_schema, AccountSchema};

use super::middleware::{auth_context_middleware, AuthState};
use super::modules::graphql::{graphiql, graphql_handler};
use super::modules::health::{health_check, HealthState};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::modules::request_id::request_id_middleware;

/// Unified router state. Each handler extracts its own slice via `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub schema: AccountSchema,
    pub auth: AuthState,
    pub health: HealthState,
    pub metrics: MetricsState,
}

impl FromRef<AppState> for AccountSchema {
    fn from_ref(s: &AppState) -> Self {
        s.schema.clone()
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(s: &AppState) -> Self {
        s.auth.clone()
    }
}

impl FromRef<AppState> for HealthState {
    fn from_ref(s: &AppState) -> Self {
        s.health.clone()
    }
}

impl FromRef<AppState> for MetricsState {
    fn from_ref(s: &AppState) -> Self {
        s.metrics.clone()
    }
}

/// Build the complete HTTP router.
pub fn create_router(
    resolvers: Arc<UserResolvers>,
    issuer: Arc<JwtAuthPayloadIssuer>,
    prometheus_handle: PrometheusHandle,
) -> Router {
    let store = resolvers.store().clone();
    let state = AppState {
        schema: build_schema(resolvers),
        auth: AuthState {
            issuer,
            store: store.clone(),
        },
        health: HealthState {
            store,
            started_at: Arc::new(Instant::now()),
        },
        metrics: MetricsState {
            handle: prometheus_handle,
        },
    };

    let graphql_routes = Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth_context_middleware,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(graphql_routes)
        .route("/health", get(health_check))
        .route("/metrics", get(prometheus_metrics))
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::crypto::TEST_BCRYPT_COST;
    use crate::domain::{NewUser, UserRepositoryInterface, UserRole};
    use crate::infrastructure::crypto::{JwtConfig, PasswordHasher};
    use crate::infrastructure::storage::InMemoryUserRepository;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> (Router, Arc<InMemoryUserRepository>) {
        let store = Arc::new(InMemoryUserRepository::new(PasswordHasher::new(TEST_BCRYPT_COST)));
        let issuer = Arc::new(JwtAuthPayloadIssuer::new(JwtConfig {
            secret: "router-test-secret".into(),
            expiration_hours: 1,
            issuer: "account-service".into(),
        }));
        let resolvers = Arc::new(UserResolvers::new(store.clone(), issuer.clone()));
        let handle = PrometheusBuilder::new().build_recorder().handle();
        (create_router(resolvers, issuer, handle), store)
    }

    async fn post_graphql(app: &Router, query: &str, token: Option<&str>) -> Value {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = builder
            .body(Body::from(json!({ "query": query }).to_string()))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store"]["status"], "ok");
    }

    #[tokio::test]
    async fn graphiql_is_served_on_get() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::builder().uri("/graphql").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
    }

    #[tokio::test]
    async fn bearer_token_from_sign_up_authenticates_me() {
        let (app, _) = app();

        let body = post_graphql(
            &app,
            r#"mutation { signUp(input: {name: "Ada", email: "ada@x.com", password: "password123"}) { token } }"#,
            None,
        )
        .await;
        let token = body["data"]["signUp"]["token"].as_str().unwrap().to_string();

        let body = post_graphql(&app, "{ me { email } }", Some(&token)).await;
        assert_eq!(body["data"]["me"]["email"], "ada@x.com");

        let body = post_graphql(&app, "{ me { email } }", Some("not-a-jwt")).await;
        assert_eq!(body["errors"][0]["extensions"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn admin_token_unlocks_admin_mutations() {
        let (app, store) = app();
        let password_hash = store.generate_password_hash("password123").unwrap();
        store
            .create(NewUser {
                email: "root@x.com".into(),
                name: "Root".into(),
                password_hash,
                roles: vec![UserRole::Admin],
            })
            .await
            .unwrap();

        let body = post_graphql(
            &app,
            r#"mutation { signIn(email: "root@x.com", password: "password123") { token } }"#,
            None,
        )
        .await;
        let token = body["data"]["signIn"]["token"].as_str().unwrap().to_string();

        let body = post_graphql(
            &app,
            r#"mutation { createUser(input: {email: "new@x.com", password: "password123", name: "New"}) { email roles } }"#,
            Some(&token),
        )
        .await;
        assert_eq!(body["data"]["createUser"]["email"], "new@x.com");
        assert_eq!(body["data"]["createUser"]["roles"], json!(["USER"]));
    }
}
