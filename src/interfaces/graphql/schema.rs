use std::sync::Arc;

use async_graphql::extensions::Logger;
use async_graphql::{EmptySubscription, Schema};

use super::{mutation::MutationRoot, query::QueryRoot};
use crate::application::UserResolvers;

pub type AccountSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(resolvers: Arc<UserResolvers>) -> AccountSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .limit_complexity(500)
        .limit_depth(10)
        .data(resolvers)
        .extension(Logger)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::crypto::TEST_BCRYPT_COST;
    use crate::domain::{AuthContext, NewUser, User, UserRepositoryInterface, UserRole};
    use crate::infrastructure::crypto::{JwtAuthPayloadIssuer, JwtConfig, PasswordHasher};
    use crate::infrastructure::storage::InMemoryUserRepository;
    use async_graphql::Request;
    use serde_json::Value;

    struct Fixture {
        schema: AccountSchema,
        store: Arc<InMemoryUserRepository>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryUserRepository::new(PasswordHasher::new(TEST_BCRYPT_COST)));
        let issuer = Arc::new(JwtAuthPayloadIssuer::new(JwtConfig {
            secret: "schema-test-secret".into(),
            expiration_hours: 1,
            issuer: "account-service".into(),
        }));
        let resolvers = Arc::new(UserResolvers::new(store.clone(), issuer));
        Fixture {
            schema: build_schema(resolvers),
            store,
        }
    }

    async fn seed(store: &InMemoryUserRepository, email: &str, roles: Vec<UserRole>) -> User {
        let password_hash = store.generate_password_hash("password123").unwrap();
        store
            .create(NewUser {
                email: email.into(),
                name: "Seed".into(),
                password_hash,
                roles,
            })
            .await
            .unwrap()
    }

    async fn run(schema: &AccountSchema, query: &str, ctx: AuthContext) -> Value {
        let response = schema.execute(Request::new(query).data(ctx)).await;
        serde_json::to_value(&response).unwrap()
    }

    fn first_error_code(body: &Value) -> &str {
        body["errors"][0]["extensions"]["code"].as_str().unwrap_or("")
    }

    #[tokio::test]
    async fn sign_up_then_sign_in_returns_bearer_tokens() {
        let f = fixture();
        let anon = AuthContext::anonymous;

        let body = run(
            &f.schema,
            r#"mutation { signUp(input: {name: "Ada", email: "ada@x.com", password: "password123"}) {
                token tokenType expiresIn user { email roles }
            } }"#,
            anon(),
        )
        .await;
        assert!(body["errors"].is_null(), "{body}");
        assert_eq!(body["data"]["signUp"]["tokenType"], "Bearer");
        assert_eq!(body["data"]["signUp"]["expiresIn"], 3600);
        assert_eq!(body["data"]["signUp"]["user"]["roles"][0], "USER");

        let body = run(
            &f.schema,
            r#"mutation { signIn(email: "ada@x.com", password: "password123") { token user { email } } }"#,
            anon(),
        )
        .await;
        assert_eq!(body["data"]["signIn"]["user"]["email"], "ada@x.com");
        assert!(!body["data"]["signIn"]["token"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_credentials_surface_unauthorized_code() {
        let f = fixture();
        let body = run(
            &f.schema,
            r#"mutation { signIn(email: "ghost@x.com", password: "whatever") { token } }"#,
            AuthContext::anonymous(),
        )
        .await;
        assert_eq!(first_error_code(&body), "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn duplicate_sign_up_surfaces_email_code() {
        let f = fixture();
        seed(&f.store, "ada@x.com", vec![UserRole::User]).await;

        let body = run(
            &f.schema,
            r#"mutation { signUp(input: {name: "Ada", email: "ada@x.com", password: "password123"}) { token } }"#,
            AuthContext::anonymous(),
        )
        .await;
        assert_eq!(first_error_code(&body), "EMAIL_ALREADY_EXISTS");
        assert_eq!(
            body["errors"][0]["message"],
            "Has an user registered with this email: ada@x.com"
        );
    }

    #[tokio::test]
    async fn invalid_input_surfaces_validation_code() {
        let f = fixture();
        let body = run(
            &f.schema,
            r#"mutation { signUp(input: {name: "Ada", email: "nope", password: "password123"}) { token } }"#,
            AuthContext::anonymous(),
        )
        .await;
        assert_eq!(first_error_code(&body), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn me_requires_a_resolved_user() {
        let f = fixture();
        let user = seed(&f.store, "ada@x.com", vec![UserRole::User]).await;

        let anon = run(&f.schema, "{ me { id } }", AuthContext::anonymous()).await;
        assert_eq!(first_error_code(&anon), "UNAUTHORIZED");

        let body = run(
            &f.schema,
            "{ me { id email name } }",
            AuthContext::authenticated(user.clone()),
        )
        .await;
        assert_eq!(body["data"]["me"]["id"], user.id.as_str());
        assert_eq!(body["data"]["me"]["email"], "ada@x.com");
    }

    #[tokio::test]
    async fn password_hash_is_not_queryable() {
        let f = fixture();
        let user = seed(&f.store, "ada@x.com", vec![UserRole::User]).await;

        let body = run(
            &f.schema,
            "{ me { passwordHash } }",
            AuthContext::authenticated(user),
        )
        .await;
        assert!(body["errors"].is_array());
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn update_user_rejects_unknown_fields() {
        let f = fixture();
        let admin = seed(&f.store, "root@x.com", vec![UserRole::Admin]).await;
        let target = seed(&f.store, "ada@x.com", vec![UserRole::User]).await;

        let query = format!(
            r#"mutation {{ updateUser(id: "{}", input: {{password: "hijack123"}}) {{ id }} }}"#,
            target.id
        );
        let body = run(&f.schema, &query, AuthContext::authenticated(admin)).await;
        assert!(body["errors"].is_array());

        // Stored hash untouched
        assert!(f
            .store
            .get_by_email_and_password("ada@x.com", "password123")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn admin_mutations_round_trip() {
        let f = fixture();
        let admin = AuthContext::authenticated(seed(&f.store, "root@x.com", vec![UserRole::Admin]).await);

        let body = run(
            &f.schema,
            r#"mutation { createUser(input: {email: "new@x.com", password: "password123", name: "New", roles: [ADMIN]}) { id roles } }"#,
            admin.clone(),
        )
        .await;
        assert!(body["errors"].is_null(), "{body}");
        assert_eq!(body["data"]["createUser"]["roles"][0], "ADMIN");
        let id = body["data"]["createUser"]["id"].as_str().unwrap().to_string();

        let body = run(
            &f.schema,
            &format!(r#"mutation {{ updateUser(id: "{id}", input: {{name: "Renamed"}}) {{ name email }} }}"#),
            admin.clone(),
        )
        .await;
        assert_eq!(body["data"]["updateUser"]["name"], "Renamed");
        assert_eq!(body["data"]["updateUser"]["email"], "new@x.com");

        let body = run(
            &f.schema,
            &format!(r#"mutation {{ removeUser(id: "{id}") }}"#),
            admin.clone(),
        )
        .await;
        assert_eq!(body["data"]["removeUser"], true);
        assert!(f.store.get_by_id(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn non_admin_cannot_remove_users() {
        let f = fixture();
        let user = seed(&f.store, "ada@x.com", vec![UserRole::User]).await;

        let body = run(
            &f.schema,
            &format!(r#"mutation {{ removeUser(id: "{}") }}"#, user.id),
            AuthContext::authenticated(user.clone()),
        )
        .await;
        assert_eq!(first_error_code(&body), "UNAUTHORIZED");
        assert!(f.store.get_by_id(&user.id).await.unwrap().is_some());
    }
}
