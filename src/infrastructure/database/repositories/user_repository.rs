use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, SqlErr,
};
use tracing::{debug, warn};

use crate::domain::{
    normalize_roles, DomainError, DomainResult, NewUser, User, UserChanges,
    UserRepositoryInterface, UserRole,
};
use crate::infrastructure::crypto::PasswordHasher;
use crate::infrastructure::database::entities::user;
use crate::shared::InfraError;

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
    hasher: PasswordHasher,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection, hasher: PasswordHasher) -> Self {
        Self { db, hasher }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn roles_to_json(roles: &[UserRole]) -> String {
    let names: Vec<&str> = roles.iter().map(UserRole::as_str).collect();
    serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string())
}

fn roles_from_json(raw: &str) -> Vec<UserRole> {
    let names: Vec<String> = serde_json::from_str(raw).unwrap_or_default();
    names
        .iter()
        .filter_map(|name| match name.parse::<UserRole>() {
            Ok(role) => Some(role),
            Err(_) => {
                warn!(role = %name, "Ignoring unknown stored role");
                None
            }
        })
        .collect()
}

fn user_model_to_domain(model: user::Model) -> User {
    User {
        roles: roles_from_json(&model.roles),
        id: model.id,
        email: model.email,
        name: model.name,
        password_hash: model.password_hash,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn db_err(e: DbErr) -> DomainError {
    InfraError::Database(e).into()
}

fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        || e.to_string().contains("UNIQUE")
        || e.to_string().contains("duplicate")
}

/// Map a failed row update. A row deleted after it was read updates
/// nothing, which reads as "no such user".
fn update_failure(e: DbErr, new_email: Option<&str>) -> DomainResult<Option<User>> {
    match (e, new_email) {
        (DbErr::RecordNotUpdated, _) => Ok(None),
        (e, Some(email)) if is_unique_violation(&e) => Err(DomainError::email_taken(email)),
        (e, _) => Err(db_err(e)),
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for SeaOrmUserRepository {
    async fn get_by_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> DomainResult<Option<User>> {
        let Some(user) = self.get_by_email(email).await? else {
            return Ok(None);
        };

        if self.hasher.verify(password, &user.password_hash) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    async fn get_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn find_other_by_email_ci(
        &self,
        exclude_id: &str,
        email: &str,
    ) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Id.ne(exclude_id))
            .filter(user::Column::EmailLower.eq(email.to_lowercase()))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn get_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    fn generate_password_hash(&self, plaintext: &str) -> DomainResult<String> {
        Ok(self.hasher.hash(plaintext)?)
    }

    async fn create(&self, new_user: NewUser) -> DomainResult<User> {
        let now = Utc::now();
        let email = new_user.email.clone();

        let active = user::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            email_lower: Set(new_user.email.to_lowercase()),
            email: Set(new_user.email),
            name: Set(new_user.name),
            password_hash: Set(new_user.password_hash),
            roles: Set(roles_to_json(&normalize_roles(new_user.roles))),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::email_taken(&email)
            } else {
                db_err(e)
            }
        })?;

        debug!(user_id = %model.id, "User row inserted");
        Ok(user_model_to_domain(model))
    }

    async fn find_by_id_and_update(
        &self,
        id: &str,
        changes: UserChanges,
    ) -> DomainResult<Option<User>> {
        let existing = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        if changes.is_empty() {
            return Ok(Some(user_model_to_domain(existing)));
        }

        let new_email = changes.email.clone();
        let mut active: user::ActiveModel = existing.into();

        if let Some(email) = changes.email {
            active.email_lower = Set(email.to_lowercase());
            active.email = Set(email);
        }
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(roles) = changes.roles {
            active.roles = Set(roles_to_json(&normalize_roles(roles)));
        }

        active.updated_at = Set(Utc::now());

        match active.update(&self.db).await {
            Ok(updated) => Ok(Some(user_model_to_domain(updated))),
            Err(e) => update_failure(e, new_email.as_deref()),
        }
    }

    async fn update_password_hash(&self, id: &str, password_hash: &str) -> DomainResult<()> {
        let existing = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Err(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: id.to_string(),
            });
        };

        let mut active: user::ActiveModel = existing.into();
        active.password_hash = Set(password_hash.to_string());
        active.updated_at = Set(Utc::now());
        match active.update(&self.db).await {
            Ok(_) => Ok(()),
            // Deleted between the lookup and the write
            Err(DbErr::RecordNotUpdated) => Err(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: id.to_string(),
            }),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn find_by_id_and_delete(&self, id: &str) -> DomainResult<()> {
        let result = user::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        debug!(user_id = %id, rows = result.rows_affected, "User delete executed");
        Ok(())
    }

    async fn count(&self) -> DomainResult<u64> {
        user::Entity::find().count(&self.db).await.map_err(db_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::crypto::TEST_BCRYPT_COST;
    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::database::{init_database, DatabaseConfig};
    use sea_orm_migration::MigratorTrait;

    async fn repo() -> SeaOrmUserRepository {
        let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SeaOrmUserRepository::new(db, PasswordHasher::new(TEST_BCRYPT_COST))
    }

    async fn insert(repo: &SeaOrmUserRepository, email: &str, password: &str) -> User {
        let password_hash = repo.generate_password_hash(password).unwrap();
        repo.create(NewUser {
            email: email.to_string(),
            name: "Test User".to_string(),
            password_hash,
            roles: vec![UserRole::User],
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn create_then_lookup_by_email_and_password() {
        let repo = repo().await;
        let created = insert(&repo, "ada@example.com", "correct horse").await;

        let found = repo
            .get_by_email_and_password("ada@example.com", "correct horse")
            .await
            .unwrap()
            .expect("user should match");
        assert_eq!(found.id, created.id);
        assert_eq!(found.roles, vec![UserRole::User]);

        assert!(repo
            .get_by_email_and_password("ada@example.com", "wrong")
            .await
            .unwrap()
            .is_none());
        assert!(repo
            .get_by_email_and_password("nobody@example.com", "correct horse")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn get_by_email_is_exact() {
        let repo = repo().await;
        insert(&repo, "Ada@Example.com", "password1").await;

        assert!(repo.get_by_email("Ada@Example.com").await.unwrap().is_some());
        assert!(repo.get_by_email("ada@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unique_index_rejects_exact_duplicates_only() {
        let repo = repo().await;
        insert(&repo, "A@x.com", "password1").await;

        let dup = repo
            .create(NewUser {
                email: "A@x.com".into(),
                name: "Dup".into(),
                password_hash: "h".into(),
                roles: vec![],
            })
            .await;
        assert!(matches!(dup, Err(DomainError::EmailAlreadyExists(_))));

        // Case-different email is a different row at the storage layer
        insert(&repo, "a@x.com", "password1").await;
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn find_other_by_email_ci_excludes_self() {
        let repo = repo().await;
        let u1 = insert(&repo, "one@x.com", "password1").await;
        let u2 = insert(&repo, "b@x.com", "password1").await;

        let hit = repo.find_other_by_email_ci(&u1.id, "B@X.COM").await.unwrap();
        assert_eq!(hit.map(|u| u.id), Some(u2.id.clone()));

        assert!(repo
            .find_other_by_email_ci(&u2.id, "B@x.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn partial_update_changes_only_supplied_fields() {
        let repo = repo().await;
        let user = insert(&repo, "ada@example.com", "password1").await;

        let updated = repo
            .find_by_id_and_update(
                &user.id,
                UserChanges {
                    name: Some("Ada Lovelace".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Ada Lovelace");
        assert_eq!(updated.email, "ada@example.com");
        assert_eq!(updated.password_hash, user.password_hash);

        let missing = repo
            .find_by_id_and_update("missing", UserChanges::default())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn update_into_taken_email_maps_to_conflict() {
        let repo = repo().await;
        let user = insert(&repo, "one@x.com", "password1").await;
        insert(&repo, "two@x.com", "password1").await;

        let result = repo
            .find_by_id_and_update(
                &user.id,
                UserChanges {
                    email: Some("two@x.com".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(DomainError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let repo = repo().await;
        let user = insert(&repo, "ada@example.com", "password1").await;

        repo.find_by_id_and_delete(&user.id).await.unwrap();
        repo.find_by_id_and_delete(&user.id).await.unwrap();
        assert!(repo.get_by_id(&user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn password_hash_update_requires_existing_user() {
        let repo = repo().await;
        let user = insert(&repo, "ada@example.com", "password1").await;

        let new_hash = repo.generate_password_hash("password2").unwrap();
        repo.update_password_hash(&user.id, &new_hash).await.unwrap();
        assert!(repo
            .get_by_email_and_password("ada@example.com", "password2")
            .await
            .unwrap()
            .is_some());

        let missing = repo.update_password_hash("missing", &new_hash).await;
        assert!(matches!(missing, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn find_other_by_email_ci_folds_non_ascii() {
        let repo = repo().await;
        let emile = insert(&repo, "ÉMILE@x.com", "password1").await;

        let hit = repo
            .find_other_by_email_ci("other-id", "émile@x.com")
            .await
            .unwrap();
        assert_eq!(hit.map(|u| u.id), Some(emile.id.clone()));

        // The folded column follows email changes
        repo.find_by_id_and_update(
            &emile.id,
            UserChanges {
                email: Some("ÅSA@x.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert!(repo
            .find_other_by_email_ci("other-id", "émile@x.com")
            .await
            .unwrap()
            .is_none());
        let hit = repo
            .find_other_by_email_ci("other-id", "åsa@X.COM")
            .await
            .unwrap();
        assert_eq!(hit.map(|u| u.id), Some(emile.id));
    }

    #[test]
    fn update_of_vanished_row_reads_as_missing() {
        assert!(matches!(
            update_failure(DbErr::RecordNotUpdated, None),
            Ok(None)
        ));
        assert!(matches!(
            update_failure(DbErr::RecordNotUpdated, Some("a@x.com")),
            Ok(None)
        ));
        assert!(matches!(
            update_failure(DbErr::Custom("boom".into()), None),
            Err(DomainError::Storage(_))
        ));
    }

    #[test]
    fn roles_round_trip_through_json() {
        let json = roles_to_json(&[UserRole::Admin, UserRole::User]);
        assert_eq!(json, r#"["admin","user"]"#);
        assert_eq!(roles_from_json(&json), vec![UserRole::Admin, UserRole::User]);
        assert_eq!(roles_from_json(r#"["admin","ghost"]"#), vec![UserRole::Admin]);
    }
}
