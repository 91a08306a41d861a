//! In-memory user store

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{
    normalize_roles, DomainError, DomainResult, NewUser, User, UserChanges,
    UserRepositoryInterface,
};
use crate::infrastructure::crypto::PasswordHasher;

/// In-memory user store for development and testing.
///
/// `emails` is an exact-match unique index (email -> user id), mirroring
/// the unique index of the SQL schema.
pub struct InMemoryUserRepository {
    users: DashMap<String, User>,
    emails: DashMap<String, String>,
    hasher: PasswordHasher,
}

impl InMemoryUserRepository {
    pub fn new(hasher: PasswordHasher) -> Self {
        Self {
            users: DashMap::new(),
            emails: DashMap::new(),
            hasher,
        }
    }

    /// Claim `email` for `id`. Fails if another id already holds it.
    fn claim_email(&self, email: &str, id: &str) -> DomainResult<()> {
        match self.emails.entry(email.to_string()) {
            Entry::Occupied(entry) if entry.get() != id => Err(DomainError::email_taken(email)),
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(entry) => {
                entry.insert(id.to_string());
                Ok(())
            }
        }
    }
}

#[async_trait]
impl UserRepositoryInterface for InMemoryUserRepository {
    async fn get_by_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> DomainResult<Option<User>> {
        Ok(self
            .get_by_email(email)
            .await?
            .filter(|user| self.hasher.verify(password, &user.password_hash)))
    }

    async fn get_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let Some(id) = self.emails.get(email).map(|id| id.value().clone()) else {
            return Ok(None);
        };
        Ok(self
            .users
            .get(&id)
            .filter(|u| u.email == email)
            .map(|u| u.value().clone()))
    }

    async fn find_other_by_email_ci(
        &self,
        exclude_id: &str,
        email: &str,
    ) -> DomainResult<Option<User>> {
        let needle = email.to_lowercase();
        Ok(self
            .users
            .iter()
            .find(|u| u.id != exclude_id && u.email.to_lowercase() == needle)
            .map(|u| u.value().clone()))
    }

    async fn get_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(id).map(|u| u.value().clone()))
    }

    fn generate_password_hash(&self, plaintext: &str) -> DomainResult<String> {
        Ok(self.hasher.hash(plaintext)?)
    }

    async fn create(&self, new_user: NewUser) -> DomainResult<User> {
        let now = Utc::now();
        let id = uuid::Uuid::new_v4().to_string();

        self.claim_email(&new_user.email, &id)?;

        let user = User {
            id: id.clone(),
            email: new_user.email,
            name: new_user.name,
            password_hash: new_user.password_hash,
            roles: normalize_roles(new_user.roles),
            created_at: now,
            updated_at: now,
        };
        self.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_id_and_update(
        &self,
        id: &str,
        changes: UserChanges,
    ) -> DomainResult<Option<User>> {
        // The record stays locked for the whole update so concurrent writers
        // to the same id serialize and the index never points at a stale row.
        let Some(mut user) = self.users.get_mut(id) else {
            return Ok(None);
        };

        if changes.is_empty() {
            return Ok(Some(user.value().clone()));
        }

        if let Some(email) = changes.email {
            if email != user.email {
                self.claim_email(&email, id)?;
                let old = std::mem::replace(&mut user.email, email);
                self.emails.remove_if(&old, |_, owner| owner == id);
            }
        }
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(roles) = changes.roles {
            user.roles = normalize_roles(roles);
        }
        user.updated_at = Utc::now();

        Ok(Some(user.value().clone()))
    }

    async fn update_password_hash(&self, id: &str, password_hash: &str) -> DomainResult<()> {
        let Some(mut user) = self.users.get_mut(id) else {
            return Err(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: id.to_string(),
            });
        };
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn find_by_id_and_delete(&self, id: &str) -> DomainResult<()> {
        if let Some((_, user)) = self.users.remove(id) {
            self.emails.remove_if(&user.email, |_, owner| owner == id);
        }
        Ok(())
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.users.len() as u64)
    }
}
