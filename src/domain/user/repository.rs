use async_trait::async_trait;

use super::{NewUser, User, UserChanges};
use crate::shared::DomainResult;

/// Data-access contract for user records.
///
/// Email lookups come in two flavours: [`get_by_email`] is an exact match,
/// [`find_other_by_email_ci`] compares case-insensitively and skips one id.
///
/// [`get_by_email`]: UserRepositoryInterface::get_by_email
/// [`find_other_by_email_ci`]: UserRepositoryInterface::find_other_by_email_ci
#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    /// User whose email matches exactly and whose hash verifies `password`.
    async fn get_by_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> DomainResult<Option<User>>;

    async fn get_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    async fn find_other_by_email_ci(
        &self,
        exclude_id: &str,
        email: &str,
    ) -> DomainResult<Option<User>>;

    async fn get_by_id(&self, id: &str) -> DomainResult<Option<User>>;

    fn generate_password_hash(&self, plaintext: &str) -> DomainResult<String>;

    /// Fails with `EmailAlreadyExists` when the email is taken (exact match).
    async fn create(&self, user: NewUser) -> DomainResult<User>;

    async fn find_by_id_and_update(
        &self,
        id: &str,
        changes: UserChanges,
    ) -> DomainResult<Option<User>>;

    async fn update_password_hash(&self, id: &str, password_hash: &str) -> DomainResult<()>;

    /// Idempotent: deleting a missing id succeeds.
    async fn find_by_id_and_delete(&self, id: &str) -> DomainResult<()>;

    async fn count(&self) -> DomainResult<u64>;
}
