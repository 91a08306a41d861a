//! User resolvers: account business logic behind the GraphQL schema.
//!
//! Every public method binds its access level once via [`Access::guard`]
//! and then delegates to the user store and the auth payload issuer.
//! Errors from either collaborator propagate unchanged.

use std::sync::Arc;

use tracing::info;
use validator::Validate;

use super::access::Access;
use super::inputs::{ChangePasswordInput, CreateUserInput, SignUpInput, UpdateUserInput};
use crate::domain::{
    AuthContext, AuthPayload, AuthPayloadIssuer, DomainError, DomainResult, NewUser, User,
    UserRepositoryInterface, UserRole,
};

/// An account with no roles gets the plain user role.
fn roles_or_default(roles: Vec<UserRole>) -> Vec<UserRole> {
    if roles.is_empty() {
        vec![UserRole::User]
    } else {
        roles
    }
}

#[derive(Clone)]
pub struct UserResolvers {
    store: Arc<dyn UserRepositoryInterface>,
    issuer: Arc<dyn AuthPayloadIssuer>,
}

impl UserResolvers {
    pub fn new(store: Arc<dyn UserRepositoryInterface>, issuer: Arc<dyn AuthPayloadIssuer>) -> Self {
        Self { store, issuer }
    }

    pub fn store(&self) -> &Arc<dyn UserRepositoryInterface> {
        &self.store
    }

    pub async fn sign_in(
        &self,
        ctx: &AuthContext,
        email: &str,
        password: &str,
    ) -> DomainResult<AuthPayload> {
        Access::Public
            .guard(ctx, || async move {
                let Some(user) = self.store.get_by_email_and_password(email, password).await?
                else {
                    metrics::counter!("auth_sign_in_total", "outcome" => "rejected").increment(1);
                    return Err(DomainError::Unauthorized("Not authorized".into()));
                };

                metrics::counter!("auth_sign_in_total", "outcome" => "accepted").increment(1);
                info!(user_id = %user.id, "User signed in");
                self.issuer.issue(&user)
            })
            .await
    }

    pub async fn sign_up(&self, ctx: &AuthContext, input: SignUpInput) -> DomainResult<AuthPayload> {
        Access::Public
            .guard(ctx, || async move {
                input.validate()?;

                if self.store.get_by_email(&input.email).await?.is_some() {
                    return Err(DomainError::email_taken(&input.email));
                }

                let password_hash = self.store.generate_password_hash(&input.password)?;
                let user = self
                    .store
                    .create(NewUser {
                        email: input.email,
                        name: input.name,
                        password_hash,
                        roles: roles_or_default(input.roles),
                    })
                    .await?;

                info!(user_id = %user.id, "New user signed up");
                self.issuer.issue(&user)
            })
            .await
    }

    /// The caller's own record, exactly as resolved into the context.
    pub async fn me(&self, ctx: &AuthContext) -> DomainResult<Option<User>> {
        Access::Authenticated
            .guard(ctx, || async { Ok(ctx.user().cloned()) })
            .await
    }

    /// Always `true`; a missing id is not an error.
    pub async fn remove_user(&self, ctx: &AuthContext, id: &str) -> DomainResult<bool> {
        Access::Admin
            .guard(ctx, || async move {
                self.store.find_by_id_and_delete(id).await?;
                info!(user_id = %id, "User removed");
                Ok(true)
            })
            .await
    }

    pub async fn create_user(&self, ctx: &AuthContext, input: CreateUserInput) -> DomainResult<User> {
        Access::Admin
            .guard(ctx, || async move {
                input.validate()?;

                if self.store.get_by_email(&input.email).await?.is_some() {
                    return Err(DomainError::email_taken(&input.email));
                }

                let password_hash = self.store.generate_password_hash(&input.password)?;
                let user = self
                    .store
                    .create(NewUser {
                        email: input.email,
                        name: input.name,
                        password_hash,
                        roles: roles_or_default(input.roles),
                    })
                    .await?;

                info!(user_id = %user.id, "User created by admin");
                Ok(user)
            })
            .await
    }

    /// Partial update. The email check is case-insensitive and ignores the
    /// target record, unlike the exact match used by sign-up and create.
    pub async fn update_user(
        &self,
        ctx: &AuthContext,
        id: &str,
        input: UpdateUserInput,
    ) -> DomainResult<Option<User>> {
        Access::Admin
            .guard(ctx, || async move {
                input.validate()?;

                if let Some(email) = input.email.as_deref() {
                    if self.store.find_other_by_email_ci(id, email).await?.is_some() {
                        return Err(DomainError::email_taken(email));
                    }
                }

                let updated = self.store.find_by_id_and_update(id, input.into()).await?;
                if updated.is_some() {
                    info!(user_id = %id, "User updated");
                }
                Ok(updated)
            })
            .await
    }

    pub async fn change_password(
        &self,
        ctx: &AuthContext,
        input: ChangePasswordInput,
    ) -> DomainResult<bool> {
        Access::Authenticated
            .guard(ctx, || async move {
                input.validate()?;

                let user = ctx
                    .user()
                    .ok_or_else(|| DomainError::Unauthorized("Not authorized".into()))?;

                if self
                    .store
                    .get_by_email_and_password(&user.email, &input.current_password)
                    .await?
                    .is_none()
                {
                    return Err(DomainError::Unauthorized("Invalid current password".into()));
                }

                let new_hash = self.store.generate_password_hash(&input.new_password)?;
                self.store.update_password_hash(&user.id, &new_hash).await?;

                info!(user_id = %user.id, "Password changed");
                Ok(true)
            })
            .await
    }
}
