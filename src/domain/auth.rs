//! Authentication ports and per-request auth state.

use crate::domain::User;
use crate::shared::DomainResult;

/// Credential handed back after a successful sign-in or sign-up.
#[derive(Debug, Clone)]
pub struct AuthPayload {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

/// Issues signed credentials for an authenticated user.
pub trait AuthPayloadIssuer: Send + Sync {
    fn issue(&self, user: &User) -> DomainResult<AuthPayload>;
}

/// Per-request authentication state. Read-only to resolvers.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    user: Option<User>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn authenticated(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}
