//! Access-control wrappers for resolvers.
//!
//! A resolver is an async closure; [`Access::guard`] checks the caller's
//! [`AuthContext`] and only then runs it. Each resolver is bound to exactly
//! one level where it is defined.

use std::future::Future;

use tracing::warn;

use crate::domain::{AuthContext, DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No precondition.
    Public,
    /// Caller must resolve to a user.
    Authenticated,
    /// Caller must resolve to a user holding the admin role.
    Admin,
}

impl Access {
    pub fn check(self, ctx: &AuthContext) -> DomainResult<()> {
        let allowed = match self {
            Access::Public => true,
            Access::Authenticated => ctx.is_authenticated(),
            Access::Admin => ctx.user().is_some_and(|u| u.is_admin()),
        };

        if allowed {
            Ok(())
        } else {
            Err(DomainError::Unauthorized("Not authorized".into()))
        }
    }

    /// Run `resolver` if the precondition holds, otherwise short-circuit.
    pub async fn guard<T, F, Fut>(self, ctx: &AuthContext, resolver: F) -> DomainResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DomainResult<T>>,
    {
        if let Err(e) = self.check(ctx) {
            warn!(
                access = ?self,
                user_id = ctx.user().map(|u| u.id.as_str()).unwrap_or("-"),
                "Access denied"
            );
            return Err(e);
        }
        resolver().await
    }
}
