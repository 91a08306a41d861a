//! Domain layer: entities and the ports the application depends on.

pub mod auth;
pub mod user;

pub use auth::{AuthContext, AuthPayload, AuthPayloadIssuer};
pub use user::{
    normalize_roles, NewUser, User, UserChanges, UserRepositoryInterface, UserRole,
};

// Re-export errors for convenience
pub use crate::shared::{DomainError, DomainResult};
