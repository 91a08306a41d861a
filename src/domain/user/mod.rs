//! User aggregate
//!
//! Contains the User entity, DTOs, and repository interface.

pub mod model;
pub mod repository;

mod dto_create;
mod dto_update;

// Re-export model types
pub use model::{normalize_roles, User, UserRole};

// Re-export DTOs
pub use dto_create::NewUser;
pub use dto_update::UserChanges;

// Re-export repository trait
pub use repository::UserRepositoryInterface;
