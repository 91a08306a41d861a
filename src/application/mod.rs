pub mod identity;

// Re-export key types for convenience
pub use identity::{
    Access, ChangePasswordInput, CreateUserInput, SignUpInput, UpdateUserInput, UserResolvers,
};
