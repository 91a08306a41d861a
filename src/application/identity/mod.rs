//! Identity module: user accounts and authentication
//!
//! Contains the `UserResolvers` which carry every account use-case
//! (sign-in, sign-up, profile lookup, admin user management, password
//! changes) behind the access levels in [`access`].

pub mod access;
pub mod inputs;
pub mod resolvers;

pub use access::Access;
pub use inputs::{ChangePasswordInput, CreateUserInput, SignUpInput, UpdateUserInput};
pub use resolvers::UserResolvers;
