//! # Account Service
//!
//! GraphQL user-account service: sign-in, sign-up, the current-user query and
//! admin user management, each behind an explicit access level.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Users, roles, auth payloads and the user store port
//! - **application**: Access levels, validated inputs and the user resolvers
//! - **infrastructure**: SeaORM and in-memory stores, bcrypt, JWT
//! - **interfaces**: GraphQL schema and the axum HTTP router
//! - **shared**: Error types and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};

pub use interfaces::{build_schema, create_router, AccountSchema};
