//! GraphQL endpoint and GraphiQL playground

pub mod handlers;

pub use handlers::*;
