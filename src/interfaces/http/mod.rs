//! HTTP interface
//!
//! - `middleware`: bearer token -> `AuthContext` resolution
//! - `modules`: GraphQL, health and metrics handlers
//! - `router`: the assembled axum router

pub mod middleware;
pub mod modules;
pub mod router;

pub use router::create_router;
