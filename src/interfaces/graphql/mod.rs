//! GraphQL interface
//!
//! - `types`: output objects, enums and closed input objects
//! - `query` / `mutation`: thin roots delegating to `UserResolvers`
//! - `errors`: `DomainError` -> GraphQL error with an `extensions.code`
//! - `schema`: schema construction

pub mod errors;
pub mod mutation;
pub mod query;
pub mod schema;
pub mod types;

pub use schema::{build_schema, AccountSchema};

use std::sync::Arc;

use async_graphql::Context;

use crate::application::UserResolvers;
use crate::domain::AuthContext;

/// Caller identity attached to the request; anonymous when absent.
pub(crate) fn auth_context(ctx: &Context<'_>) -> AuthContext {
    ctx.data_opt::<AuthContext>().cloned().unwrap_or_default()
}

pub(crate) fn resolvers<'a>(ctx: &Context<'a>) -> &'a Arc<UserResolvers> {
    ctx.data_unchecked::<Arc<UserResolvers>>()
}
