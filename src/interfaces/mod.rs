pub mod graphql;
pub mod http;

pub use graphql::{build_schema, AccountSchema};
pub use http::create_router;
