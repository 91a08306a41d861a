//! GraphQL error mapping

use async_graphql::{Error, ErrorExtensions};
use tracing::error;

use crate::shared::DomainError;

impl ErrorExtensions for DomainError {
    fn extend(&self) -> Error {
        let message = match self {
            DomainError::Storage(_) | DomainError::Crypto(_) => {
                error!(error = %self, "Internal error while resolving request");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let code = self.code();
        Error::new(message).extend_with(|_, e| e.set("code", code))
    }
}
