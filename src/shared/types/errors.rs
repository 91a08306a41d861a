use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("{0}")]
    EmailAlreadyExists(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Crypto error: {0}")]
    Crypto(String),
}

impl DomainError {
    /// Message used whenever an email collides with an existing account.
    pub fn email_taken(email: &str) -> Self {
        Self::EmailAlreadyExists(format!(
            "Has an user registered with this email: {}",
            email
        ))
    }

    /// Whether this error is likely transient (e.g. DB connection lost)
    /// and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, DomainError::Storage(_))
    }

    /// Stable machine-readable code surfaced to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::NotFound { .. } => "NOT_FOUND",
            DomainError::Validation(_) => "VALIDATION_ERROR",
            DomainError::EmailAlreadyExists(_) => "EMAIL_ALREADY_EXISTS",
            DomainError::Unauthorized(_) => "UNAUTHORIZED",
            DomainError::Storage(_) | DomainError::Crypto(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    format!("{}: {}", field, msg)
                })
            })
            .collect();

        if field_errors.is_empty() {
            DomainError::Validation("Validation failed".to_string())
        } else {
            DomainError::Validation(field_errors.join("; "))
        }
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfraError> for DomainError {
    fn from(err: InfraError) -> Self {
        match err {
            InfraError::Crypto(msg) => DomainError::Crypto(msg),
            other => DomainError::Storage(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Infra(#[from] InfraError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::Infra(InfraError::Database(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(email(message = "must be a valid email"))]
        email: String,
    }

    #[test]
    fn email_taken_names_the_email() {
        let err = DomainError::email_taken("a@x.com");
        assert_eq!(
            err.to_string(),
            "Has an user registered with this email: a@x.com"
        );
        assert_eq!(err.code(), "EMAIL_ALREADY_EXISTS");
    }

    #[test]
    fn only_storage_errors_are_transient() {
        assert!(DomainError::Storage("connection reset".into()).is_transient());
        assert!(!DomainError::Unauthorized("nope".into()).is_transient());
        assert!(!DomainError::Crypto("bad cost".into()).is_transient());
    }

    #[test]
    fn validation_errors_list_fields() {
        let errors = Probe {
            email: "not-an-email".into(),
        }
        .validate()
        .unwrap_err();

        match DomainError::from(errors) {
            DomainError::Validation(msg) => assert_eq!(msg, "email: must be a valid email"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn database_errors_map_to_storage() {
        let err: DomainError = InfraError::Database(sea_orm::DbErr::Custom("boom".into())).into();
        assert!(matches!(err, DomainError::Storage(_)));
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }
}
