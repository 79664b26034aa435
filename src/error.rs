use crate::{db::dao::DaoLayerError, validation::ValidationErrors};

const PERSISTENCE_FAILED: &str = "database operation failed. Please check the logs for more details";

/// Outcome of a failed domain operation.
///
/// `Validation` means the input was rejected and nothing was written.
/// `Conflict` and `Persistence` come from the database and may be retried.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{message}")]
    Persistence {
        message: String,
        #[source]
        source: sea_orm::DbErr,
    },
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Failures caused by the storage layer rather than by the input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::Persistence { .. })
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<DaoLayerError> for AppError {
    fn from(err: DaoLayerError) -> Self {
        match err {
            DaoLayerError::Db(source) => {
                tracing::error!(error = %source, "database operation failed");
                AppError::Persistence {
                    message: PERSISTENCE_FAILED.to_string(),
                    source,
                }
            }
            DaoLayerError::UniqueViolation(_) | DaoLayerError::ForeignKeyViolation(_) => {
                tracing::warn!(error = %err, "constraint violation");
                AppError::conflict(err.to_string())
            }
            DaoLayerError::NotFound { .. } => AppError::not_found(err.to_string()),
            DaoLayerError::InvalidPagination { .. } => AppError::bad_request(err.to_string()),
        }
    }
}
