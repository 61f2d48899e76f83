use thiserror::Error;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] daysheet_service::error::ServiceError),

    #[error(transparent)]
    ValidationError(#[from] daysheet_service::error::ValidationError),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
