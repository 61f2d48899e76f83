use thiserror::Error;

/// Caller input that cannot be turned into a planner request.
///
/// The `Display` text is shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please provide at least one iCal URL")]
    NoSources,

    #[error("Time range must be at least 8 hours")]
    RangeTooShort,

    #[error("Time range cannot exceed 12 hours")]
    RangeTooLong,

    #[error("Time range must end by midnight")]
    HourOutOfRange,

    #[error("Invalid hour: {0}")]
    InvalidHour(String),

    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("End date must be on or after start date")]
    EndBeforeStart,
}

impl From<daysheet_core::error::CoreError> for ValidationError {
    fn from(err: daysheet_core::error::CoreError) -> Self {
        use daysheet_core::error::CoreError;
        match err {
            CoreError::EndBeforeStart { .. } => Self::EndBeforeStart,
            CoreError::HourRangeTooShort { .. } => Self::RangeTooShort,
            CoreError::HourRangeTooLong { .. } => Self::RangeTooLong,
            CoreError::HourOutOfRange(_) => Self::HourOutOfRange,
        }
    }
}

/// Service layer errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("HTTP client setup failed: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Document rendering failed: {0}")]
    Render(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
