use chrono::NaiveDate;
use thiserror::Error;

/// Core-level errors raised by the validated value types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("End date {end} must be on or after start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("Time range must be at least {min} hours (got {span})")]
    HourRangeTooShort { span: i64, min: u32 },

    #[error("Time range cannot exceed {max} hours (got {span})")]
    HourRangeTooLong { span: i64, max: u32 },

    #[error("Hour {0} is outside the day")]
    HourOutOfRange(u32),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
