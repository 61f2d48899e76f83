use thiserror::Error;

use crate::rfc::ical::expand::timezone::ConversionError;
use crate::rfc::ical::parse::ParseError;

/// RFC parsing and conversion errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("Timezone error: {0}")]
    TimezoneError(#[from] ConversionError),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;
