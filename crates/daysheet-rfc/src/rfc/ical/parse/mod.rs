//! iCalendar text parsing.

mod error;
mod lexer;
mod parser;
mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use parser::{parse, parse_bytes};
pub use values::{parse_date, parse_datetime, parse_duration, unescape_text};
