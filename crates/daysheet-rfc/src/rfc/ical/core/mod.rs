//! iCalendar core models (RFC 5545).
//!
//! Only the value types a day planner reads are modelled with structure.
//! Everything else is kept as raw text so unknown content never aborts a
//! feed.

mod component;
mod parameter;
mod property;
mod value;

pub use component::{Component, ComponentKind, ICalendar};
pub use parameter::Parameter;
pub use property::{ContentLine, Property, names};
pub use value::{DateTime, DateTimeForm, Value};
