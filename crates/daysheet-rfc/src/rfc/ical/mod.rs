//! iCalendar (RFC 5545) support: the subset needed to read event feeds.

pub mod core;
pub mod expand;
pub mod parse;
