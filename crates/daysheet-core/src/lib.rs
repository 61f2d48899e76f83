//! Shared configuration, errors and value types for the daysheet workspace.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
