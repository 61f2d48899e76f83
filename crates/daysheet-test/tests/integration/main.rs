//! Cross-crate planner scenarios.

mod document;
mod expansion;
mod helpers;
mod http;
mod normalization;
