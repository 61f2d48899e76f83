//! PDF output for laid-out day pages.

pub mod pdf;

pub use pdf::render_document;
