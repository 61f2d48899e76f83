//! Daysheet planner - integration test support.
//!
//! This crate re-exports the workspace crates so scenario tests can reach the
//! whole pipeline through one dependency.

pub mod component {
    pub use daysheet_core::{config, constants, types};
    pub use daysheet_service::{feed, generate, planner, render};

    pub mod error {
        pub use daysheet_core::error::*;
        pub use daysheet_service::error::*;
    }
}

pub mod app {
    pub use daysheet_app::*;
}

pub use daysheet_rfc as rfc;
