pub mod app;
pub mod config;
pub mod error;
pub mod fetcher_handler;
