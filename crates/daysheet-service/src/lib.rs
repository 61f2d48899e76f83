pub mod error;
pub mod feed;
pub mod generate;
pub mod planner;
pub mod render;
