//! CLI command implementations.

pub mod batch;
pub mod clean;
pub mod show_config;
