//! `ActivityWatch` export cleaner CLI library.
//!
//! This crate provides the command-line front-end for `awc-core`.

mod cli;
pub mod commands;
mod config;

pub use cli::Cli;
pub use config::{Config, Overrides};
