//! Cleaning engine for ActivityWatch event exports.
//!
//! This crate turns a raw export into a cleaned one of the same shape:
//! - Container: recognizing bucket maps, event lists and wrapped documents
//! - Dedupe: dropping exact duplicates
//! - Merge: joining consecutive same-activity events across short gaps
//! - Filter: dropping too-short events and excluded apps
//!
//! The engine is pure. It reads no files, no environment and writes no logs;
//! callers get either a cleaned document or a [`CleanError`].

pub mod config;
pub mod container;
pub mod dedupe;
mod error;
mod event;
pub mod filter;
pub mod identity;
pub mod merge;
mod pipeline;
pub mod watcher;

pub use config::{CleanConfig, DEFAULT_EXCLUDED_APPS, MergeDuration};
pub use container::{ContainerKind, EventStream, ShapeDescriptor};
pub use error::{CleanError, ConfigError, SchemaProblem};
pub use event::Event;
pub use identity::{Identity, IdentityRule};
pub use pipeline::{CleanReport, StageCounts, StreamReport, clean, clean_stream, clean_with_report};
pub use watcher::WatcherKind;
