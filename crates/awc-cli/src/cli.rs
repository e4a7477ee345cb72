//! Command-line argument definitions.

use std::path::PathBuf;

use awc_core::{ConfigError, MergeDuration};
use clap::Parser;

/// Clean and deduplicate `ActivityWatch` events.
///
/// Reads an export (a bucket map, an events list or a bare array of events),
/// removes duplicates, merges consecutive same-activity events, drops short
/// and excluded events, and writes a document of the same shape to stdout.
#[derive(Debug, Parser)]
#[command(
    name = "aw-clean",
    version,
    about,
    long_about = None,
    after_help = "Examples:\n  cat data.json | aw-clean\n  aw-clean data.json --min-duration 5 --max-gap 60\n  aw-clean -d data/ --no-merge"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input JSON file (stdin when omitted).
    #[arg(conflicts_with = "directory")]
    pub input: Option<PathBuf>,

    /// Clean every `*.json` file in a directory, one JSON line per file.
    #[arg(short, long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Minimum event duration in seconds [default: 2].
    #[arg(long, value_name = "SECONDS")]
    pub min_duration: Option<f64>,

    /// Largest gap in seconds that still merges consecutive events [default: 30].
    #[arg(long, value_name = "SECONDS")]
    pub max_gap: Option<f64>,

    /// Disable merging of consecutive events.
    #[arg(long)]
    pub no_merge: bool,

    /// Disable removal of duplicate events.
    #[arg(long)]
    pub no_dedupe: bool,

    /// Keep zero-duration events.
    #[arg(long)]
    pub keep_zero_duration: bool,

    /// Apps (or web hosts) to exclude; pass the flag alone to exclude nothing.
    #[arg(long, num_args = 0.., value_name = "APP")]
    pub exclude_apps: Option<Vec<String>>,

    /// Collapse events that start at the same instant into the longest one.
    #[arg(long)]
    pub dedupe_simultaneous: bool,

    /// How a merged event's duration is computed.
    #[arg(long, value_name = "POLICY", value_parser = parse_merge_duration)]
    pub merge_duration: Option<MergeDuration>,

    /// Payload key that identifies an activity; repeat for several keys.
    #[arg(long = "identity-field", value_name = "KEY")]
    pub identity_fields: Vec<String>,

    /// Pretty-print the output document.
    #[arg(long)]
    pub pretty: bool,

    /// Print the effective configuration and exit.
    #[arg(long)]
    pub show_config: bool,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

fn parse_merge_duration(value: &str) -> Result<MergeDuration, ConfigError> {
    value.parse()
}
