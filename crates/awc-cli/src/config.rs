//! Configuration loading and management.

use std::path::{Path, PathBuf};

use awc_core::{CleanConfig, MergeDuration};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::Cli;

/// Application configuration.
///
/// The cleaning options sit at the top level of the file next to the output
/// options, so a config file reads like the command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(flatten)]
    pub clean: CleanConfig,

    /// Pretty-print output documents.
    pub pretty: bool,
}

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_gap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedupe: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_zero_duration: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_apps: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedupe_simultaneous: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_duration: Option<MergeDuration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,
}

impl Overrides {
    /// Collects the flags the user actually passed.
    ///
    /// Switch flags only ever turn a behavior on (or, for `--no-*`, off), so an
    /// absent switch is an unset override rather than `false`.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            min_duration: cli.min_duration,
            max_gap: cli.max_gap,
            merge: cli.no_merge.then_some(false),
            dedupe: cli.no_dedupe.then_some(false),
            keep_zero_duration: cli.keep_zero_duration.then_some(true),
            exclude_apps: cli.exclude_apps.clone(),
            dedupe_simultaneous: cli.dedupe_simultaneous.then_some(true),
            merge_duration: cli.merge_duration,
            identity_fields: (!cli.identity_fields.is_empty()).then(|| cli.identity_fields.clone()),
            pretty: cli.pretty.then_some(true),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file, with command-line
    /// overrides applied last.
    ///
    /// Layers, lowest first: built-in defaults, the user config file, the file
    /// given with `--config`, `AW_CLEAN_*` environment variables, `overrides`.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>, overrides: &Overrides) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // An explicitly named file has to exist
        if let Some(path) = config_path {
            if !path.is_file() {
                return Err(figment::Error::from(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (AW_CLEAN_*)
        figment = figment.merge(Env::prefixed("AW_CLEAN_"));

        figment = figment.merge(Serialized::defaults(overrides));

        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    fn validate(&self) -> Result<(), figment::Error> {
        for (name, value) in [
            ("min_duration", self.clean.min_duration),
            ("max_gap", self.clean.max_gap),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(figment::Error::from(format!(
                    "{name} must be a non-negative number of seconds, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Returns the platform-specific config directory for aw-clean.
///
/// On Linux: `~/.config/aw-clean`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("aw-clean"))
}
