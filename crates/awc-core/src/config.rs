//! Cleaning configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Apps that are excluded unless the caller overrides the list.
pub const DEFAULT_EXCLUDED_APPS: [&str; 3] =
    ["UserNotificationCenter", "loginwindow", "CoreServicesUIAgent"];

/// How the duration of a merged chain is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeDuration {
    /// From the first start to the latest end, gaps included.
    #[default]
    Span,
    /// Sum of the constituent durations, gaps excluded.
    Sum,
}

impl MergeDuration {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Span => "span",
            Self::Sum => "sum",
        }
    }
}

impl fmt::Display for MergeDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeDuration {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "span" => Ok(Self::Span),
            "sum" => Ok(Self::Sum),
            _ => Err(ConfigError::InvalidMergeDuration {
                value: s.to_string(),
            }),
        }
    }
}

/// Configuration for one cleaning run.
///
/// The value is passed explicitly to every stage; no stage reads global state.
/// All fields have defaults so partial configuration files deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct CleanConfig {
    /// Events shorter than this many seconds are dropped. Default: 2.
    pub min_duration: f64,

    /// Largest gap in seconds that still joins two same-identity events.
    /// Default: 30.
    pub max_gap: f64,

    /// Merge consecutive same-identity events.
    pub merge: bool,

    /// Remove exact duplicate events.
    pub dedupe: bool,

    /// Keep zero-duration events regardless of `min_duration`.
    pub keep_zero_duration: bool,

    /// Display names (app or web host) whose events are dropped. Case-sensitive.
    pub exclude_apps: Vec<String>,

    /// Collapse events sharing a start instant into the longest one.
    pub dedupe_simultaneous: bool,

    /// Duration policy for merged chains.
    pub merge_duration: MergeDuration,

    /// Payload keys that form an event's identity. Empty means the watcher default.
    pub identity_fields: Vec<String>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            min_duration: 2.0,
            max_gap: 30.0,
            merge: true,
            dedupe: true,
            keep_zero_duration: false,
            exclude_apps: DEFAULT_EXCLUDED_APPS.iter().map(ToString::to_string).collect(),
            dedupe_simultaneous: false,
            merge_duration: MergeDuration::Span,
            identity_fields: Vec::new(),
        }
    }
}

impl CleanConfig {
    /// A configuration with every optional stage switched off.
    ///
    /// Only sorting remains, which makes the output a reordering of the input.
    #[must_use]
    pub fn passthrough() -> Self {
        Self {
            min_duration: 0.0,
            merge: false,
            dedupe: false,
            keep_zero_duration: true,
            exclude_apps: Vec::new(),
            dedupe_simultaneous: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_uses_defaults() {
        let config: CleanConfig = serde_json::from_str(r#"{"max_gap": 60}"#).unwrap();
        assert!((config.max_gap - 60.0).abs() < f64::EPSILON);
        assert!((config.min_duration - 2.0).abs() < f64::EPSILON);
        assert!(config.merge);
        assert_eq!(config.exclude_apps.len(), 3);
        assert_eq!(config.merge_duration, MergeDuration::Span);
    }

    #[test]
    fn merge_duration_parses_lowercase() {
        assert_eq!("sum".parse::<MergeDuration>(), Ok(MergeDuration::Sum));
        assert_eq!("span".parse::<MergeDuration>(), Ok(MergeDuration::Span));
        assert_eq!(
            "Span".parse::<MergeDuration>(),
            Err(ConfigError::InvalidMergeDuration {
                value: "Span".to_string(),
            })
        );
    }

    #[test]
    fn merge_duration_serializes_lowercase() {
        let json = serde_json::to_string(&MergeDuration::Sum).unwrap();
        assert_eq!(json, r#""sum""#);
    }

    #[test]
    fn passthrough_disables_filters() {
        let config = CleanConfig::passthrough();
        assert!(!config.merge && !config.dedupe && !config.dedupe_simultaneous);
        assert!(config.keep_zero_duration);
        assert!(config.exclude_apps.is_empty());
    }
}
