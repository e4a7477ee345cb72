//! Errors raised while cleaning a document.

use thiserror::Error;

/// Why a single event record was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaProblem {
    /// The record is not a JSON object.
    #[error("event is not an object")]
    NotAnObject,

    /// A required field is absent.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A field holds a value of the wrong JSON type.
    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    /// The timestamp is not an RFC 3339 instant with an offset.
    #[error("unparseable timestamp {value:?}: {reason}")]
    BadTimestamp { value: String, reason: String },
}

/// Errors returned by the cleaning engine.
///
/// Every variant is fatal for the document being cleaned: no partial output
/// is produced.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CleanError {
    /// The document matches none of the supported container shapes.
    #[error("unrecognized container shape: {reason}")]
    Format { reason: String },

    /// An event record is structurally invalid.
    #[error("event {index}{}: {problem}", bucket_suffix(.bucket))]
    EventSchema {
        bucket: Option<String>,
        index: usize,
        problem: SchemaProblem,
    },

    /// An event carries a negative duration.
    #[error("event {index}{}: negative duration {duration}", bucket_suffix(.bucket))]
    InvalidDuration {
        bucket: Option<String>,
        index: usize,
        duration: f64,
    },
}

/// Errors raised while reading configuration values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A merge duration policy other than `span` or `sum`.
    #[error("invalid merge duration policy: {value} (expected span or sum)")]
    InvalidMergeDuration { value: String },
}

impl CleanError {
    pub(crate) fn format(reason: impl Into<String>) -> Self {
        Self::Format {
            reason: reason.into(),
        }
    }

    /// Returns the index of the offending event, if the error concerns one.
    pub const fn event_index(&self) -> Option<usize> {
        match self {
            Self::Format { .. } => None,
            Self::EventSchema { index, .. } | Self::InvalidDuration { index, .. } => Some(*index),
        }
    }
}

#[allow(clippy::ref_option)]
fn bucket_suffix(bucket: &Option<String>) -> String {
    bucket
        .as_deref()
        .map_or_else(String::new, |id| format!(" in bucket {id:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_names_index_and_bucket() {
        let err = CleanError::EventSchema {
            bucket: Some("aw-watcher-window_host".to_string()),
            index: 3,
            problem: SchemaProblem::MissingField("timestamp"),
        };
        assert_eq!(
            err.to_string(),
            "event 3 in bucket \"aw-watcher-window_host\": missing required field `timestamp`"
        );
        assert_eq!(err.event_index(), Some(3));
    }

    #[test]
    fn duration_error_without_bucket() {
        let err = CleanError::InvalidDuration {
            bucket: None,
            index: 0,
            duration: -1.5,
        };
        assert_eq!(err.to_string(), "event 0: negative duration -1.5");
    }

    #[test]
    fn invalid_merge_duration_names_value() {
        let err = ConfigError::InvalidMergeDuration {
            value: "avg".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid merge duration policy: avg (expected span or sum)"
        );
    }

    #[test]
    fn format_error_has_no_index() {
        let err = CleanError::format("expected an object or array");
        assert_eq!(err.event_index(), None);
        assert!(err.to_string().starts_with("unrecognized container shape"));
    }
}
