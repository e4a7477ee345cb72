//! Activity events as read from an export.

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Number, Value};

use crate::error::{CleanError, SchemaProblem};

static NULL: Value = Value::Null;

/// One activity interval.
///
/// The parsed `start` and `duration` drive every cleaning decision, while the
/// original record is kept whole so that an event no stage touches is written
/// back exactly as it was read (field order and unknown fields included).
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    start: DateTime<FixedOffset>,
    duration: f64,
    /// Seconds from `start` to the real end. Differs from `duration` only for
    /// chains merged under the sum policy.
    extent: f64,
    record: Map<String, Value>,
}

/// Why a record could not become an [`Event`], before its position is known.
#[derive(Debug)]
pub(crate) enum RecordError {
    Schema(SchemaProblem),
    NegativeDuration(f64),
}

impl RecordError {
    pub(crate) fn locate(self, bucket: Option<&str>, index: usize) -> CleanError {
        let bucket = bucket.map(str::to_string);
        match self {
            Self::Schema(problem) => CleanError::EventSchema {
                bucket,
                index,
                problem,
            },
            Self::NegativeDuration(duration) => CleanError::InvalidDuration {
                bucket,
                index,
                duration,
            },
        }
    }
}

impl From<SchemaProblem> for RecordError {
    fn from(problem: SchemaProblem) -> Self {
        Self::Schema(problem)
    }
}

impl Event {
    /// Builds an event from a raw JSON record.
    pub(crate) fn from_record(value: Value) -> Result<Self, RecordError> {
        let Value::Object(record) = value else {
            return Err(SchemaProblem::NotAnObject.into());
        };

        let raw_timestamp = match record.get("timestamp") {
            None | Some(Value::Null) => {
                return Err(SchemaProblem::MissingField("timestamp").into());
            }
            Some(Value::String(s)) => s,
            Some(_) => {
                return Err(SchemaProblem::WrongType {
                    field: "timestamp",
                    expected: "a string",
                }
                .into());
            }
        };
        let start = DateTime::parse_from_rfc3339(raw_timestamp).map_err(|err| {
            SchemaProblem::BadTimestamp {
                value: raw_timestamp.clone(),
                reason: err.to_string(),
            }
        })?;

        let duration = match record.get("duration") {
            None | Some(Value::Null) => {
                return Err(SchemaProblem::MissingField("duration").into());
            }
            Some(Value::Number(n)) => n.as_f64().ok_or(SchemaProblem::WrongType {
                field: "duration",
                expected: "a finite number",
            })?,
            Some(_) => {
                return Err(SchemaProblem::WrongType {
                    field: "duration",
                    expected: "a number",
                }
                .into());
            }
        };
        if duration < 0.0 {
            return Err(RecordError::NegativeDuration(duration));
        }

        Ok(Self {
            start,
            duration,
            extent: duration,
            record,
        })
    }

    /// When the activity began.
    pub const fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    /// Length of the activity in seconds.
    pub const fn duration(&self) -> f64 {
        self.duration
    }

    /// Seconds from the start to the latest instant the activity covers.
    pub const fn extent(&self) -> f64 {
        self.extent
    }

    /// The watcher-specific payload (`data`), or `null` when absent.
    pub fn data(&self) -> &Value {
        self.record.get("data").unwrap_or(&NULL)
    }

    /// Looks up a payload field by name.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.data().get(key)
    }

    /// The full record, including fields the cleaner does not interpret.
    pub const fn record(&self) -> &Map<String, Value> {
        &self.record
    }

    /// Seconds elapsed from this event's start until `instant`.
    ///
    /// Negative when `instant` is earlier than the start.
    pub fn seconds_until(&self, instant: DateTime<FixedOffset>) -> f64 {
        seconds_between(self.start, instant)
    }

    /// Synthesizes a copy of this event with a different duration and extent.
    ///
    /// Every other field, the payload included, is carried over unchanged.
    #[must_use]
    pub(crate) fn with_duration(&self, duration: f64, extent: f64) -> Self {
        let mut record = self.record.clone();
        let number = Number::from_f64(duration).map_or(Value::Null, Value::Number);
        record.insert("duration".to_string(), number);
        Self {
            start: self.start,
            duration,
            extent,
            record,
        }
    }

    /// Converts the event back into its JSON record.
    pub fn into_value(self) -> Value {
        Value::Object(self.record)
    }
}

#[allow(clippy::cast_precision_loss)]
fn seconds_between(from: DateTime<FixedOffset>, to: DateTime<FixedOffset>) -> f64 {
    let delta = to.signed_duration_since(from);
    delta.num_nanoseconds().map_or_else(
        || delta.num_milliseconds() as f64 / 1_000.0,
        |nanos| nanos as f64 / 1_000_000_000.0,
    )
}
