//! Container shapes: taking event lists out of a document and putting them back.
//!
//! Four shapes are recognized, tried in this order:
//!
//! 1. Bucket map: `{"buckets": {"<id>": {..., "events": [...]}}}`
//! 2. Events field: `{"events": [...], ...}`
//! 3. Bare array: `[...]`
//! 4. Wrapped data: `{"data": {"events": [...], ...}, ...}`
//!
//! Parsing empties each event list in place and keeps the rest of the
//! document as a skeleton. Rebuilding fills the lists back in, so every other
//! field survives with its value and position.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CleanError;
use crate::event::Event;
use crate::watcher::WatcherKind;

/// The shape class of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    BucketMap,
    EventsField,
    BareArray,
    WrappedData,
}

/// The events of one bucket, or of the single list in a non-bucket document.
#[derive(Debug, Clone, PartialEq)]
pub struct EventStream {
    /// Bucket id, for bucket maps.
    pub bucket: Option<String>,
    /// The watcher family the events came from.
    pub watcher: WatcherKind,
    pub events: Vec<Event>,
}

/// Where an event list lives inside the skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Bucket(String),
    EventsField,
    Root,
    WrappedData,
}

/// Everything needed to rebuild a document around cleaned event lists.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDescriptor {
    kind: ContainerKind,
    skeleton: Value,
    slots: Vec<Slot>,
}

impl ShapeDescriptor {
    pub const fn kind(&self) -> ContainerKind {
        self.kind
    }
}

/// Splits a document into its event streams and a shape descriptor.
pub fn parse(document: Value) -> Result<(Vec<EventStream>, ShapeDescriptor), CleanError> {
    match document {
        Value::Object(root) => parse_object(root),
        Value::Array(items) => {
            let events = parse_events(items, None)?;
            let watcher = WatcherKind::infer(events.iter().map(Event::data));
            let stream = EventStream {
                bucket: None,
                watcher,
                events,
            };
            let shape = ShapeDescriptor {
                kind: ContainerKind::BareArray,
                skeleton: Value::Array(Vec::new()),
                slots: vec![Slot::Root],
            };
            Ok((vec![stream], shape))
        }
        other => Err(CleanError::format(format!(
            "expected a JSON object or array, found {}",
            type_name(&other)
        ))),
    }
}

fn parse_object(mut root: Map<String, Value>) -> Result<(Vec<EventStream>, ShapeDescriptor), CleanError> {
    if let Some(Value::Object(buckets)) = root.get_mut("buckets") {
        let mut streams = Vec::new();
        let mut slots = Vec::new();
        for (id, bucket) in buckets.iter_mut() {
            let Value::Object(bucket) = bucket else {
                continue;
            };
            let Some(items) = take_events(bucket, &format!("buckets.{id}.events"))? else {
                continue;
            };
            let events = parse_events(items, Some(id.as_str()))?;
            let watcher = WatcherKind::from_bucket(id, bucket)
                .unwrap_or_else(|| WatcherKind::infer(events.iter().map(Event::data)));
            streams.push(EventStream {
                bucket: Some(id.clone()),
                watcher,
                events,
            });
            slots.push(Slot::Bucket(id.clone()));
        }
        let shape = ShapeDescriptor {
            kind: ContainerKind::BucketMap,
            skeleton: Value::Object(root),
            slots,
        };
        return Ok((streams, shape));
    }

    if let Some(items) = take_events(&mut root, "events")? {
        return single(items, ContainerKind::EventsField, Slot::EventsField, root);
    }

    let wrapped = match root.get_mut("data") {
        Some(Value::Object(data)) => take_events(data, "data.events")?,
        _ => None,
    };
    if let Some(items) = wrapped {
        return single(items, ContainerKind::WrappedData, Slot::WrappedData, root);
    }

    Err(CleanError::format(
        "object has no `buckets`, `events` or `data.events` field",
    ))
}

fn single(
    items: Vec<Value>,
    kind: ContainerKind,
    slot: Slot,
    root: Map<String, Value>,
) -> Result<(Vec<EventStream>, ShapeDescriptor), CleanError> {
    let events = parse_events(items, None)?;
    let watcher = WatcherKind::infer(events.iter().map(Event::data));
    let stream = EventStream {
        bucket: None,
        watcher,
        events,
    };
    let shape = ShapeDescriptor {
        kind,
        skeleton: Value::Object(root),
        slots: vec![slot],
    };
    Ok((vec![stream], shape))
}

/// Moves the `events` array out of `object`, leaving an empty array behind.
///
/// Returns `None` when there is no `events` key.
fn take_events(object: &mut Map<String, Value>, path: &str) -> Result<Option<Vec<Value>>, CleanError> {
    match object.get_mut("events") {
        None => Ok(None),
        Some(Value::Array(items)) => Ok(Some(std::mem::take(items))),
        Some(other) => Err(CleanError::format(format!(
            "`{path}` must be an array, found {}",
            type_name(other)
        ))),
    }
}

fn parse_events(items: Vec<Value>, bucket: Option<&str>) -> Result<Vec<Event>, CleanError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| Event::from_record(item).map_err(|err| err.locate(bucket, index)))
        .collect()
}

/// Reassembles a document from its shape descriptor and cleaned streams.
///
/// `streams` must be in the order `parse` returned them.
pub fn rebuild(shape: ShapeDescriptor, streams: Vec<EventStream>) -> Value {
    let ShapeDescriptor {
        mut skeleton,
        slots,
        ..
    } = shape;

    for (slot, stream) in slots.iter().zip(streams) {
        let events = Value::Array(stream.events.into_iter().map(Event::into_value).collect());
        let target = match slot {
            Slot::Bucket(id) => skeleton
                .get_mut("buckets")
                .and_then(|buckets| buckets.get_mut(id))
                .and_then(|bucket| bucket.get_mut("events")),
            Slot::EventsField => skeleton.get_mut("events"),
            Slot::WrappedData => skeleton
                .get_mut("data")
                .and_then(|data| data.get_mut("events")),
            Slot::Root => Some(&mut skeleton),
        };
        if let Some(target) = target {
            *target = events;
        }
    }

    skeleton
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(ts: &str, duration: f64, app: &str) -> Value {
        json!({"timestamp": ts, "duration": duration, "data": {"app": app}})
    }

    #[test]
    fn detects_bucket_map() {
        let doc = json!({
            "buckets": {
                "aw-watcher-window_host": {
                    "id": "aw-watcher-window_host",
                    "type": "currentwindow",
                    "events": [event("2025-06-01T10:00:00Z", 5.0, "Code")]
                },
                "aw-watcher-web-firefox_host": {
                    "id": "aw-watcher-web-firefox_host",
                    "type": "web.tab.current",
                    "events": []
                }
            }
        });

        let (streams, shape) = parse(doc).unwrap();
        assert_eq!(shape.kind(), ContainerKind::BucketMap);
        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].bucket.as_deref(), Some("aw-watcher-window_host"));
        assert_eq!(streams[0].watcher, WatcherKind::Window);
        assert_eq!(streams[0].events.len(), 1);
        assert_eq!(streams[1].watcher, WatcherKind::Web);
    }

    #[test]
    fn detects_events_field_before_wrapped_data() {
        let doc = json!({
            "events": [event("2025-06-01T10:00:00Z", 5.0, "Code")],
            "data": {"events": []}
        });
        let (streams, shape) = parse(doc).unwrap();
        assert_eq!(shape.kind(), ContainerKind::EventsField);
        assert_eq!(streams[0].events.len(), 1);
    }

    #[test]
    fn detects_bare_array_and_wrapped_data() {
        let (streams, shape) = parse(json!([event("2025-06-01T10:00:00Z", 1.0, "A")])).unwrap();
        assert_eq!(shape.kind(), ContainerKind::BareArray);
        assert_eq!(streams[0].watcher, WatcherKind::Window);

        let doc = json!({"source": "export", "data": {"events": [], "count": 0}});
        let (streams, shape) = parse(doc).unwrap();
        assert_eq!(shape.kind(), ContainerKind::WrappedData);
        assert!(streams[0].events.is_empty());
    }

    #[test]
    fn unrecognized_shapes_are_format_errors() {
        for doc in [json!({"foo": 1}), json!("text"), json!({"data": [1, 2]}), json!(null)] {
            let err = parse(doc).unwrap_err();
            assert!(matches!(err, CleanError::Format { .. }), "{err}");
        }
    }

    #[test]
    fn non_array_events_is_format_error() {
        let err = parse(json!({"events": {"a": 1}})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unrecognized container shape: `events` must be an array, found an object"
        );
    }

    #[test]
    fn schema_error_carries_bucket_and_index() {
        let doc = json!({
            "buckets": {
                "b1": {"events": [
                    event("2025-06-01T10:00:00Z", 1.0, "A"),
                    {"timestamp": "2025-06-01T10:00:05Z", "data": {}}
                ]}
            }
        });
        let err = parse(doc).unwrap_err();
        assert!(matches!(
            err,
            CleanError::EventSchema { ref bucket, index: 1, .. } if bucket.as_deref() == Some("b1")
        ));
    }

    #[test]
    fn bucket_without_events_is_left_alone() {
        let doc = json!({
            "buckets": {
                "meta-only": {"id": "meta-only", "hostname": "host"},
                "b": {"id": "b", "events": []}
            }
        });
        let (streams, shape) = parse(doc.clone()).unwrap();
        assert_eq!(streams.len(), 1);
        assert_eq!(rebuild(shape, streams), doc);
    }

    #[test]
    fn rebuild_restores_every_shape() {
        let docs = [
            json!({
                "buckets": {
                    "z-bucket": {
                        "id": "z-bucket",
                        "created": "2025-01-01T00:00:00Z",
                        "type": "currentwindow",
                        "client": "aw-watcher-window",
                        "hostname": "laptop",
                        "events": [event("2025-06-01T10:00:00Z", 1.0, "A")]
                    },
                    "a-bucket": {"id": "a-bucket", "events": []}
                },
                "exported_at": "2025-06-02"
            }),
            json!({"version": 2, "events": [event("2025-06-01T10:00:00Z", 1.0, "A")]}),
            json!([event("2025-06-01T10:00:00Z", 1.0, "A")]),
            json!({"data": {"events": [event("2025-06-01T10:00:00Z", 1.0, "A")], "n": 1}}),
        ];
        for doc in docs {
            let (streams, shape) = parse(doc.clone()).unwrap();
            assert_eq!(rebuild(shape, streams), doc);
        }
    }

    #[test]
    fn rebuild_keeps_key_order() {
        let input = r#"{"zeta":1,"buckets":{"b2":{"id":"b2","events":[]},"b1":{"events":[],"id":"b1"}},"alpha":2}"#;
        let doc: Value = serde_json::from_str(input).unwrap();
        let (streams, shape) = parse(doc).unwrap();
        let output = serde_json::to_string(&rebuild(shape, streams)).unwrap();
        assert_eq!(output, input);
    }
}
