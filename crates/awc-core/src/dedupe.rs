//! Duplicate removal.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::event::Event;

/// Removes exact duplicates, keeping the first occurrence of each.
///
/// Two events are duplicates when their start instant, duration and payload
/// are all equal. Payload comparison is structural: object key order does not
/// matter. Survivors keep their relative order.
pub fn dedupe(events: Vec<Event>) -> Vec<Event> {
    let mut seen = HashSet::with_capacity(events.len());
    events
        .into_iter()
        .filter(|event| seen.insert(structural_key(event)))
        .collect()
}

/// Collapses events that share a start instant into the longest of them.
///
/// The survivor takes the position of the first event of its group; on equal
/// durations the earliest one wins.
pub fn collapse_simultaneous(events: Vec<Event>) -> Vec<Event> {
    let mut slots: HashMap<(i64, u32), usize> = HashMap::with_capacity(events.len());
    let mut kept: Vec<Event> = Vec::with_capacity(events.len());

    for event in events {
        let start = event.start();
        let instant = (start.timestamp(), start.timestamp_subsec_nanos());
        match slots.get(&instant) {
            Some(&slot) => {
                if event.duration() > kept[slot].duration() {
                    kept[slot] = event;
                }
            }
            None => {
                slots.insert(instant, kept.len());
                kept.push(event);
            }
        }
    }

    kept
}

/// A deterministic key that is equal for exactly the events `dedupe` treats as equal.
fn structural_key(event: &Event) -> String {
    let start = event.start();
    // Adding 0.0 folds -0.0 into 0.0.
    let duration = event.duration() + 0.0;
    let mut key = format!(
        "{}.{:09}|{:016x}|",
        start.timestamp(),
        start.timestamp_subsec_nanos(),
        duration.to_bits()
    );
    push_canonical(event.data(), &mut key);
    key
}

fn push_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (key, value) in entries {
                out.push_str(&format!("{key:?}:"));
                push_canonical(value, out);
                out.push(',');
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for item in items {
                push_canonical(item, out);
                out.push(',');
            }
            out.push(']');
        }
        Value::String(s) => out.push_str(&format!("{s:?}")),
        other => out.push_str(&other.to_string()),
    }
}
