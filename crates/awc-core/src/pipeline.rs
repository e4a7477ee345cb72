//! The cleaning pipeline.
//!
//! Stages run in a fixed order on each stream:
//! sort → dedupe → simultaneous collapse → merge → duration filter → exclusion filter.
//!
//! Filters can remove an event that kept two same-identity neighbours apart.
//! To keep cleaning idempotent, merge and the filters repeat until a pass
//! drops nothing.

use serde::Serialize;
use serde_json::Value;

use crate::config::CleanConfig;
use crate::container::{self, ContainerKind, EventStream};
use crate::dedupe::{collapse_simultaneous, dedupe};
use crate::error::CleanError;
use crate::event::Event;
use crate::filter::{filter_duration, filter_excluded};
use crate::identity::IdentityRule;
use crate::merge::merge;
use crate::watcher::WatcherKind;

/// How many events each stage removed from one stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageCounts {
    pub input: usize,
    pub duplicates: usize,
    pub simultaneous: usize,
    /// Events absorbed into a merged chain.
    pub merged: usize,
    pub too_short: usize,
    pub excluded: usize,
    pub output: usize,
}

impl StageCounts {
    fn accumulate(&mut self, other: &Self) {
        self.input += other.input;
        self.duplicates += other.duplicates;
        self.simultaneous += other.simultaneous;
        self.merged += other.merged;
        self.too_short += other.too_short;
        self.excluded += other.excluded;
        self.output += other.output;
    }

    /// Human-readable lines describing what each stage did.
    ///
    /// Stages that removed nothing are skipped; the total is always present.
    pub fn summary(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.duplicates > 0 {
            lines.push(format!("Removed {} duplicate events", self.duplicates));
        }
        if self.simultaneous > 0 {
            lines.push(format!("Collapsed {} simultaneous events", self.simultaneous));
        }
        if self.merged > 0 {
            lines.push(format!("Merged {} consecutive same-activity events", self.merged));
        }
        if self.too_short > 0 {
            lines.push(format!("Removed {} events below the minimum duration", self.too_short));
        }
        if self.excluded > 0 {
            lines.push(format!("Removed {} events from excluded apps", self.excluded));
        }
        let removed = self.input.saturating_sub(self.output);
        #[allow(clippy::cast_precision_loss)]
        let percent = if self.input > 0 {
            removed as f64 / self.input as f64 * 100.0
        } else {
            0.0
        };
        lines.push(format!("Total reduction: {removed} events ({percent:.1}%)"));
        lines
    }
}

/// Stage counts for one stream of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamReport {
    pub bucket: Option<String>,
    pub watcher: WatcherKind,
    #[serde(flatten)]
    pub counts: StageCounts,
}

/// What a cleaning run did to a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub container: ContainerKind,
    pub streams: Vec<StreamReport>,
}

impl CleanReport {
    /// Counts summed over all streams.
    pub fn totals(&self) -> StageCounts {
        let mut totals = StageCounts::default();
        for stream in &self.streams {
            totals.accumulate(&stream.counts);
        }
        totals
    }
}

/// Cleans a document, returning a new document of the same shape.
///
/// Only the event lists change. Fails without partial output if the shape is
/// unrecognized or any event is invalid.
pub fn clean(document: &Value, config: &CleanConfig) -> Result<Value, CleanError> {
    clean_with_report(document, config).map(|(cleaned, _)| cleaned)
}

/// Like [`clean`], also reporting what each stage removed per stream.
pub fn clean_with_report(
    document: &Value,
    config: &CleanConfig,
) -> Result<(Value, CleanReport), CleanError> {
    let (streams, shape) = container::parse(document.clone())?;
    let container = shape.kind();

    let mut reports = Vec::with_capacity(streams.len());
    let cleaned: Vec<EventStream> = streams
        .into_iter()
        .map(|stream| {
            let (stream, counts) = clean_stream(stream, config);
            reports.push(StreamReport {
                bucket: stream.bucket.clone(),
                watcher: stream.watcher,
                counts,
            });
            stream
        })
        .collect();

    let report = CleanReport {
        container,
        streams: reports,
    };
    Ok((container::rebuild(shape, cleaned), report))
}

/// Runs every stage over a single stream.
pub fn clean_stream(stream: EventStream, config: &CleanConfig) -> (EventStream, StageCounts) {
    let EventStream {
        bucket,
        watcher,
        mut events,
    } = stream;
    let rule = IdentityRule::new(watcher, &config.identity_fields);
    let mut counts = StageCounts {
        input: events.len(),
        ..StageCounts::default()
    };

    events.sort_by_key(Event::start);

    if config.dedupe {
        let before = events.len();
        events = dedupe(events);
        counts.duplicates = before - events.len();
    }

    if config.dedupe_simultaneous {
        let before = events.len();
        events = collapse_simultaneous(events);
        counts.simultaneous = before - events.len();
    }

    loop {
        let before = events.len();
        events = merge(events, &rule, config);
        let merged = events.len();
        counts.merged += before - merged;

        events = filter_duration(events, config.min_duration, config.keep_zero_duration);
        let qualified = events.len();
        counts.too_short += merged - qualified;

        events = filter_excluded(events, &rule, &config.exclude_apps);
        counts.excluded += qualified - events.len();

        if !config.merge || events.len() == merged {
            break;
        }
    }

    counts.output = events.len();
    let stream = EventStream {
        bucket,
        watcher,
        events,
    };
    (stream, counts)
}
