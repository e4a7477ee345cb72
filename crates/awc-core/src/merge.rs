//! Temporal merging of consecutive same-activity events.
//!
//! # Algorithm
//!
//! A single left-to-right fold over events sorted by start. One chain is open
//! at a time; each event either joins it or closes it and opens a new one:
//!
//! 1. The event joins when its identity equals the chain's and the gap from the
//!    chain's latest end to the event's start is at most `max_gap`. Overlaps
//!    (negative gaps) join as well.
//! 2. Otherwise the chain is emitted and the event opens the next chain.
//! 3. At the end of the input the open chain is emitted.
//!
//! A chain of one event is emitted untouched. A longer chain becomes a single
//! synthesized event that keeps the first event's start and record and covers
//! the chain according to the [`MergeDuration`] policy. The merged event
//! remembers where the chain really ends, so merging it again measures gaps
//! from that end whatever the policy.

use crate::config::{CleanConfig, MergeDuration};
use crate::event::Event;
use crate::identity::{Identity, IdentityRule};

/// The chain being accumulated.
#[derive(Debug)]
struct OpenChain {
    head: Event,
    identity: Identity,
    /// Seconds from the head's start to the latest end seen so far.
    end: f64,
    /// Sum of member durations.
    active: f64,
    absorbed: usize,
}

impl OpenChain {
    fn open(head: Event, identity: Identity) -> Self {
        let end = head.extent();
        let active = head.duration();
        Self {
            head,
            identity,
            end,
            active,
            absorbed: 0,
        }
    }

    fn accepts(&self, event: &Event, identity: &Identity, max_gap: f64) -> bool {
        if *identity != self.identity {
            return false;
        }
        let gap = self.head.seconds_until(event.start()) - self.end;
        gap <= max_gap
    }

    fn absorb(&mut self, event: &Event) {
        let event_end = self.head.seconds_until(event.start()) + event.extent();
        self.end = self.end.max(event_end);
        self.active += event.duration();
        self.absorbed += 1;
    }

    fn close(self, policy: MergeDuration) -> Event {
        if self.absorbed == 0 {
            return self.head;
        }
        let duration = match policy {
            MergeDuration::Span => self.end,
            MergeDuration::Sum => self.active,
        };
        self.head.with_duration(duration, self.end)
    }
}

/// Merges runs of same-identity events separated by at most `config.max_gap`.
///
/// `events` must be sorted by start. Returns the input unchanged when
/// `config.merge` is off.
pub fn merge(events: Vec<Event>, rule: &IdentityRule, config: &CleanConfig) -> Vec<Event> {
    if !config.merge {
        return events;
    }

    let mut merged = Vec::with_capacity(events.len());
    let mut open: Option<OpenChain> = None;

    for event in events {
        let identity = rule.identity(&event);
        let joins = open
            .as_ref()
            .is_some_and(|chain| chain.accepts(&event, &identity, config.max_gap));

        if joins {
            if let Some(chain) = open.as_mut() {
                chain.absorb(&event);
            }
        } else if let Some(done) = open.replace(OpenChain::open(event, identity)) {
            merged.push(done.close(config.merge_duration));
        }
    }

    if let Some(done) = open {
        merged.push(done.close(config.merge_duration));
    }

    merged
}
