//! Event identity: deciding whether two events are the same activity.

use serde_json::Value;

use crate::event::Event;
use crate::watcher::WatcherKind;

/// The key two events must share to count as one continuous activity.
///
/// Built from a subset of payload values; absent fields contribute `None`, so
/// two events both lacking a field still agree on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity(Vec<Option<Value>>);

/// Derives identities and display names for the events of one stream.
#[derive(Debug, Clone)]
pub struct IdentityRule {
    watcher: WatcherKind,
    fields: Vec<String>,
}

impl IdentityRule {
    /// Creates the rule for a watcher family.
    ///
    /// A non-empty `fields` list replaces the family's default identity keys.
    pub fn new(watcher: WatcherKind, fields: &[String]) -> Self {
        let fields = if fields.is_empty() {
            watcher
                .identity_fields()
                .iter()
                .map(ToString::to_string)
                .collect()
        } else {
            fields.to_vec()
        };
        Self { watcher, fields }
    }

    /// Computes the identity of `event`.
    pub fn identity(&self, event: &Event) -> Identity {
        if !self.fields.is_empty() {
            return Identity(
                self.fields
                    .iter()
                    .map(|key| event.field(key).cloned())
                    .collect(),
            );
        }
        match self.watcher {
            WatcherKind::Web => {
                let url = event.field("url");
                let host = url
                    .and_then(Value::as_str)
                    .and_then(url_host)
                    .map(|host| Value::String(host.to_string()));
                Identity(vec![host.or_else(|| url.cloned())])
            }
            _ => Identity(vec![Some(event.data().clone())]),
        }
    }

    /// The name matched against the exclusion list.
    ///
    /// Web events are named by their URL host; every other family by its `app`.
    pub fn display_name<'e>(&self, event: &'e Event) -> Option<&'e str> {
        match self.watcher {
            WatcherKind::Web => event.field("url").and_then(Value::as_str).and_then(url_host),
            _ => event.field("app").and_then(Value::as_str),
        }
    }
}

/// Extracts the host from an absolute URL such as `https://user@host:8080/path`.
///
/// Returns `None` for strings without an authority (`about:blank`, `file:///x`).
pub fn url_host(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
    let host = if host_port.starts_with('[') {
        host_port.find(']').map_or(host_port, |end| &host_port[..=end])
    } else {
        host_port.split_once(':').map_or(host_port, |(host, _)| host)
    };
    (!host.is_empty()).then_some(host)
}
