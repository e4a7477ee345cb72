//! Watcher families and how they are recognized.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// The kind of watcher that produced a stream of events.
///
/// Identity and display-name rules differ per family, which is why events of
/// different buckets are never cleaned together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WatcherKind {
    Window,
    Web,
    Afk,
    Editor,
    Notes,
    #[default]
    Unknown,
}

impl WatcherKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Window => "window",
            Self::Web => "web",
            Self::Afk => "afk",
            Self::Editor => "editor",
            Self::Notes => "notes",
            Self::Unknown => "unknown",
        }
    }

    /// Detects the watcher family from bucket metadata.
    ///
    /// The bucket `type` is authoritative; the bucket id prefix is the fallback
    /// for exports that omit or customize the type.
    pub fn from_bucket(bucket_id: &str, bucket: &Map<String, Value>) -> Option<Self> {
        bucket
            .get("type")
            .and_then(Value::as_str)
            .and_then(Self::from_bucket_type)
            .or_else(|| Self::from_bucket_id(bucket_id))
    }

    fn from_bucket_type(kind: &str) -> Option<Self> {
        match kind {
            "currentwindow" => Some(Self::Window),
            "afkstatus" => Some(Self::Afk),
            "app.editor.activity" => Some(Self::Editor),
            k if k.starts_with("web.") => Some(Self::Web),
            k if k.contains("notes") => Some(Self::Notes),
            _ => None,
        }
    }

    fn from_bucket_id(id: &str) -> Option<Self> {
        const PREFIXES: [(&str, WatcherKind); 8] = [
            ("aw-watcher-window", WatcherKind::Window),
            ("aw-watcher-web", WatcherKind::Web),
            ("aw-watcher-afk", WatcherKind::Afk),
            ("aw-watcher-vscode", WatcherKind::Editor),
            ("aw-watcher-vim", WatcherKind::Editor),
            ("aw-watcher-jetbrains", WatcherKind::Editor),
            ("aw-watcher-obsidian", WatcherKind::Notes),
            ("aw-watcher-notes", WatcherKind::Notes),
        ];
        PREFIXES
            .iter()
            .find(|(prefix, _)| id.starts_with(prefix))
            .map(|(_, kind)| *kind)
    }

    /// Infers the family from event payloads when no bucket metadata exists.
    ///
    /// The first payload carrying a recognizable key decides.
    pub fn infer<'a>(payloads: impl IntoIterator<Item = &'a Value>) -> Self {
        payloads
            .into_iter()
            .filter_map(Value::as_object)
            .find_map(|data| {
                if data.contains_key("url") {
                    Some(Self::Web)
                } else if data.contains_key("app") {
                    Some(Self::Window)
                } else if data.contains_key("status") {
                    Some(Self::Afk)
                } else if data.contains_key("file") {
                    Some(Self::Editor)
                } else {
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Payload keys whose values form an event's identity for this family.
    ///
    /// `Web` is keyed on the URL host rather than a raw field and `Unknown`
    /// uses the whole payload; both return an empty slice.
    #[must_use]
    pub const fn identity_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Window => &["app", "title"],
            Self::Afk => &["status"],
            Self::Editor => &["project", "file"],
            Self::Notes => &["app", "file"],
            Self::Web | Self::Unknown => &[],
        }
    }
}

impl fmt::Display for WatcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for WatcherKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bucket(value: &Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn serializes_as_display_name() {
        for (kind, name) in [
            (WatcherKind::Window, "window"),
            (WatcherKind::Web, "web"),
            (WatcherKind::Afk, "afk"),
            (WatcherKind::Editor, "editor"),
            (WatcherKind::Notes, "notes"),
            (WatcherKind::Unknown, "unknown"),
        ] {
            assert_eq!(kind.to_string(), name);
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(name));
        }
    }

    #[test]
    fn bucket_type_wins_over_id() {
        let meta = bucket(&json!({"type": "web.tab.current"}));
        assert_eq!(
            WatcherKind::from_bucket("aw-watcher-window_host", &meta),
            Some(WatcherKind::Web)
        );
    }

    #[test]
    fn bucket_id_prefix_is_fallback() {
        let meta = bucket(&json!({"type": "custom"}));
        assert_eq!(
            WatcherKind::from_bucket("aw-watcher-afk_laptop.local", &meta),
            Some(WatcherKind::Afk)
        );
        assert_eq!(WatcherKind::from_bucket("my-bucket", &meta), None);
    }

    #[test]
    fn infer_from_payload_keys() {
        let web = [json!({}), json!({"url": "https://example.com"})];
        assert_eq!(WatcherKind::infer(&web), WatcherKind::Web);

        let window = [json!({"app": "Code", "title": "main.rs"})];
        assert_eq!(WatcherKind::infer(&window), WatcherKind::Window);

        let empty: [Value; 0] = [];
        assert_eq!(WatcherKind::infer(&empty), WatcherKind::Unknown);
    }
}
