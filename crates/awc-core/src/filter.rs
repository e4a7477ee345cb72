//! Duration and exclusion filters.

use crate::event::Event;
use crate::identity::IdentityRule;

/// Keeps events lasting at least `min_duration` seconds.
///
/// With `keep_zero`, zero-duration events are kept whatever the threshold.
pub fn filter_duration(events: Vec<Event>, min_duration: f64, keep_zero: bool) -> Vec<Event> {
    events
        .into_iter()
        .filter(|event| {
            let duration = event.duration();
            (keep_zero && duration <= 0.0) || duration >= min_duration
        })
        .collect()
}

/// Drops events whose display name is in `excluded`.
///
/// Matching is exact and case-sensitive. Events without a display name are kept.
pub fn filter_excluded(events: Vec<Event>, rule: &IdentityRule, excluded: &[String]) -> Vec<Event> {
    if excluded.is_empty() {
        return events;
    }
    events
        .into_iter()
        .filter(|event| {
            rule.display_name(event)
                .is_none_or(|name| !excluded.iter().any(|entry| entry == name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::fixtures::{app, at};
    use crate::watcher::WatcherKind;
    use serde_json::json;

    fn names(events: &[Event]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|event| event.field("app").and_then(|v| v.as_str()))
            .collect()
    }

    #[test]
    fn short_event_is_dropped() {
        let events = vec![app(0.0, 2.0, "short"), app(10.0, 5.0, "exact"), app(20.0, 9.0, "long")];
        let result = filter_duration(events, 5.0, false);
        assert_eq!(names(&result), ["exact", "long"]);
    }

    #[test]
    fn keep_zero_overrides_threshold() {
        let events = vec![app(0.0, 0.0, "zero"), app(1.0, 1.0, "short")];
        let result = filter_duration(events, 5.0, true);
        assert_eq!(names(&result), ["zero"]);
    }

    #[test]
    fn zero_threshold_admits_zero_duration_without_keep_zero() {
        let events = vec![app(0.0, 0.0, "zero"), app(1.0, 1.0, "short")];
        let result = filter_duration(events, 0.0, false);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn zero_duration_dropped_when_threshold_positive() {
        let events = vec![app(0.0, 0.0, "zero"), app(60.0, 60.0, "kept")];
        let result = filter_duration(events, 2.0, false);
        assert_eq!(names(&result), ["kept"]);
    }

    #[test]
    fn exclusion_is_case_sensitive() {
        let rule = IdentityRule::new(WatcherKind::Window, &[]);
        let events = vec![app(0.0, 5.0, "Browser"), app(10.0, 5.0, "browser")];
        let result = filter_excluded(events, &rule, &["Browser".to_string()]);
        assert_eq!(names(&result), ["browser"]);
    }

    #[test]
    fn exclusion_matches_web_host() {
        let rule = IdentityRule::new(WatcherKind::Web, &[]);
        let events = vec![
            at(0.0, 5.0, json!({"url": "https://news.ycombinator.com/item?id=1"})),
            at(10.0, 5.0, json!({"url": "https://docs.rs/chrono"})),
        ];
        let result = filter_excluded(events, &rule, &["news.ycombinator.com".to_string()]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].field("url"), Some(&json!("https://docs.rs/chrono")));
    }

    #[test]
    fn nameless_events_are_never_excluded() {
        let rule = IdentityRule::new(WatcherKind::Afk, &[]);
        let events = vec![at(0.0, 5.0, json!({"status": "afk"}))];
        let result = filter_excluded(events, &rule, &["afk".to_string()]);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn system_apps_excluded() {
        let rule = IdentityRule::new(WatcherKind::Window, &[]);
        let events = vec![
            app(0.0, 60.0, "UserNotificationCenter"),
            app(60.0, 60.0, "TestApp"),
        ];
        let excluded = vec!["UserNotificationCenter".to_string(), "loginwindow".to_string()];
        let result = filter_excluded(events, &rule, &excluded);
        assert_eq!(names(&result), ["TestApp"]);
    }
}
