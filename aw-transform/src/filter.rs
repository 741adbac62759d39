//! Filtering events by key/value membership or regex match.
//!
//! Grounded on `aw_transform/filter_keyvals.py`.

use aw_models::Event;
use regex::Regex;
use serde_json::Value;

use crate::error::{Result, TransformError};

/// Keep (or, if `exclude`, drop) events whose `data[key]` is one of `vals`.
pub fn filter_keyvals(events: &[Event], key: &str, vals: &[&str], exclude: bool) -> Vec<Event> {
    let matches = |e: &Event| {
        e.data
            .get(key)
            .and_then(Value::as_str)
            .map(|v| vals.contains(&v))
            .unwrap_or(false)
    };
    events
        .iter()
        .filter(|e| matches(e) != exclude)
        .cloned()
        .collect()
}

/// Keep events whose `data[key]` matches `regex`.
pub fn filter_keyvals_regex(events: &[Event], key: &str, regex: &str) -> Result<Vec<Event>> {
    let re = Regex::new(regex).map_err(|e| TransformError::InvalidRegex(e.to_string()))?;
    Ok(events
        .iter()
        .filter(|e| {
            e.data
                .get(key)
                .and_then(Value::as_str)
                .map(|v| re.is_match(v))
                .unwrap_or(false)
        })
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn ev(app: &str) -> Event {
        let Value::Object(data) = json!({"app": app}) else { unreachable!() };
        Event::new("2024-01-01T00:00:00Z".parse().unwrap(), Duration::seconds(1), data).unwrap()
    }

    #[test]
    fn filter_keyvals_keeps_matching() {
        let events = vec![ev("firefox"), ev("code")];
        let kept = filter_keyvals(&events, "app", &["firefox"], false);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].app(), Some("firefox"));
    }

    #[test]
    fn filter_keyvals_exclude_drops_matching() {
        let events = vec![ev("firefox"), ev("code")];
        let kept = filter_keyvals(&events, "app", &["firefox"], true);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].app(), Some("code"));
    }

    #[test]
    fn filter_keyvals_regex_matches_substrings() {
        let events = vec![ev("firefox"), ev("code")];
        let kept = filter_keyvals_regex(&events, "app", "^fire").unwrap();
        assert_eq!(kept.len(), 1);
    }
}
