//! Merging events that share a composite key built from a subset of
//! their `data` fields, summing durations of matches.
//!
//! Grounded on `aw_transform/merge_events_by_keys.py`.

use std::collections::HashMap;

use aw_models::Event;
use serde_json::Value;

/// Composite key built by picking `keys` out of an event's `data`, in
/// order, serialised to JSON text so it can be used as a hash key
/// regardless of the underlying value's shape (`Value` has no `Hash`
/// impl).
fn composite_key(event: &Event, keys: &[&str]) -> String {
    keys.iter()
        .map(|k| event.data.get(*k).unwrap_or(&Value::Null).to_string())
        .collect::<Vec<_>>()
        .join("\u{1f}")
}

/// Collapse `events` into one event per distinct combination of `keys`
/// values, summing durations and keeping only the `keys` fields in the
/// resulting `data`. With an empty `keys` list, returns `events`
/// unchanged.
pub fn merge_events_by_keys(events: &[Event], keys: &[&str]) -> Vec<Event> {
    if keys.is_empty() {
        return events.to_vec();
    }
    let mut merged: HashMap<String, Event> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for event in events {
        let key = composite_key(event, keys);
        match merged.get_mut(&key) {
            Some(existing) => {
                existing.duration = existing.duration + event.duration;
            }
            None => {
                let mut data = serde_json::Map::new();
                for k in keys {
                    if let Some(v) = event.data.get(*k) {
                        data.insert((*k).to_string(), v.clone());
                    }
                }
                let new_event = Event::new(event.timestamp, event.duration, data)
                    .expect("duration copied from a valid event cannot be negative");
                order.push(key.clone());
                merged.insert(key, new_event);
            }
        }
    }

    order.into_iter().map(|k| merged.remove(&k).unwrap()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn ev(app: &str, secs: i64) -> Event {
        let Value::Object(data) = json!({"app": app, "title": "ignored"}) else { unreachable!() };
        Event::new("2024-01-01T00:00:00Z".parse().unwrap(), Duration::seconds(secs), data).unwrap()
    }

    #[test]
    fn sums_durations_for_matching_keys() {
        let events = vec![ev("code", 5), ev("code", 3), ev("firefox", 2)];
        let merged = merge_events_by_keys(&events, &["app"]);
        assert_eq!(merged.len(), 2);
        let code = merged.iter().find(|e| e.data.get("app").unwrap() == "code").unwrap();
        assert_eq!(code.duration, Duration::seconds(8));
        assert!(!code.data.contains_key("title"));
    }

    #[test]
    fn empty_keys_is_identity() {
        let events = vec![ev("code", 5)];
        let merged = merge_events_by_keys(&events, &[]);
        assert_eq!(merged, events);
    }
}
