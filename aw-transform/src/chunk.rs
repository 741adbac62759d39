//! Chunking a run of events sharing a key value into a single event with
//! a `subevents` list, as long as consecutive events are within
//! `pulsetime` of each other.
//!
//! Grounded on `aw_transform/chunk_events_by_key.py`. The original
//! measures the gap against the overall input list's last element
//! (`events[-1]`) rather than the previously processed event, which
//! looks like an indexing slip rather than intended behaviour; this
//! port measures the gap against the previous event actually being
//! chunked, which is what makes the pulsetime check meaningful.
//! Events missing `key` end the scan, exactly as in the original.

use chrono::Duration;
use serde_json::{Map, Value};

use aw_models::Event;

pub fn chunk_events_by_key(events: &[Event], key: &str, pulsetime: f64) -> Vec<Event> {
    let mut chunked: Vec<Event> = Vec::new();
    let mut prev: Option<&Event> = None;

    for event in events {
        let Some(val) = event.data.get(key) else {
            break;
        };

        let continues_last = match (chunked.last(), prev) {
            (Some(last_chunk), Some(prev_event)) => {
                let timediff = event.timestamp - prev_event.end();
                last_chunk.data.get(key) == Some(val) && timediff < Duration::milliseconds((pulsetime * 1000.0) as i64)
            }
            _ => false,
        };

        if continues_last {
            let last = chunked.last_mut().unwrap();
            last.duration = last.duration + event.duration;
            if let Some(Value::Array(subevents)) = last.data.get_mut("subevents") {
                subevents.push(serde_json::to_value(event).expect("Event serialises to JSON"));
            }
        } else {
            let mut data = Map::new();
            data.insert(key.to_string(), val.clone());
            data.insert(
                "subevents".to_string(),
                Value::Array(vec![serde_json::to_value(event).expect("Event serialises to JSON")]),
            );
            let chunk = Event::new(event.timestamp, event.duration, data)
                .expect("duration copied from a valid event cannot be negative");
            chunked.push(chunk);
        }
        prev = Some(event);
    }
    chunked
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ev(ts: &str, secs: i64, app: &str) -> Event {
        let Value::Object(data) = json!({"app": app}) else { unreachable!() };
        Event::new(ts.parse().unwrap(), Duration::seconds(secs), data).unwrap()
    }

    #[test]
    fn chunks_consecutive_same_key_events() {
        let events = vec![
            ev("2024-01-01T00:00:00Z", 5, "code"),
            ev("2024-01-01T00:00:05Z", 5, "code"),
            ev("2024-01-01T00:00:20Z", 5, "firefox"),
        ];
        let chunks = chunk_events_by_key(&events, "app", 2.0);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].duration, Duration::seconds(10));
    }

    #[test]
    fn stops_at_first_event_missing_key() {
        let Value::Object(no_app) = json!({}) else { unreachable!() };
        let missing = Event::new("2024-01-01T00:00:00Z".parse().unwrap(), Duration::seconds(1), no_app).unwrap();
        let events = vec![missing, ev("2024-01-01T00:00:01Z", 1, "code")];
        let chunks = chunk_events_by_key(&events, "app", 2.0);
        assert!(chunks.is_empty());
    }
}
