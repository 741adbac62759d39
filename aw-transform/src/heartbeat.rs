//! Heartbeat coalescing: merging identical-data heartbeats that arrive
//! within `pulsetime` of one another into a single, duration-extended
//! event.
//!
//! Grounded on `aw_transform/heartbeats.py`. Used both by the ingest-time
//! coalescing path in the datastore and as a query-time transform.

use aw_models::Event;
use chrono::Duration;

/// Reduce a time-ordered event list by merging consecutive heartbeats
/// sharing the same `data` within `pulsetime` seconds of each other.
pub fn heartbeat_reduce(events: &[Event], pulsetime: f64) -> Vec<Event> {
    let mut events = events.iter();
    let mut reduced: Vec<Event> = Vec::new();
    if let Some(first) = events.next() {
        reduced.push(first.clone());
    }
    for heartbeat in events {
        let last = reduced.last().unwrap().clone();
        match heartbeat_merge(&last, heartbeat, pulsetime) {
            Some(merged) => {
                let idx = reduced.len() - 1;
                reduced[idx] = merged;
            }
            None => reduced.push(heartbeat.clone()),
        }
    }
    reduced
}

/// Attempt to merge `heartbeat` into `last_event`. Returns the extended
/// event if `heartbeat` shares the same `data` and falls within
/// `pulsetime` seconds of `last_event`'s end, else `None`.
pub fn heartbeat_merge(last_event: &Event, heartbeat: &Event, pulsetime: f64) -> Option<Event> {
    if last_event.data != heartbeat.data {
        return None;
    }
    let pulseperiod_end =
        last_event.timestamp + last_event.duration + Duration::milliseconds((pulsetime * 1000.0) as i64);
    let within_window = last_event.timestamp <= heartbeat.timestamp && heartbeat.timestamp <= pulseperiod_end;
    if !within_window {
        return None;
    }
    if last_event.duration < Duration::zero() {
        log::warn!("merging heartbeats would result in a negative duration, refusing to merge");
        return None;
    }
    let new_duration = (heartbeat.timestamp - last_event.timestamp) + heartbeat.duration;
    let mut merged = last_event.clone();
    merged.duration = merged.duration.max(new_duration);
    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn ev(ts: &str, secs: i64, app: &str) -> Event {
        let Value::Object(data) = json!({"app": app}) else { unreachable!() };
        Event::new(ts.parse().unwrap(), Duration::seconds(secs), data).unwrap()
    }

    #[test]
    fn merges_within_pulsetime() {
        let last = ev("2024-01-01T00:00:00Z", 5, "code");
        let hb = ev("2024-01-01T00:00:06Z", 0, "code");
        let merged = heartbeat_merge(&last, &hb, 5.0).unwrap();
        assert_eq!(merged.duration, Duration::seconds(6));
    }

    #[test]
    fn does_not_merge_different_data() {
        let last = ev("2024-01-01T00:00:00Z", 5, "code");
        let hb = ev("2024-01-01T00:00:06Z", 0, "firefox");
        assert!(heartbeat_merge(&last, &hb, 5.0).is_none());
    }

    #[test]
    fn does_not_merge_outside_pulsetime() {
        let last = ev("2024-01-01T00:00:00Z", 5, "code");
        let hb = ev("2024-01-01T00:01:00Z", 0, "code");
        assert!(heartbeat_merge(&last, &hb, 5.0).is_none());
    }

    #[test]
    fn reduce_collapses_a_run_of_heartbeats() {
        let events = vec![
            ev("2024-01-01T00:00:00Z", 0, "code"),
            ev("2024-01-01T00:00:01Z", 0, "code"),
            ev("2024-01-01T00:00:02Z", 0, "code"),
        ];
        let reduced = heartbeat_reduce(&events, 5.0);
        assert_eq!(reduced.len(), 1);
        assert_eq!(reduced[0].duration, Duration::seconds(2));
    }
}
