//! Small ordering, aggregation and gap-filling utilities used directly
//! by the query function registry.
//!
//! These are not broken out into their own files in the original
//! `aw-transform` package (they live alongside the query functions
//! importing them); grounded on the behaviour documented and exercised
//! by `aw_query/functions.py`'s `q2_sort_by_timestamp`,
//! `q2_sort_by_duration`, `q2_sum_durations`, `q2_concat` and `q2_flood`.

use chrono::Duration;

use aw_models::Event;

pub fn sort_by_timestamp(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by_key(|e| e.timestamp);
    events
}

/// Longest-duration events first.
pub fn sort_by_duration(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by(|a, b| b.duration.cmp(&a.duration));
    events
}

pub fn sum_durations(events: &[Event]) -> Duration {
    events.iter().fold(Duration::zero(), |acc, e| acc + e.duration)
}

pub fn concat(events1: &[Event], events2: &[Event]) -> Vec<Event> {
    let mut out = events1.to_vec();
    out.extend_from_slice(events2);
    out
}

/// Keep only the first `count` events.
pub fn limit_events(events: &[Event], count: usize) -> Vec<Event> {
    events.iter().take(count).cloned().collect()
}

/// Extends each event to fill gaps shorter than `pulsetime` seconds
/// before the next event, removing small slivers of dead time between
/// otherwise-adjacent events.
pub fn flood(events: &[Event], pulsetime: f64) -> Vec<Event> {
    let mut events = events.to_vec();
    events.sort_by_key(|e| e.timestamp);
    let threshold = Duration::milliseconds((pulsetime * 1000.0) as i64);

    for i in 0..events.len().saturating_sub(1) {
        let gap = events[i + 1].timestamp - events[i].end();
        if gap > Duration::zero() && gap <= threshold {
            events[i].duration = events[i].duration + gap;
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn ev(ts: &str, secs: i64) -> Event {
        let Value::Object(data) = json!({}) else { unreachable!() };
        Event::new(ts.parse().unwrap(), Duration::seconds(secs), data).unwrap()
    }

    #[test]
    fn flood_fills_small_gaps_only() {
        let events = vec![ev("2024-01-01T00:00:00Z", 5), ev("2024-01-01T00:00:06Z", 5)];
        let flooded = flood(&events, 5.0);
        assert_eq!(flooded[0].duration, Duration::seconds(6));
    }

    #[test]
    fn flood_leaves_large_gaps_alone() {
        let events = vec![ev("2024-01-01T00:00:00Z", 5), ev("2024-01-01T01:00:00Z", 5)];
        let flooded = flood(&events, 5.0);
        assert_eq!(flooded[0].duration, Duration::seconds(5));
    }

    #[test]
    fn sort_by_duration_is_descending() {
        let events = vec![ev("2024-01-01T00:00:00Z", 1), ev("2024-01-01T00:00:05Z", 9)];
        let sorted = sort_by_duration(events);
        assert_eq!(sorted[0].duration, Duration::seconds(9));
    }

    #[test]
    fn sum_durations_adds_up() {
        let events = vec![ev("2024-01-01T00:00:00Z", 1), ev("2024-01-01T00:00:05Z", 9)];
        assert_eq!(sum_durations(&events), Duration::seconds(10));
    }
}
