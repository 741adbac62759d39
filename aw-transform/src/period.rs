//! Intersecting and unioning events by their time periods.
//!
//! Grounded on `aw_transform/filter_period_intersect.py`.

use aw_models::{Event, TimeSlot};

fn event_period(e: &Event) -> TimeSlot {
    TimeSlot::new(e.timestamp, e.end())
}

fn with_period(e: &Event, period: TimeSlot) -> Event {
    let mut copy = e.clone();
    copy.timestamp = period.start;
    copy.duration = period.duration();
    copy
}

/// All `(e1, e2, intersection)` triples between two time-sorted event
/// lists whose periods overlap.
fn intersecting_eventpairs<'a>(
    events1: &'a [Event],
    events2: &'a [Event],
) -> Vec<(&'a Event, &'a Event, TimeSlot)> {
    let mut out = Vec::new();
    let mut i1 = 0;
    let mut i2 = 0;
    while i1 < events1.len() && i2 < events2.len() {
        let e1 = &events1[i1];
        let e2 = &events2[i2];
        let p1 = event_period(e1);
        let p2 = event_period(e2);

        if let Some(ip) = p1.intersection(&p2) {
            out.push((e1, e2, ip));
            if p1.end <= p2.end {
                i1 += 1;
            } else {
                i2 += 1;
            }
        } else if p1.end <= p2.start {
            i1 += 1;
        } else if p2.end <= p1.start {
            i2 += 1;
        } else {
            log::error!("should be unreachable, skipping period");
            i1 += 1;
            i2 += 1;
        }
    }
    out
}

/// Filters away all events, or parts of events, during which `filterevents`
/// has no intersecting period. Useful for trimming window events down to
/// only the parts during which the user was not AFK.
pub fn filter_period_intersect(events: &[Event], filterevents: &[Event]) -> Vec<Event> {
    let mut events = events.to_vec();
    let mut filterevents = filterevents.to_vec();
    events.sort_by_key(|e| e.timestamp);
    filterevents.sort_by_key(|e| e.timestamp);

    intersecting_eventpairs(&events, &filterevents)
        .into_iter()
        .map(|(e1, _, ip)| with_period(e1, ip))
        .collect()
}

/// Merges two event lists into the union of their time periods, with no
/// overlapping output events. Strips all event data, since it cannot be
/// kept consistent across a merge.
pub fn period_union(events1: &[Event], events2: &[Event]) -> Vec<Event> {
    let mut events: Vec<Event> = events1.iter().chain(events2.iter()).cloned().collect();
    events.sort_by_key(|e| e.timestamp);

    let mut merged: Vec<Event> = Vec::new();
    let mut iter = events.into_iter();
    if let Some(first) = iter.next() {
        merged.push(first);
    }
    for e in iter {
        let last = merged.last().unwrap();
        let e_p = event_period(&e);
        let last_p = event_period(last);
        if e_p.gap(&last_p).is_none() {
            let union_period = e_p.union(&last_p);
            let idx = merged.len() - 1;
            merged[idx] = with_period(last, union_period);
        } else {
            merged.push(e);
        }
    }
    for e in &mut merged {
        e.data.clear();
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::{json, Value};

    fn ev(ts: &str, secs: i64) -> Event {
        let Value::Object(data) = json!({"app": "x"}) else { unreachable!() };
        Event::new(ts.parse().unwrap(), Duration::seconds(secs), data).unwrap()
    }

    #[test]
    fn filter_period_intersect_trims_to_overlap() {
        let windows = vec![ev("2024-01-01T00:00:00Z", 10)];
        let notafk = vec![ev("2024-01-01T00:00:02Z", 3)];
        let result = filter_period_intersect(&windows, &notafk);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].timestamp, "2024-01-01T00:00:02Z".parse().unwrap());
        assert_eq!(result[0].duration, Duration::seconds(3));
    }

    #[test]
    fn period_union_merges_overlapping_and_strips_data() {
        let a = vec![ev("2024-01-01T00:00:00Z", 5)];
        let b = vec![ev("2024-01-01T00:00:03Z", 5)];
        let result = period_union(&a, &b);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].duration, Duration::seconds(8));
        assert!(result[0].data.is_empty());
    }
}
