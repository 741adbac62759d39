//! Merging two event lists with the first list taking precedence over
//! any overlapping period in the second.
//!
//! Grounded on `aw_transform/union_no_overlap.py`.

use aw_models::{Event, TimeSlot};
use chrono::{DateTime, Utc};

/// Splits `e` at `dt` if `dt` falls strictly inside its period, returning
/// the (possibly unmodified) first half and an optional second half.
fn split_event(e: &Event, dt: DateTime<Utc>) -> (Event, Option<Event>) {
    if e.timestamp < dt && dt < e.end() {
        let mut e1 = e.clone();
        e1.duration = dt - e.timestamp;
        let mut e2 = e.clone();
        e2.timestamp = dt;
        e2.duration = e.end() - dt;
        (e1, Some(e2))
    } else {
        (e.clone(), None)
    }
}

/// Merges two event lists and removes overlap; `events1` has precedence.
///
/// ```text
/// events1  | xxx    xx     xxx     |
/// events2  |  ----     ------   -- |
/// result   | xxx--  xx ----xxx  -- |
/// ```
pub fn union_no_overlap(events1: &[Event], events2: &[Event]) -> Vec<Event> {
    let mut events1 = events1.to_vec();
    let mut events2 = events2.to_vec();

    let mut out = Vec::new();
    let mut i1 = 0;
    let mut i2 = 0;
    while i1 < events1.len() && i2 < events2.len() {
        let e1 = events1[i1].clone();
        let e2 = events2[i2].clone();
        let p1 = TimeSlot::new(e1.timestamp, e1.end());
        let p2 = TimeSlot::new(e2.timestamp, e2.end());

        if p1.intersects(&p2) {
            if e1.timestamp <= e2.timestamp {
                out.push(e1.clone());
                i1 += 1;
                let (_, e2_next) = split_event(&e2, e1.end());
                match e2_next {
                    Some(next) => events2[i2] = next,
                    None => i2 += 1,
                }
            } else {
                let (e2_head, e2_tail) = split_event(&e2, e1.timestamp);
                out.push(e2_head);
                i2 += 1;
                if let Some(tail) = e2_tail {
                    events2.insert(i2, tail);
                }
            }
        } else if e1.timestamp <= e2.timestamp {
            out.push(e1);
            i1 += 1;
        } else {
            out.push(e2);
            i2 += 1;
        }
    }
    out.extend_from_slice(&events1[i1..]);
    out.extend_from_slice(&events2[i2..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::{json, Value};

    fn ev(ts: &str, secs: i64) -> Event {
        let Value::Object(data) = json!({}) else { unreachable!() };
        Event::new(ts.parse().unwrap(), Duration::hours(secs), data).unwrap()
    }

    #[test]
    fn split_event_cuts_in_half() {
        let now: DateTime<Utc> = "2018-01-01T00:00:00Z".parse().unwrap();
        let e = ev("2018-01-01T00:00:00Z", 2);
        let (e1, e2) = split_event(&e, now + Duration::hours(1));
        assert_eq!(e1.timestamp, now);
        assert_eq!(e1.duration, Duration::hours(1));
        let e2 = e2.unwrap();
        assert_eq!(e2.timestamp, now + Duration::hours(1));
        assert_eq!(e2.duration, Duration::hours(1));
    }

    #[test]
    fn events1_has_precedence_on_overlap() {
        let events1 = vec![ev("2018-01-01T00:00:00Z", 1)];
        let events2 = vec![ev("2018-01-01T00:00:00Z", 1)];
        let result = union_no_overlap(&events1, &events2);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].duration, Duration::hours(1));
    }
}
