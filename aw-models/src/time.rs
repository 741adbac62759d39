//! Timestamp parsing/normalisation and half-open interval arithmetic.
//!
//! Grounded on `aw_core/models.py::_timestamp_parse` (millisecond
//! truncation, UTC-with-warning fallback) and on the `Timeslot` type used
//! throughout `aw_transform/` (`filter_period_intersect.py`,
//! `union_no_overlap.py`).

use chrono::{DateTime, Duration, SubsecRound, Utc};

use crate::error::{ModelError, Result};

/// Parse an RFC3339/ISO-8601 timestamp, truncating to millisecond
/// resolution. A timestamp string without a UTC offset is rejected by
/// `chrono`'s RFC3339 parser; callers that may receive offset-less input
/// should fall back to [`parse_naive_as_utc`].
pub fn parse(value: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .map_err(|_| ModelError::TimestampInvalid(value.to_string()))?;
    Ok(truncate_millis(parsed.with_timezone(&Utc)))
}

/// Accept a timestamp string that may be missing a timezone offset. Used
/// where the source data is not guaranteed to be well-formed RFC3339 (the
/// original logs a warning and assumes UTC; we do the same via `log::warn!`).
pub fn parse_lenient(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = parse(value) {
        return Ok(dt);
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        log::warn!("timestamp without timezone found, using UTC: {naive}");
        return Ok(truncate_millis(DateTime::from_naive_utc_and_offset(naive, Utc)));
    }
    Err(ModelError::TimestampInvalid(value.to_string()))
}

/// Floor (never round) to millisecond resolution — matches
/// `ts.replace(microsecond=int(ts.microsecond / 1000) * 1000)`.
pub fn truncate_millis(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.trunc_subsecs(3)
}

/// Normalise and validate a duration expressed in seconds (float or
/// integer). Rejects negative durations per the `DurationInvalid` error.
pub fn duration_from_secs(secs: f64) -> Result<Duration> {
    let millis = (secs * 1000.0).round() as i64;
    let dur = Duration::milliseconds(millis);
    if dur < Duration::zero() {
        return Err(ModelError::DurationInvalid(dur));
    }
    Ok(dur)
}

pub fn duration_to_secs(dur: Duration) -> f64 {
    dur.num_milliseconds() as f64 / 1000.0
}

/// A half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSlot {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        TimeSlot { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether this slot and `other` share any instant. Half-open, so two
    /// slots that merely touch at a boundary do not intersect.
    pub fn intersects(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The overlapping sub-interval, if any.
    pub fn intersection(&self, other: &TimeSlot) -> Option<TimeSlot> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end {
            Some(TimeSlot::new(start, end))
        } else {
            None
        }
    }

    /// The gap between two slots: `None` if they intersect or merely
    /// touch, else the `Duration` separating them. Mirrors
    /// `Timeslot.gap` as used by `period_union`.
    pub fn gap(&self, other: &TimeSlot) -> Option<Duration> {
        if self.intersects(other) {
            return None;
        }
        if self.end <= other.start {
            let g = other.start - self.end;
            if g.is_zero() {
                None
            } else {
                Some(g)
            }
        } else {
            let g = self.start - other.end;
            if g.is_zero() {
                None
            } else {
                Some(g)
            }
        }
    }

    /// The smallest slot covering both inputs.
    pub fn union(&self, other: &TimeSlot) -> TimeSlot {
        TimeSlot::new(self.start.min(other.start), self.end.max(other.end))
    }
}

pub fn add(instant: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    instant + duration
}

/// "Round up" the end of a query window so that events ending exactly on
/// the boundary are included: `end + (1ms - (end mod 1ms))`. Mirrors the
/// millisecond-overflow-safe arithmetic in `Bucket.get` (`aw_datastore.py`).
pub fn round_up_to_next_ms(end: DateTime<Utc>) -> DateTime<Utc> {
    let truncated = truncate_millis(end);
    if truncated == end {
        end + Duration::milliseconds(1)
    } else {
        truncated + Duration::milliseconds(1)
    }
}
