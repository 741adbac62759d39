//! The core `Event` type: a timestamped, duration-bearing bag of
//! watcher-supplied key/value data.
//!
//! Grounded on `aw_core/models.py::Event` for construction/normalisation
//! semantics. Fields are public rather than hidden behind getters so
//! downstream crates can read and rebuild events directly
//! (`e.timestamp + e.duration`, `new_e.id = None`).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::time;

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: Option<i64>,
    pub timestamp: DateTime<Utc>,
    pub duration: Duration,
    pub data: Map<String, Value>,
    /// Sync bookkeeping column; not part of the wire format.
    pub server_sync_status: i64,
}

impl Event {
    pub fn new(timestamp: DateTime<Utc>, duration: Duration, data: Map<String, Value>) -> Result<Self> {
        if duration < Duration::zero() {
            return Err(crate::error::ModelError::DurationInvalid(duration));
        }
        Ok(Event {
            id: None,
            timestamp: time::truncate_millis(timestamp),
            duration,
            data,
            server_sync_status: 0,
        })
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.timestamp + self.duration
    }

    pub fn timeslot(&self) -> crate::time::TimeSlot {
        crate::time::TimeSlot::new(self.timestamp, self.end())
    }

    pub fn app(&self) -> Option<&str> {
        self.data.get("app").and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.data.get("title").and_then(Value::as_str)
    }

    pub fn url(&self) -> Option<&str> {
        self.data.get("url").and_then(Value::as_str)
    }

    /// The name this event should be attributed to: the registrable
    /// domain of `url` if set, else `app` with any trailing `.exe`
    /// (case-insensitive) stripped, falling back to the raw `app` if
    /// that strip would leave an empty string. Computed fresh from
    /// `data` rather than cached, since `data` is the single source of
    /// truth and nothing mutates it without going through `data` directly.
    pub fn application_name(&self) -> String {
        if let Some(url) = self.url() {
            if let Some(domain) = url::Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
            {
                return domain;
            }
        }
        let app = self.app().unwrap_or_default();
        let lower = app.to_ascii_lowercase();
        if let Some(stripped_len) = lower.strip_suffix(".exe").map(str::len) {
            let stripped = &app[..stripped_len];
            if !stripped.is_empty() {
                return stripped.to_string();
            }
        }
        app.to_string()
    }

    /// Two events are considered equal for coalescing/testing purposes
    /// when their timestamp, duration and data match, ignoring `id` and
    /// sync status.
    pub fn data_eq(&self, other: &Event) -> bool {
        self.timestamp == other.timestamp && self.duration == other.duration && self.data == other.data
    }
}

/// Wire shape per §6: flattened `app`/`title`/`url`/`application_name`
/// alongside the raw `data` bag, timestamp as ISO-8601, duration as
/// float seconds.
#[derive(Serialize, Deserialize)]
struct EventWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    timestamp: DateTime<Utc>,
    duration: f64,
    #[serde(default)]
    data: Map<String, Value>,
    #[serde(default)]
    app: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    application_name: Option<String>,
    #[serde(default)]
    server_sync_status: i64,
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        EventWire {
            id: self.id,
            timestamp: self.timestamp,
            duration: self.duration.num_milliseconds() as f64 / 1000.0,
            data: self.data.clone(),
            app: self.app().map(str::to_string),
            title: self.title().map(str::to_string),
            url: self.url().map(str::to_string),
            application_name: Some(self.application_name()),
            server_sync_status: self.server_sync_status,
        }
        .serialize(s)
    }
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let wire = EventWire::deserialize(d)?;
        Ok(Event {
            id: wire.id,
            timestamp: time::truncate_millis(wire.timestamp),
            duration: Duration::milliseconds((wire.duration * 1000.0).round() as i64),
            data: wire.data,
            server_sync_status: wire.server_sync_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(app: &str, title: &str) -> Map<String, Value> {
        let Value::Object(m) = json!({"app": app, "title": title}) else {
            unreachable!()
        };
        m
    }

    #[test]
    fn rejects_negative_duration() {
        let ts = "2024-01-01T00:00:00Z".parse().unwrap();
        assert!(Event::new(ts, Duration::seconds(-1), data("a", "b")).is_err());
    }

    #[test]
    fn equality_ignores_id() {
        let ts = "2024-01-01T00:00:00Z".parse().unwrap();
        let mut a = Event::new(ts, Duration::seconds(5), data("a", "b")).unwrap();
        let b = Event::new(ts, Duration::seconds(5), data("a", "b")).unwrap();
        a.id = Some(42);
        assert!(a.data_eq(&b));
    }

    #[test]
    fn end_is_timestamp_plus_duration() {
        let ts = "2024-01-01T00:00:00Z".parse().unwrap();
        let e = Event::new(ts, Duration::seconds(10), data("a", "b")).unwrap();
        assert_eq!(e.end(), ts + Duration::seconds(10));
    }

    #[test]
    fn application_name_prefers_registrable_domain_of_url() {
        let ts = "2024-01-01T00:00:00Z".parse().unwrap();
        let Value::Object(d) = json!({"app": "firefox", "url": "https://www.example.com/page"}) else {
            unreachable!()
        };
        let e = Event::new(ts, Duration::seconds(1), d).unwrap();
        assert_eq!(e.application_name(), "example.com");
    }

    #[test]
    fn application_name_strips_exe_suffix_case_insensitively() {
        let ts = "2024-01-01T00:00:00Z".parse().unwrap();
        let Value::Object(d) = json!({"app": "Notepad.EXE"}) else { unreachable!() };
        let e = Event::new(ts, Duration::seconds(1), d).unwrap();
        assert_eq!(e.application_name(), "Notepad");
    }

    #[test]
    fn application_name_falls_back_to_app_when_strip_would_be_empty() {
        let ts = "2024-01-01T00:00:00Z".parse().unwrap();
        let Value::Object(d) = json!({"app": ".exe"}) else { unreachable!() };
        let e = Event::new(ts, Duration::seconds(1), d).unwrap();
        assert_eq!(e.application_name(), ".exe");
    }

    #[test]
    fn roundtrips_through_json() {
        let ts = "2024-01-01T00:00:00.250Z".parse().unwrap();
        let e = Event::new(ts, Duration::milliseconds(1500), data("a", "b")).unwrap();
        let json = serde_json::to_string(&e).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert!(e.data_eq(&back));
    }
}
