//! Volatile, process-local storage backend. Used by tests and by the
//! `--testing` CLI flag; nothing survives past process exit.
//!
//! Grounded on `aw_datastore/storages/memory.py::MemoryStorage`.

use std::collections::HashMap;
use std::sync::Mutex;

use aw_models::{Application, ApplicationType, Bucket, Event};
use aw_transform::heartbeat_merge;
use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::error::{DatastoreError, Result};
use crate::queries::{is_excluded_app, normalised_host, AppUsage, DashboardEvent};
use crate::storage::StorageInterface;

/// Projects an `Event` into the dashboard-feed shape shared by
/// `get_dashboard_events` and `get_non_sync_events` (spec.md §4.5).
fn event_to_dashboard_event(bucket_id: &str, e: &Event, duration_secs: f64) -> DashboardEvent {
    DashboardEvent {
        id: e.id.unwrap_or_default(),
        event_id: e.id.unwrap_or_default(),
        bucket_id: bucket_id.to_string(),
        start: e.timestamp,
        end: e.end(),
        timestamp: e.timestamp,
        application_name: e.application_name(),
        app: e.app().map(str::to_string),
        title: e.title().map(str::to_string),
        url: e.url().map(str::to_string),
        duration: duration_secs,
        data: serde_json::Value::Object(e.data.clone()),
    }
}

struct BucketState {
    metadata: Bucket,
    events: Vec<Event>,
    next_id: i64,
}

pub struct MemoryStore {
    buckets: Mutex<HashMap<String, BucketState>>,
    settings: Mutex<HashMap<String, serde_json::Value>>,
    applications: Mutex<HashMap<String, Application>>,
    next_application_id: Mutex<i64>,
    config: Config,
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::with_config(Config::default())
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// As [`Self::new`], but with an explicit [`Config`] driving the
    /// heartbeat pulsetime and dashboard duration floor, mirroring
    /// [`crate::sqlite::EncryptedStore::open_with_config`].
    pub fn with_config(config: Config) -> Self {
        MemoryStore {
            buckets: Mutex::new(HashMap::new()),
            settings: Mutex::new(HashMap::new()),
            applications: Mutex::new(HashMap::new()),
            next_application_id: Mutex::new(0),
            config,
        }
    }

    /// Upsert an `Application` row from an ingested event's `(app, url)`
    /// pair, mirroring the side effect `EncryptedStore::insert_one`
    /// performs per spec.md §4.5.
    fn upsert_application_from_event(&self, event: &Event) {
        let (app_type, key) = match event.url() {
            Some(url) if !url.is_empty() => (ApplicationType::WebApplication, url.to_string()),
            _ => {
                let app = event.app().unwrap_or_default();
                if app.is_empty() {
                    return;
                }
                (ApplicationType::Application, app.to_string())
            }
        };
        let mut applications = self.applications.lock().unwrap();
        if let Some(existing) = applications.get_mut(&key) {
            existing.updated_at = Utc::now();
            return;
        }
        let mut id = self.next_application_id.lock().unwrap();
        let application = Application {
            id: Some(*id),
            app_type,
            name: matches!(app_type, ApplicationType::Application).then(|| key.clone()),
            url: matches!(app_type, ApplicationType::WebApplication).then(|| key.clone()),
            alias: None,
            is_blocked: false,
            is_ignore_idle_time: false,
            color: None,
            criteria: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        *id += 1;
        applications.insert(key, application);
    }
}

impl StorageInterface for MemoryStore {
    fn buckets(&self) -> Result<HashMap<String, Bucket>> {
        Ok(self
            .buckets
            .lock()
            .unwrap()
            .iter()
            .map(|(id, b)| (id.clone(), b.metadata.clone()))
            .collect())
    }

    fn create_bucket(&self, bucket: &Bucket) -> Result<()> {
        let mut buckets = self.buckets.lock().unwrap();
        if buckets.contains_key(&bucket.id) {
            return Err(DatastoreError::BucketAlreadyExists(bucket.id.clone()));
        }
        buckets.insert(
            bucket.id.clone(),
            BucketState {
                metadata: bucket.clone(),
                events: Vec::new(),
                next_id: 0,
            },
        );
        Ok(())
    }

    fn update_bucket(
        &self,
        bucket_id: &str,
        bucket_type: Option<&str>,
        client: Option<&str>,
        hostname: Option<&str>,
        name: Option<&str>,
        data: Option<&serde_json::Value>,
    ) -> Result<()> {
        let mut buckets = self.buckets.lock().unwrap();
        let state = buckets
            .get_mut(bucket_id)
            .ok_or_else(|| DatastoreError::BucketNotFound(bucket_id.to_string()))?;
        if let Some(t) = bucket_type {
            state.metadata._type = t.to_string();
        }
        if let Some(c) = client {
            state.metadata.client = c.to_string();
        }
        if let Some(h) = hostname {
            state.metadata.hostname = h.to_string();
        }
        if let Some(n) = name {
            state.metadata.name = Some(n.to_string());
        }
        if let Some(d) = data {
            if let serde_json::Value::Object(map) = d {
                state.metadata.data = map.clone().into_iter().collect();
            }
        }
        Ok(())
    }

    fn delete_bucket(&self, bucket_id: &str) -> Result<()> {
        self.buckets
            .lock()
            .unwrap()
            .remove(bucket_id)
            .map(|_| ())
            .ok_or_else(|| DatastoreError::BucketNotFound(bucket_id.to_string()))
    }

    fn get_metadata(&self, bucket_id: &str) -> Result<Bucket> {
        self.buckets
            .lock()
            .unwrap()
            .get(bucket_id)
            .map(|s| s.metadata.clone())
            .ok_or_else(|| DatastoreError::BucketNotFound(bucket_id.to_string()))
    }

    fn insert_one(&self, bucket_id: &str, event: &Event) -> Result<Event> {
        if event.app().unwrap_or("").is_empty() || event.title().unwrap_or("").is_empty() {
            log::debug!("dropping event with empty app/title on ingest");
            return Ok(event.clone());
        }
        let mut buckets = self.buckets.lock().unwrap();
        let state = buckets
            .get_mut(bucket_id)
            .ok_or_else(|| DatastoreError::BucketNotFound(bucket_id.to_string()))?;
        let mut event = event.clone();
        if let Some(id) = event.id {
            if let Some(existing) = state.events.iter_mut().find(|e| e.id == Some(id)) {
                *existing = event.clone();
                drop(buckets);
                self.upsert_application_from_event(&event);
                return Ok(event);
            }
        }

        let pulsetime = chrono::Duration::milliseconds((self.config.heartbeat_pulsetime_secs * 1000.0).round() as i64);
        let window_start = event.timestamp - pulsetime;
        let application_name = event.application_name();
        let title = event.title().map(str::to_string);
        let coalesce_target = state
            .events
            .iter_mut()
            .filter(|e| e.application_name() == application_name && e.title().map(str::to_string) == title)
            .filter(|e| e.timestamp >= window_start && e.timestamp <= event.timestamp)
            .max_by_key(|e| e.timestamp);

        let result = match coalesce_target {
            Some(existing) => {
                existing.duration = existing.duration + event.duration;
                existing.server_sync_status = 0;
                existing.clone()
            }
            None => {
                event.id = Some(state.next_id);
                state.next_id += 1;
                state.events.push(event.clone());
                event.clone()
            }
        };
        drop(buckets);
        self.upsert_application_from_event(&result);
        Ok(result)
    }

    fn insert_many(&self, bucket_id: &str, events: &[Event]) -> Result<()> {
        for event in events {
            if event.app().unwrap_or("").is_empty() || event.title().unwrap_or("").is_empty() {
                log::debug!("dropping event with empty app/title on ingest");
                continue;
            }
            let mut buckets = self.buckets.lock().unwrap();
            let state = buckets
                .get_mut(bucket_id)
                .ok_or_else(|| DatastoreError::BucketNotFound(bucket_id.to_string()))?;
            let mut event = event.clone();
            event.id = Some(state.next_id);
            state.next_id += 1;
            state.events.push(event.clone());
            drop(buckets);
            self.upsert_application_from_event(&event);
        }
        Ok(())
    }

    fn heartbeat(&self, bucket_id: &str, heartbeat: &Event, pulsetime: f64) -> Result<Event> {
        let mut buckets = self.buckets.lock().unwrap();
        let state = buckets
            .get_mut(bucket_id)
            .ok_or_else(|| DatastoreError::BucketNotFound(bucket_id.to_string()))?;

        if let Some(last) = state.events.iter().max_by_key(|e| e.timestamp) {
            if let Some(merged) = heartbeat_merge(last, heartbeat, pulsetime) {
                let id = last.id;
                let merged_id = id;
                let mut merged = merged;
                merged.id = merged_id;
                if let Some(pos) = state.events.iter().position(|e| e.id == id) {
                    state.events[pos] = merged.clone();
                }
                drop(buckets);
                self.upsert_application_from_event(&merged);
                return Ok(merged);
            }
        }
        drop(buckets);
        self.insert_one(bucket_id, heartbeat)
    }

    fn get_event(&self, bucket_id: &str, event_id: i64) -> Result<Option<Event>> {
        let buckets = self.buckets.lock().unwrap();
        let state = buckets
            .get(bucket_id)
            .ok_or_else(|| DatastoreError::BucketNotFound(bucket_id.to_string()))?;
        Ok(state.events.iter().rev().find(|e| e.id == Some(event_id)).cloned())
    }

    fn get_events(
        &self,
        bucket_id: &str,
        limit: Option<usize>,
        starttime: Option<DateTime<Utc>>,
        endtime: Option<DateTime<Utc>>,
    ) -> Result<Vec<Event>> {
        let buckets = self.buckets.lock().unwrap();
        let state = buckets
            .get(bucket_id)
            .ok_or_else(|| DatastoreError::BucketNotFound(bucket_id.to_string()))?;

        let mut events: Vec<Event> = state.events.clone();
        events.sort_by_key(|e| e.timestamp);
        events.reverse();

        if let Some(start) = starttime {
            events.retain(|e| e.end() > start);
        }
        if let Some(end) = endtime {
            let end_bound = aw_models::round_up_to_next_ms(end);
            events.retain(|e| e.timestamp < end_bound);
        }

        for e in &mut events {
            if let Some(start) = starttime {
                if e.timestamp < start {
                    let end = e.end();
                    e.timestamp = start;
                    e.duration = end - e.timestamp;
                }
            }
            if let Some(end) = endtime {
                if e.end() > end {
                    e.duration = end - e.timestamp;
                }
            }
        }

        if let Some(limit) = limit {
            events.truncate(limit);
        }
        Ok(events)
    }

    fn get_eventcount(
        &self,
        bucket_id: &str,
        starttime: Option<DateTime<Utc>>,
        endtime: Option<DateTime<Utc>>,
    ) -> Result<i64> {
        let buckets = self.buckets.lock().unwrap();
        let state = buckets
            .get(bucket_id)
            .ok_or_else(|| DatastoreError::BucketNotFound(bucket_id.to_string()))?;
        Ok(state
            .events
            .iter()
            .filter(|e| starttime.map(|s| s <= e.timestamp).unwrap_or(true))
            .filter(|e| endtime.map(|t| e.timestamp <= t).unwrap_or(true))
            .count() as i64)
    }

    fn replace(&self, bucket_id: &str, event_id: i64, event: &Event) -> Result<Event> {
        let mut buckets = self.buckets.lock().unwrap();
        let state = buckets
            .get_mut(bucket_id)
            .ok_or_else(|| DatastoreError::BucketNotFound(bucket_id.to_string()))?;
        let pos = state
            .events
            .iter()
            .position(|e| e.id == Some(event_id))
            .ok_or(DatastoreError::EventNotFound(event_id))?;
        let mut new_event = event.clone();
        new_event.id = Some(event_id);
        state.events[pos] = new_event.clone();
        Ok(new_event)
    }

    fn replace_last(&self, bucket_id: &str, event: &Event) -> Result<Event> {
        let last_id = {
            let buckets = self.buckets.lock().unwrap();
            let state = buckets
                .get(bucket_id)
                .ok_or_else(|| DatastoreError::BucketNotFound(bucket_id.to_string()))?;
            state
                .events
                .iter()
                .max_by_key(|e| e.timestamp)
                .and_then(|e| e.id)
                .ok_or(DatastoreError::EventNotFound(-1))?
        };
        self.replace(bucket_id, last_id, event)
    }

    fn delete(&self, bucket_id: &str, event_id: i64) -> Result<bool> {
        let mut buckets = self.buckets.lock().unwrap();
        let state = buckets
            .get_mut(bucket_id)
            .ok_or_else(|| DatastoreError::BucketNotFound(bucket_id.to_string()))?;
        let before = state.events.len();
        state.events.retain(|e| e.id != Some(event_id));
        Ok(state.events.len() != before)
    }

    fn get_most_used_apps(&self, starttime: DateTime<Utc>, endtime: DateTime<Utc>) -> Result<Vec<AppUsage>> {
        let buckets = self.buckets.lock().unwrap();
        let mut totals: HashMap<String, (f64, Option<String>)> = HashMap::new();
        for state in buckets.values() {
            for e in &state.events {
                if e.timestamp < starttime || e.timestamp > endtime {
                    continue;
                }
                let secs = e.duration.num_milliseconds() as f64 / 1000.0;
                if secs <= self.config.dashboard_duration_floor_secs {
                    continue;
                }
                let app = e.app().unwrap_or_default();
                if is_excluded_app(app) {
                    continue;
                }
                let name = e.application_name();
                let entry = totals.entry(name).or_insert((0.0, e.url().map(str::to_string)));
                entry.0 += secs;
            }
        }
        Ok(totals
            .into_iter()
            .map(|(app, (total, url))| AppUsage { app, url, total_duration_secs: total })
            .collect())
    }

    fn get_dashboard_events(&self, starttime: DateTime<Utc>, endtime: DateTime<Utc>) -> Result<Vec<DashboardEvent>> {
        let buckets = self.buckets.lock().unwrap();
        let mut out = Vec::new();
        for (bucket_id, state) in buckets.iter() {
            for e in &state.events {
                if e.timestamp < starttime || e.timestamp > endtime {
                    continue;
                }
                let secs = e.duration.num_milliseconds() as f64 / 1000.0;
                if secs <= self.config.dashboard_duration_floor_secs {
                    continue;
                }
                let app = e.app().unwrap_or_default();
                if is_excluded_app(app) {
                    continue;
                }
                if e.data.get("status").and_then(|v| v.as_str()).map(|s| s.contains("not-afk")).unwrap_or(false) {
                    continue;
                }
                out.push(event_to_dashboard_event(bucket_id, e, secs));
            }
        }
        out.sort_by_key(|e| e.start);
        Ok(out)
    }

    fn get_non_sync_events(&self) -> Result<Vec<DashboardEvent>> {
        let buckets = self.buckets.lock().unwrap();
        let mut out = Vec::new();
        for (bucket_id, state) in buckets.iter() {
            for e in &state.events {
                let secs = e.duration.num_milliseconds() as f64 / 1000.0;
                if secs <= self.config.dashboard_duration_floor_secs || e.server_sync_status != 0 {
                    continue;
                }
                let app = e.app().unwrap_or_default();
                if is_excluded_app(app) {
                    continue;
                }
                if e.data.get("status").and_then(|v| v.as_str()).map(|s| s.contains("not-afk")).unwrap_or(false) {
                    continue;
                }
                out.push(event_to_dashboard_event(bucket_id, e, secs));
            }
        }
        out.sort_by_key(|e| e.timestamp);
        Ok(out)
    }

    fn update_server_sync_status(&self, ids: &[i64], new_status: i64) -> Result<()> {
        let mut buckets = self.buckets.lock().unwrap();
        for state in buckets.values_mut() {
            for e in &mut state.events {
                if let Some(id) = e.id {
                    if ids.contains(&id) {
                        e.server_sync_status = new_status;
                    }
                }
            }
        }
        Ok(())
    }

    fn save_settings(&self, code: &str, value: &serde_json::Value) -> Result<()> {
        self.settings.lock().unwrap().insert(code.to_string(), value.clone());
        Ok(())
    }

    fn retrieve_settings(&self, code: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.settings.lock().unwrap().get(code).cloned())
    }

    fn save_application(&self, application: &Application) -> Result<Application> {
        let mut applications = self.applications.lock().unwrap();
        let key = application.upsert_key().to_string();
        let mut saved = application.clone();
        if let Some(existing) = applications.get(&key) {
            saved.id = existing.id;
            saved.created_at = existing.created_at;
        } else {
            let mut id = self.next_application_id.lock().unwrap();
            saved.id = Some(*id);
            *id += 1;
        }
        saved.updated_at = Utc::now();
        applications.insert(key, saved.clone());
        Ok(saved)
    }

    fn get_applications(&self) -> Result<Vec<Application>> {
        Ok(self.applications.lock().unwrap().values().cloned().collect())
    }

    fn delete_application(&self, id: i64) -> Result<bool> {
        let mut applications = self.applications.lock().unwrap();
        let key = applications
            .iter()
            .find(|(_, a)| a.id == Some(id))
            .map(|(k, _)| k.clone());
        match key {
            Some(key) => {
                applications.remove(&key);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn is_blocked(&self, app: &str, url: Option<&str>) -> Result<bool> {
        let applications = self.applications.lock().unwrap();
        let host = url.and_then(normalised_host);
        Ok(applications.values().any(|a| {
            if !a.is_blocked {
                return false;
            }
            match a.app_type {
                ApplicationType::Application => a.name.as_deref() == Some(app),
                ApplicationType::WebApplication => {
                    host.is_some() && a.url.as_deref().and_then(normalised_host) == host
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn bucket() -> Bucket {
        Bucket::new("b1", "currentwindow", "aw-watcher-window", "host", Utc::now())
    }

    fn ev(ts: &str, secs: i64, app: &str) -> Event {
        let serde_json::Value::Object(data) = json!({"app": app, "title": "t"}) else { unreachable!() };
        Event::new(ts.parse().unwrap(), Duration::seconds(secs), data).unwrap()
    }

    #[test]
    fn insert_assigns_incrementing_ids() {
        let store = MemoryStore::new();
        store.create_bucket(&bucket()).unwrap();
        let e1 = store.insert_one("b1", &ev("2024-01-01T00:00:00Z", 5, "a")).unwrap();
        let e2 = store.insert_one("b1", &ev("2024-01-01T00:00:10Z", 5, "b")).unwrap();
        assert_eq!(e1.id, Some(0));
        assert_eq!(e2.id, Some(1));
    }

    #[test]
    fn insert_one_coalesces_matching_app_and_title_within_pulsetime() {
        let store = MemoryStore::new();
        store.create_bucket(&bucket()).unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:00:00Z", 5, "code")).unwrap();
        let merged = store.insert_one("b1", &ev("2024-01-01T00:00:30Z", 5, "code")).unwrap();
        assert_eq!(merged.duration, Duration::seconds(10));
        assert_eq!(store.get_eventcount("b1", None, None).unwrap(), 1);
    }

    #[test]
    fn insert_one_does_not_coalesce_past_pulsetime() {
        let store = MemoryStore::new();
        store.create_bucket(&bucket()).unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:00:00Z", 5, "code")).unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:02:00Z", 5, "code")).unwrap();
        assert_eq!(store.get_eventcount("b1", None, None).unwrap(), 2);
    }

    #[test]
    fn insert_one_drops_events_with_empty_app_or_title() {
        let store = MemoryStore::new();
        store.create_bucket(&bucket()).unwrap();
        let serde_json::Value::Object(data) = json!({"app": "", "title": ""}) else { unreachable!() };
        let event = Event::new("2024-01-01T00:00:00Z".parse().unwrap(), Duration::seconds(1), data).unwrap();
        store.insert_one("b1", &event).unwrap();
        assert_eq!(store.get_eventcount("b1", None, None).unwrap(), 0);
    }

    #[test]
    fn get_events_trims_partial_events_at_range_boundary() {
        let store = MemoryStore::new();
        store.create_bucket(&bucket()).unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:00:00Z", 10, "a")).unwrap();

        let start = "2024-01-01T00:00:05Z".parse().unwrap();
        let events = store.get_events("b1", None, Some(start), None).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].timestamp, start);
        assert_eq!(events[0].duration, Duration::seconds(5));
    }

    #[test]
    fn heartbeat_merges_within_pulsetime() {
        let store = MemoryStore::new();
        store.create_bucket(&bucket()).unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:00:00Z", 0, "a")).unwrap();
        let merged = store.heartbeat("b1", &ev("2024-01-01T00:00:05Z", 0, "a"), 10.0).unwrap();
        assert_eq!(merged.duration, Duration::seconds(5));
        assert_eq!(store.get_eventcount("b1", None, None).unwrap(), 1);
    }

    #[test]
    fn heartbeat_appends_new_event_outside_pulsetime() {
        let store = MemoryStore::new();
        store.create_bucket(&bucket()).unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:00:00Z", 0, "a")).unwrap();
        store.heartbeat("b1", &ev("2024-01-01T01:00:00Z", 0, "a"), 10.0).unwrap();
        assert_eq!(store.get_eventcount("b1", None, None).unwrap(), 2);
    }

    #[test]
    fn most_used_apps_excludes_afk_and_short_events() {
        let store = MemoryStore::new();
        store.create_bucket(&bucket()).unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:00:00Z", 60, "code")).unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:01:00Z", 60, "afk")).unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:02:00Z", 5, "code")).unwrap();

        let start = "2024-01-01T00:00:00Z".parse().unwrap();
        let end = "2024-01-01T01:00:00Z".parse().unwrap();
        let apps = store.get_most_used_apps(start, end).unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].app, "code");
        assert_eq!(apps[0].total_duration_secs, 60.0);
    }

    #[test]
    fn dashboard_events_excludes_afk_but_keeps_unsynced_status() {
        let store = MemoryStore::new();
        store.create_bucket(&bucket()).unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:00:00Z", 60, "code")).unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:01:00Z", 60, "afk")).unwrap();
        store.update_server_sync_status(&[0], 1).unwrap();

        let start = "2024-01-01T00:00:00Z".parse().unwrap();
        let end = "2024-01-01T01:00:00Z".parse().unwrap();
        let events = store.get_dashboard_events(start, end).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].app.as_deref(), Some("code"));
    }

    #[test]
    fn non_sync_events_filters_on_sync_status() {
        let store = MemoryStore::new();
        store.create_bucket(&bucket()).unwrap();
        let e1 = store.insert_one("b1", &ev("2024-01-01T00:00:00Z", 60, "code")).unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:01:00Z", 60, "slack")).unwrap();
        store.update_server_sync_status(&[e1.id.unwrap()], 1).unwrap();

        let pending = store.get_non_sync_events().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].app.as_deref(), Some("slack"));
    }

    #[test]
    fn insert_one_upserts_application_registry() {
        let store = MemoryStore::new();
        store.create_bucket(&bucket()).unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:00:00Z", 5, "code")).unwrap();
        let apps = store.get_applications().unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].name.as_deref(), Some("code"));
        assert!(!apps[0].is_blocked);
    }

    #[test]
    fn is_blocked_matches_blocked_application_by_name() {
        let store = MemoryStore::new();
        store.create_bucket(&bucket()).unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:00:00Z", 5, "steam")).unwrap();
        let mut app = store.get_applications().unwrap().remove(0);
        app.is_blocked = true;
        store.save_application(&app).unwrap();
        assert!(store.is_blocked("steam", None).unwrap());
        assert!(!store.is_blocked("code", None).unwrap());
    }
}
