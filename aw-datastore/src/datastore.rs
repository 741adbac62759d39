//! The `Datastore` facade: the single entry point consumers reach for,
//! wrapping whichever [`StorageInterface`] backend was chosen at
//! startup.
//!
//! Grounded on `aw_datastore/datastore.py::Datastore`'s facade shape
//! (`ds.get_buckets()`, `ds.create_bucket(&bucket)`,
//! `ds.heartbeat(bucket_id, event, pulsetime)`, …).

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use aw_models::{Application, Bucket, Event};
use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::error::Result;
use crate::memory::MemoryStore;
use crate::queries::{AppUsage, DashboardEvent};
use crate::sqlite::EncryptedStore;
use crate::storage::StorageInterface;

/// The maximum number of events committed in a single `insert_many`
/// chunk; matches the backing stores' variable-count ceiling.
const INSERT_CHUNK_SIZE: usize = 100;

#[derive(Clone)]
pub struct Datastore {
    storage: Arc<dyn StorageInterface>,
}

impl std::fmt::Debug for Datastore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Datastore")
    }
}

impl Datastore {
    /// A volatile, process-local datastore. Used by tests and by
    /// `aw-cli --testing`.
    pub fn new_memory() -> Self {
        Datastore { storage: Arc::new(MemoryStore::new()) }
    }

    /// As [`Self::new_memory`], but with an explicit [`Config`] driving
    /// the heartbeat pulsetime and dashboard duration floor.
    pub fn new_memory_with_config(config: Config) -> Self {
        Datastore { storage: Arc::new(MemoryStore::with_config(config)) }
    }

    /// Opens (creating if absent) a persistent, SQLCipher-encrypted
    /// datastore, running any pending schema migration.
    pub fn new_encrypted(path: &Path, passphrase: &str) -> Result<Self> {
        Self::new_encrypted_with_config(path, passphrase, Config::default())
    }

    /// As [`Self::new_encrypted`], but with an explicit [`Config`] —
    /// the entry point a caller that loaded `sundial.toml` should use.
    pub fn new_encrypted_with_config(path: &Path, passphrase: &str, config: Config) -> Result<Self> {
        let (store, outcome) = EncryptedStore::open_with_config(path, passphrase, config)?;
        if outcome.changed {
            log::info!("datastore schema migrated at {}", path.display());
        }
        Ok(Datastore { storage: Arc::new(store) })
    }

    pub fn buckets(&self) -> Result<HashMap<String, Bucket>> {
        self.storage.buckets()
    }

    pub fn get_bucket(&self, bucket_id: &str) -> Result<Bucket> {
        self.storage.get_metadata(bucket_id)
    }

    pub fn create_bucket(&self, bucket: &Bucket) -> Result<()> {
        self.storage.create_bucket(bucket)
    }

    pub fn update_bucket(
        &self,
        bucket_id: &str,
        bucket_type: Option<&str>,
        client: Option<&str>,
        hostname: Option<&str>,
        name: Option<&str>,
        data: Option<&serde_json::Value>,
    ) -> Result<()> {
        self.storage.update_bucket(bucket_id, bucket_type, client, hostname, name, data)
    }

    pub fn delete_bucket(&self, bucket_id: &str) -> Result<()> {
        self.storage.delete_bucket(bucket_id)
    }

    pub fn insert_event(&self, bucket_id: &str, event: &Event) -> Result<Event> {
        self.storage.insert_one(bucket_id, event)
    }

    /// Inserts `events` in chunks of [`INSERT_CHUNK_SIZE`], each chunk
    /// committed independently rather than all-or-nothing.
    pub fn insert_events(&self, bucket_id: &str, events: &[Event]) -> Result<()> {
        for chunk in events.chunks(INSERT_CHUNK_SIZE) {
            self.storage.insert_many(bucket_id, chunk)?;
        }
        Ok(())
    }

    pub fn heartbeat(&self, bucket_id: &str, event: Event, pulsetime: f64) -> Result<Event> {
        self.storage.heartbeat(bucket_id, &event, pulsetime)
    }

    pub fn get_event(&self, bucket_id: &str, event_id: i64) -> Result<Option<Event>> {
        self.storage.get_event(bucket_id, event_id)
    }

    pub fn get_events(
        &self,
        bucket_id: &str,
        limit: Option<usize>,
        starttime: Option<DateTime<Utc>>,
        endtime: Option<DateTime<Utc>>,
    ) -> Result<Vec<Event>> {
        self.storage.get_events(bucket_id, limit, starttime, endtime)
    }

    pub fn get_event_count(
        &self,
        bucket_id: &str,
        starttime: Option<DateTime<Utc>>,
        endtime: Option<DateTime<Utc>>,
    ) -> Result<i64> {
        self.storage.get_eventcount(bucket_id, starttime, endtime)
    }

    pub fn replace_event(&self, bucket_id: &str, event_id: i64, event: &Event) -> Result<Event> {
        self.storage.replace(bucket_id, event_id, event)
    }

    pub fn replace_last_event(&self, bucket_id: &str, event: &Event) -> Result<Event> {
        self.storage.replace_last(bucket_id, event)
    }

    pub fn delete_event(&self, bucket_id: &str, event_id: i64) -> Result<bool> {
        self.storage.delete(bucket_id, event_id)
    }

    pub fn get_most_used_apps(&self, starttime: DateTime<Utc>, endtime: DateTime<Utc>) -> Result<Vec<AppUsage>> {
        self.storage.get_most_used_apps(starttime, endtime)
    }

    pub fn get_dashboard_events(&self, starttime: DateTime<Utc>, endtime: DateTime<Utc>) -> Result<Vec<DashboardEvent>> {
        self.storage.get_dashboard_events(starttime, endtime)
    }

    pub fn get_non_sync_events(&self) -> Result<Vec<DashboardEvent>> {
        self.storage.get_non_sync_events()
    }

    pub fn update_server_sync_status(&self, ids: &[i64], new_status: i64) -> Result<()> {
        self.storage.update_server_sync_status(ids, new_status)
    }

    pub fn save_settings(&self, code: &str, value: &serde_json::Value) -> Result<()> {
        self.storage.save_settings(code, value)
    }

    pub fn retrieve_settings(&self, code: &str) -> Result<Option<serde_json::Value>> {
        self.storage.retrieve_settings(code)
    }

    pub fn save_application(&self, application: &Application) -> Result<Application> {
        self.storage.save_application(application)
    }

    pub fn get_applications(&self) -> Result<Vec<Application>> {
        self.storage.get_applications()
    }

    pub fn delete_application(&self, id: i64) -> Result<bool> {
        self.storage.delete_application(id)
    }

    pub fn is_blocked(&self, app: &str, url: Option<&str>) -> Result<bool> {
        self.storage.is_blocked(app, url)
    }

    /// A convenience handle scoped to a single bucket, mirroring
    /// `datastore.py`'s `Bucket` accessor object.
    pub fn bucket<'a>(&'a self, bucket_id: &'a str) -> BucketHandle<'a> {
        BucketHandle { datastore: self, bucket_id }
    }
}

pub struct BucketHandle<'a> {
    datastore: &'a Datastore,
    bucket_id: &'a str,
}

impl<'a> BucketHandle<'a> {
    pub fn metadata(&self) -> Result<Bucket> {
        self.datastore.get_bucket(self.bucket_id)
    }

    pub fn get(
        &self,
        limit: Option<usize>,
        starttime: Option<DateTime<Utc>>,
        endtime: Option<DateTime<Utc>>,
    ) -> Result<Vec<Event>> {
        self.datastore.get_events(self.bucket_id, limit, starttime, endtime)
    }

    pub fn get_by_id(&self, event_id: i64) -> Result<Option<Event>> {
        self.datastore.get_event(self.bucket_id, event_id)
    }

    pub fn get_eventcount(&self, starttime: Option<DateTime<Utc>>, endtime: Option<DateTime<Utc>>) -> Result<i64> {
        self.datastore.get_event_count(self.bucket_id, starttime, endtime)
    }

    pub fn insert(&self, event: &Event) -> Result<Event> {
        self.datastore.insert_event(self.bucket_id, event)
    }

    pub fn delete(&self, event_id: i64) -> Result<bool> {
        self.datastore.delete_event(self.bucket_id, event_id)
    }

    pub fn replace(&self, event_id: i64, event: &Event) -> Result<Event> {
        self.datastore.replace_event(self.bucket_id, event_id, event)
    }

    pub fn replace_last(&self, event: &Event) -> Result<Event> {
        self.datastore.replace_last_event(self.bucket_id, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn ev(ts: &str, secs: i64, app: &str) -> Event {
        let serde_json::Value::Object(data) = json!({"app": app, "title": "t"}) else { unreachable!() };
        Event::new(ts.parse().unwrap(), Duration::seconds(secs), data).unwrap()
    }

    #[test]
    fn bucket_handle_round_trips_through_datastore() {
        let ds = Datastore::new_memory();
        ds.create_bucket(&Bucket::new("b1", "currentwindow", "aw-watcher-window", "host", Utc::now()))
            .unwrap();
        let handle = ds.bucket("b1");
        let inserted = handle.insert(&ev("2024-01-01T00:00:00Z", 5, "code")).unwrap();
        assert_eq!(handle.get_by_id(inserted.id.unwrap()).unwrap(), Some(inserted));
    }

    #[test]
    fn insert_events_chunks_large_batches() {
        let ds = Datastore::new_memory();
        ds.create_bucket(&Bucket::new("b1", "currentwindow", "aw-watcher-window", "host", Utc::now()))
            .unwrap();
        let events: Vec<Event> = (0..250)
            .map(|i| ev(&format!("2024-01-01T00:{:02}:{:02}Z", i / 60, i % 60), 1, "code"))
            .collect();
        ds.insert_events("b1", &events).unwrap();
        assert_eq!(ds.get_event_count("b1", None, None).unwrap(), 250);
    }
}
