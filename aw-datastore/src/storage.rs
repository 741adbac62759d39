//! The storage backend contract. Grounded on
//! `aw_datastore/storages/abstract.py::AbstractStorage`, extended with
//! the heartbeat-coalescing, dashboard and sync-status operations that
//! live directly on `PeeweeStorage` in the original.

use std::collections::HashMap;

use aw_models::{Application, Bucket, Event};
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::queries::{AppUsage, DashboardEvent};

/// Outcome of an idempotent schema migration: whether any column or
/// table was actually added. Resolves the "does migration need a
/// meaningful return value" design question with an explicit struct
/// rather than a bare bool or unit, so callers can log/branch on intent
/// instead of truthiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MigrationOutcome {
    pub changed: bool,
}

/// A storage backend for buckets and events. Implemented by
/// [`crate::memory::MemoryStore`] (volatile, used in tests) and
/// [`crate::sqlite::EncryptedStore`] (persistent, SQLCipher-backed).
pub trait StorageInterface: Send + Sync {
    fn buckets(&self) -> Result<HashMap<String, Bucket>>;
    fn create_bucket(&self, bucket: &Bucket) -> Result<()>;
    fn update_bucket(
        &self,
        bucket_id: &str,
        bucket_type: Option<&str>,
        client: Option<&str>,
        hostname: Option<&str>,
        name: Option<&str>,
        data: Option<&serde_json::Value>,
    ) -> Result<()>;
    fn delete_bucket(&self, bucket_id: &str) -> Result<()>;
    fn get_metadata(&self, bucket_id: &str) -> Result<Bucket>;

    /// The ingest fast path: for a non-AFK event (both `app` and
    /// `title` non-empty) coalesces into the most recent event sharing
    /// `application_name` and `title` within the backend's heartbeat
    /// pulsetime window, rather than always appending a row. Events
    /// with an empty `app` or `title` are dropped rather than stored.
    ///
    /// Implementations serialise this read-modify-write internally
    /// ([`MemoryStore`](crate::memory::MemoryStore) holds its bucket
    /// mutex for the whole call; [`EncryptedStore`](crate::sqlite::EncryptedStore)
    /// wraps it in an `IMMEDIATE` transaction) — callers do not need an
    /// external lock.
    fn insert_one(&self, bucket_id: &str, event: &Event) -> Result<Event>;

    /// Inserts `events` verbatim (AFK-noise dropped, no coalescing) —
    /// the bulk-import path used by `insert_many`/batched sync, where
    /// coalescing against history already recorded elsewhere would be
    /// surprising.
    fn insert_many(&self, bucket_id: &str, events: &[Event]) -> Result<()>;

    /// Insert-or-merge `heartbeat` per the heartbeat coalescing rules:
    /// merged into the last event in the bucket if `data` matches and
    /// the gap is within `pulsetime` seconds. A second, explicit
    /// coalescing entry point alongside `insert_one`'s own fast path —
    /// matching on full `data` equality against only the bucket's
    /// single most recent event, the coarser rule a dedicated
    /// heartbeat-submission route needs.
    fn heartbeat(&self, bucket_id: &str, heartbeat: &Event, pulsetime: f64) -> Result<Event>;

    fn get_event(&self, bucket_id: &str, event_id: i64) -> Result<Option<Event>>;
    fn get_events(
        &self,
        bucket_id: &str,
        limit: Option<usize>,
        starttime: Option<DateTime<Utc>>,
        endtime: Option<DateTime<Utc>>,
    ) -> Result<Vec<Event>>;
    fn get_eventcount(
        &self,
        bucket_id: &str,
        starttime: Option<DateTime<Utc>>,
        endtime: Option<DateTime<Utc>>,
    ) -> Result<i64>;

    fn replace(&self, bucket_id: &str, event_id: i64, event: &Event) -> Result<Event>;
    fn replace_last(&self, bucket_id: &str, event: &Event) -> Result<Event>;
    fn delete(&self, bucket_id: &str, event_id: i64) -> Result<bool>;

    fn get_most_used_apps(&self, starttime: DateTime<Utc>, endtime: DateTime<Utc>) -> Result<Vec<AppUsage>>;
    fn get_dashboard_events(&self, starttime: DateTime<Utc>, endtime: DateTime<Utc>) -> Result<Vec<DashboardEvent>>;
    fn get_non_sync_events(&self) -> Result<Vec<DashboardEvent>>;
    fn update_server_sync_status(&self, ids: &[i64], new_status: i64) -> Result<()>;

    fn save_settings(&self, code: &str, value: &serde_json::Value) -> Result<()>;
    fn retrieve_settings(&self, code: &str) -> Result<Option<serde_json::Value>>;

    /// Upsert `application` by its [`Application::upsert_key`]. On a
    /// unique-key collision with an existing row, falls back to
    /// updating that row (the `IntegrityViolation` recovery path from
    /// the error taxonomy) rather than surfacing the conflict.
    fn save_application(&self, application: &Application) -> Result<Application>;
    fn get_applications(&self) -> Result<Vec<Application>>;
    fn delete_application(&self, id: i64) -> Result<bool>;

    /// Whether `app`/`url` match a blocked [`Application`] row: `app`
    /// equals the `name` of a blocked desktop application, or the
    /// normalised host of `url` equals the normalised host of a
    /// blocked web application's url.
    fn is_blocked(&self, app: &str, url: Option<&str>) -> Result<bool>;
}
