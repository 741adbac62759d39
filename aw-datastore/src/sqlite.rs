//! Persistent, SQLCipher-encrypted SQLite storage backend.
//!
//! Grounded on `aw_datastore/storages/peewee.py::PeeweeStorage`, ported
//! away from peewee's ORM/raw-SQL mix onto plain `rusqlite` + a
//! `r2d2` connection pool, in the idiom the pack's `omgpointless-aspy`
//! uses for its own local SQLite store.
//!
//! `insert_one` itself coalesces: a non-AFK event lands on top of the
//! most recent event sharing `application_name` and `title` within the
//! pulsetime window rather than appending a new row, so a bucket fed by
//! a polling watcher doesn't grow one row per poll. The separate
//! `heartbeat` entry point performs its own, coarser (full-`data`-match)
//! coalescing against only the bucket's single most recent event. Both
//! read-modify-write paths run inside a single `IMMEDIATE` transaction
//! rather than relying on a `UNIQUE` index on
//! `(bucket_id, application_name, title, timestamp/pulsetime)`: such an
//! index would reject legitimate back-to-back heartbeats that land in
//! the same coalescing window but are not actually duplicates (e.g. two
//! distinct 0-duration heartbeats fired in the same second by a watcher
//! running at high frequency).

use std::path::Path;

use aw_models::{Application, ApplicationType, Bucket, Event};
use aw_transform::heartbeat_merge;
use chrono::{DateTime, TimeZone, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;

use crate::config::Config;
use crate::error::{DatastoreError, Result};
use crate::queries::{is_excluded_app, normalised_host, AppUsage, DashboardEvent};
use crate::schema::run_migrations;
use crate::storage::{MigrationOutcome, StorageInterface};

pub struct EncryptedStore {
    pool: Pool<SqliteConnectionManager>,
    config: Config,
}

/// Events with no `app` or no `title` are AFK/lock-screen noise and are
/// dropped at ingest rather than persisted, per the original's
/// `insert_one` behaviour.
fn is_afk_noise(event: &Event) -> bool {
    event.app().unwrap_or("").is_empty() || event.title().unwrap_or("").is_empty()
}

impl EncryptedStore {
    /// Open (creating if absent) a SQLCipher-encrypted database at
    /// `path`, keyed with `passphrase`, running schema migrations on the
    /// way in.
    pub fn open(path: &Path, passphrase: &str) -> Result<(Self, MigrationOutcome)> {
        Self::open_with_config(path, passphrase, Config::default())
    }

    /// As [`Self::open`], but with an explicit [`Config`] rather than
    /// its defaults — lets a caller that loaded a TOML config drive the
    /// heartbeat pulsetime and dashboard duration floor actually used
    /// by this store.
    pub fn open_with_config(path: &Path, passphrase: &str, config: Config) -> Result<(Self, MigrationOutcome)> {
        let passphrase = passphrase.to_string();
        let manager = SqliteConnectionManager::file(path).with_init(move |conn| {
            conn.pragma_update(None, "key", &passphrase)?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            Ok(())
        });
        let pool = Pool::new(manager).map_err(DatastoreError::Pool)?;
        let conn = pool.get()?;
        let outcome = run_migrations(&conn)?;
        drop(conn);
        Ok((EncryptedStore { pool, config }, outcome))
    }

    fn conn(&self) -> Result<r2d2::PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }
}

fn row_to_event(row: &Row<'_>) -> rusqlite::Result<Event> {
    let id: i64 = row.get("id")?;
    let timestamp: String = row.get("timestamp")?;
    let duration_secs: f64 = row.get("duration")?;
    let datastr: String = row.get("datastr")?;
    let server_sync_status: i64 = row.get("server_sync_status")?;

    let timestamp: DateTime<Utc> = timestamp
        .parse()
        .map_err(|_| rusqlite::Error::InvalidColumnType(0, "timestamp".into(), rusqlite::types::Type::Text))?;
    let data: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&datastr)
        .map_err(|_| rusqlite::Error::InvalidColumnType(0, "datastr".into(), rusqlite::types::Type::Text))?;

    Ok(Event {
        id: Some(id),
        timestamp,
        duration: chrono::Duration::milliseconds((duration_secs * 1000.0).round() as i64),
        data,
        server_sync_status,
    })
}

fn row_to_bucket(row: &Row<'_>) -> rusqlite::Result<Bucket> {
    let created: String = row.get("created")?;
    let created: DateTime<Utc> = created
        .parse()
        .map_err(|_| rusqlite::Error::InvalidColumnType(0, "created".into(), rusqlite::types::Type::Text))?;
    let datastr: String = row.get("datastr")?;
    let data: HashMap<String, serde_json::Value> = serde_json::from_str(&datastr).unwrap_or_default();
    Ok(Bucket {
        id: row.get("id")?,
        _type: row.get("type")?,
        client: row.get("client")?,
        hostname: row.get("hostname")?,
        created,
        name: row.get("name")?,
        data,
    })
}

impl StorageInterface for EncryptedStore {
    fn buckets(&self) -> Result<HashMap<String, Bucket>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT * FROM buckets")?;
        let rows = stmt.query_map([], row_to_bucket)?;
        let mut out = HashMap::new();
        for b in rows {
            let b = b?;
            out.insert(b.id.clone(), b);
        }
        Ok(out)
    }

    fn create_bucket(&self, bucket: &Bucket) -> Result<()> {
        let conn = self.conn()?;
        let datastr = serde_json::to_string(&bucket.data)?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO buckets (id, type, client, hostname, created, name, datastr) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                bucket.id,
                bucket._type,
                bucket.client,
                bucket.hostname,
                bucket.created.to_rfc3339(),
                bucket.name,
                datastr,
            ],
        )?;
        if inserted == 0 {
            return Err(DatastoreError::BucketAlreadyExists(bucket.id.clone()));
        }
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
        let conn = self.conn()?;
        let exists: bool = conn
            .query_row("SELECT 1 FROM buckets WHERE id = ?1", params![bucket_id], |_| Ok(true))
            .optional()?
            .unwrap_or(false);
        if !exists {
            return Err(DatastoreError::BucketNotFound(bucket_id.to_string()));
        }
        if let Some(t) = bucket_type {
            conn.execute("UPDATE buckets SET type = ?1 WHERE id = ?2", params![t, bucket_id])?;
        }
        if let Some(c) = client {
            conn.execute("UPDATE buckets SET client = ?1 WHERE id = ?2", params![c, bucket_id])?;
        }
        if let Some(h) = hostname {
            conn.execute("UPDATE buckets SET hostname = ?1 WHERE id = ?2", params![h, bucket_id])?;
        }
        if let Some(n) = name {
            conn.execute("UPDATE buckets SET name = ?1 WHERE id = ?2", params![n, bucket_id])?;
        }
        if let Some(d) = data {
            conn.execute(
                "UPDATE buckets SET datastr = ?1 WHERE id = ?2",
                params![serde_json::to_string(d)?, bucket_id],
            )?;
        }
        Ok(())
    }

    fn delete_bucket(&self, bucket_id: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM events WHERE bucket_id = ?1", params![bucket_id])?;
        let deleted = conn.execute("DELETE FROM buckets WHERE id = ?1", params![bucket_id])?;
        if deleted == 0 {
            return Err(DatastoreError::BucketNotFound(bucket_id.to_string()));
        }
        Ok(())
    }

    fn get_metadata(&self, bucket_id: &str) -> Result<Bucket> {
        let conn = self.conn()?;
        conn.query_row("SELECT * FROM buckets WHERE id = ?1", params![bucket_id], row_to_bucket)
            .optional()?
            .ok_or_else(|| DatastoreError::BucketNotFound(bucket_id.to_string()))
    }

    fn insert_one(&self, bucket_id: &str, event: &Event) -> Result<Event> {
        if is_afk_noise(event) {
            log::debug!("dropping event with empty app/title on ingest");
            return Ok(event.clone());
        }
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        let window_start = event.timestamp
            - chrono::Duration::milliseconds((self.config.heartbeat_pulsetime_secs * 1000.0).round() as i64);
        let existing: Option<Event> = tx
            .query_row(
                "SELECT * FROM events WHERE bucket_id = ?1 AND application_name = ?2 AND title = ?3
                 AND timestamp >= ?4 AND timestamp <= ?5
                 ORDER BY timestamp DESC LIMIT 1",
                params![
                    bucket_id,
                    event.application_name(),
                    event.title().unwrap_or(""),
                    window_start.to_rfc3339(),
                    event.timestamp.to_rfc3339(),
                ],
                row_to_event,
            )
            .optional()?;

        let result = match existing {
            Some(mut existing) => {
                let id = existing.id.unwrap();
                existing.duration = existing.duration + event.duration;
                existing.server_sync_status = 0;
                update_event(&tx, id, &existing)?;
                existing
            }
            None => insert_event(&tx, bucket_id, event)?,
        };
        upsert_application_from_event(&tx, event)?;
        tx.commit()?;
        Ok(result)
    }

    fn insert_many(&self, bucket_id: &str, events: &[Event]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for event in events {
            if is_afk_noise(event) {
                log::debug!("dropping event with empty app/title on ingest");
                continue;
            }
            insert_event(&tx, bucket_id, event)?;
            upsert_application_from_event(&tx, event)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn heartbeat(&self, bucket_id: &str, heartbeat: &Event, pulsetime: f64) -> Result<Event> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let last: Option<Event> = tx
            .query_row(
                "SELECT * FROM events WHERE bucket_id = ?1 ORDER BY timestamp DESC LIMIT 1",
                params![bucket_id],
                row_to_event,
            )
            .optional()?;

        let result = match last.as_ref().and_then(|last| heartbeat_merge(last, heartbeat, pulsetime)) {
            Some(merged) => {
                let id = last.unwrap().id.unwrap();
                update_event(&tx, id, &merged)?;
                let mut merged = merged;
                merged.id = Some(id);
                merged
            }
            None => insert_event(&tx, bucket_id, heartbeat)?,
        };
        upsert_application_from_event(&tx, heartbeat)?;
        tx.commit()?;
        Ok(result)
    }

    fn get_event(&self, bucket_id: &str, event_id: i64) -> Result<Option<Event>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                "SELECT * FROM events WHERE bucket_id = ?1 AND id = ?2",
                params![bucket_id, event_id],
                row_to_event,
            )
            .optional()?)
    }

    fn get_events(
        &self,
        bucket_id: &str,
        limit: Option<usize>,
        starttime: Option<DateTime<Utc>>,
        endtime: Option<DateTime<Utc>>,
    ) -> Result<Vec<Event>> {
        if limit == Some(0) {
            return Ok(Vec::new());
        }
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT * FROM events WHERE bucket_id = ?1 ORDER BY timestamp DESC")?;
        let rows = stmt.query_map(params![bucket_id], row_to_event)?;
        let mut events: Vec<Event> = Vec::new();
        for e in rows {
            events.push(e?);
        }

        if let Some(start) = starttime {
            events.retain(|e| e.end() > start);
        }
        if let Some(end) = endtime {
            let end_bound = aw_models::round_up_to_next_ms(end);
            events.retain(|e| e.timestamp < end_bound);
        }
        // Trim partial events that straddle the query boundary.
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
        let conn = self.conn()?;
        let mut sql = String::from("SELECT COUNT(*) FROM events WHERE bucket_id = ?1");
        if starttime.is_some() {
            sql.push_str(" AND timestamp >= ?2");
        }
        if endtime.is_some() {
            sql.push_str(if starttime.is_some() { " AND timestamp <= ?3" } else { " AND timestamp <= ?2" });
        }
        let count: i64 = match (starttime, endtime) {
            (Some(s), Some(e)) => conn.query_row(&sql, params![bucket_id, s.to_rfc3339(), e.to_rfc3339()], |r| r.get(0))?,
            (Some(s), None) => conn.query_row(&sql, params![bucket_id, s.to_rfc3339()], |r| r.get(0))?,
            (None, Some(e)) => conn.query_row(&sql, params![bucket_id, e.to_rfc3339()], |r| r.get(0))?,
            (None, None) => conn.query_row(&sql, params![bucket_id], |r| r.get(0))?,
        };
        Ok(count)
    }

    fn replace(&self, bucket_id: &str, event_id: i64, event: &Event) -> Result<Event> {
        let conn = self.conn()?;
        let exists: bool = conn
            .query_row("SELECT 1 FROM events WHERE bucket_id = ?1 AND id = ?2", params![bucket_id, event_id], |_| Ok(true))
            .optional()?
            .unwrap_or(false);
        if !exists {
            return Err(DatastoreError::EventNotFound(event_id));
        }
        update_event(&conn, event_id, event)?;
        let mut updated = event.clone();
        updated.id = Some(event_id);
        Ok(updated)
    }

    fn replace_last(&self, bucket_id: &str, event: &Event) -> Result<Event> {
        let conn = self.conn()?;
        let last_id: i64 = conn
            .query_row(
                "SELECT id FROM events WHERE bucket_id = ?1 ORDER BY timestamp DESC LIMIT 1",
                params![bucket_id],
                |r| r.get(0),
            )
            .optional()?
            .ok_or(DatastoreError::EventNotFound(-1))?;
        update_event(&conn, last_id, event)?;
        let mut updated = event.clone();
        updated.id = Some(last_id);
        Ok(updated)
    }

    fn delete(&self, bucket_id: &str, event_id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM events WHERE bucket_id = ?1 AND id = ?2",
            params![bucket_id, event_id],
        )?;
        Ok(deleted > 0)
    }

    fn get_most_used_apps(&self, starttime: DateTime<Utc>, endtime: DateTime<Utc>) -> Result<Vec<AppUsage>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT application_name, url, SUM(duration) as total
             FROM events
             WHERE timestamp >= ?1 AND timestamp <= ?2
               AND duration > ?3
               AND app NOT LIKE '%afk%'
               AND app NOT LIKE '%LockApp%'
               AND app NOT LIKE '%loginwindow%'
             GROUP BY application_name",
        )?;
        let rows = stmt.query_map(
            params![starttime.to_rfc3339(), endtime.to_rfc3339(), self.config.dashboard_duration_floor_secs],
            |row| {
                Ok(AppUsage {
                    app: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    url: row.get(1)?,
                    total_duration_secs: row.get(2)?,
                })
            },
        )?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    fn get_dashboard_events(&self, starttime: DateTime<Utc>, endtime: DateTime<Utc>) -> Result<Vec<DashboardEvent>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, bucket_id, timestamp, duration, title, datastr, app, url, application_name
             FROM events
             WHERE timestamp >= ?1 AND timestamp <= ?2
               AND duration > ?3",
        )?;
        let rows = stmt.query_map(params![starttime.to_rfc3339(), endtime.to_rfc3339(), self.config.dashboard_duration_floor_secs], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, Option<String>>(6)?,
                row.get::<_, Option<String>>(7)?,
                row.get::<_, String>(8)?,
            ))
        })?;

        let mut out = Vec::new();
        for r in rows {
            let (id, bucket_id, timestamp, duration, title, datastr, app, url, application_name) = r?;
            if let Some(app) = &app {
                if is_excluded_app(app) {
                    continue;
                }
            }
            let data: serde_json::Value = serde_json::from_str(&datastr)?;
            if data.get("status").and_then(|v| v.as_str()).map(|s| s.contains("not-afk")).unwrap_or(false) {
                continue;
            }
            let start: DateTime<Utc> = timestamp.parse().unwrap_or_else(|_| Utc.timestamp_opt(0, 0).unwrap());
            out.push(DashboardEvent {
                id,
                event_id: id,
                bucket_id,
                start,
                end: start + chrono::Duration::milliseconds((duration * 1000.0) as i64),
                timestamp: start,
                application_name,
                app,
                title,
                url,
                duration,
                data,
            });
        }
        out.sort_by_key(|e| e.start);
        Ok(out)
    }

    fn get_non_sync_events(&self) -> Result<Vec<DashboardEvent>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, bucket_id, timestamp, duration, title, datastr, app, url, application_name
             FROM events
             WHERE duration > ?1
               AND server_sync_status = 0
             ORDER BY timestamp ASC",
        )?;
        let rows = stmt.query_map(params![self.config.dashboard_duration_floor_secs], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, Option<String>>(6)?,
                row.get::<_, Option<String>>(7)?,
                row.get::<_, String>(8)?,
            ))
        })?;
        let mut out = Vec::new();
        for r in rows {
            let (id, bucket_id, timestamp, duration, title, datastr, app, url, application_name) = r?;
            if let Some(app) = &app {
                if is_excluded_app(app) {
                    continue;
                }
            }
            let data: serde_json::Value = serde_json::from_str(&datastr)?;
            if data.get("status").and_then(|v| v.as_str()).map(|s| s.contains("not-afk")).unwrap_or(false) {
                continue;
            }
            let start: DateTime<Utc> = timestamp.parse().unwrap_or_else(|_| Utc.timestamp_opt(0, 0).unwrap());
            out.push(DashboardEvent {
                id,
                event_id: id,
                bucket_id,
                start,
                end: start + chrono::Duration::milliseconds((duration * 1000.0) as i64),
                timestamp: start,
                application_name,
                app,
                title,
                url,
                duration,
                data,
            });
        }
        Ok(out)
    }

    fn update_server_sync_status(&self, ids: &[i64], new_status: i64) -> Result<()> {
        let conn = self.conn()?;
        let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!("UPDATE events SET server_sync_status = ? WHERE id IN ({placeholders})");
        let mut params_vec: Vec<&dyn rusqlite::ToSql> = vec![&new_status];
        for id in ids {
            params_vec.push(id);
        }
        conn.execute(&sql, params_vec.as_slice())?;
        Ok(())
    }

    fn save_settings(&self, code: &str, value: &serde_json::Value) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO settings (code, value) VALUES (?1, ?2)
             ON CONFLICT(code) DO UPDATE SET value = excluded.value",
            params![code, serde_json::to_string(value)?],
        )?;
        Ok(())
    }

    fn retrieve_settings(&self, code: &str) -> Result<Option<serde_json::Value>> {
        let conn = self.conn()?;
        let value: Option<String> = conn
            .query_row("SELECT value FROM settings WHERE code = ?1", params![code], |r| r.get(0))
            .optional()?;
        Ok(value.map(|v| serde_json::from_str(&v)).transpose()?)
    }

    fn save_application(&self, application: &Application) -> Result<Application> {
        let conn = self.conn()?;
        let key_column = if matches!(application.app_type, ApplicationType::WebApplication) {
            "url"
        } else {
            "name"
        };
        let key_value = application.upsert_key();
        let existing: Option<i64> = conn
            .query_row(
                &format!("SELECT id FROM applications WHERE {key_column} = ?1"),
                params![key_value],
                |r| r.get(0),
            )
            .optional()?;
        let now = Utc::now();
        let criteria = application.criteria.as_ref().map(serde_json::to_string).transpose()?;
        let id = match existing {
            Some(id) => {
                conn.execute(
                    "UPDATE applications SET type = ?1, alias = ?2, is_blocked = ?3, is_ignore_idle_time = ?4, color = ?5, criteria = ?6, updated_at = ?7 WHERE id = ?8",
                    params![
                        application.app_type.as_str(),
                        application.alias,
                        application.is_blocked,
                        application.is_ignore_idle_time,
                        application.color,
                        criteria,
                        now.to_rfc3339(),
                        id,
                    ],
                )?;
                id
            }
            None => {
                conn.execute(
                    "INSERT INTO applications (type, name, url, alias, is_blocked, is_ignore_idle_time, color, criteria, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
                    params![
                        application.app_type.as_str(),
                        application.name,
                        application.url,
                        application.alias,
                        application.is_blocked,
                        application.is_ignore_idle_time,
                        application.color,
                        criteria,
                        now.to_rfc3339(),
                    ],
                )?;
                conn.last_insert_rowid()
            }
        };
        conn.query_row("SELECT * FROM applications WHERE id = ?1", params![id], row_to_application)
            .map_err(DatastoreError::from)
    }

    fn get_applications(&self) -> Result<Vec<Application>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT * FROM applications")?;
        let rows = stmt.query_map([], row_to_application)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    fn delete_application(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM applications WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn is_blocked(&self, app: &str, url: Option<&str>) -> Result<bool> {
        let conn = self.conn()?;
        let blocked_by_name: bool = conn
            .query_row(
                "SELECT 1 FROM applications WHERE is_blocked = 1 AND name = ?1",
                params![app],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if blocked_by_name {
            return Ok(true);
        }
        let Some(host) = url.and_then(normalised_host) else {
            return Ok(false);
        };
        let mut stmt = conn.prepare("SELECT url FROM applications WHERE is_blocked = 1 AND url IS NOT NULL")?;
        let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
        for row in rows {
            if normalised_host(&row?).as_deref() == Some(host.as_str()) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn insert_event(conn: &Connection, bucket_id: &str, event: &Event) -> Result<Event> {
    let datastr = serde_json::to_string(&event.data)?;
    let duration_secs = event.duration.num_milliseconds() as f64 / 1000.0;
    conn.execute(
        "INSERT INTO events (bucket_id, timestamp, duration, datastr, app, title, url, application_name, server_sync_status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0)",
        params![
            bucket_id,
            event.timestamp.to_rfc3339(),
            duration_secs,
            datastr,
            event.app(),
            event.title(),
            event.url(),
            event.application_name(),
        ],
    )?;
    let id = conn.last_insert_rowid();
    let mut inserted = event.clone();
    inserted.id = Some(id);
    inserted.server_sync_status = 0;
    Ok(inserted)
}

fn update_event(conn: &Connection, id: i64, event: &Event) -> Result<()> {
    let datastr = serde_json::to_string(&event.data)?;
    let duration_secs = event.duration.num_milliseconds() as f64 / 1000.0;
    conn.execute(
        "UPDATE events SET timestamp = ?1, duration = ?2, datastr = ?3, app = ?4, title = ?5, url = ?6, application_name = ?7, server_sync_status = 0
         WHERE id = ?8",
        params![
            event.timestamp.to_rfc3339(),
            duration_secs,
            datastr,
            event.app(),
            event.title(),
            event.url(),
            event.application_name(),
            id,
        ],
    )?;
    Ok(())
}

/// Upsert an `applications` row from `event`'s `(app, url)` pair, per
/// spec.md §4.5. Falls back to an update on a unique-key collision
/// (the `IntegrityViolation` recovery path in §7) rather than
/// surfacing the conflict.
fn upsert_application_from_event(conn: &Connection, event: &Event) -> Result<()> {
    let (type_str, name, url): (&str, Option<&str>, Option<&str>) = match event.url() {
        Some(url) if !url.is_empty() => ("web application", None, Some(url)),
        _ => match event.app() {
            Some(app) if !app.is_empty() => ("application", Some(app), None),
            _ => return Ok(()),
        },
    };
    let now = Utc::now().to_rfc3339();
    let key_column = if url.is_some() { "url" } else { "name" };
    let key_value = url.or(name).unwrap();
    let existing: Option<i64> = conn
        .query_row(
            &format!("SELECT id FROM applications WHERE {key_column} = ?1"),
            params![key_value],
            |r| r.get(0),
        )
        .optional()?;
    match existing {
        Some(id) => {
            conn.execute("UPDATE applications SET updated_at = ?1 WHERE id = ?2", params![now, id])?;
        }
        None => {
            conn.execute(
                "INSERT INTO applications (type, name, url, is_blocked, is_ignore_idle_time, created_at, updated_at)
                 VALUES (?1, ?2, ?3, 0, 0, ?4, ?4)",
                params![type_str, name, url, now],
            )?;
        }
    }
    Ok(())
}

fn row_to_application(row: &Row<'_>) -> rusqlite::Result<Application> {
    let type_str: String = row.get("type")?;
    let app_type = ApplicationType::from_str(&type_str)
        .ok_or_else(|| rusqlite::Error::InvalidColumnType(0, "type".into(), rusqlite::types::Type::Text))?;
    let criteria: Option<String> = row.get("criteria")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    Ok(Application {
        id: Some(row.get("id")?),
        app_type,
        name: row.get("name")?,
        url: row.get("url")?,
        alias: row.get("alias")?,
        is_blocked: row.get("is_blocked")?,
        is_ignore_idle_time: row.get("is_ignore_idle_time")?,
        color: row.get("color")?,
        criteria: criteria.and_then(|c| serde_json::from_str(&c).ok()),
        created_at: created_at
            .parse()
            .map_err(|_| rusqlite::Error::InvalidColumnType(0, "created_at".into(), rusqlite::types::Type::Text))?,
        updated_at: updated_at
            .parse()
            .map_err(|_| rusqlite::Error::InvalidColumnType(0, "updated_at".into(), rusqlite::types::Type::Text))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aw_models::Bucket;
    use chrono::Duration;
    use serde_json::json;

    fn ev(ts: &str, secs: i64, app: &str, title: &str) -> Event {
        let serde_json::Value::Object(data) = json!({"app": app, "title": title}) else { unreachable!() };
        Event::new(ts.parse().unwrap(), Duration::seconds(secs), data).unwrap()
    }

    fn open_store() -> (tempfile::TempDir, EncryptedStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let (store, outcome) = EncryptedStore::open(&path, "correct horse battery staple").unwrap();
        assert!(outcome.changed);
        (dir, store)
    }

    #[test]
    fn reopening_an_existing_file_runs_no_further_migration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        EncryptedStore::open(&path, "pw").unwrap();
        let (_, outcome) = EncryptedStore::open(&path, "pw").unwrap();
        assert!(!outcome.changed);
    }

    #[test]
    fn insert_and_fetch_round_trips() {
        let (_dir, store) = open_store();
        store
            .create_bucket(&Bucket::new("b1", "currentwindow", "aw-watcher-window", "host", Utc::now()))
            .unwrap();
        let inserted = store.insert_one("b1", &ev("2024-01-01T00:00:00Z", 5, "code", "main.rs")).unwrap();
        let fetched = store.get_event("b1", inserted.id.unwrap()).unwrap().unwrap();
        assert!(fetched.data_eq(&inserted));
    }

    #[test]
    fn insert_one_drops_events_with_empty_app_or_title() {
        let (_dir, store) = open_store();
        store
            .create_bucket(&Bucket::new("b1", "afkwatcher", "aw-watcher-afk", "host", Utc::now()))
            .unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:00:00Z", 1, "", "")).unwrap();
        assert_eq!(store.get_eventcount("b1", None, None).unwrap(), 0);
    }

    #[test]
    fn insert_one_coalesces_matching_app_and_title_within_pulsetime() {
        let (_dir, store) = open_store();
        store
            .create_bucket(&Bucket::new("b1", "currentwindow", "aw-watcher-window", "host", Utc::now()))
            .unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:00:00Z", 5, "code", "main.rs")).unwrap();
        let merged = store
            .insert_one("b1", &ev("2024-01-01T00:00:30Z", 5, "code", "main.rs"))
            .unwrap();
        assert_eq!(merged.duration, Duration::seconds(10));
        assert_eq!(store.get_eventcount("b1", None, None).unwrap(), 1);
    }

    #[test]
    fn insert_one_does_not_coalesce_past_pulsetime_or_across_titles() {
        let (_dir, store) = open_store();
        store
            .create_bucket(&Bucket::new("b1", "currentwindow", "aw-watcher-window", "host", Utc::now()))
            .unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:00:00Z", 5, "code", "main.rs")).unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:02:00Z", 5, "code", "main.rs")).unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:02:05Z", 5, "code", "lib.rs")).unwrap();
        assert_eq!(store.get_eventcount("b1", None, None).unwrap(), 3);
    }

    #[test]
    fn heartbeat_coalesces_within_pulsetime_in_a_transaction() {
        let (_dir, store) = open_store();
        store
            .create_bucket(&Bucket::new("b1", "currentwindow", "aw-watcher-window", "host", Utc::now()))
            .unwrap();
        store.heartbeat("b1", &ev("2024-01-01T00:00:00Z", 5, "code", "main.rs"), 70.0).unwrap();
        let merged = store
            .heartbeat("b1", &ev("2024-01-01T00:00:30Z", 5, "code", "main.rs"), 70.0)
            .unwrap();
        assert_eq!(merged.duration, Duration::seconds(35));
        assert_eq!(store.get_eventcount("b1", None, None).unwrap(), 1);
    }

    #[test]
    fn most_used_apps_aggregates_across_events() {
        let (_dir, store) = open_store();
        store
            .create_bucket(&Bucket::new("b1", "currentwindow", "aw-watcher-window", "host", Utc::now()))
            .unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:00:00Z", 120, "firefox", "t")).unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:05:00Z", 60, "firefox", "t")).unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:10:00Z", 300, "afk", "afk")).unwrap();

        let start = "2024-01-01T00:00:00Z".parse().unwrap();
        let end = "2024-01-01T01:00:00Z".parse().unwrap();
        let apps = store.get_most_used_apps(start, end).unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].app, "firefox");
        assert_eq!(apps[0].total_duration_secs, 180.0);
    }

    #[test]
    fn insert_one_upserts_application_registry() {
        let (_dir, store) = open_store();
        store
            .create_bucket(&Bucket::new("b1", "currentwindow", "aw-watcher-window", "host", Utc::now()))
            .unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:00:00Z", 5, "code", "main.rs")).unwrap();
        let apps = store.get_applications().unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].name.as_deref(), Some("code"));
    }

    #[test]
    fn dashboard_events_excludes_afk_but_keeps_unsynced_status() {
        let (_dir, store) = open_store();
        store
            .create_bucket(&Bucket::new("b1", "currentwindow", "aw-watcher-window", "host", Utc::now()))
            .unwrap();
        let inserted = store.insert_one("b1", &ev("2024-01-01T00:00:00Z", 60, "code", "t")).unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:01:00Z", 60, "afk", "afk")).unwrap();
        store.update_server_sync_status(&[inserted.id.unwrap()], 1).unwrap();

        let start = "2024-01-01T00:00:00Z".parse().unwrap();
        let end = "2024-01-01T01:00:00Z".parse().unwrap();
        let events = store.get_dashboard_events(start, end).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].app.as_deref(), Some("code"));
    }

    #[test]
    fn non_sync_events_filters_on_sync_status() {
        let (_dir, store) = open_store();
        store
            .create_bucket(&Bucket::new("b1", "currentwindow", "aw-watcher-window", "host", Utc::now()))
            .unwrap();
        let synced = store.insert_one("b1", &ev("2024-01-01T00:00:00Z", 60, "code", "t")).unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:01:00Z", 60, "slack", "t")).unwrap();
        store.update_server_sync_status(&[synced.id.unwrap()], 1).unwrap();

        let pending = store.get_non_sync_events().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].app.as_deref(), Some("slack"));
    }

    #[test]
    fn is_blocked_matches_blocked_application_by_name() {
        let (_dir, store) = open_store();
        store
            .create_bucket(&Bucket::new("b1", "currentwindow", "aw-watcher-window", "host", Utc::now()))
            .unwrap();
        store.insert_one("b1", &ev("2024-01-01T00:00:00Z", 5, "steam", "t")).unwrap();
        let mut app = store.get_applications().unwrap().remove(0);
        app.is_blocked = true;
        store.save_application(&app).unwrap();
        assert!(store.is_blocked("steam", None).unwrap());
        assert!(!store.is_blocked("code", None).unwrap());
    }
}
