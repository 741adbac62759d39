//! Schema creation and additive, idempotent migration.
//!
//! Grounded on `aw_datastore/storages/peewee.py::auto_migrate`, which
//! introspects `PRAGMA table_info` and adds any column the running
//! version expects but an older database file lacks. We follow the same
//! column-presence-check shape rather than a numbered migration chain,
//! since there is only ever one schema version to migrate towards.

use rusqlite::Connection;

use crate::error::Result;
use crate::storage::MigrationOutcome;

const CREATE_BUCKETS: &str = "
    CREATE TABLE IF NOT EXISTS buckets (
        id TEXT PRIMARY KEY,
        type TEXT NOT NULL,
        client TEXT NOT NULL,
        hostname TEXT NOT NULL,
        created TEXT NOT NULL,
        name TEXT,
        datastr TEXT NOT NULL DEFAULT '{}'
    )";

const CREATE_EVENTS: &str = "
    CREATE TABLE IF NOT EXISTS events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        bucket_id TEXT NOT NULL REFERENCES buckets(id),
        timestamp TEXT NOT NULL,
        duration REAL NOT NULL,
        datastr TEXT NOT NULL,
        app TEXT,
        title TEXT,
        url TEXT,
        application_name TEXT,
        server_sync_status INTEGER NOT NULL DEFAULT 0
    )";

const CREATE_EVENTS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS events_bucket_timestamp ON events(bucket_id, timestamp)";

const CREATE_SETTINGS: &str = "
    CREATE TABLE IF NOT EXISTS settings (
        code TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )";

const CREATE_APPLICATIONS: &str = "
    CREATE TABLE IF NOT EXISTS applications (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        type TEXT NOT NULL,
        name TEXT UNIQUE,
        url TEXT UNIQUE,
        alias TEXT,
        is_blocked INTEGER NOT NULL DEFAULT 0,
        is_ignore_idle_time INTEGER NOT NULL DEFAULT 0,
        color TEXT,
        criteria TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )";

/// Columns that may be missing from a database file created by an
/// earlier version of this schema, and the `ALTER TABLE` fragment to
/// add them.
const ADDITIVE_COLUMNS: &[(&str, &str, &str)] = &[
    ("events", "server_sync_status", "INTEGER NOT NULL DEFAULT 0"),
    ("events", "application_name", "TEXT"),
];

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Create the schema if absent, then add any columns a prior schema
/// version is missing. Safe to call on every startup.
pub fn run_migrations(conn: &Connection) -> Result<MigrationOutcome> {
    let mut changed = false;

    let bucket_table_existed = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name='buckets'")?
        .exists([])?;
    let applications_table_existed = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name='applications'")?
        .exists([])?;

    conn.execute(CREATE_BUCKETS, [])?;
    conn.execute(CREATE_EVENTS, [])?;
    conn.execute(CREATE_EVENTS_INDEX, [])?;
    conn.execute(CREATE_SETTINGS, [])?;
    conn.execute(CREATE_APPLICATIONS, [])?;

    if !bucket_table_existed || !applications_table_existed {
        changed = true;
    }

    for (table, column, definition) in ADDITIVE_COLUMNS {
        if !has_column(conn, table, column)? {
            conn.execute(&format!("ALTER TABLE {table} ADD COLUMN {column} {definition}"), [])?;
            changed = true;
        }
    }

    Ok(MigrationOutcome { changed })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_run_reports_changed() {
        let conn = Connection::open_in_memory().unwrap();
        let outcome = run_migrations(&conn).unwrap();
        assert!(outcome.changed);
    }

    #[test]
    fn second_run_is_a_no_op() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let outcome = run_migrations(&conn).unwrap();
        assert!(!outcome.changed);
    }
}
