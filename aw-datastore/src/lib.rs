//! Event storage: an in-memory reference backend and a persistent,
//! SQLCipher-encrypted backend, unified behind [`StorageInterface`] and
//! exposed through the [`Datastore`] facade.

mod config;
mod datastore;
mod error;
mod memory;
mod queries;
mod schema;
mod sqlite;
mod storage;

pub use config::{Config, DB_VERSION};
pub use datastore::{BucketHandle, Datastore};
pub use error::{DatastoreError, Result};
pub use memory::MemoryStore;
pub use queries::{AppUsage, DashboardEvent, EXCLUDED_APPS, MIN_REPORTABLE_DURATION_SECS};
pub use schema::run_migrations;
pub use sqlite::EncryptedStore;
pub use storage::{MigrationOutcome, StorageInterface};
