use thiserror::Error;

/// Storage-layer error taxonomy. Mirrors the `BucketNotFound` / `DbError` /
/// `DbVersionMismatch` cases from the design's error taxonomy.
#[derive(Debug, Error)]
pub enum DatastoreError {
    #[error("no bucket named '{0}'")]
    BucketNotFound(String),

    #[error("bucket '{0}' already exists")]
    BucketAlreadyExists(String),

    #[error("no event with id {0}")]
    EventNotFound(i64),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("invalid event data: {0}")]
    Model(#[from] aw_models::ModelError),

    #[error("could not (de)serialise event data: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DatastoreError>;
