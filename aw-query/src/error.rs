//! The query-layer error taxonomy (spec.md §7): `QueryTypeMismatch` and
//! `QueryBucketMissing` are distinct from the storage layer's
//! `BucketNotFound` because they are raised by argument validation in
//! the evaluator, before any storage call is made.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("unknown query function '{0}'")]
    UnknownFunction(String),

    #[error("'{function}' takes {expected} argument(s), got {actual}")]
    ArityMismatch {
        function: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("argument '{param}' to '{function}' is of invalid type: expected {expected}, got {actual}")]
    TypeMismatch {
        function: &'static str,
        param: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("there's no bucket named '{0}'")]
    BucketMissing(String),

    #[error("query namespace is missing required key '{0}'")]
    NamespaceMissing(&'static str),

    #[error("could not parse {field} as a timestamp: {value}")]
    TimestampInvalid { field: &'static str, value: String },

    #[error(transparent)]
    Datastore(#[from] aw_datastore::DatastoreError),

    #[error(transparent)]
    Transform(#[from] aw_transform::TransformError),
}

pub type Result<T> = std::result::Result<T, QueryError>;
