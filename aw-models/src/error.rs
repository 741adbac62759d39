use thiserror::Error;

/// Errors raised while constructing or normalising model types.
///
/// These map onto the `DurationInvalid` and `DecodeError` members of the
/// error taxonomy; storage- and query-level errors are defined in their
/// own crates and may wrap this type via `#[from]`.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("duration must be non-negative, got {0:?}")]
    DurationInvalid(chrono::Duration),

    #[error("could not parse timestamp: {0}")]
    TimestampInvalid(String),

    #[error("application must have exactly one of name/url set (type: {0:?})")]
    ApplicationKeyInvalid(crate::application::ApplicationType),

    #[error("invalid json in {field}: {source}")]
    DecodeError {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
