use thiserror::Error;

/// `NotReady` is the only error a caller needs to branch on: both "no
/// identity yet" and "key present but undecryptable" collapse into it
/// per the original's `decrypt_uuid` try/except-returns-`None` policy.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credentials not ready: identity or local key is absent, or undecryptable")]
    NotReady,

    #[error("secret store error: {0}")]
    SecretStore(String),
}

pub type Result<T> = std::result::Result<T, CredentialError>;
