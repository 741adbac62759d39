use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("invalid regex: {0}")]
    InvalidRegex(String),
}

pub type Result<T> = std::result::Result<T, TransformError>;
