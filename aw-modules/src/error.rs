use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("no module named '{0}'")]
    UnknownModule(String),

    #[error("module '{0}' failed to start: {1}")]
    StartFailed(String, String),

    #[error("module '{0}' failed to stop: {1}")]
    StopFailed(String, String),
}

pub type Result<T> = std::result::Result<T, ModuleError>;
