use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Snapshot has no time axis (start_time or end_time missing)")]
    NoTimeAxis,

    #[error("Task not found: {id}")]
    TaskNotFound { id: crate::core::TaskId },

    #[error("Dependency cycle detected at task: {task}")]
    CycleDetected { task: crate::core::TaskId },
}

pub type Result<T> = std::result::Result<T, Error>;
