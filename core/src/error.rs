use thiserror::Error;

use crate::source::SourceError;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Roster line {line}: {reason}")]
    Roster { line: usize, reason: String },

    #[error("Required source '{source_name}' failed: {reason}")]
    RequiredSource {
        source_name: &'static str,
        reason: SourceError,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Run '{0}' has already been executed by this engine")]
    RunAlreadyExecuted(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
