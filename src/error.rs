use thiserror::Error;

/// Main error type for codevo operations
#[derive(Error, Debug)]
pub enum CodevoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Commit lookup failed for {commit}: {message}")]
    CommitLookup { commit: String, message: String },

    #[error("Parser error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CodevoError>;
