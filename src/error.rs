use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GfetchError {
    #[error("improper action '{0}' (expected 'search' or 'fetch')")]
    InvalidAction(String),

    #[error("invalid organism name: {0}")]
    InvalidName(String),

    #[error("invalid status filter: {0}")]
    InvalidStatus(String),

    #[error("failed to parse manifest: {0}")]
    ManifestParse(String),

    #[error("malformed record {taxonomy_id}: {reason}")]
    MalformedRecord { taxonomy_id: String, reason: String },

    #[error("transfer failed: {0}")]
    Transfer(String),

    #[error("remote returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("{failed} of {total} downloads failed")]
    PartialFetch { failed: usize, total: usize },
}
