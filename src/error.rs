//! Error type shared by the storage and backend layers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A feed child could not be turned into a message.
    #[error("malformed message {key}: {reason}")]
    Decode { key: String, reason: String },

    /// The picked file cannot be uploaded (no file name, not a file, ...).
    #[error("cannot upload {}: {reason}", .path.display())]
    InvalidUpload { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, ChatError>;
