//! Error types for snapshot persistence.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from key-value stores and the snapshot codec.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The root directory of a [`DiskKv`](crate::DiskKv) is unusable.
    #[error("invalid root path {path:?}: {source}")]
    RootPathInvalid {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A key that cannot be mapped onto the store.
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// Reading or writing a key failed.
    #[error("i/o error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A snapshot could not be encoded or decoded.
    #[error("snapshot codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Result alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistError>;
