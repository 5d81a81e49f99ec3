//! Error types for state trees.

use thiserror::Error;

use crate::path::PathError;

/// Errors raised while navigating or converting a [`Value`](crate::Value).
#[derive(Debug, Error)]
pub enum Error {
    /// Path validation error.
    #[error("path error: {0}")]
    Path(#[from] PathError),

    /// A path could not be followed through the tree.
    #[error("invalid path: {message}")]
    InvalidPath { message: String },

    /// A value could not be decoded into the requested type.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// A value could not be encoded.
    #[error("encode error: {message}")]
    Encode { message: String },
}

impl Error {
    pub fn decode(message: impl Into<String>) -> Self {
        Error::Decode {
            message: message.into(),
        }
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Error::Encode {
            message: message.into(),
        }
    }
}

/// Result alias for state tree operations.
pub type Result<T> = std::result::Result<T, Error>;
