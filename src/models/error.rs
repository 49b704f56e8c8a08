//! Error types for syngram.
//!
//! Grouped by origin: bad input the user can fix, IO failures from the
//! environment, and internal invariant violations.

use thiserror::Error;

/// Top-level error type for syngram.
#[derive(Debug, Error)]
pub enum SyngramError {
    #[error("Configuration error: {0}")]
    Config(#[from] super::ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Parse error in {path} at offset {offset}: {message}")]
    TreeParse {
        path: String,
        offset: usize,
        message: String,
    },

    #[error("Empty corpus: {0}")]
    EmptyCorpus(String),

    #[error("Vector length mismatch: {left} vs {right}")]
    VectorLength { left: usize, right: usize },

    #[error("Token not in vocabulary: {0:?}")]
    UnknownToken(String),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SyngramError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a tree parse error.
    pub fn tree_parse(path: impl Into<String>, offset: usize, message: impl Into<String>) -> Self {
        Self::TreeParse {
            path: path.into(),
            offset,
            message: message.into(),
        }
    }
}

/// Result type alias for syngram.
pub type Result<T> = std::result::Result<T, SyngramError>;
