//! Error types for ground-truth loading, parsing and artifact storage.

use std::io;
use thiserror::Error;

/// How a failure surfaces to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    NotFound,
    BadInput,
    Internal,
}

impl ErrorClass {
    /// Process exit code used by the CLI.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorClass::NotFound => 2,
            ErrorClass::BadInput => 3,
            ErrorClass::Internal => 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum SplitCheckError {
    /// Referenced artifact does not exist.
    #[error("artifact not found: {0}")]
    NotFound(String),

    /// Artifact exists but is not well-formed ground-truth markup.
    #[error("malformed ground truth: {0}")]
    MalformedInput(String),

    /// Artifact exists but is not a ground-truth XML document.
    #[error("artifact is not ground-truth XML: {0}")]
    WrongKind(String),

    #[error("artifact too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: u64 },

    #[error("invalid artifact id: {0}")]
    InvalidId(String),

    #[error("input rejected: {0}")]
    Rejected(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SplitCheckError {
    pub fn class(&self) -> ErrorClass {
        match self {
            SplitCheckError::NotFound(_) => ErrorClass::NotFound,
            SplitCheckError::MalformedInput(_)
            | SplitCheckError::WrongKind(_)
            | SplitCheckError::TooLarge { .. }
            | SplitCheckError::InvalidId(_)
            | SplitCheckError::Rejected(_) => ErrorClass::BadInput,
            SplitCheckError::Io(_) | SplitCheckError::Json(_) => ErrorClass::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, SplitCheckError>;
