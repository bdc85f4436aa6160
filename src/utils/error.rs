//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while parsing a run record
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid record format: {0}")]
    InvalidFormat(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Failed to read record: {0}")]
    ReadFailed(#[from] std::io::Error),
}

/// Errors that can occur while folding calls into a tree
///
/// `build` logs these and skips the offending call; `build_with_options`
/// returns the first one.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BuildError {
    #[error("Call {index} has an empty stack")]
    EmptyStack { index: usize },

    #[error("Call {index} has a stack {depth} frames deep")]
    StackTooDeep { index: usize, depth: usize },

    #[error("Tree exceeds the node limit of {0}")]
    NodeLimitExceeded(usize),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
