//! Crate-level error types

use thiserror::Error;

/// Errors produced by endurecer operations
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Shape mismatch: {0}")]
    Shape(String),
}

/// Result type for endurecer operations
pub type Result<T> = std::result::Result<T, Error>;
