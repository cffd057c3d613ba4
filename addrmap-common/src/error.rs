//! Common error types for addrmap

use thiserror::Error;

/// Common result type for addrmap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the addrmap crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Record store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Record store errors
///
/// `Corrupt` means the persisted value exists but is not a valid record
/// collection. Callers may treat it as an empty collection for display, but
/// must never overwrite it as part of an append.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Stored data is corrupt: {0}")]
    Corrupt(String),

    #[error("Failed to read stored data: {0}")]
    ReadFailure(String),

    #[error("Failed to write stored data: {0}")]
    WriteFailure(String),
}
