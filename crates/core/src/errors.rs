//! Core error types for the Tidewatch engine.
//!
//! Fetch failures never appear here: they are absorbed into per-series
//! `FAIL` statuses by the acquisition layer. What remains is configuration
//! validation and the write side of the cache boundary.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cache operation failed: {0}")]
    Cache(#[from] CacheError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),
}

/// Errors raised by key-value stores behind the cache.
///
/// Storage-specific errors (filesystem, serialization) are carried as
/// strings so the trait stays backend-agnostic.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The backend could not read a key.
    #[error("Failed to read cache key '{key}': {message}")]
    ReadFailed { key: String, message: String },

    /// The backend could not write a key.
    #[error("Failed to write cache key '{key}': {message}")]
    WriteFailed { key: String, message: String },

    /// A value could not be serialized for storage.
    #[error("Failed to serialize cache value: {0}")]
    Serialization(#[from] serde_json::Error),
}
