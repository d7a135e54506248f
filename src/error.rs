//! Error types for host capabilities and configuration.
//!
//! Nothing here is ever surfaced to the reader of the page. Components log
//! these and carry on; the worst outcome is a missing enhancement.

use thiserror::Error;

/// Failure reported by a host capability (storage, DOM).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// Persistent storage is disabled, blocked, or missing.
    #[error("persistent storage is unavailable")]
    StorageUnavailable,
    /// Storage exists but refused the write (quota, privacy mode).
    #[error("storage write rejected: {0}")]
    StorageWrite(String),
    /// A DOM call failed or its anchor element is missing.
    #[error("dom operation failed: {0}")]
    Dom(String),
}

/// Failure while reading a [`crate::config::ThemeConfig`] override.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid theme config: {0}")]
    Parse(#[from] serde_json::Error),
}
