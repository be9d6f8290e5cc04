//! Typed errors for the ingestion library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell
//! a missing creator from a dead datastore.

use thiserror::Error;

/// Errors that can occur while running an ingestion.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Scraping job failed or returned an unusable dataset
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// Completion service unavailable or failed
    #[error("completion service error: {0}")]
    Completion(String),

    /// Datastore or key-value store operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// No creator row exists for the handle
    #[error("creator not found: {handle}")]
    CreatorNotFound { handle: String },

    /// JSON (de)serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl IngestionError {
    /// Wrap any backend error as a storage failure.
    pub fn storage(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage(err.into())
    }
}

/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;
