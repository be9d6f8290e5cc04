//! Completion service abstraction.
//!
//! The pipeline only needs prompt-in, text-out. Prompt construction and
//! response validation live in [`crate::pipeline`], so adapters stay thin.

use async_trait::async_trait;

use crate::error::Result;

/// A text completion service.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one prompt and return the raw response text.
    ///
    /// The caller asks for JSON in the prompt; adapters that support a
    /// JSON response mode should enable it.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
