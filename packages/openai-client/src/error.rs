//! Error types for the OpenAI client.

use thiserror::Error;

/// Result type for OpenAI client operations.
pub type Result<T> = std::result::Result<T, OpenAIError>;

#[derive(Debug, Error)]
pub enum OpenAIError {
    /// Missing API key or invalid settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection failed or timed out before a response arrived
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response, or a 2xx response without usable content
    #[error("API error: {0}")]
    Api(String),

    /// Response body was not the expected JSON shape
    #[error("Parse error: {0}")]
    Parse(String),
}
