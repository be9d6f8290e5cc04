//! `CompletionClient` over the OpenAI chat-completions client.
//!
//! # Example
//!
//! ```rust,ignore
//! use ingestion::ai::OpenAICompletion;
//! use openai_client::OpenAIClient;
//!
//! let completion = OpenAICompletion::new(OpenAIClient::from_env()?).with_model("gpt-4o-mini");
//! ```

use async_trait::async_trait;
use openai_client::{ChatRequest, Message, OpenAIClient};
use tracing::debug;

use crate::error::{IngestionError, Result};
use crate::traits::ai::CompletionClient;
use crate::types::config::IngestionConfig;

const SYSTEM_PROMPT: &str =
    "You extract structured data from social media content. Respond with a single JSON object and nothing else.";

/// JSON-mode chat completions.
#[derive(Clone)]
pub struct OpenAICompletion {
    client: OpenAIClient,
    model: String,
    temperature: f32,
}

impl OpenAICompletion {
    pub fn new(client: OpenAIClient) -> Self {
        let defaults = IngestionConfig::default();
        Self {
            client,
            model: defaults.completion_model,
            temperature: defaults.temperature,
        }
    }

    /// Model and temperature from an ingestion config.
    pub fn from_config(client: OpenAIClient, config: &IngestionConfig) -> Self {
        Self {
            client,
            model: config.completion_model.clone(),
            temperature: config.temperature,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionClient for OpenAICompletion {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest::new(&self.model)
            .message(Message::system(SYSTEM_PROMPT))
            .message(Message::user(prompt))
            .temperature(self.temperature)
            .json_mode();

        let response = self
            .client
            .chat_completion(request)
            .await
            .map_err(|e| IngestionError::Completion(e.to_string()))?;

        if let Some(usage) = &response.usage {
            debug!(
                model = %self.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Completion finished"
            );
        }
        Ok(response.content)
    }
}
