//! Configuration for the ingestion pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for one `Ingestion` instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Maximum characters of joined caption text sent for extraction.
    ///
    /// Counted in Unicode scalar values. Default: 50,000.
    pub caption_budget: usize,

    /// Sliding expiry of progress records. Default: 300s.
    pub progress_ttl: Duration,

    /// Posts scraped when the creator has no override. Default: 50.
    pub default_posts_limit: u32,

    /// Reels scraped when the creator has no override. Default: 30.
    pub default_reels_limit: u32,

    /// Captions fed to the persona prompt. Default: 15.
    pub persona_caption_limit: usize,

    /// Model name passed to the completion adapter.
    pub completion_model: String,

    /// Sampling temperature for extraction calls.
    pub temperature: f32,

    /// Category assigned to discovered products.
    pub default_product_category: String,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            caption_budget: 50_000,
            progress_ttl: Duration::from_secs(300),
            default_posts_limit: 50,
            default_reels_limit: 30,
            persona_caption_limit: 15,
            completion_model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            default_product_category: "כללי".to_string(),
        }
    }
}

impl IngestionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_caption_budget(mut self, chars: usize) -> Self {
        self.caption_budget = chars;
        self
    }

    pub fn with_progress_ttl(mut self, ttl: Duration) -> Self {
        self.progress_ttl = ttl;
        self
    }

    /// Set the fallback scrape limits.
    pub fn with_default_limits(mut self, posts: u32, reels: u32) -> Self {
        self.default_posts_limit = posts;
        self.default_reels_limit = reels;
        self
    }

    pub fn with_persona_caption_limit(mut self, captions: usize) -> Self {
        self.persona_caption_limit = captions;
        self
    }

    pub fn with_completion_model(mut self, model: impl Into<String>) -> Self {
        self.completion_model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_product_category(mut self, category: impl Into<String>) -> Self {
        self.default_product_category = category.into();
        self
    }
}
