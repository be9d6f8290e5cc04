//! Server dependencies
//!
//! Builds the production `Ingestion` from configuration: Apify for content,
//! OpenAI for completions, Postgres for entities and progress.

use std::sync::Arc;

use anyhow::{Context, Result};
use apify_client::ApifyClient;
use ingestion::{
    ApifyFetcher, Ingestion, IngestionConfig, OpenAICompletion, PostgresStore,
};
use openai_client::OpenAIClient;
use sqlx::PgPool;

use crate::config::Config;

/// Dependencies shared by every request handler
#[derive(Clone)]
pub struct ServerDeps {
    pub ingestion: Ingestion,
    /// Present in production; tests run without a database
    pub store: Option<PostgresStore>,
}

impl ServerDeps {
    /// Wrap an already-built pipeline (tests, alternative backends).
    pub fn new(ingestion: Ingestion) -> Self {
        Self {
            ingestion,
            store: None,
        }
    }

    /// Production wiring over an existing pool.
    pub async fn from_config(config: &Config, pool: PgPool) -> Result<Self> {
        let store = PostgresStore::from_pool(pool)
            .await
            .context("Failed to prepare ingestion schema")?;

        let ingestion_config = IngestionConfig::new()
            .with_progress_ttl(config.progress_ttl)
            .with_completion_model(config.openai_model.clone());

        let fetcher = ApifyFetcher::new(ApifyClient::new(config.apify_token.clone()));
        let completion = OpenAICompletion::from_config(
            OpenAIClient::new(config.openai_api_key.clone()),
            &ingestion_config,
        );
        let shared = Arc::new(store.clone());

        let ingestion = Ingestion::new(
            Arc::new(fetcher),
            Arc::new(completion),
            shared.clone(),
            shared,
            ingestion_config,
        );

        Ok(Self {
            ingestion,
            store: Some(store),
        })
    }
}
