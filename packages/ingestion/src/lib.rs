//! Creator Content Ingestion
//!
//! Scrapes a creator's public posts and reels, extracts brand partnerships,
//! coupon codes and products with a completion model, stores them without
//! duplicates, and reports live progress while doing it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ingestion::{Ingestion, IngestionConfig, MemoryStore, RunMode};
//! use ingestion::testing::{MockCompletion, MockFetcher};
//!
//! let store = Arc::new(MemoryStore::new());
//! let ingestion = Ingestion::new(
//!     Arc::new(MockFetcher::new()),
//!     Arc::new(MockCompletion::new()),
//!     store.clone(),
//!     store,
//!     IngestionConfig::default(),
//! );
//!
//! let outcome = ingestion.run("chef_dana", RunMode::Full).await;
//! let progress = ingestion.progress("chef_dana").await;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Seams for fetching, completion and storage
//! - [`types`] - Progress records, scraped content, entities, rows
//! - [`progress`] - TTL-backed progress store
//! - [`pipeline`] - Extraction, persistence, persona and the orchestrator
//! - [`stores`] - Storage implementations (MemoryStore, PostgresStore)
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod pipeline;
pub mod progress;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

#[cfg(feature = "apify")]
pub mod fetchers;

// Re-export core types at crate root
pub use error::{IngestionError, Result};
pub use traits::{
    ai::CompletionClient,
    fetcher::ContentFetcher,
    store::{EntityStore, TtlStore},
};
pub use types::{
    config::IngestionConfig,
    content::{ContentKind, ItemBody, OwnerSnapshot, ScrapedItem},
    entities::ExtractedEntities,
    outcome::Outcome,
    progress::{
        calculate_eta, ProgressDetails, ProgressUpdate, ScanProgress, ScanStatus,
        DEFAULT_ETA_SECS,
    },
    records::{
        Coupon, Creator, CreatorProfileUpdate, Greeting, Partnership, Persona, PersonaRecord,
        Product,
    },
    stats::{IngestionOutcome, IngestionStats, ProfileSnapshot, RunMode},
};

pub use pipeline::{EntityExtractor, Ingestion, PersonaGenerator};
pub use progress::{progress_key, ProgressStore};

// Re-export stores
pub use stores::MemoryStore;

#[cfg(feature = "postgres")]
pub use stores::PostgresStore;

#[cfg(feature = "openai")]
pub use ai::OpenAICompletion;

#[cfg(feature = "apify")]
pub use fetchers::ApifyFetcher;

// Re-export testing utilities
pub use testing::{MockCompletion, MockFetcher, TestScenario};
