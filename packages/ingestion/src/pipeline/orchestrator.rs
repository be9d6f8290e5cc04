//! The ingestion run: fetch, extract, persist, report.
//!
//! | status          | percent | work                                   |
//! |-----------------|---------|----------------------------------------|
//! | starting        | 0       | init record, look up creator           |
//! | scraping_posts  | 10      | fetch posts (fatal on error)           |
//! | scraping_reels  | 30      | fetch reels (degrades to none)         |
//! | analyzing       | 40      | join captions, extract entities        |
//! | saving          | 70      | persist entities                       |
//! | saving          | 90      | persona + greeting (full runs only)    |
//! | completed       | 100     | profile refresh, final counters        |
//!
//! Any error is caught in [`Ingestion::run`], recorded with `fail`, and
//! returned as an unsuccessful [`IngestionOutcome`].

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{IngestionError, Result};
use crate::progress::ProgressStore;
use crate::traits::ai::CompletionClient;
use crate::traits::fetcher::ContentFetcher;
use crate::traits::store::{EntityStore, TtlStore};
use crate::types::config::IngestionConfig;
use crate::types::content::ScrapedItem;
use crate::types::outcome::Outcome;
use crate::types::progress::{ProgressDetails, ProgressUpdate, ScanProgress, ScanStatus};
use crate::types::records::{Creator, CreatorProfileUpdate};
use crate::types::stats::{IngestionOutcome, IngestionStats, ProfileSnapshot, RunMode};

use super::extract::{aggregate_captions, EntityExtractor};
use super::persist::persist_entities;
use super::persona::PersonaGenerator;

/// Runs ingestions for creators.
///
/// Cheap to clone; every dependency is shared.
#[derive(Clone)]
pub struct Ingestion {
    fetcher: Arc<dyn ContentFetcher>,
    store: Arc<dyn EntityStore>,
    progress: ProgressStore,
    extractor: EntityExtractor,
    persona: PersonaGenerator,
    config: IngestionConfig,
}

impl Ingestion {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        completion: Arc<dyn CompletionClient>,
        store: Arc<dyn EntityStore>,
        kv: Arc<dyn TtlStore>,
        config: IngestionConfig,
    ) -> Self {
        Self {
            fetcher,
            store,
            progress: ProgressStore::new(kv, config.progress_ttl),
            extractor: EntityExtractor::new(completion.clone()),
            persona: PersonaGenerator::new(completion, config.persona_caption_limit),
            config,
        }
    }

    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }

    pub fn progress_store(&self) -> &ProgressStore {
        &self.progress
    }

    /// Current progress for a handle.
    pub async fn progress(&self, handle: &str) -> Option<ScanProgress> {
        self.progress.get(handle).await
    }

    /// Run one ingestion to a terminal state. Never returns an error.
    pub async fn run(&self, handle: &str, mode: RunMode) -> IngestionOutcome {
        info!(handle, %mode, "Starting ingestion");
        let run = self.progress.init(handle).await.run_id;

        match self.execute(handle, mode, run).await {
            Ok(stats) => {
                self.progress.complete(handle, stats.to_details()).await;
                info!(
                    handle,
                    posts = stats.posts,
                    reels = stats.reels,
                    partnerships = stats.partnerships,
                    coupons = stats.coupons,
                    products = stats.products,
                    "Ingestion completed"
                );
                IngestionOutcome::succeeded(stats)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(handle, error = %message, "Ingestion failed");
                self.progress.fail(handle, &message).await;
                IngestionOutcome::failed(message)
            }
        }
    }

    async fn execute(&self, handle: &str, mode: RunMode, run: Option<Uuid>) -> Result<IngestionStats> {
        let creator = self
            .store
            .find_creator(handle)
            .await?
            .ok_or_else(|| IngestionError::CreatorNotFound {
                handle: handle.to_string(),
            })?;
        let posts_limit = creator.posts_limit.unwrap_or(self.config.default_posts_limit);
        let reels_limit = creator.reels_limit.unwrap_or(self.config.default_reels_limit);

        self.progress
            .update(
                handle,
                ProgressUpdate::stage(
                    ScanStatus::ScrapingPosts,
                    10,
                    format!("Fetching up to {posts_limit} posts..."),
                )
                .with_eta(90)
                .for_run(run),
            )
            .await;

        let posts = self.fetcher.fetch_posts(handle, posts_limit).await?;
        info!(handle, posts = posts.len(), "Posts fetched");

        self.progress
            .update(
                handle,
                ProgressUpdate::stage(
                    ScanStatus::ScrapingReels,
                    30,
                    format!("Fetched {} posts, fetching reels...", posts.len()),
                )
                .with_details(ProgressDetails {
                    posts_scraped: Some(count(&posts)),
                    ..Default::default()
                })
                .with_eta(60)
                .for_run(run),
            )
            .await;

        let reels = match self.fetch_reels(handle, reels_limit).await {
            Outcome::Ok(reels) => reels,
            Outcome::Degraded { partial, reason } => {
                warn!(handle, %reason, "Continuing with posts only");
                self.progress
                    .update(
                        handle,
                        ProgressUpdate {
                            run_id: run,
                            current_step: Some(
                                "Reels unavailable, continuing with posts only".to_string(),
                            ),
                            details: Some(ProgressDetails {
                                reels_scraped: Some(0),
                                ..Default::default()
                            }),
                            estimated_seconds_remaining: Some(45),
                            ..Default::default()
                        },
                    )
                    .await;
                partial
            }
        };

        self.progress
            .update(
                handle,
                ProgressUpdate::stage(
                    ScanStatus::Analyzing,
                    40,
                    format!("Analyzing {} items...", posts.len() + reels.len()),
                )
                .with_details(ProgressDetails {
                    reels_scraped: Some(count(&reels)),
                    ..Default::default()
                })
                .with_eta(60)
                .for_run(run),
            )
            .await;

        let captions = aggregate_captions(posts.iter().chain(reels.iter()), self.config.caption_budget);
        let entities = match self.extractor.extract(&captions).await {
            Outcome::Ok(entities) => entities,
            Outcome::Degraded { partial, reason } => {
                warn!(handle, %reason, "Entity extraction degraded, saving no entities");
                partial
            }
        };

        self.progress
            .update(
                handle,
                ProgressUpdate::stage(ScanStatus::Saving, 70, "Saving discovered entities...")
                    .with_details(ProgressDetails {
                        brands_found: Some(entities.brand_count()),
                        coupons_found: Some(entities.coupon_count()),
                        products_found: Some(entities.product_count()),
                        ..Default::default()
                    })
                    .with_eta(30)
                    .for_run(run),
            )
            .await;

        persist_entities(
            self.store.as_ref(),
            creator.id,
            &entities,
            &self.config.default_product_category,
        )
        .await?;

        let (persona_generated, greeting_generated) = if mode.generates_persona() {
            self.progress
                .update(
                    handle,
                    ProgressUpdate::stage(ScanStatus::Saving, 90, "Building chatbot persona...")
                        .with_eta(10)
                        .for_run(run),
                )
                .await;
            self.generate_persona(&creator, &posts).await?
        } else {
            info!(handle, "Rescan, skipping persona");
            (false, false)
        };

        let profile = profile_snapshot(&posts, &reels);
        self.store
            .update_creator_profile(
                creator.id,
                &CreatorProfileUpdate {
                    display_name: profile.name.clone(),
                    followers_count: profile.followers,
                    avatar_url: profile.avatar_url.clone(),
                    last_scanned_at: Utc::now(),
                },
            )
            .await?;

        Ok(IngestionStats {
            posts: count(&posts),
            reels: count(&reels),
            content: count(&posts) + count(&reels),
            partnerships: entities.brand_count(),
            coupons: entities.coupon_count(),
            products: entities.product_count(),
            profile,
            persona_generated,
            greeting_generated,
        })
    }

    async fn fetch_reels(&self, handle: &str, limit: u32) -> Outcome<Vec<ScrapedItem>> {
        match self.fetcher.fetch_reels(handle, limit).await {
            Ok(reels) => {
                info!(handle, reels = reels.len(), "Reels fetched");
                Outcome::Ok(reels)
            }
            Err(e) => Outcome::degraded(Vec::new(), e.to_string()),
        }
    }

    /// Generation failures are logged and reported as `false`; only store
    /// errors propagate.
    async fn generate_persona(&self, creator: &Creator, posts: &[ScrapedItem]) -> Result<(bool, bool)> {
        let persona_generated = match self.persona.generate_persona(posts).await {
            Ok(persona) => {
                self.store.upsert_persona(creator.id, &persona).await?;
                true
            }
            Err(e) => {
                warn!(handle = %creator.handle, error = %e, "Persona generation failed");
                false
            }
        };

        let greeting_generated = match self.persona.generate_greeting(&creator.handle, posts).await {
            Ok(greeting) => {
                self.store.update_greeting(creator.id, &greeting).await?;
                true
            }
            Err(e) => {
                warn!(handle = %creator.handle, error = %e, "Greeting generation failed");
                false
            }
        };

        Ok((persona_generated, greeting_generated))
    }
}

fn count(items: &[ScrapedItem]) -> u32 {
    u32::try_from(items.len()).unwrap_or(u32::MAX)
}

/// Profile fields from the first post that names its owner, else the first reel.
///
/// The avatar is the scraper's CDN URL as-is, not a re-hosted copy. Those
/// URLs are signed and expire, so a stored avatar can go stale until the
/// next scan refreshes it. Content without a picture leaves the stored
/// avatar untouched.
fn profile_snapshot(posts: &[ScrapedItem], reels: &[ScrapedItem]) -> ProfileSnapshot {
    let source = posts
        .first()
        .filter(|post| post.owner().full_name.is_some())
        .or_else(|| reels.first());

    match source {
        Some(item) => {
            let owner = item.owner();
            ProfileSnapshot {
                name: owner.full_name.clone(),
                followers: owner.followers_count,
                avatar_url: owner.profile_pic_url.clone(),
            }
        }
        None => ProfileSnapshot::default(),
    }
}
