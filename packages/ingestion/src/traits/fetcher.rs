//! Social content fetching.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::content::ScrapedItem;

/// Source of a creator's public content.
///
/// Each call triggers one scraping job and resolves once its result set is
/// ready. Implementations return at most `limit` items and persist nothing.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch feed posts for `handle`.
    async fn fetch_posts(&self, handle: &str, limit: u32) -> Result<Vec<ScrapedItem>>;

    /// Fetch short-form videos for `handle`.
    async fn fetch_reels(&self, handle: &str, limit: u32) -> Result<Vec<ScrapedItem>>;
}
