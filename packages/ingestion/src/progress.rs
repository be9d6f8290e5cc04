//! Progress tracking for ingestion runs.
//!
//! Records live in a [`TtlStore`] under `scrape_progress:{handle}` and expire
//! `ttl` after the last write. Every operation logs and swallows backend
//! errors: progress is advisory and must never fail a run.
//!
//! Updates are whole-record read-modify-write with no locking. Two runs for
//! the same handle interleave last-writer-wins; see [`ScanProgress::apply`].
//! A record is only re-created when the backend reports it absent. When the
//! read itself fails the update is skipped, so a live record is never
//! replaced by a fresh one.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::Result;
use crate::traits::store::TtlStore;
use crate::types::progress::{ProgressDetails, ProgressUpdate, ScanProgress, ScanStatus};

const KEY_PREFIX: &str = "scrape_progress";

/// Storage key for a handle's progress record.
pub fn progress_key(handle: &str) -> String {
    format!("{KEY_PREFIX}:{handle}")
}

/// Progress records over any TTL backend.
#[derive(Clone)]
pub struct ProgressStore {
    kv: Arc<dyn TtlStore>,
    ttl: Duration,
}

impl ProgressStore {
    pub fn new(kv: Arc<dyn TtlStore>, ttl: Duration) -> Self {
        Self { kv, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a fresh record, replacing whatever was stored for the handle.
    pub async fn init(&self, handle: &str) -> ScanProgress {
        let record = ScanProgress::starting(handle, Utc::now());
        self.save(&record).await;
        record
    }

    /// Merge `update` into the stored record, creating one if it is missing.
    pub async fn update(&self, handle: &str, update: ProgressUpdate) {
        let mut record = match self.read(handle).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(handle, "No progress record to update, initializing");
                self.init(handle).await
            }
            Err(e) => {
                warn!(handle, error = %e, "Failed to read progress, skipping update");
                return;
            }
        };
        record.apply(&update);
        self.save(&record).await;
    }

    /// Current record, or `None` if absent, expired or unreadable.
    pub async fn get(&self, handle: &str) -> Option<ScanProgress> {
        self.read(handle).await.unwrap_or_else(|e| {
            warn!(handle, error = %e, "Failed to read progress");
            None
        })
    }

    async fn read(&self, handle: &str) -> Result<Option<ScanProgress>> {
        match self.kv.get(&progress_key(handle)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Mark the run completed with final counters.
    pub async fn complete(&self, handle: &str, details: ProgressDetails) {
        self.update(
            handle,
            ProgressUpdate::stage(ScanStatus::Completed, 100, "Scan completed")
                .with_details(details)
                .with_eta(0),
        )
        .await;
    }

    /// Mark the run failed, keeping the last reported percent.
    pub async fn fail(&self, handle: &str, message: &str) {
        self.update(
            handle,
            ProgressUpdate {
                status: Some(ScanStatus::Failed),
                current_step: Some("Scan failed".to_string()),
                ..Default::default()
            }
            .with_error(message)
            .with_eta(0),
        )
        .await;
    }

    /// Evict the record before it expires.
    pub async fn delete(&self, handle: &str) {
        if let Err(e) = self.kv.delete(&progress_key(handle)).await {
            warn!(handle, error = %e, "Failed to delete progress");
        }
    }

    async fn save(&self, record: &ScanProgress) {
        let value = match serde_json::to_string(record) {
            Ok(value) => value,
            Err(e) => {
                warn!(handle = %record.username, error = %e, "Failed to serialize progress");
                return;
            }
        };
        if let Err(e) = self
            .kv
            .set_ex(&progress_key(&record.username), &value, self.ttl)
            .await
        {
            warn!(handle = %record.username, error = %e, "Failed to write progress");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use crate::error::IngestionError;
    use crate::stores::MemoryStore;
    use crate::testing::UnavailableTtlStore;

    /// Memory backend whose next `get` can be made to fail.
    #[derive(Default)]
    struct FlakyTtlStore {
        inner: MemoryStore,
        fail_next_get: AtomicBool,
    }

    #[async_trait]
    impl TtlStore for FlakyTtlStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            if self.fail_next_get.swap(false, Ordering::SeqCst) {
                return Err(IngestionError::storage("connection reset"));
            }
            self.inner.get(key).await
        }

        async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
            self.inner.set_ex(key, value, ttl).await
        }

        async fn delete(&self, key: &str) -> Result<()> {
            self.inner.delete(key).await
        }
    }

    fn store() -> ProgressStore {
        ProgressStore::new(Arc::new(MemoryStore::new()), Duration::from_secs(300))
    }

    #[test]
    fn key_format() {
        assert_eq!(progress_key("chef_dana"), "scrape_progress:chef_dana");
    }

    #[tokio::test]
    async fn init_then_get() {
        let progress = store();
        progress.init("chef_dana").await;

        let record = progress.get("chef_dana").await.unwrap();
        assert_eq!(record.status, ScanStatus::Starting);
        assert_eq!(record.progress, 0);
        assert_eq!(record.estimated_seconds_remaining, 120);
    }

    #[tokio::test]
    async fn update_self_heals_missing_record() {
        let progress = store();
        progress
            .update(
                "ghost",
                ProgressUpdate::stage(ScanStatus::ScrapingPosts, 10, "Fetching posts"),
            )
            .await;

        let record = progress.get("ghost").await.unwrap();
        assert_eq!(record.status, ScanStatus::ScrapingPosts);
        assert_eq!(record.progress, 10);
    }

    #[tokio::test]
    async fn fail_keeps_last_progress() {
        let progress = store();
        progress.init("chef_dana").await;
        progress
            .update(
                "chef_dana",
                ProgressUpdate::stage(ScanStatus::Analyzing, 40, "Analyzing"),
            )
            .await;
        progress.fail("chef_dana", "datastore offline").await;

        let record = progress.get("chef_dana").await.unwrap();
        assert_eq!(record.status, ScanStatus::Failed);
        assert_eq!(record.progress, 40);
        assert_eq!(record.error.as_deref(), Some("datastore offline"));
        assert_eq!(record.estimated_seconds_remaining, 0);
    }

    #[tokio::test]
    async fn failed_read_leaves_record_untouched() {
        let kv = Arc::new(FlakyTtlStore::default());
        let progress = ProgressStore::new(kv.clone(), Duration::from_secs(300));
        let started = progress.init("chef_dana").await;
        progress
            .update(
                "chef_dana",
                ProgressUpdate::stage(ScanStatus::Saving, 70, "Saving"),
            )
            .await;

        kv.fail_next_get.store(true, Ordering::SeqCst);
        progress.fail("chef_dana", "db down").await;

        let record = progress.get("chef_dana").await.unwrap();
        assert_eq!(record.status, ScanStatus::Saving);
        assert_eq!(record.progress, 70);
        assert_eq!(record.started_at, started.started_at);
        assert_eq!(record.run_id, started.run_id);

        progress.fail("chef_dana", "db down").await;
        let record = progress.get("chef_dana").await.unwrap();
        assert_eq!(record.status, ScanStatus::Failed);
        assert_eq!(record.progress, 70);
    }

    #[tokio::test]
    async fn unparseable_record_is_not_overwritten_by_update() {
        let kv = Arc::new(MemoryStore::new());
        let progress = ProgressStore::new(kv.clone(), Duration::from_secs(300));
        kv.set_ex(&progress_key("chef_dana"), "not json", Duration::from_secs(300))
            .await
            .unwrap();

        progress
            .update(
                "chef_dana",
                ProgressUpdate::stage(ScanStatus::ScrapingPosts, 10, "posts"),
            )
            .await;

        assert!(progress.get("chef_dana").await.is_none());
        assert_eq!(
            kv.get(&progress_key("chef_dana")).await.unwrap().as_deref(),
            Some("not json")
        );
    }

    #[tokio::test]
    async fn overlapping_runs_last_writer_wins() {
        let progress = store();
        let run_b = progress.init("chef_dana").await.run_id;

        // run A finishing after run B started
        progress.fail("chef_dana", "run A failed").await;

        progress
            .update(
                "chef_dana",
                ProgressUpdate::stage(ScanStatus::Analyzing, 40, "Analyzing").for_run(run_b),
            )
            .await;
        progress.complete("chef_dana", ProgressDetails::default()).await;

        let record = progress.get("chef_dana").await.unwrap();
        assert_eq!(record.status, ScanStatus::Completed);
        assert_eq!(record.progress, 100);
        assert!(record.error.is_none());
    }

    #[tokio::test]
    async fn complete_sets_full_progress() {
        let progress = store();
        progress.init("chef_dana").await;
        progress
            .complete(
                "chef_dana",
                ProgressDetails {
                    posts_scraped: Some(3),
                    ..Default::default()
                },
            )
            .await;

        let record = progress.get("chef_dana").await.unwrap();
        assert_eq!(record.status, ScanStatus::Completed);
        assert_eq!(record.progress, 100);
        assert_eq!(record.details.unwrap().posts_scraped, Some(3));
    }

    #[tokio::test]
    async fn init_resets_terminal_record() {
        let progress = store();
        progress.init("chef_dana").await;
        progress.complete("chef_dana", ProgressDetails::default()).await;
        progress.init("chef_dana").await;

        let record = progress.get("chef_dana").await.unwrap();
        assert_eq!(record.status, ScanStatus::Starting);
        assert_eq!(record.progress, 0);
    }

    #[tokio::test]
    async fn delete_evicts() {
        let progress = store();
        progress.init("chef_dana").await;
        progress.delete("chef_dana").await;
        assert!(progress.get("chef_dana").await.is_none());
    }

    #[tokio::test]
    async fn records_expire_after_ttl() {
        let progress = ProgressStore::new(Arc::new(MemoryStore::new()), Duration::from_millis(20));
        progress.init("chef_dana").await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(progress.get("chef_dana").await.is_none());
    }

    #[tokio::test]
    async fn unavailable_backend_is_swallowed() {
        let progress = ProgressStore::new(Arc::new(UnavailableTtlStore), Duration::from_secs(300));
        progress.init("chef_dana").await;
        progress
            .update(
                "chef_dana",
                ProgressUpdate::stage(ScanStatus::ScrapingPosts, 10, "posts"),
            )
            .await;
        progress.fail("chef_dana", "boom").await;
        progress.delete("chef_dana").await;
        assert!(progress.get("chef_dana").await.is_none());
    }
}
