//! Periodic maintenance tasks.

use std::time::Duration;

use ingestion::PostgresStore;
use tokio::task::JoinHandle;

/// Delete expired progress rows every `every`.
///
/// Expired rows are already invisible to readers; this only reclaims space.
pub fn start_progress_purge(store: PostgresStore, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            match store.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!(removed, "Purged expired progress records"),
                Err(e) => tracing::error!("Progress purge failed: {}", e),
            }
        }
    })
}
