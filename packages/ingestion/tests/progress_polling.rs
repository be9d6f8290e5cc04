//! Observing a run while it is in flight.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ingestion::testing::{sample_posts, MockCompletion};
use ingestion::{
    ContentFetcher, Creator, Ingestion, IngestionConfig, MemoryStore, Result, RunMode,
    ScanStatus, ScrapedItem,
};

/// Fetcher that takes a while, so polls land between stages.
struct SlowFetcher {
    delay: Duration,
}

#[async_trait]
impl ContentFetcher for SlowFetcher {
    async fn fetch_posts(&self, _handle: &str, _limit: u32) -> Result<Vec<ScrapedItem>> {
        tokio::time::sleep(self.delay).await;
        Ok(sample_posts("Dana Cohen", &["Use code DANA10", "Tnuva breakfast"]))
    }

    async fn fetch_reels(&self, _handle: &str, _limit: u32) -> Result<Vec<ScrapedItem>> {
        tokio::time::sleep(self.delay).await;
        Ok(vec![ScrapedItem::reel("Osem snack review")])
    }
}

fn ingestion(store: Arc<MemoryStore>) -> Ingestion {
    let completion = MockCompletion::new().with_response(
        "Analyze this Instagram content",
        r#"{"brands":["Tnuva","Osem"],"coupons":["DANA10"],"products":[]}"#,
    );
    Ingestion::new(
        Arc::new(SlowFetcher {
            delay: Duration::from_millis(40),
        }),
        Arc::new(completion),
        store.clone(),
        store,
        IngestionConfig::default(),
    )
}

#[tokio::test]
async fn polled_progress_never_decreases() {
    let store = Arc::new(MemoryStore::new().with_creator(Creator::new("chef_dana")));
    let ingestion = ingestion(store);

    let runner = ingestion.clone();
    let run = tokio::spawn(async move { runner.run("chef_dana", RunMode::Full).await });

    let mut observed = Vec::new();
    let mut statuses = Vec::new();
    loop {
        if let Some(record) = ingestion.progress("chef_dana").await {
            observed.push(record.progress);
            statuses.push(record.status);
            if record.status.is_terminal() {
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let outcome = run.await.unwrap();
    assert!(outcome.success);

    assert!(
        observed.windows(2).all(|pair| pair[0] <= pair[1]),
        "progress went backwards: {observed:?}"
    );
    assert_eq!(observed.last(), Some(&100));
    assert!(statuses.contains(&ScanStatus::ScrapingPosts));
    assert!(statuses.contains(&ScanStatus::ScrapingReels));
    assert_eq!(statuses.last(), Some(&ScanStatus::Completed));
}

#[tokio::test]
async fn stage_eta_is_reported_while_fetching() {
    let store = Arc::new(MemoryStore::new().with_creator(Creator::new("chef_dana")));
    let ingestion = ingestion(store);

    let runner = ingestion.clone();
    let run = tokio::spawn(async move { runner.run("chef_dana", RunMode::Rescan).await });

    tokio::time::sleep(Duration::from_millis(20)).await;
    let record = ingestion.progress("chef_dana").await.unwrap();
    assert_eq!(record.status, ScanStatus::ScrapingPosts);
    assert_eq!(record.estimated_seconds_remaining, 90);

    run.await.unwrap();
    let record = ingestion.progress("chef_dana").await.unwrap();
    assert_eq!(record.live_eta(chrono::Utc::now()), 0);
}
