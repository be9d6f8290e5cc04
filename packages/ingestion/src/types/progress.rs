//! Progress record for one ingestion run.
//!
//! The serialized shape (camelCase) is what polling clients receive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ETA reported before any stage has run.
pub const DEFAULT_ETA_SECS: u32 = 120;

/// Closed set of run states.
///
/// Non-terminal states advance in declaration order. `Completed` and
/// `Failed` are reachable from any non-terminal state. A terminal record no
/// longer belongs to a live run, so the next writer may move it anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Starting,
    ScrapingPosts,
    ScrapingReels,
    Analyzing,
    Saving,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::ScrapingPosts => "scraping_posts",
            Self::ScrapingReels => "scraping_reels",
            Self::Analyzing => "analyzing",
            Self::Saving => "saving",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Starting => 0,
            Self::ScrapingPosts => 1,
            Self::ScrapingReels => 2,
            Self::Analyzing => 3,
            Self::Saving => 4,
            Self::Completed | Self::Failed => 5,
        }
    }

    /// Whether a run's record in `self` may move to `next`.
    ///
    /// Staying in the same non-terminal state is allowed (the saving stage
    /// reports twice).
    pub fn can_transition_to(&self, next: ScanStatus) -> bool {
        self.is_terminal() || next.is_terminal() || next.rank() >= self.rank()
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured counters shown alongside the step text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts_scraped: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reels_scraped: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brands_found: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupons_found: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products_found: Option<u32>,
}

impl ProgressDetails {
    /// Overlay every counter that `other` sets.
    pub fn merge(&mut self, other: &ProgressDetails) {
        if other.posts_scraped.is_some() {
            self.posts_scraped = other.posts_scraped;
        }
        if other.reels_scraped.is_some() {
            self.reels_scraped = other.reels_scraped;
        }
        if other.brands_found.is_some() {
            self.brands_found = other.brands_found;
        }
        if other.coupons_found.is_some() {
            self.coupons_found = other.coupons_found;
        }
        if other.products_found.is_some() {
            self.products_found = other.products_found;
        }
    }
}

/// The progress record stored per handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanProgress {
    pub username: String,
    /// Run that last wrote the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
    pub status: ScanStatus,
    pub progress: u8,
    pub current_step: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ProgressDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(rename = "estimatedTimeRemaining")]
    pub estimated_seconds_remaining: u32,
}

impl ScanProgress {
    /// Fresh record in the `starting` state.
    pub fn starting(username: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            username: username.into(),
            run_id: Some(Uuid::now_v7()),
            status: ScanStatus::Starting,
            progress: 0,
            current_step: "Initializing scan...".to_string(),
            details: None,
            error: None,
            started_at: now,
            estimated_seconds_remaining: DEFAULT_ETA_SECS,
        }
    }

    /// Apply a partial update.
    ///
    /// Within one run (same `run_id`, or an untagged update) progress never
    /// moves backwards and backwards status moves are dropped. A write tagged
    /// with another run wins outright: overlapping runs on one handle are
    /// last-writer-wins. A terminal record accepts any next status.
    pub fn apply(&mut self, update: &ProgressUpdate) {
        let same_run = match update.run_id {
            Some(run_id) => self.run_id == Some(run_id),
            None => true,
        };
        let owned = same_run && !self.status.is_terminal();

        if let Some(status) = update.status {
            if owned && !self.status.can_transition_to(status) {
                tracing::debug!(
                    username = %self.username,
                    from = %self.status,
                    to = %status,
                    "Ignoring backwards progress status"
                );
                return;
            }
            if status != ScanStatus::Failed {
                self.error = None;
            }
            self.status = status;
        }
        if !same_run {
            self.run_id = update.run_id;
        }
        if let Some(progress) = update.progress {
            let progress = progress.min(100);
            self.progress = if owned {
                progress.max(self.progress)
            } else {
                progress
            };
        }
        if let Some(step) = &update.current_step {
            self.current_step = step.clone();
        }
        if let Some(details) = &update.details {
            self.details
                .get_or_insert_with(ProgressDetails::default)
                .merge(details);
        }
        if let Some(error) = &update.error {
            self.error = Some(error.clone());
        }
        if let Some(eta) = update.estimated_seconds_remaining {
            self.estimated_seconds_remaining = eta;
        }
    }

    /// ETA derived from elapsed time, or the stored value once terminal.
    pub fn live_eta(&self, now: DateTime<Utc>) -> u32 {
        if self.status.is_terminal() {
            return self.estimated_seconds_remaining;
        }
        calculate_eta(self.started_at, self.progress, now)
    }
}

/// Partial record merged into the stored one by `ProgressStore::update`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressUpdate {
    /// Writing run; `None` merges as the record's own run.
    pub run_id: Option<Uuid>,
    pub status: Option<ScanStatus>,
    pub progress: Option<u8>,
    pub current_step: Option<String>,
    pub details: Option<ProgressDetails>,
    pub error: Option<String>,
    pub estimated_seconds_remaining: Option<u32>,
}

impl ProgressUpdate {
    /// Stage transition: status, percent and step text together.
    pub fn stage(status: ScanStatus, progress: u8, step: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            progress: Some(progress),
            current_step: Some(step.into()),
            ..Default::default()
        }
    }

    pub fn for_run(mut self, run_id: Option<Uuid>) -> Self {
        self.run_id = run_id;
        self
    }

    pub fn with_details(mut self, details: ProgressDetails) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_eta(mut self, seconds: u32) -> Self {
        self.estimated_seconds_remaining = Some(seconds);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Estimate seconds remaining from elapsed time and percent complete.
pub fn calculate_eta(started_at: DateTime<Utc>, progress: u8, now: DateTime<Utc>) -> u32 {
    if progress == 0 {
        return DEFAULT_ETA_SECS;
    }
    if progress >= 100 {
        return 0;
    }

    let elapsed = (now - started_at).num_milliseconds().max(0) as f64 / 1000.0;
    let estimated_total = elapsed / f64::from(progress) * 100.0;
    let remaining = (estimated_total - elapsed).max(0.0);

    remaining.round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record() -> ScanProgress {
        ScanProgress::starting("chef_dana", Utc::now())
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&ScanStatus::ScrapingReels).unwrap();
        assert_eq!(json, "\"scraping_reels\"");
    }

    #[test]
    fn record_uses_camel_case_wire_names() {
        let value = serde_json::to_value(record()).unwrap();
        assert_eq!(value["status"], "starting");
        assert_eq!(value["currentStep"], "Initializing scan...");
        assert_eq!(value["estimatedTimeRemaining"], DEFAULT_ETA_SECS);
        assert!(value.get("details").is_none());
        assert!(value.get("error").is_none());
    }

    #[test]
    fn terminal_reachable_from_any_non_terminal_state() {
        for status in [
            ScanStatus::Starting,
            ScanStatus::ScrapingPosts,
            ScanStatus::ScrapingReels,
            ScanStatus::Analyzing,
            ScanStatus::Saving,
        ] {
            assert!(status.can_transition_to(ScanStatus::Failed));
            assert!(status.can_transition_to(ScanStatus::Completed));
        }
        assert!(!ScanStatus::Saving.can_transition_to(ScanStatus::ScrapingPosts));
        assert!(ScanStatus::Failed.can_transition_to(ScanStatus::Analyzing));
    }

    #[test]
    fn apply_never_lowers_progress() {
        let mut progress = record();
        progress.apply(&ProgressUpdate::stage(ScanStatus::Analyzing, 40, "analyzing"));
        progress.apply(&ProgressUpdate {
            progress: Some(10),
            ..Default::default()
        });
        assert_eq!(progress.progress, 40);
    }

    #[test]
    fn apply_drops_backwards_status() {
        let mut progress = record();
        progress.apply(&ProgressUpdate::stage(ScanStatus::Saving, 70, "saving"));
        progress.apply(&ProgressUpdate::stage(ScanStatus::ScrapingPosts, 10, "posts"));

        assert_eq!(progress.status, ScanStatus::Saving);
        assert_eq!(progress.current_step, "saving");
    }

    #[test]
    fn later_run_overrides_finished_record() {
        let mut progress = record();
        let run = progress.run_id;
        progress.apply(&ProgressUpdate {
            status: Some(ScanStatus::Failed),
            ..Default::default()
        }
        .with_error("earlier run failed"));

        progress.apply(&ProgressUpdate::stage(ScanStatus::Analyzing, 40, "analyzing").for_run(run));
        assert_eq!(progress.status, ScanStatus::Analyzing);
        assert_eq!(progress.progress, 40);
        assert!(progress.error.is_none());

        progress.apply(&ProgressUpdate::stage(ScanStatus::Completed, 100, "done").for_run(run));
        assert_eq!(progress.status, ScanStatus::Completed);
        assert_eq!(progress.progress, 100);
    }

    #[test]
    fn other_run_write_is_last_writer_wins() {
        let mut progress = record();
        let current = progress.run_id;
        progress.apply(&ProgressUpdate::stage(ScanStatus::Saving, 70, "saving").for_run(current));

        let other = Some(Uuid::now_v7());
        progress.apply(&ProgressUpdate::stage(ScanStatus::ScrapingPosts, 10, "posts").for_run(other));

        assert_eq!(progress.status, ScanStatus::ScrapingPosts);
        assert_eq!(progress.progress, 10);
        assert_eq!(progress.run_id, other);
    }

    #[test]
    fn apply_merges_details_field_by_field() {
        let mut progress = record();
        progress.apply(&ProgressUpdate::default().with_details(ProgressDetails {
            posts_scraped: Some(3),
            ..Default::default()
        }));
        progress.apply(&ProgressUpdate::default().with_details(ProgressDetails {
            reels_scraped: Some(2),
            ..Default::default()
        }));

        let details = progress.details.unwrap();
        assert_eq!(details.posts_scraped, Some(3));
        assert_eq!(details.reels_scraped, Some(2));
    }

    #[test]
    fn eta_defaults_and_bounds() {
        let now = Utc::now();
        assert_eq!(calculate_eta(now, 0, now), DEFAULT_ETA_SECS);
        assert_eq!(calculate_eta(now, 100, now), 0);
    }

    #[test]
    fn eta_scales_with_elapsed_time() {
        let now = Utc::now();
        let started = now - Duration::seconds(30);
        // 30s for 25% -> 120s total -> 90s left
        assert_eq!(calculate_eta(started, 25, now), 90);
    }
}
