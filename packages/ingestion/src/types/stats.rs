//! Run mode and the statistics a run reports.

use serde::{Deserialize, Serialize};

use super::progress::ProgressDetails;

/// What a run covers, chosen once at entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Scrape, extract, persist and regenerate the persona.
    #[default]
    Full,
    /// Same as `Full` without the persona stage.
    Rescan,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Rescan => "rescan",
        }
    }

    pub fn generates_persona(&self) -> bool {
        matches!(self, Self::Full)
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile fields observed in the scraped content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    pub name: Option<String>,
    pub followers: Option<i64>,
    pub avatar_url: Option<String>,
}

/// Counters for one successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionStats {
    pub posts: u32,
    pub reels: u32,
    /// Posts plus reels
    pub content: u32,
    pub partnerships: u32,
    pub coupons: u32,
    pub products: u32,
    pub profile: ProfileSnapshot,
    pub persona_generated: bool,
    pub greeting_generated: bool,
}

impl IngestionStats {
    /// Counters mirrored into the terminal progress record.
    pub fn to_details(&self) -> ProgressDetails {
        ProgressDetails {
            posts_scraped: Some(self.posts),
            reels_scraped: Some(self.reels),
            brands_found: Some(self.partnerships),
            coupons_found: Some(self.coupons),
            products_found: Some(self.products),
        }
    }
}

/// What `Ingestion::run` returns. Never an error: failures land in `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<IngestionStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IngestionOutcome {
    pub fn succeeded(stats: IngestionStats) -> Self {
        Self {
            success: true,
            stats: Some(stats),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            stats: None,
            error: Some(error.into()),
        }
    }
}
