//! Persisted rows the pipeline reads and writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discovery tag for rows found by caption analysis.
pub const DISCOVERED_VIA_AI: &str = "ai_analysis";

/// Status given to new and refreshed partnership/coupon rows.
pub const STATUS_ACTIVE: &str = "active";

/// A creator account, looked up by handle at the start of every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub id: Uuid,
    pub handle: String,
    pub display_name: Option<String>,
    pub followers_count: Option<i64>,
    pub avatar_url: Option<String>,
    /// Per-creator override of how many posts to scrape
    pub posts_limit: Option<u32>,
    /// Per-creator override of how many reels to scrape
    pub reels_limit: Option<u32>,
    pub last_scanned_at: Option<DateTime<Utc>>,
}

impl Creator {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            handle: handle.into(),
            display_name: None,
            followers_count: None,
            avatar_url: None,
            posts_limit: None,
            reels_limit: None,
            last_scanned_at: None,
        }
    }

    pub fn with_limits(mut self, posts: u32, reels: u32) -> Self {
        self.posts_limit = Some(posts);
        self.reels_limit = Some(reels);
        self
    }
}

/// Profile fields refreshed at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatorProfileUpdate {
    pub display_name: Option<String>,
    pub followers_count: Option<i64>,
    pub avatar_url: Option<String>,
    pub last_scanned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partnership {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub brand_name: String,
    pub status: String,
    pub discovered_via: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Partnership {
    /// A new AI-discovered, active partnership.
    pub fn discovered(creator_id: Uuid, brand_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            creator_id,
            brand_name: brand_name.into(),
            status: STATUS_ACTIVE.to_string(),
            discovered_via: Some(DISCOVERED_VIA_AI.to_string()),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub code: String,
    pub status: String,
    pub discovered_via: Option<String>,
    /// Free-form fields owned by humans; the pipeline never writes them
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub name: String,
    pub category: String,
    /// `false` for rows the pipeline discovered, `true` for rows a human entered
    pub is_manual: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn discovered(creator_id: Uuid, name: impl Into<String>, category: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            creator_id,
            name: name.into(),
            category: category.to_string(),
            is_manual: false,
            created_at: Utc::now(),
        }
    }
}

/// Chatbot persona derived from a creator's posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub tone: String,
    pub style: String,
    pub emoji_style: String,
    pub response_length: String,
    pub topics: Vec<String>,
}

/// Greeting message and suggested opening questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Greeting {
    pub greeting: String,
    pub questions: Vec<String>,
}

/// Stored persona row (persona and greeting live together).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaRecord {
    pub creator_id: Uuid,
    pub persona: Persona,
    pub greeting: Option<Greeting>,
    pub updated_at: DateTime<Utc>,
}
