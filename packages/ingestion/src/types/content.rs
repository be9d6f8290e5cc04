//! Scraped social content, normalized across content kinds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which scraping job produced an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Post,
    Reel,
}

/// Account fields the scraper attaches to each item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerSnapshot {
    pub full_name: Option<String>,
    pub followers_count: Option<i64>,
    pub profile_pic_url: Option<String>,
}

/// Fields shared by every content kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemBody {
    pub caption: Option<String>,
    pub likes_count: Option<i64>,
    pub comments_count: Option<i64>,
    /// Image or video URL
    pub media_url: Option<String>,
    pub permalink: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub owner: OwnerSnapshot,
}

impl ItemBody {
    pub fn with_caption(caption: impl Into<String>) -> Self {
        Self {
            caption: Some(caption.into()),
            ..Default::default()
        }
    }
}

/// One scraped item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScrapedItem {
    Post(ItemBody),
    Reel {
        #[serde(flatten)]
        body: ItemBody,
        view_count: Option<i64>,
    },
}

impl ScrapedItem {
    pub fn post(caption: impl Into<String>) -> Self {
        Self::Post(ItemBody::with_caption(caption))
    }

    pub fn reel(caption: impl Into<String>) -> Self {
        Self::Reel {
            body: ItemBody::with_caption(caption),
            view_count: None,
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Post(_) => ContentKind::Post,
            Self::Reel { .. } => ContentKind::Reel,
        }
    }

    pub fn body(&self) -> &ItemBody {
        match self {
            Self::Post(body) => body,
            Self::Reel { body, .. } => body,
        }
    }

    /// Caption text, `None` when absent or blank.
    pub fn caption(&self) -> Option<&str> {
        self.body()
            .caption
            .as_deref()
            .filter(|c| !c.trim().is_empty())
    }

    pub fn owner(&self) -> &OwnerSnapshot {
        &self.body().owner
    }

    pub fn with_owner(mut self, owner: OwnerSnapshot) -> Self {
        match &mut self {
            Self::Post(body) => body.owner = owner,
            Self::Reel { body, .. } => body.owner = owner,
        }
        self
    }
}
