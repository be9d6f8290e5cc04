use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Input for the apify/instagram-scraper actor in profile-posts mode.
#[derive(Debug, Clone, Serialize)]
pub struct InstagramPostsInput {
    #[serde(rename = "directUrls")]
    pub direct_urls: Vec<String>,
    #[serde(rename = "resultsType")]
    pub results_type: String,
    #[serde(rename = "resultsLimit")]
    pub results_limit: u32,
    #[serde(rename = "searchType")]
    pub search_type: String,
    #[serde(rename = "searchLimit")]
    pub search_limit: u32,
    #[serde(rename = "addParentData")]
    pub add_parent_data: bool,
}

impl InstagramPostsInput {
    pub fn for_profile(username: &str, limit: u32) -> Self {
        Self {
            direct_urls: vec![profile_url(username)],
            results_type: "posts".to_string(),
            results_limit: limit,
            search_type: "user".to_string(),
            search_limit: 1,
            add_parent_data: true,
        }
    }
}

/// Input for the apify/instagram-reel-scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct InstagramReelsInput {
    pub username: Vec<String>,
    #[serde(rename = "resultsLimit")]
    pub results_limit: u32,
}

/// Canonical profile URL for an Instagram username.
pub fn profile_url(username: &str) -> String {
    format!("https://www.instagram.com/{}/", username.trim_start_matches('@'))
}

/// A single Instagram post from the Apify dataset.
///
/// Profile fields (`followersCount`, `profilePicUrl`) are only present when
/// the run was started with `addParentData`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstagramPost {
    pub caption: Option<String>,
    #[serde(rename = "ownerUsername")]
    pub owner_username: Option<String>,
    #[serde(rename = "ownerFullName")]
    pub owner_full_name: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "shortCode")]
    pub short_code: Option<String>,
    #[serde(rename = "displayUrl")]
    pub display_url: Option<String>,
    #[serde(rename = "videoUrl")]
    pub video_url: Option<String>,
    #[serde(rename = "likesCount")]
    pub likes_count: Option<i64>,
    #[serde(rename = "commentsCount")]
    pub comments_count: Option<i64>,
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub post_type: Option<String>,
    #[serde(rename = "followersCount")]
    pub followers_count: Option<i64>,
    #[serde(rename = "profilePicUrl")]
    pub profile_pic_url: Option<String>,
}

/// A single Instagram reel from the Apify dataset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstagramReel {
    pub caption: Option<String>,
    #[serde(rename = "ownerUsername")]
    pub owner_username: Option<String>,
    #[serde(rename = "ownerFullName")]
    pub owner_full_name: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "shortCode")]
    pub short_code: Option<String>,
    #[serde(rename = "displayUrl")]
    pub display_url: Option<String>,
    #[serde(rename = "videoUrl")]
    pub video_url: Option<String>,
    #[serde(rename = "likesCount")]
    pub likes_count: Option<i64>,
    #[serde(rename = "commentsCount")]
    pub comments_count: Option<i64>,
    #[serde(rename = "videoViewCount")]
    pub video_view_count: Option<i64>,
    #[serde(rename = "videoPlayCount")]
    pub video_play_count: Option<i64>,
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "followersCount")]
    pub followers_count: Option<i64>,
    #[serde(rename = "profilePicUrl")]
    pub profile_pic_url: Option<String>,
}

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Apify actor run metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
}
