//! Pure Apify REST API client.
//!
//! A minimal client for the Apify platform API. Supports starting actor runs,
//! polling for completion, and fetching dataset results.
//!
//! # Example
//!
//! ```rust,ignore
//! use apify_client::ApifyClient;
//!
//! let client = ApifyClient::new("your-api-token".into());
//!
//! let posts = client.scrape_instagram_posts("chef_dana", 50).await?;
//! let reels = client.scrape_instagram_reels("chef_dana", 30).await?;
//! ```

pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{
    InstagramPost, InstagramPostsInput, InstagramReel, InstagramReelsInput, RunData,
};

use serde::de::DeserializeOwned;
use serde::Serialize;
use types::ApiResponse;

const BASE_URL: &str = "https://api.apify.com/v2";

/// apify/instagram-scraper, in `username~actor` path form.
const INSTAGRAM_SCRAPER: &str = "apify~instagram-scraper";

/// apify/instagram-reel-scraper.
const INSTAGRAM_REEL_SCRAPER: &str = "apify~instagram-reel-scraper";

#[derive(Clone)]
pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API root (proxies, test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Decode an `ApiResponse` envelope or a bare JSON body, mapping non-2xx to `Api`.
    async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            return Err(ApifyError::Api {
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }
        Ok(resp.json().await?)
    }

    /// Start an actor run. Returns immediately with run metadata.
    pub async fn start_actor_run<I: Serialize + ?Sized>(
        &self,
        actor_id: &str,
        input: &I,
    ) -> Result<RunData> {
        let resp = self
            .client
            .post(format!("{}/acts/{}/runs", self.base_url, actor_id))
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;

        let envelope: ApiResponse<RunData> = Self::read_json(resp).await?;
        Ok(envelope.data)
    }

    /// Long-poll (`waitForFinish=60`) until the run leaves the running states.
    pub async fn wait_for_run(&self, run_id: &str) -> Result<RunData> {
        let url = format!("{}/actor-runs/{}?waitForFinish=60", self.base_url, run_id);
        loop {
            let resp = self.client.get(&url).bearer_auth(&self.token).send().await?;
            let run = Self::read_json::<ApiResponse<RunData>>(resp).await?.data;

            match run.status.as_str() {
                "SUCCEEDED" => return Ok(run),
                "FAILED" | "ABORTED" | "TIMED-OUT" => return Err(ApifyError::RunFailed(run.status)),
                other => tracing::debug!(run_id, status = other, "Run still in progress"),
            }
        }
    }

    /// Fetch at most `limit` items from a dataset.
    pub async fn get_dataset_items<T: DeserializeOwned>(
        &self,
        dataset_id: &str,
        limit: usize,
    ) -> Result<Vec<T>> {
        let resp = self
            .client
            .get(format!("{}/datasets/{}/items", self.base_url, dataset_id))
            .query(&[("format", "json".to_string()), ("limit", limit.to_string())])
            .bearer_auth(&self.token)
            .send()
            .await?;

        let mut items: Vec<T> = Self::read_json(resp).await?;
        // The limit query is advisory for some actors
        items.truncate(limit);
        Ok(items)
    }

    /// Start a run, wait for it, and read up to `limit` results.
    pub async fn run_actor<I, T>(&self, actor_id: &str, input: &I, limit: usize) -> Result<Vec<T>>
    where
        I: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let run = self.start_actor_run(actor_id, input).await?;
        tracing::info!(run_id = %run.id, actor_id, "Actor run started");

        let finished = self.wait_for_run(&run.id).await?;
        tracing::debug!(run_id = %finished.id, dataset_id = %finished.default_dataset_id, "Actor run finished");

        self.get_dataset_items(&finished.default_dataset_id, limit).await
    }

    /// Scrape Instagram profile posts end-to-end.
    pub async fn scrape_instagram_posts(
        &self,
        username: &str,
        limit: u32,
    ) -> Result<Vec<InstagramPost>> {
        tracing::info!(username, limit, "Starting Instagram posts scrape");

        let input = InstagramPostsInput::for_profile(username, limit);
        let posts: Vec<InstagramPost> = self
            .run_actor(INSTAGRAM_SCRAPER, &input, limit as usize)
            .await?;
        tracing::info!(count = posts.len(), "Fetched Instagram posts");

        Ok(posts)
    }

    /// Scrape Instagram profile reels end-to-end.
    pub async fn scrape_instagram_reels(
        &self,
        username: &str,
        limit: u32,
    ) -> Result<Vec<InstagramReel>> {
        tracing::info!(username, limit, "Starting Instagram reels scrape");

        let input = InstagramReelsInput {
            username: vec![username.trim_start_matches('@').to_string()],
            results_limit: limit,
        };
        let reels: Vec<InstagramReel> = self
            .run_actor(INSTAGRAM_REEL_SCRAPER, &input, limit as usize)
            .await?;
        tracing::info!(count = reels.len(), "Fetched Instagram reels");

        Ok(reels)
    }
}
