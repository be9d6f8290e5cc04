//! Testing utilities including mock implementations.
//!
//! These let applications exercise the pipeline without scraping jobs,
//! completion calls or a database.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{IngestionError, Result};
use crate::pipeline::Ingestion;
use crate::stores::MemoryStore;
use crate::traits::{
    ai::CompletionClient,
    fetcher::ContentFetcher,
    store::{EntityStore, TtlStore},
};
use crate::types::{
    config::IngestionConfig,
    content::{OwnerSnapshot, ScrapedItem},
    records::{Creator, CreatorProfileUpdate, Greeting, Partnership, Persona, Product},
};

/// Record of a call made to the mock fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFetcherCall {
    Posts { handle: String, limit: u32 },
    Reels { handle: String, limit: u32 },
}

/// A mock content fetcher serving canned items per handle.
#[derive(Default)]
pub struct MockFetcher {
    posts: HashMap<String, Vec<ScrapedItem>>,
    reels: HashMap<String, Vec<ScrapedItem>>,
    fail_posts: bool,
    fail_reels: bool,
    calls: Arc<RwLock<Vec<MockFetcherCall>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve these posts for `handle`.
    pub fn with_posts(mut self, handle: &str, posts: Vec<ScrapedItem>) -> Self {
        self.posts.insert(handle.to_string(), posts);
        self
    }

    /// Serve these reels for `handle`.
    pub fn with_reels(mut self, handle: &str, reels: Vec<ScrapedItem>) -> Self {
        self.reels.insert(handle.to_string(), reels);
        self
    }

    /// Make every post fetch fail.
    pub fn fail_posts(mut self) -> Self {
        self.fail_posts = true;
        self
    }

    /// Make every reel fetch fail.
    pub fn fail_reels(mut self) -> Self {
        self.fail_reels = true;
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockFetcherCall> {
        self.calls.read().unwrap().clone()
    }

    fn serve(
        &self,
        items: &HashMap<String, Vec<ScrapedItem>>,
        handle: &str,
        limit: u32,
    ) -> Vec<ScrapedItem> {
        items
            .get(handle)
            .map(|items| items.iter().take(limit as usize).cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn fetch_posts(&self, handle: &str, limit: u32) -> Result<Vec<ScrapedItem>> {
        self.calls.write().unwrap().push(MockFetcherCall::Posts {
            handle: handle.to_string(),
            limit,
        });
        if self.fail_posts {
            return Err(IngestionError::Fetch(format!(
                "posts for {handle}: actor run FAILED"
            )));
        }
        Ok(self.serve(&self.posts, handle, limit))
    }

    async fn fetch_reels(&self, handle: &str, limit: u32) -> Result<Vec<ScrapedItem>> {
        self.calls.write().unwrap().push(MockFetcherCall::Reels {
            handle: handle.to_string(),
            limit,
        });
        if self.fail_reels {
            return Err(IngestionError::Fetch(format!(
                "reels for {handle}: actor run TIMED-OUT"
            )));
        }
        Ok(self.serve(&self.reels, handle, limit))
    }
}

/// A mock completion service.
///
/// Responses are keyed by a substring of the prompt; the first matching key
/// wins. Unmatched prompts get the default response (`{}`).
pub struct MockCompletion {
    responses: Vec<(String, String)>,
    default_response: String,
    fail: bool,
    calls: Arc<RwLock<Vec<String>>>,
}

impl Default for MockCompletion {
    fn default() -> Self {
        Self {
            responses: Vec::new(),
            default_response: "{}".to_string(),
            fail: false,
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl MockCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer prompts containing `prompt_contains` with `response`.
    pub fn with_response(
        mut self,
        prompt_contains: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.responses
            .push((prompt_contains.into(), response.into()));
        self
    }

    pub fn with_default_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    /// Make every call fail.
    pub fn fail_completions(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Prompts received, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Number of prompts containing `needle`.
    pub fn calls_containing(&self, needle: &str) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|p| p.contains(needle))
            .count()
    }
}

#[async_trait]
impl CompletionClient for MockCompletion {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.calls.write().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(IngestionError::Completion("mock completion failure".into()));
        }
        Ok(self
            .responses
            .iter()
            .find(|(key, _)| prompt.contains(key.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.default_response.clone()))
    }
}

/// A TTL store whose every operation fails, as if the server were down.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableTtlStore;

fn unavailable() -> IngestionError {
    IngestionError::storage("connection refused")
}

#[async_trait]
impl TtlStore for UnavailableTtlStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(unavailable())
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
        Err(unavailable())
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Err(unavailable())
    }
}

/// Entity store that reads through to a `MemoryStore` and rejects writes.
pub struct FailingEntityStore {
    inner: Arc<MemoryStore>,
}

impl FailingEntityStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self { inner }
    }
}

fn write_rejected() -> IngestionError {
    IngestionError::storage("database is read-only")
}

#[async_trait]
impl EntityStore for FailingEntityStore {
    async fn find_creator(&self, handle: &str) -> Result<Option<Creator>> {
        self.inner.find_creator(handle).await
    }

    async fn find_partnership(
        &self,
        creator_id: Uuid,
        brand_name: &str,
    ) -> Result<Option<Partnership>> {
        self.inner.find_partnership(creator_id, brand_name).await
    }

    async fn insert_partnership(&self, _partnership: &Partnership) -> Result<bool> {
        Err(write_rejected())
    }

    async fn upsert_coupon(&self, _creator_id: Uuid, _code: &str) -> Result<()> {
        Err(write_rejected())
    }

    async fn upsert_products(&self, _products: &[Product]) -> Result<usize> {
        Err(write_rejected())
    }

    async fn upsert_persona(&self, _creator_id: Uuid, _persona: &Persona) -> Result<()> {
        Err(write_rejected())
    }

    async fn update_greeting(&self, _creator_id: Uuid, _greeting: &Greeting) -> Result<()> {
        Err(write_rejected())
    }

    async fn update_creator_profile(
        &self,
        _creator_id: Uuid,
        _update: &CreatorProfileUpdate,
    ) -> Result<()> {
        Err(write_rejected())
    }
}

/// Posts whose owner fields look like a real scrape.
pub fn sample_posts(full_name: &str, captions: &[&str]) -> Vec<ScrapedItem> {
    captions
        .iter()
        .map(|caption| {
            ScrapedItem::post(*caption).with_owner(OwnerSnapshot {
                full_name: Some(full_name.to_string()),
                followers_count: Some(48_000),
                profile_pic_url: Some("https://cdn.example.com/avatar.jpg".to_string()),
            })
        })
        .collect()
}

/// Everything a scenario wires together.
pub struct ScenarioHarness {
    pub ingestion: Ingestion,
    pub store: Arc<MemoryStore>,
    pub fetcher: Arc<MockFetcher>,
    pub completion: Arc<MockCompletion>,
    pub creator: Creator,
}

/// Builder for a creator with canned content and completion responses.
pub struct TestScenario {
    creator: Creator,
    fetcher: MockFetcher,
    completion: MockCompletion,
    config: IngestionConfig,
    ttl_store: Option<Arc<dyn TtlStore>>,
}

impl TestScenario {
    /// A scenario for a creator that exists in the store.
    pub fn new(handle: &str) -> Self {
        Self {
            creator: Creator::new(handle),
            fetcher: MockFetcher::new(),
            completion: MockCompletion::new(),
            config: IngestionConfig::default(),
            ttl_store: None,
        }
    }

    pub fn with_posts(mut self, posts: Vec<ScrapedItem>) -> Self {
        self.fetcher = self.fetcher.with_posts(&self.creator.handle, posts);
        self
    }

    pub fn with_reels(mut self, reels: Vec<ScrapedItem>) -> Self {
        self.fetcher = self.fetcher.with_reels(&self.creator.handle, reels);
        self
    }

    /// Raw completion text returned for the entity prompt.
    pub fn with_entity_response(mut self, response: &str) -> Self {
        self.completion = self
            .completion
            .with_response("Analyze this Instagram content", response);
        self
    }

    pub fn with_persona_response(mut self, response: &str) -> Self {
        self.completion = self
            .completion
            .with_response("Analyze the writing style", response);
        self
    }

    pub fn with_greeting_response(mut self, response: &str) -> Self {
        self.completion = self.completion.with_response("Write a greeting", response);
        self
    }

    pub fn failing_posts(mut self) -> Self {
        self.fetcher = self.fetcher.fail_posts();
        self
    }

    pub fn failing_reels(mut self) -> Self {
        self.fetcher = self.fetcher.fail_reels();
        self
    }

    pub fn failing_completions(mut self) -> Self {
        self.completion = self.completion.fail_completions();
        self
    }

    pub fn with_limits(mut self, posts: u32, reels: u32) -> Self {
        self.creator = self.creator.with_limits(posts, reels);
        self
    }

    pub fn with_config(mut self, config: IngestionConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a separate TTL backend for progress instead of the memory store.
    pub fn with_ttl_store(mut self, store: Arc<dyn TtlStore>) -> Self {
        self.ttl_store = Some(store);
        self
    }

    pub fn build(self) -> ScenarioHarness {
        let store = Arc::new(MemoryStore::new().with_creator(self.creator.clone()));
        self.build_with_entity_store(store.clone(), store)
    }

    /// Build with a custom entity store; `store` still holds the creator and
    /// backs progress unless a TTL store was set.
    pub fn build_with_entity_store(
        self,
        entities: Arc<dyn EntityStore>,
        store: Arc<MemoryStore>,
    ) -> ScenarioHarness {
        if store.creator(&self.creator.handle).is_none() {
            store.add_creator(self.creator.clone());
        }
        let fetcher = Arc::new(self.fetcher);
        let completion = Arc::new(self.completion);
        let kv: Arc<dyn TtlStore> = self
            .ttl_store
            .unwrap_or_else(|| store.clone() as Arc<dyn TtlStore>);

        let ingestion = Ingestion::new(
            fetcher.clone(),
            completion.clone(),
            entities,
            kv,
            self.config,
        );

        ScenarioHarness {
            ingestion,
            store,
            fetcher,
            completion,
            creator: self.creator,
        }
    }
}
