//! Storage traits.
//!
//! Split the same way the pipeline uses them:
//! - `TtlStore`: ephemeral key-value records with expiry (progress)
//! - `EntityStore`: durable creator, entity and persona rows

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::types::records::{
    Creator, CreatorProfileUpdate, Greeting, Partnership, Persona, Product,
};

/// Key-value store with per-key expiry.
#[async_trait]
pub trait TtlStore: Send + Sync {
    /// Value for `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value and resetting
    /// its expiry to `ttl` from now.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Durable rows for creators and what the pipeline discovers about them.
///
/// Every write is idempotent: repeating a call with the same arguments
/// leaves one row per (creator, name) pair.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Look up a creator by handle.
    async fn find_creator(&self, handle: &str) -> Result<Option<Creator>>;

    /// Existing partnership for (creator, brand), if any.
    async fn find_partnership(
        &self,
        creator_id: Uuid,
        brand_name: &str,
    ) -> Result<Option<Partnership>>;

    /// Insert a partnership. Returns `false` if one already existed for the
    /// same (creator, brand), in which case nothing is written.
    async fn insert_partnership(&self, partnership: &Partnership) -> Result<bool>;

    /// Upsert a coupon by (creator, code), setting status to active and the
    /// discovery tag without touching any other column.
    async fn upsert_coupon(&self, creator_id: Uuid, code: &str) -> Result<()>;

    /// Insert products, skipping names the creator already has.
    ///
    /// Returns the number of rows actually inserted.
    async fn upsert_products(&self, products: &[Product]) -> Result<usize>;

    /// Insert or replace the persona row for a creator.
    async fn upsert_persona(&self, creator_id: Uuid, persona: &Persona) -> Result<()>;

    /// Set greeting text and opening questions on the persona row.
    async fn update_greeting(&self, creator_id: Uuid, greeting: &Greeting) -> Result<()>;

    /// Refresh profile fields. `None` fields keep their stored value.
    async fn update_creator_profile(
        &self,
        creator_id: Uuid,
        update: &CreatorProfileUpdate,
    ) -> Result<()>;
}
