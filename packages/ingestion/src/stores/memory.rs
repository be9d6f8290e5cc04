//! In-memory storage implementation for testing and development.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{IngestionError, Result};
use crate::traits::store::{EntityStore, TtlStore};
use crate::types::records::{
    Coupon, Creator, CreatorProfileUpdate, Greeting, Partnership, Persona, PersonaRecord,
    Product, DISCOVERED_VIA_AI, STATUS_ACTIVE,
};

struct Expiring {
    value: String,
    deadline: Instant,
}

/// In-memory storage for creators, discovered entities and TTL records.
///
/// Useful for testing and development. Not suitable for production
/// as data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    creators: RwLock<HashMap<String, Creator>>,
    partnerships: RwLock<Vec<Partnership>>,
    coupons: RwLock<Vec<Coupon>>,
    products: RwLock<Vec<Product>>,
    personas: RwLock<HashMap<Uuid, PersonaRecord>>,
    kv: RwLock<HashMap<String, Expiring>>,
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|e| IngestionError::storage(e.to_string()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|e| IngestionError::storage(e.to_string()))
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a creator row.
    pub fn with_creator(self, creator: Creator) -> Self {
        self.add_creator(creator);
        self
    }

    pub fn add_creator(&self, creator: Creator) {
        if let Ok(mut creators) = self.creators.write() {
            creators.insert(creator.handle.clone(), creator);
        }
    }

    /// Creator row by handle, bypassing the trait.
    pub fn creator(&self, handle: &str) -> Option<Creator> {
        self.creators.read().ok()?.get(handle).cloned()
    }

    pub fn partnerships_for(&self, creator_id: Uuid) -> Vec<Partnership> {
        self.partnerships
            .read()
            .map(|rows| {
                rows.iter()
                    .filter(|p| p.creator_id == creator_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn coupons_for(&self, creator_id: Uuid) -> Vec<Coupon> {
        self.coupons
            .read()
            .map(|rows| {
                rows.iter()
                    .filter(|c| c.creator_id == creator_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn products_for(&self, creator_id: Uuid) -> Vec<Product> {
        self.products
            .read()
            .map(|rows| {
                rows.iter()
                    .filter(|p| p.creator_id == creator_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn persona_for(&self, creator_id: Uuid) -> Option<PersonaRecord> {
        self.personas.read().ok()?.get(&creator_id).cloned()
    }

    /// Overwrite a coupon's human-owned description.
    pub fn set_coupon_description(&self, creator_id: Uuid, code: &str, description: &str) {
        if let Ok(mut coupons) = self.coupons.write() {
            for coupon in coupons
                .iter_mut()
                .filter(|c| c.creator_id == creator_id && c.code == code)
            {
                coupon.description = Some(description.to_string());
            }
        }
    }

    /// Number of live (unexpired) TTL entries.
    pub fn ttl_entry_count(&self) -> usize {
        let now = Instant::now();
        self.kv
            .read()
            .map(|kv| kv.values().filter(|e| e.deadline > now).count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl TtlStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let kv = read(&self.kv)?;
        Ok(kv
            .get(key)
            .filter(|entry| entry.deadline > Instant::now())
            .map(|entry| entry.value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let mut kv = write(&self.kv)?;
        kv.retain(|_, entry| entry.deadline > now);
        kv.insert(
            key.to_string(),
            Expiring {
                value: value.to_string(),
                deadline: now + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        write(&self.kv)?.remove(key);
        Ok(())
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn find_creator(&self, handle: &str) -> Result<Option<Creator>> {
        Ok(read(&self.creators)?.get(handle).cloned())
    }

    async fn find_partnership(
        &self,
        creator_id: Uuid,
        brand_name: &str,
    ) -> Result<Option<Partnership>> {
        Ok(read(&self.partnerships)?
            .iter()
            .find(|p| p.creator_id == creator_id && p.brand_name == brand_name)
            .cloned())
    }

    async fn insert_partnership(&self, partnership: &Partnership) -> Result<bool> {
        let mut rows = write(&self.partnerships)?;
        let exists = rows.iter().any(|p| {
            p.creator_id == partnership.creator_id && p.brand_name == partnership.brand_name
        });
        if exists {
            return Ok(false);
        }
        rows.push(partnership.clone());
        Ok(true)
    }

    async fn upsert_coupon(&self, creator_id: Uuid, code: &str) -> Result<()> {
        let mut rows = write(&self.coupons)?;
        let now = Utc::now();

        match rows
            .iter_mut()
            .find(|c| c.creator_id == creator_id && c.code == code)
        {
            Some(existing) => {
                existing.status = STATUS_ACTIVE.to_string();
                existing.discovered_via = Some(DISCOVERED_VIA_AI.to_string());
                existing.updated_at = now;
            }
            None => rows.push(Coupon {
                id: Uuid::new_v4(),
                creator_id,
                code: code.to_string(),
                status: STATUS_ACTIVE.to_string(),
                discovered_via: Some(DISCOVERED_VIA_AI.to_string()),
                description: None,
                updated_at: now,
            }),
        }
        Ok(())
    }

    async fn upsert_products(&self, products: &[Product]) -> Result<usize> {
        let mut rows = write(&self.products)?;
        let mut inserted = 0;
        for product in products {
            let exists = rows
                .iter()
                .any(|p| p.creator_id == product.creator_id && p.name == product.name);
            if !exists {
                rows.push(product.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn upsert_persona(&self, creator_id: Uuid, persona: &Persona) -> Result<()> {
        let mut personas = write(&self.personas)?;
        let now = Utc::now();
        personas
            .entry(creator_id)
            .and_modify(|record| {
                record.persona = persona.clone();
                record.updated_at = now;
            })
            .or_insert_with(|| PersonaRecord {
                creator_id,
                persona: persona.clone(),
                greeting: None,
                updated_at: now,
            });
        Ok(())
    }

    async fn update_greeting(&self, creator_id: Uuid, greeting: &Greeting) -> Result<()> {
        if let Some(record) = write(&self.personas)?.get_mut(&creator_id) {
            record.greeting = Some(greeting.clone());
            record.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_creator_profile(
        &self,
        creator_id: Uuid,
        update: &CreatorProfileUpdate,
    ) -> Result<()> {
        let mut creators = write(&self.creators)?;
        if let Some(creator) = creators.values_mut().find(|c| c.id == creator_id) {
            if let Some(name) = &update.display_name {
                creator.display_name = Some(name.clone());
            }
            if let Some(followers) = update.followers_count {
                creator.followers_count = Some(followers);
            }
            if let Some(avatar) = &update.avatar_url {
                creator.avatar_url = Some(avatar.clone());
            }
            creator.last_scanned_at = Some(update.last_scanned_at);
        }
        Ok(())
    }
}
