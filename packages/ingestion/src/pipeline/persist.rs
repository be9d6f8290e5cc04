//! Idempotent persistence of extracted entities.

use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::traits::store::EntityStore;
use crate::types::entities::ExtractedEntities;
use crate::types::records::{Partnership, Product};

/// Rows actually created by one `persist_entities` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistSummary {
    pub partnerships_created: usize,
    pub coupons_upserted: usize,
    pub products_created: usize,
}

/// Write extracted entities for a creator.
///
/// Partnerships are insert-if-absent and never overwritten. Coupons are
/// upserted by code, which only refreshes status. Products skip names that
/// already exist. Writes are not transactional: an error part way through
/// leaves earlier rows committed.
pub async fn persist_entities(
    store: &dyn EntityStore,
    creator_id: Uuid,
    entities: &ExtractedEntities,
    product_category: &str,
) -> Result<PersistSummary> {
    let mut summary = PersistSummary::default();

    for brand in &entities.brands {
        if store.find_partnership(creator_id, brand).await?.is_some() {
            continue;
        }
        if store
            .insert_partnership(&Partnership::discovered(creator_id, brand.as_str()))
            .await?
        {
            summary.partnerships_created += 1;
        }
    }

    for code in &entities.coupons {
        store.upsert_coupon(creator_id, code).await?;
        summary.coupons_upserted += 1;
    }

    if !entities.products.is_empty() {
        let products: Vec<Product> = entities
            .products
            .iter()
            .map(|name| Product::discovered(creator_id, name.as_str(), product_category))
            .collect();
        summary.products_created = store.upsert_products(&products).await?;
    }

    debug!(
        %creator_id,
        partnerships_created = summary.partnerships_created,
        coupons_upserted = summary.coupons_upserted,
        products_created = summary.products_created,
        "Entities persisted"
    );
    Ok(summary)
}
