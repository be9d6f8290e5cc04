//! Marketing entities extracted from captions.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Deduplicated brand, coupon and product names.
///
/// Sets keep first-seen order so persisted rows follow caption order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    pub brands: IndexSet<String>,
    pub coupons: IndexSet<String>,
    pub products: IndexSet<String>,
}

impl ExtractedEntities {
    /// Build from raw model output: trims, drops blanks, upper-cases coupon
    /// codes, dedupes.
    pub fn from_raw<B, C, P>(brands: B, coupons: C, products: P) -> Self
    where
        B: IntoIterator,
        B::Item: AsRef<str>,
        C: IntoIterator,
        C::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        Self {
            brands: normalize(brands, |s| s.to_string()),
            coupons: normalize(coupons, |s| s.to_uppercase()),
            products: normalize(products, |s| s.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.brands.is_empty() && self.coupons.is_empty() && self.products.is_empty()
    }

    pub fn brand_count(&self) -> u32 {
        self.brands.len() as u32
    }

    pub fn coupon_count(&self) -> u32 {
        self.coupons.len() as u32
    }

    pub fn product_count(&self) -> u32 {
        self.products.len() as u32
    }
}

fn normalize<I>(values: I, f: impl Fn(&str) -> String) -> IndexSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    values
        .into_iter()
        .filter_map(|v| {
            let trimmed = v.as_ref().trim();
            (!trimmed.is_empty()).then(|| f(trimmed))
        })
        .collect()
}
