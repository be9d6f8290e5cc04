//! Entity extraction from captions.
//!
//! Model output is untrusted. Anything that is not a JSON object carrying
//! all three arrays degrades to the empty result instead of erroring.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::traits::ai::CompletionClient;
use crate::types::content::ScrapedItem;
use crate::types::entities::ExtractedEntities;
use crate::types::outcome::Outcome;

use super::prompts::format_entity_prompt;

/// Separator placed between captions in the joined text.
pub const CAPTION_SEPARATOR: &str = "\n---\n";

const ENTITY_KEYS: [&str; 3] = ["brands", "coupons", "products"];

/// Join non-empty captions in item order and cut to `budget` characters.
///
/// The cut counts Unicode scalar values so it never splits a character.
pub fn aggregate_captions<'a, I>(items: I, budget: usize) -> String
where
    I: IntoIterator<Item = &'a ScrapedItem>,
{
    let joined = items
        .into_iter()
        .filter_map(ScrapedItem::caption)
        .collect::<Vec<_>>()
        .join(CAPTION_SEPARATOR);

    match joined.char_indices().nth(budget) {
        Some((cut, _)) => joined[..cut].to_string(),
        None => joined,
    }
}

/// Validate and normalize a raw completion response.
///
/// Returns the reason on rejection.
pub fn parse_entities(raw: &str) -> Result<ExtractedEntities, String> {
    let text = strip_code_fence(raw.trim()).trim();

    if !(text.starts_with('{') && text.ends_with('}')) {
        return Err("response is not a JSON object".to_string());
    }

    let span = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => return Err("no JSON object span in response".to_string()),
    };

    let value: Value =
        serde_json::from_str(span).map_err(|e| format!("invalid JSON in response: {e}"))?;
    let object = value
        .as_object()
        .ok_or_else(|| "response is not a JSON object".to_string())?;

    for key in ENTITY_KEYS {
        if object.get(key).map_or(true, Value::is_null) {
            return Err(format!("response missing \"{key}\""));
        }
    }

    Ok(ExtractedEntities::from_raw(
        string_array(&object["brands"]),
        string_array(&object["coupons"]),
        string_array(&object["products"]),
    ))
}

/// Non-arrays become empty; non-string elements are dropped.
fn string_array(value: &Value) -> Vec<&str> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

pub(crate) fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (```json) up to the first newline
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body)
}

/// Sends joined captions to the completion service and validates the answer.
#[derive(Clone)]
pub struct EntityExtractor {
    completion: Arc<dyn CompletionClient>,
}

impl EntityExtractor {
    pub fn new(completion: Arc<dyn CompletionClient>) -> Self {
        Self { completion }
    }

    /// Extract entities from joined caption text. Never fails.
    pub async fn extract(&self, captions: &str) -> Outcome<ExtractedEntities> {
        if captions.trim().is_empty() {
            debug!("No caption text, skipping entity extraction");
            return Outcome::Ok(ExtractedEntities::default());
        }

        let raw = match self.completion.complete(&format_entity_prompt(captions)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Entity extraction call failed");
                return Outcome::degraded(ExtractedEntities::default(), e.to_string());
            }
        };

        match parse_entities(&raw) {
            Ok(entities) => {
                debug!(
                    brands = entities.brands.len(),
                    coupons = entities.coupons.len(),
                    products = entities.products.len(),
                    "Entities extracted"
                );
                Outcome::Ok(entities)
            }
            Err(reason) => {
                warn!(%reason, response_len = raw.len(), "Rejected entity extraction response");
                Outcome::degraded(ExtractedEntities::default(), reason)
            }
        }
    }
}
