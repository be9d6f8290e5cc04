//! Persona and greeting generation for full runs.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::error::{IngestionError, Result};
use crate::traits::ai::CompletionClient;
use crate::types::content::ScrapedItem;
use crate::types::records::{Greeting, Persona};

use super::extract::{strip_code_fence, CAPTION_SEPARATOR};
use super::prompts::{format_greeting_prompt, format_persona_prompt};

const MAX_QUESTIONS: usize = 6;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PersonaResponse {
    tone: Option<String>,
    style: Option<String>,
    emoji_style: Option<String>,
    response_length: Option<String>,
    topics: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GreetingResponse {
    greeting: Option<String>,
    questions: Vec<String>,
}

/// Parse a JSON object out of a completion response.
fn parse_object<T: for<'de> Deserialize<'de>>(raw: &str) -> Result<T> {
    let text = strip_code_fence(raw.trim());
    let span = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => {
            return Err(IngestionError::Completion(
                "response contains no JSON object".to_string(),
            ))
        }
    };
    Ok(serde_json::from_str(span)?)
}

fn non_blank(value: Option<String>, fallback: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Derives chatbot persona and greeting text from a creator's posts.
#[derive(Clone)]
pub struct PersonaGenerator {
    completion: Arc<dyn CompletionClient>,
    caption_limit: usize,
}

impl PersonaGenerator {
    pub fn new(completion: Arc<dyn CompletionClient>, caption_limit: usize) -> Self {
        Self {
            completion,
            caption_limit,
        }
    }

    fn captions(&self, posts: &[ScrapedItem]) -> String {
        posts
            .iter()
            .filter_map(ScrapedItem::caption)
            .take(self.caption_limit)
            .collect::<Vec<_>>()
            .join(CAPTION_SEPARATOR)
    }

    /// Tone, style and topics from up to `caption_limit` captions.
    ///
    /// Fields the model leaves out get neutral defaults.
    pub async fn generate_persona(&self, posts: &[ScrapedItem]) -> Result<Persona> {
        let captions = self.captions(posts);
        if captions.is_empty() {
            return Err(IngestionError::Completion(
                "no captions to derive a persona from".to_string(),
            ));
        }

        let raw = self
            .completion
            .complete(&format_persona_prompt(&captions))
            .await?;
        let response: PersonaResponse = parse_object(&raw)?;

        let persona = Persona {
            tone: non_blank(response.tone, "friendly"),
            style: non_blank(response.style, "casual"),
            emoji_style: non_blank(response.emoji_style, "light"),
            response_length: non_blank(response.response_length, "medium"),
            topics: clean_list(response.topics),
        };
        debug!(tone = %persona.tone, topics = persona.topics.len(), "Persona generated");
        Ok(persona)
    }

    /// Greeting plus up to six opening questions.
    pub async fn generate_greeting(&self, handle: &str, posts: &[ScrapedItem]) -> Result<Greeting> {
        let captions = self.captions(posts);
        let raw = self
            .completion
            .complete(&format_greeting_prompt(handle, &captions))
            .await?;
        let response: GreetingResponse = parse_object(&raw)?;

        let greeting = response
            .greeting
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .ok_or_else(|| IngestionError::Completion("response has no greeting".to_string()))?;

        let mut questions = clean_list(response.questions);
        questions.truncate(MAX_QUESTIONS);

        Ok(Greeting {
            greeting,
            questions,
        })
    }
}
