//! Completion prompts for the ingestion pipeline.
//!
//! Every prompt asks for a bare JSON object; responses are validated by the
//! parsers in [`super::extract`] and [`super::persona`].

/// Prompt for pulling marketing entities out of joined captions.
pub const ENTITY_PROMPT: &str = r#"Analyze this Instagram content and extract marketing entities.

Return ONLY a JSON object, no markdown, no commentary:
{"brands": [], "coupons": [], "products": []}

Rules:
- brands: brand or company names the creator works with or promotes
- coupons: discount codes, UPPERCASE letters and digits, ONLY if explicitly written
- products: specific product names mentioned by name, not generic categories
- Keep names in the language they appear in
- Use an empty array when nothing qualifies

Example:
{"brands":["Nike","Adidas"],"coupons":["SALE20","WINTER50"],"products":["Air Max running shoes"]}

Captions (separated by ---):
{captions}"#;

/// Prompt for deriving the chatbot persona.
pub const PERSONA_PROMPT: &str = r#"Analyze the writing style of this Instagram creator from their captions.

Return ONLY a JSON object:
{
    "tone": "short description of the overall tone (e.g. warm, playful, professional)",
    "style": "one sentence on how they write",
    "emoji_style": "none" | "light" | "heavy",
    "response_length": "short" | "medium" | "long",
    "topics": ["main topics they post about"]
}

Captions:
{captions}"#;

/// Prompt for the greeting and suggested opening questions.
pub const GREETING_PROMPT: &str = r#"Write a greeting for the chatbot of Instagram creator @{handle}, in their voice.

Also suggest 4 to 6 short questions a follower might ask first, based on what they post about.

Return ONLY a JSON object:
{"greeting": "one or two sentences", "questions": ["question 1", "question 2", "question 3", "question 4"]}

Recent captions:
{captions}"#;

/// Fill the entity prompt.
pub fn format_entity_prompt(captions: &str) -> String {
    ENTITY_PROMPT.replace("{captions}", captions)
}

/// Fill the persona prompt.
pub fn format_persona_prompt(captions: &str) -> String {
    PERSONA_PROMPT.replace("{captions}", captions)
}

/// Fill the greeting prompt.
pub fn format_greeting_prompt(handle: &str, captions: &str) -> String {
    GREETING_PROMPT
        .replace("{handle}", handle)
        .replace("{captions}", captions)
}
