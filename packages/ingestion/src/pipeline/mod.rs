//! The ingestion pipeline.
//!
//! - Entity extraction with strict response validation
//! - Idempotent persistence
//! - Persona and greeting generation
//! - The orchestrator sequencing them with progress updates

pub mod extract;
pub mod orchestrator;
pub mod persist;
pub mod persona;
pub mod prompts;

pub use extract::{aggregate_captions, parse_entities, EntityExtractor, CAPTION_SEPARATOR};
pub use orchestrator::Ingestion;
pub use persist::{persist_entities, PersistSummary};
pub use persona::PersonaGenerator;
pub use prompts::{
    format_entity_prompt, format_greeting_prompt, format_persona_prompt, ENTITY_PROMPT,
    GREETING_PROMPT, PERSONA_PROMPT,
};
