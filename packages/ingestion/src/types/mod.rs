//! Data types for the ingestion library.

pub mod config;
pub mod content;
pub mod entities;
pub mod outcome;
pub mod progress;
pub mod records;
pub mod stats;
