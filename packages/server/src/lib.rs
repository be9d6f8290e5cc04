// Creator Ingestion - API Core
//
// HTTP surface over the ingestion pipeline: trigger scans, poll progress.
// Wiring of concrete clients and stores lives in kernel/.

pub mod config;
pub mod kernel;
pub mod server;

pub use config::*;
