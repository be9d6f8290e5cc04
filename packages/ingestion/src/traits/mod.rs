//! Trait seams for every external system the pipeline touches.

pub mod ai;
pub mod fetcher;
pub mod store;
