//! Content fetcher implementations.

pub mod apify;

pub use apify::ApifyFetcher;
