//! Persistence adapters.

pub mod cache_json;

pub use cache_json::JsonCache;
