//! Elasticsearch wire layer for versedex
//!
//! REST client, index configuration and the JSON documents exchanged with the
//! search service.

pub mod client;
pub mod mapping;
pub mod types;

// Re-export main types
pub use client::ElasticClient;
pub use mapping::index_config;
pub use types::{BulkItemResult, BulkResponse, IndexedDocument, SearchHit, SearchResponse, ServerInfo};
