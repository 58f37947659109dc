//! # versedex
//!
//! Index a Bible verse database into Elasticsearch and search it with fuzzy,
//! phrase-aware, highlighted matching.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use versedex::{Config, ElasticClient, Indexer, QueryService, VerseDatabase};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let client = ElasticClient::from_config(&config.elasticsearch)?;
//!
//!     // Rebuild the index from the bible database
//!     let db = VerseDatabase::open(&config.source.db_path)?;
//!     let index_name = config.elasticsearch.index_name.clone();
//!     let report = Indexer::new(client.clone(), config).run(&db).await?;
//!     println!("{} indexed, {} errors", report.summary.success, report.summary.errors);
//!
//!     // Search it
//!     let search = QueryService::new(client, &index_name);
//!     for hit in search.search("beginning", 10).await? {
//!         println!("{} - {}", hit.reference, hit.text);
//!     }
//!
//!     Ok(())
//! }
//! ```

// Core modules
pub mod api;
pub mod config;
pub mod elastic;
pub mod error;
pub mod export;
pub mod storage;
pub mod utils;

// Re-export main API types
pub use api::{
    BatchLoader, IndexLifecycle, Indexer, IndexingReport, LoadSummary, QueryService, VerseHit,
};
pub use config::Config;
pub use elastic::ElasticClient;
pub use error::{Result, VersedexError, is_index_not_found_error};

// Re-export commonly used types
pub use storage::{Verse, VerseDatabase, VerseSource};
