//! API layer for versedex
//!
//! This module provides the indexing pipeline (index lifecycle, batch loading,
//! full rebuilds) and the query service.

pub mod indexer;
pub mod lifecycle;
pub mod loader;
pub mod retriever;

// Re-export main API types
pub use indexer::{Indexer, IndexingReport};
pub use lifecycle::IndexLifecycle;
pub use loader::{BatchLoader, BatchOutcome, BatchProgress, FailedDocument, LoadSummary};
pub use retriever::{DEFAULT_RESULT_SIZE, QueryService, VerseHit};
