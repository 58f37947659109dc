//! Indexer - full rebuild of the verse index
//!
//! A run checks that Elasticsearch is reachable, reads the corpus, replaces the
//! index with an empty one and bulk-loads every verse. Connectivity failures at
//! startup and index lifecycle failures abort the run; document and batch
//! failures only show up in the report.

use crate::api::lifecycle::IndexLifecycle;
use crate::api::loader::{BatchLoader, BatchProgress, LoadSummary};
use crate::config::Config;
use crate::elastic::ElasticClient;
use crate::error::{Result, VersedexError};
use crate::storage::VerseSource;
use crate::utils::ensure_directory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Result of one indexing run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingReport {
    pub index_name: String,

    /// Verses read from the source
    pub total_verses: usize,

    /// Version of the Elasticsearch node that was loaded
    pub server_version: String,

    pub summary: LoadSummary,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl IndexingReport {
    /// Write the report as pretty JSON
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            ensure_directory(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Rebuilds the verse index from a [`VerseSource`]
pub struct Indexer {
    client: ElasticClient,
    config: Config,
}

impl Indexer {
    pub fn new(client: ElasticClient, config: Config) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Rebuild the index from `source`
    pub async fn run(&self, source: &dyn VerseSource) -> Result<IndexingReport> {
        self.run_with_progress(source, |_| {}).await
    }

    /// Rebuild the index from `source`, reporting progress after every batch
    pub async fn run_with_progress<F>(
        &self,
        source: &dyn VerseSource,
        progress: F,
    ) -> Result<IndexingReport>
    where
        F: Fn(&BatchProgress),
    {
        let started_at = Utc::now();
        let index_name = self.config.elasticsearch.index_name.as_str();

        // Settings are checked before the node is touched
        self.config.validate()?;
        let loader = BatchLoader::new(self.client.clone(), index_name, self.config.indexing.clone())?;

        // Nothing destructive happens before the node has answered
        let info = self.client.info().await.map_err(|e| {
            log::error!("Error connecting to Elasticsearch: {}", e);
            VersedexError::Connection(format!(
                "Failed to connect to Elasticsearch at {}: {}",
                self.client.base_url(),
                e
            ))
        })?;
        log::info!("Connected to Elasticsearch {}", info.version_number());

        let verses = source.list_all_verses()?;
        log::info!("Total verses to index: {}", verses.len());

        IndexLifecycle::new(self.client.clone(), &self.config.elasticsearch.language)
            .ensure_fresh_index(index_name)
            .await?;

        let summary = loader.load_with_progress(&verses, progress).await?;

        Ok(IndexingReport {
            index_name: index_name.to_string(),
            total_verses: verses.len(),
            server_version: info.version_number().to_string(),
            summary,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Verse;

    #[tokio::test]
    async fn test_unreachable_node_aborts_before_lifecycle() {
        let mut config = Config::default();
        config.elasticsearch.url = "http://127.0.0.1:9".to_string();
        config.elasticsearch.request_timeout_secs = 2;

        let client = ElasticClient::from_config(&config.elasticsearch).unwrap();
        let indexer = Indexer::new(client, config);

        let corpus: Vec<Verse> = Vec::new();
        let result = indexer.run(&corpus).await;
        assert!(matches!(result, Err(VersedexError::Connection(_))));
    }

    #[test]
    fn test_report_written_as_json() {
        let report = IndexingReport {
            index_name: "bible_verses".to_string(),
            total_verses: 2,
            server_version: "8.13.4".to_string(),
            summary: LoadSummary {
                success: 1,
                errors: 1,
                batches: 1,
                ..LoadSummary::default()
            },
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };

        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("reports").join("run.json");
        report.write_json(&path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["summary"]["success"], 1);
        assert_eq!(written["summary"]["errors"], 1);
        assert_eq!(written["index_name"], "bible_verses");
    }
}
