//! Index lifecycle management
//!
//! Every build starts from an empty index: an existing index is deleted and
//! recreated with the fixed verse configuration before any document is loaded.

use crate::elastic::{ElasticClient, index_config};
use crate::error::{Result, VersedexError, is_index_not_found_error};

/// Creates and drops the verse index
#[derive(Debug, Clone)]
pub struct IndexLifecycle {
    client: ElasticClient,
    language: String,
}

impl IndexLifecycle {
    /// `language` selects the stemmer and stop-word filters of the analyzer
    pub fn new(client: ElasticClient, language: &str) -> Self {
        Self {
            client,
            language: language.to_string(),
        }
    }

    /// Drop `index` if present, then create it empty with the verse mapping.
    ///
    /// Any failure other than "index not found" aborts with
    /// [`VersedexError::Lifecycle`] (or the connectivity error that caused it).
    pub async fn ensure_fresh_index(&self, index: &str) -> Result<()> {
        self.delete_index_if_exists(index).await?;
        self.create_index(index).await
    }

    /// Returns `true` when an existing index was deleted
    pub async fn delete_index_if_exists(&self, index: &str) -> Result<bool> {
        match self.delete_existing(index).await {
            Ok(true) => {
                log::info!("Index {} successfully deleted", index);
                Ok(true)
            }
            Ok(false) => {
                log::info!("Index {} does not exist yet", index);
                Ok(false)
            }
            // Deleted concurrently between the existence check and the delete
            Err(e) if is_index_not_found_error(&e) => {
                log::info!("Index {} does not exist yet (confirmed by error)", index);
                Ok(false)
            }
            Err(e) if e.is_connectivity() => {
                log::error!("Error checking/deleting index {}: {}", index, e);
                Err(e)
            }
            Err(e) => {
                log::error!("Error checking/deleting index {}: {}", index, e);
                Err(VersedexError::Lifecycle(format!(
                    "Failed to delete index {}: {}",
                    index, e
                )))
            }
        }
    }

    async fn delete_existing(&self, index: &str) -> Result<bool> {
        if !self.client.index_exists(index).await? {
            return Ok(false);
        }

        log::info!("Index {} already exists, deleting...", index);
        self.client.delete_index(index).await?;
        Ok(true)
    }

    /// Create `index` with the analyzer and field mappings
    pub async fn create_index(&self, index: &str) -> Result<()> {
        log::info!("Creating index {} ({} analyzer)...", index, self.language);

        match self
            .client
            .create_index(index, &index_config(&self.language))
            .await
        {
            Ok(()) => {
                log::info!("Index {} created successfully", index);
                Ok(())
            }
            Err(e) if e.is_connectivity() => {
                log::error!("Error creating index {}: {}", index, e);
                Err(e)
            }
            Err(e) => {
                log::error!("Error creating index {}: {}", index, e);
                Err(VersedexError::Lifecycle(format!(
                    "Failed to create index {}: {}",
                    index, e
                )))
            }
        }
    }
}
