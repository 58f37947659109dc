//! Batch loader - pushes the verse corpus into the index
//!
//! Verses are split into consecutive chunks of at most `batch_size`; each chunk
//! becomes one `_bulk` request. Chunks are sent strictly one after another with
//! a short pause in between. Failures are counted, not thrown: a failing item
//! counts against its document, a failing request counts against its whole
//! chunk, and loading always moves on to the next chunk.

use crate::config::IndexingConfig;
use crate::elastic::{ElasticClient, IndexedDocument};
use crate::error::{Result, VersedexError};
use crate::storage::Verse;
use crate::utils::{calculate_progress, chunk_count};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;

/// A document that could not be indexed, kept for diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedDocument {
    /// Item status, `None` when the whole request failed
    pub status: Option<u16>,

    /// Engine error (`type: reason`) or transport failure message
    pub error: String,

    pub document: IndexedDocument,
}

/// Outcome of a single bulk request
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub success: usize,
    pub errors: usize,

    /// First failures of the batch, at most `error_sample_size`
    pub failed: Vec<FailedDocument>,
}

/// Progress snapshot reported after every batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchProgress {
    /// 1-based number of the batch just finished
    pub batch: usize,
    pub total_batches: usize,
    pub processed: usize,
    pub total: usize,
    pub success: usize,
    pub errors: usize,
}

/// Totals of a complete load
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadSummary {
    /// Documents indexed successfully
    pub success: usize,

    /// Documents that failed, individually or with their batch
    pub errors: usize,

    /// Bulk requests issued
    pub batches: usize,

    /// Bulk requests that failed as a whole
    pub failed_batches: usize,

    /// First failures of the run, at most `error_sample_size`
    pub samples: Vec<FailedDocument>,

    pub elapsed_secs: f64,
}

impl LoadSummary {
    /// True when every document was indexed
    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }
}

/// Loads verses into one index in bounded batches
#[derive(Debug, Clone)]
pub struct BatchLoader {
    client: ElasticClient,
    index_name: String,
    config: IndexingConfig,
}

impl BatchLoader {
    pub fn new(client: ElasticClient, index_name: &str, config: IndexingConfig) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(VersedexError::Config("Batch size must be at least 1".to_string()));
        }

        Ok(Self {
            client,
            index_name: index_name.to_string(),
            config,
        })
    }

    /// Load every verse, reporting totals at the end
    pub async fn load(&self, verses: &[Verse]) -> Result<LoadSummary> {
        self.load_with_progress(verses, |_| {}).await
    }

    /// Load every verse, calling `progress` after each batch.
    ///
    /// Only returns an error when `abort_after_connection_failures` is set and
    /// that many consecutive batches could not reach the search service.
    pub async fn load_with_progress<F>(&self, verses: &[Verse], progress: F) -> Result<LoadSummary>
    where
        F: Fn(&BatchProgress),
    {
        let start_time = Instant::now();
        let batch_size = self.config.batch_size;
        let total_batches = chunk_count(verses.len(), batch_size);

        let mut summary = LoadSummary::default();
        let mut processed = 0;
        let mut consecutive_connection_failures = 0;

        for (batch_index, batch) in verses.chunks(batch_size).enumerate() {
            log::info!(
                "Processing batch {}/{} ({} verses)...",
                batch_index + 1,
                total_batches,
                batch.len()
            );
            summary.batches += 1;

            match self.index_batch(batch).await {
                Ok(outcome) => {
                    consecutive_connection_failures = 0;
                    summary.success += outcome.success;
                    summary.errors += outcome.errors;

                    if outcome.errors > 0 {
                        log::warn!(
                            "Batch had {} errors. First few errors: {}",
                            outcome.errors,
                            serde_json::to_string_pretty(&outcome.failed).unwrap_or_default()
                        );
                    }
                    self.keep_samples(&mut summary, outcome.failed);
                }
                Err(e) => {
                    log::error!(
                        "Failed to index batch starting at verse {}: {}",
                        batch_index * batch_size,
                        e
                    );
                    summary.errors += batch.len();
                    summary.failed_batches += 1;

                    let failed = batch
                        .iter()
                        .take(self.config.error_sample_size)
                        .map(|verse| FailedDocument {
                            status: None,
                            error: e.to_string(),
                            document: IndexedDocument::from(verse),
                        })
                        .collect();
                    self.keep_samples(&mut summary, failed);

                    if e.is_connectivity() {
                        consecutive_connection_failures += 1;
                    } else {
                        consecutive_connection_failures = 0;
                    }

                    if let Some(limit) = self.config.abort_after_connection_failures
                        && consecutive_connection_failures >= limit
                    {
                        return Err(VersedexError::Connection(format!(
                            "Aborting after {} consecutive batches could not reach Elasticsearch \
                             ({} indexed, {} failed so far): {}",
                            consecutive_connection_failures, summary.success, summary.errors, e
                        )));
                    }
                }
            }

            processed += batch.len();
            log::info!(
                "Progress: {}/{} verses processed ({:.1}%, {} success, {} errors)",
                processed,
                verses.len(),
                calculate_progress(processed, verses.len()),
                summary.success,
                summary.errors
            );
            progress(&BatchProgress {
                batch: batch_index + 1,
                total_batches,
                processed,
                total: verses.len(),
                success: summary.success,
                errors: summary.errors,
            });

            let delay = self.config.batch_delay();
            if batch_index + 1 < total_batches && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        summary.elapsed_secs = start_time.elapsed().as_secs_f64();
        log::info!(
            "Indexing completed: {} verses indexed successfully, {} errors",
            summary.success,
            summary.errors
        );
        Ok(summary)
    }

    /// Index one batch with a single bulk request.
    ///
    /// Errors only when the request itself fails; per-document failures are
    /// reported in the outcome.
    pub async fn index_batch(&self, batch: &[Verse]) -> Result<BatchOutcome> {
        if batch.is_empty() {
            return Ok(BatchOutcome::default());
        }

        let body = bulk_body(&self.index_name, batch)?;
        let response = self.client.bulk(body).await?;

        if !response.errors {
            return Ok(BatchOutcome {
                success: batch.len(),
                errors: 0,
                failed: Vec::new(),
            });
        }

        let mut outcome = BatchOutcome::default();
        for (item, verse) in response.items.iter().zip(batch) {
            // Each item holds exactly one operation key
            let Some(result) = item.values().next() else {
                continue;
            };

            match result.error_summary() {
                Some(error) => {
                    outcome.errors += 1;
                    if outcome.failed.len() < self.config.error_sample_size {
                        outcome.failed.push(FailedDocument {
                            status: Some(result.status),
                            error,
                            document: IndexedDocument::from(verse),
                        });
                    }
                }
                None => outcome.success += 1,
            }
        }

        // Items missing from the response cannot be confirmed as indexed
        let unaccounted = batch.len().saturating_sub(outcome.success + outcome.errors);
        outcome.errors += unaccounted;

        Ok(outcome)
    }

    fn keep_samples(&self, summary: &mut LoadSummary, failed: Vec<FailedDocument>) {
        let room = self
            .config
            .error_sample_size
            .saturating_sub(summary.samples.len());
        summary.samples.extend(failed.into_iter().take(room));
    }
}

/// NDJSON body with one `index` action and one document per verse
pub fn bulk_body(index_name: &str, batch: &[Verse]) -> Result<String> {
    let mut body = String::new();

    for verse in batch {
        let action = json!({ "index": { "_index": index_name, "_id": verse.verse_id.to_string() } });
        body.push_str(&serde_json::to_string(&action)?);
        body.push('\n');
        body.push_str(&serde_json::to_string(&IndexedDocument::from(verse))?);
        body.push('\n');
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn verses(count: usize) -> Vec<Verse> {
        (1..=count)
            .map(|i| Verse {
                verse_id: i as i64,
                book_id: 1,
                book_name: "Genesis".to_string(),
                chapter: 1,
                verse: i as u32,
                text: format!("Verse number {}", i),
            })
            .collect()
    }

    fn loader(url: &str, batch_size: usize) -> BatchLoader {
        let client = ElasticClient::new(url, Duration::from_secs(5)).unwrap();
        let config = IndexingConfig {
            batch_size,
            batch_delay_ms: 0,
            ..IndexingConfig::default()
        };
        BatchLoader::new(client, "bible_verses", config).unwrap()
    }

    #[test]
    fn test_bulk_body_shape() {
        let body = bulk_body("bible_verses", &verses(2)).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(body.ends_with('\n'));

        let action: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(action["index"]["_index"], "bible_verses");
        assert_eq!(action["index"]["_id"], "1");

        let doc: serde_json::Value = serde_json::from_str(lines[3]).unwrap();
        assert_eq!(doc["reference"], "Genesis 1:2");
        assert_eq!(doc["verse_id"], 2);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let client = ElasticClient::new("http://localhost:9200", Duration::from_secs(1)).unwrap();
        let config = IndexingConfig {
            batch_size: 0,
            ..IndexingConfig::default()
        };
        assert!(BatchLoader::new(client, "bible_verses", config).is_err());
    }

    #[tokio::test]
    async fn test_item_errors_are_counted_and_sampled() {
        let mut server = mockito::Server::new_async().await;
        let _bulk = server
            .mock("POST", "/_bulk?refresh=true")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"took":5,"errors":true,"items":[
                    {"index":{"_id":"1","status":201}},
                    {"index":{"_id":"2","status":400,"error":{"type":"mapper_parsing_exception","reason":"bad chapter"}}},
                    {"index":{"_id":"3","status":201}}
                ]}"#,
            )
            .create_async()
            .await;

        let outcome = loader(&server.url(), 50).index_batch(&verses(3)).await.unwrap();
        assert_eq!(outcome.success, 2);
        assert_eq!(outcome.errors, 1);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].status, Some(400));
        assert_eq!(outcome.failed[0].document.reference, "Genesis 1:2");
        assert!(outcome.failed[0].error.contains("mapper_parsing_exception"));
    }

    #[tokio::test]
    async fn test_progress_reported_per_batch() {
        let mut server = mockito::Server::new_async().await;
        let bulk = server
            .mock("POST", "/_bulk?refresh=true")
            .with_status(200)
            .with_body(r#"{"took":1,"errors":false,"items":[]}"#)
            .expect(3)
            .create_async()
            .await;

        let seen = std::cell::RefCell::new(Vec::new());
        let summary = loader(&server.url(), 2)
            .load_with_progress(&verses(5), |p| seen.borrow_mut().push(*p))
            .await
            .unwrap();

        bulk.assert_async().await;
        assert_eq!(summary.success, 5);
        assert_eq!(summary.batches, 3);

        let seen = seen.into_inner();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2].processed, 5);
        assert_eq!(seen[2].batch, 3);
        assert_eq!(seen[2].total_batches, 3);
    }

    #[tokio::test]
    async fn test_abort_after_connection_failures() {
        let client = ElasticClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let config = IndexingConfig {
            batch_size: 1,
            batch_delay_ms: 0,
            abort_after_connection_failures: Some(2),
            ..IndexingConfig::default()
        };
        let loader = BatchLoader::new(client, "bible_verses", config).unwrap();

        let result = loader.load(&verses(5)).await;
        assert!(matches!(result, Err(VersedexError::Connection(_))));
    }

    #[tokio::test]
    async fn test_connection_failures_without_abort_still_summarise() {
        let loader = loader("http://127.0.0.1:9", 2);

        let summary = loader.load(&verses(5)).await.unwrap();
        assert_eq!(summary.success, 0);
        assert_eq!(summary.errors, 5);
        assert_eq!(summary.batches, 3);
        assert_eq!(summary.failed_batches, 3);
        assert_eq!(summary.samples.len(), 3);
        assert!(summary.samples.iter().all(|s| s.status.is_none()));
    }
}
