//! Configuration for versedex
//!
//! Settings are fixed at process start: built-in defaults, optionally replaced by a
//! JSON file, then overridden by environment variables and finally by CLI flags.

use crate::error::{Result, VersedexError};
use crate::utils::expand_home;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default Elasticsearch endpoint
pub const DEFAULT_ELASTICSEARCH_URL: &str = "http://localhost:9200";

/// Default index name for Bible verses
pub const DEFAULT_INDEX_NAME: &str = "bible_verses";

/// Default number of verses per bulk request
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Default request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default OpenLP bible database location
pub const DEFAULT_DB_PATH: &str = "~/.local/share/openlp/bibles/RST.sqlite";

/// Elasticsearch connection and index settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ElasticsearchConfig {
    /// Base URL of the Elasticsearch node
    pub url: String,

    /// Target index name
    pub index_name: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Language used for the stemmer and stop-word filters
    pub language: String,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ELASTICSEARCH_URL.to_string(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            language: "russian".to_string(),
        }
    }
}

impl ElasticsearchConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Bulk loading settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexingConfig {
    /// Maximum verses per bulk request
    pub batch_size: usize,

    /// Pause between consecutive bulk requests, in milliseconds
    pub batch_delay_ms: u64,

    /// Failed documents retained per batch for diagnostics
    pub error_sample_size: usize,

    /// Stop loading after this many consecutive batches fail to connect.
    /// `None` loads every batch regardless.
    pub abort_after_connection_failures: Option<usize>,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay_ms: 100,
            error_sample_size: 3,
            abort_after_connection_failures: None,
        }
    }
}

impl IndexingConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

/// Verse database settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    /// Path to the SQLite bible database
    pub db_path: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            db_path: expand_home(DEFAULT_DB_PATH),
        }
    }
}

/// Complete versedex configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub elasticsearch: ElasticsearchConfig,
    pub indexing: IndexingConfig,
    pub source: SourceConfig,
}

impl Config {
    /// Load configuration from a JSON file; missing sections keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            VersedexError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            VersedexError::Config(format!("Invalid configuration in {}: {}", path.display(), e))
        })
    }

    /// Defaults overridden by the process environment, after loading `.env`
    pub fn from_env() -> Result<Self> {
        load_dotenv()?;
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment overrides using the given lookup.
    ///
    /// Recognised keys: `ELASTICSEARCH_URL`, `INDEX_NAME`, `BATCH_SIZE`,
    /// `REQUEST_TIMEOUT` (seconds), `ANALYZER_LANGUAGE`, `DB_PATH`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("ELASTICSEARCH_URL") {
            self.elasticsearch.url = url;
        }
        if let Some(index_name) = lookup("INDEX_NAME") {
            self.elasticsearch.index_name = index_name;
        }
        if let Some(language) = lookup("ANALYZER_LANGUAGE") {
            self.elasticsearch.language = language;
        }
        if let Some(timeout) = lookup("REQUEST_TIMEOUT") {
            self.elasticsearch.request_timeout_secs = parse_number("REQUEST_TIMEOUT", &timeout)?;
        }
        if let Some(batch_size) = lookup("BATCH_SIZE") {
            self.indexing.batch_size = parse_number("BATCH_SIZE", &batch_size)?;
        }
        if let Some(db_path) = lookup("DB_PATH") {
            self.source.db_path = expand_home(&db_path);
        }
        Ok(())
    }

    /// Reject settings no run could succeed with
    pub fn validate(&self) -> Result<()> {
        if self.elasticsearch.url.trim().is_empty() {
            return Err(VersedexError::Config("Elasticsearch URL must not be empty".to_string()));
        }
        if self.elasticsearch.index_name.trim().is_empty() {
            return Err(VersedexError::Config("Index name must not be empty".to_string()));
        }
        if self.elasticsearch.request_timeout_secs == 0 {
            return Err(VersedexError::Config("Request timeout must be at least 1 second".to_string()));
        }
        if self.elasticsearch.language.trim().is_empty() {
            return Err(VersedexError::Config("Analyzer language must not be empty".to_string()));
        }
        if self.indexing.batch_size == 0 {
            return Err(VersedexError::Config("Batch size must be at least 1".to_string()));
        }
        if self.indexing.abort_after_connection_failures == Some(0) {
            return Err(VersedexError::Config(
                "abort_after_connection_failures must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load `.env` from the working directory or its parents into the process
/// environment. Variables already set are kept; a missing file is not an error.
pub fn load_dotenv() -> Result<Option<PathBuf>> {
    match dotenv::dotenv() {
        Ok(path) => {
            log::debug!("Loaded environment from {}", path.display());
            Ok(Some(path))
        }
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(VersedexError::Config(format!("Failed to load .env: {}", e))),
    }
}

/// Load a specific env file. Returns `false` when the file does not exist.
pub fn load_dotenv_from<P: AsRef<Path>>(path: P) -> Result<bool> {
    let path = path.as_ref();
    match dotenv::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(VersedexError::Config(format!(
            "Failed to load {}: {}",
            path.display(),
            e
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| VersedexError::Config(format!("{} must be a number, got '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.elasticsearch.url, "http://localhost:9200");
        assert_eq!(config.elasticsearch.index_name, "bible_verses");
        assert_eq!(config.elasticsearch.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.indexing.batch_size, 50);
        assert_eq!(config.indexing.batch_delay(), Duration::from_millis(100));
        assert_eq!(config.indexing.error_sample_size, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("ELASTICSEARCH_URL", "http://search:9200"),
            ("INDEX_NAME", "verses_kjv"),
            ("BATCH_SIZE", "200"),
            ("REQUEST_TIMEOUT", "30"),
            ("ANALYZER_LANGUAGE", "english"),
            ("DB_PATH", "/data/KJV.sqlite"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.elasticsearch.url, "http://search:9200");
        assert_eq!(config.elasticsearch.index_name, "verses_kjv");
        assert_eq!(config.elasticsearch.request_timeout_secs, 30);
        assert_eq!(config.elasticsearch.language, "english");
        assert_eq!(config.indexing.batch_size, 200);
        assert_eq!(config.source.db_path, PathBuf::from("/data/KJV.sqlite"));
    }

    #[test]
    fn test_env_rejects_non_numeric_batch_size() {
        let mut config = Config::default();
        let result = config.apply_env(|key| (key == "BATCH_SIZE").then(|| "lots".to_string()));
        assert!(matches!(result, Err(VersedexError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let mut config = Config::default();
        config.indexing.batch_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.elasticsearch.index_name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"indexing": {{"batch_size": 10}}}}"#).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.indexing.batch_size, 10);
        assert_eq!(config.indexing.batch_delay_ms, 100);
        assert_eq!(config.elasticsearch.index_name, "bible_verses");
    }

    #[test]
    fn test_dotenv_file_feeds_env_overrides() {
        let temp_dir = tempfile::tempdir().unwrap();
        let env_file = temp_dir.path().join(".env");
        std::fs::write(
            &env_file,
            "VERSEDEX_DOTENV_TEST_ELASTICSEARCH_URL=http://es.internal:9200\n\
             VERSEDEX_DOTENV_TEST_DB_PATH=/srv/bibles/RST.sqlite\n",
        )
        .unwrap();

        assert!(load_dotenv_from(&env_file).unwrap());

        let mut config = Config::default();
        config
            .apply_env(|key| std::env::var(format!("VERSEDEX_DOTENV_TEST_{}", key)).ok())
            .unwrap();
        assert_eq!(config.elasticsearch.url, "http://es.internal:9200");
        assert_eq!(config.source.db_path, PathBuf::from("/srv/bibles/RST.sqlite"));
        assert_eq!(config.elasticsearch.index_name, "bible_verses");
    }

    #[test]
    fn test_missing_dotenv_file_is_ignored() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(!load_dotenv_from(temp_dir.path().join(".env")).unwrap());
    }
}
