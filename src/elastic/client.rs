//! Thin Elasticsearch REST client
//!
//! One long-lived client is constructed by the process and handed to the
//! lifecycle manager, the batch loader and the query service. Cloning is cheap
//! and shares the underlying connection pool.

use crate::config::ElasticsearchConfig;
use crate::elastic::types::{BulkResponse, SearchResponse, ServerInfo};
use crate::error::{Result, VersedexError};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Elasticsearch client bound to one node
#[derive(Debug, Clone)]
pub struct ElasticClient {
    http: Client,
    base_url: Url,
}

impl ElasticClient {
    /// Create a client for `base_url` with a fixed per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim();
        if base_url.is_empty() {
            return Err(VersedexError::Config(
                "Elasticsearch base URL is required".to_string(),
            ));
        }

        let base_url = Url::parse(base_url).map_err(|e| {
            VersedexError::Config(format!("Invalid Elasticsearch URL {}: {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(VersedexError::Config(format!(
                "Elasticsearch URL {} cannot carry a path",
                base_url
            )));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VersedexError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    /// Create a client from configuration
    pub fn from_config(config: &ElasticsearchConfig) -> Result<Self> {
        Self::new(&config.url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Base URL extended by `segments`, each percent-encoded as a single path segment
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                VersedexError::Config(format!("Elasticsearch URL {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Cluster information (`GET /`)
    pub async fn info(&self) -> Result<ServerInfo> {
        let response = self.http.get(self.base_url.clone()).send().await?;
        read_json(response).await
    }

    /// Lightweight reachability probe (`HEAD /`). Never fails.
    pub async fn ping(&self) -> bool {
        match self.http.head(self.base_url.clone()).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                log::warn!("Elasticsearch is not available at {}: {}", self.base_url(), e);
                false
            }
        }
    }

    /// Whether `index` exists (`HEAD /{index}`)
    pub async fn index_exists(&self, index: &str) -> Result<bool> {
        let response = self.http.head(self.url(&[index])?).send().await?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(VersedexError::from_response_body(status.as_u16(), "")),
        }
    }

    /// Delete `index` (`DELETE /{index}`)
    pub async fn delete_index(&self, index: &str) -> Result<()> {
        let response = self.http.delete(self.url(&[index])?).send().await?;
        check_status(response).await?;
        Ok(())
    }

    /// Create `index` with settings and mappings (`PUT /{index}`)
    pub async fn create_index(&self, index: &str, body: &Value) -> Result<()> {
        let response = self.http.put(self.url(&[index])?).json(body).send().await?;
        check_status(response).await?;
        Ok(())
    }

    /// Submit an NDJSON bulk body (`POST /_bulk?refresh=true`)
    pub async fn bulk(&self, ndjson: String) -> Result<BulkResponse> {
        let mut url = self.url(&["_bulk"])?;
        url.set_query(Some("refresh=true"));

        let response = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(ndjson)
            .send()
            .await?;
        read_json(response).await
    }

    /// Run a search request (`POST /{index}/_search`)
    pub async fn search(&self, index: &str, body: &Value) -> Result<SearchResponse> {
        let response = self
            .http
            .post(self.url(&[index, "_search"])?)
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }
}

/// Turn a non-2xx response into a classified [`VersedexError::Elastic`]
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(VersedexError::from_response_body(status.as_u16(), &body))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check_status(response).await?;
    let body = response.text().await?;
    serde_json::from_str(&body)
        .map_err(|e| VersedexError::Transport(format!("Malformed Elasticsearch response: {}", e)))
}
