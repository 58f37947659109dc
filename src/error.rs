//! Error types for versedex
//!
//! This module provides error handling for every versedex operation: talking to
//! Elasticsearch, managing the index lifecycle, bulk loading, querying and
//! reading the verse database.

use thiserror::Error;

/// Elasticsearch error type reported when an index is missing
pub const INDEX_NOT_FOUND_EXCEPTION: &str = "index_not_found_exception";

/// Main error type for versedex operations
#[derive(Error, Debug)]
pub enum VersedexError {
    /// Search service unreachable (connection refused, DNS failure, ...)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request exceeded the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Any other HTTP transport failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Error returned by Elasticsearch itself
    #[error("Elasticsearch error (status {status}): {reason}")]
    Elastic {
        status: u16,
        /// `error.type` from the response body, when present
        kind: Option<String>,
        reason: String,
    },

    /// Index create/delete failures that must abort an indexing run
    #[error("Index lifecycle error: {0}")]
    Lifecycle(String),

    /// Query could not be executed
    #[error("Search failed: {0}")]
    SearchFailed(String),

    /// Database/storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for versedex operations
pub type Result<T> = std::result::Result<T, VersedexError>;

impl VersedexError {
    /// Whether Elasticsearch reported the target index as missing
    pub fn is_index_not_found(&self) -> bool {
        match self {
            VersedexError::Elastic { kind, .. } => {
                kind.as_deref() == Some(INDEX_NOT_FOUND_EXCEPTION)
            }
            _ => false,
        }
    }

    /// Whether the search service could not be reached at all
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            VersedexError::Connection(_) | VersedexError::Timeout(_)
        )
    }

    /// Build an [`VersedexError::Elastic`] from a non-success response body.
    ///
    /// Elasticsearch reports failures as `{"error": {"type": .., "reason": ..}, "status": ..}`,
    /// but some endpoints (HEAD, proxies) return an empty or plain-text body.
    pub fn from_response_body(status: u16, body: &str) -> Self {
        let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
        let error = parsed.as_ref().and_then(|value| value.get("error"));

        let kind = error
            .and_then(|e| e.get("type"))
            .and_then(|t| t.as_str())
            .map(str::to_string);

        let reason = error
            .and_then(|e| match e {
                serde_json::Value::String(s) => Some(s.clone()),
                other => other
                    .get("reason")
                    .and_then(|r| r.as_str())
                    .map(str::to_string),
            })
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body.trim().to_string()
                }
            });

        VersedexError::Elastic {
            status,
            kind,
            reason,
        }
    }
}

/// Typed "index not found" check used by the lifecycle manager
pub fn is_index_not_found_error(err: &VersedexError) -> bool {
    err.is_index_not_found()
}

impl From<reqwest::Error> for VersedexError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            VersedexError::Timeout(err.to_string())
        } else if err.is_connect() {
            VersedexError::Connection(err.to_string())
        } else if err.is_decode() {
            VersedexError::Transport(format!("Malformed response: {}", err))
        } else {
            VersedexError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = VersedexError::Lifecycle("create failed".to_string());
        assert_eq!(error.to_string(), "Index lifecycle error: create failed");
    }

    #[test]
    fn test_error_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = VersedexError::from(io_error);

        match error {
            VersedexError::Io(_) => (),
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_index_not_found_classification() {
        let body = r#"{
            "error": {
                "root_cause": [{"type": "index_not_found_exception", "reason": "no such index [bible_verses]"}],
                "type": "index_not_found_exception",
                "reason": "no such index [bible_verses]",
                "index": "bible_verses"
            },
            "status": 404
        }"#;

        let error = VersedexError::from_response_body(404, body);
        assert!(is_index_not_found_error(&error));
        assert_eq!(error.to_string(), "Elasticsearch error (status 404): no such index [bible_verses]");
    }

    #[test]
    fn test_other_elastic_errors_are_not_not_found() {
        let body = r#"{"error":{"type":"resource_already_exists_exception","reason":"index [bible_verses/abc] already exists"},"status":400}"#;
        let error = VersedexError::from_response_body(400, body);
        assert!(!error.is_index_not_found());

        // A bare 404 without an error body is not classified as index-not-found
        let bare = VersedexError::from_response_body(404, "");
        assert!(!bare.is_index_not_found());
        assert_eq!(bare.to_string(), "Elasticsearch error (status 404): HTTP 404");

        assert!(!VersedexError::Connection("refused".into()).is_index_not_found());
    }

    #[test]
    fn test_connectivity_classification() {
        assert!(VersedexError::Connection("refused".into()).is_connectivity());
        assert!(VersedexError::Timeout("10s".into()).is_connectivity());
        assert!(!VersedexError::Transport("reset".into()).is_connectivity());
    }

    #[tokio::test]
    async fn test_reqwest_timeout_is_classified() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Hold the connection open without answering
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_secs(10)).await;
        });

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(300))
            .build()
            .unwrap();
        let err = client
            .get(format!("http://{}/", addr))
            .send()
            .await
            .unwrap_err();

        let error = VersedexError::from(err);
        assert!(matches!(error, VersedexError::Timeout(_)));
        assert!(error.is_connectivity());
    }
}
