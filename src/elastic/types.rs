//! Documents and wire types exchanged with Elasticsearch

use crate::storage::Verse;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Document stored in the verse index, one per verse
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexedDocument {
    pub verse_id: i64,
    pub book_id: i64,
    pub book_name: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,

    /// `"{book_name} {chapter}:{verse}"`, recomputed at index time
    pub reference: String,
}

impl From<&Verse> for IndexedDocument {
    fn from(verse: &Verse) -> Self {
        Self {
            verse_id: verse.verse_id,
            book_id: verse.book_id,
            book_name: verse.book_name.clone(),
            chapter: verse.chapter,
            verse: verse.verse,
            text: verse.text.clone(),
            reference: verse.reference(),
        }
    }
}

/// Response of `GET /`
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub cluster_name: Option<String>,

    #[serde(default)]
    pub version: Option<VersionInfo>,
}

impl ServerInfo {
    pub fn version_number(&self) -> &str {
        self.version
            .as_ref()
            .map(|v| v.number.as_str())
            .unwrap_or("unknown version")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionInfo {
    pub number: String,
}

/// Response of `POST /_bulk`
#[derive(Debug, Clone, Deserialize)]
pub struct BulkResponse {
    /// True when at least one item failed
    pub errors: bool,

    /// One entry per action, in request order. Each entry holds a single key
    /// naming the operation (`index`, `create`, ...).
    #[serde(default)]
    pub items: Vec<HashMap<String, BulkItemResult>>,
}

/// Outcome of a single bulk action
#[derive(Debug, Clone, Deserialize)]
pub struct BulkItemResult {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,

    pub status: u16,

    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl BulkItemResult {
    /// `"type: reason"` of the item error, if any
    pub fn error_summary(&self) -> Option<String> {
        let error = self.error.as_ref()?;
        let kind = error.get("type").and_then(|t| t.as_str());
        let reason = error.get("reason").and_then(|r| r.as_str());

        Some(match (kind, reason) {
            (Some(kind), Some(reason)) => format!("{}: {}", kind, reason),
            (Some(kind), None) => kind.to_string(),
            (None, Some(reason)) => reason.to_string(),
            (None, None) => error.to_string(),
        })
    }
}

/// Response of `POST /{index}/_search`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub hits: SearchHits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHits {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,

    #[serde(rename = "_score", default)]
    pub score: Option<f64>,

    #[serde(rename = "_source")]
    pub source: IndexedDocument,

    /// Highlighted fragments keyed by field name
    #[serde(default)]
    pub highlight: Option<HashMap<String, Vec<String>>>,
}

impl SearchHit {
    /// First highlighted fragment of `field`
    pub fn fragment(&self, field: &str) -> Option<&str> {
        self.highlight
            .as_ref()?
            .get(field)?
            .first()
            .map(String::as_str)
    }
}
