//! Query service - free-text verse search
//!
//! A query is sent as a disjunction of a typo-tolerant match and a phrase match
//! on `text`; phrase matches carry the higher boost so they rank above
//! fuzzy-only matches. Hits come back in the engine's relevance order and are
//! never re-sorted.

use crate::elastic::{ElasticClient, SearchHit, SearchResponse};
use crate::error::{Result, VersedexError};
use crate::utils::{HIGHLIGHT_POST_TAG, HIGHLIGHT_PRE_TAG};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Number of hits returned when the caller does not ask for a size
pub const DEFAULT_RESULT_SIZE: usize = 10;

/// A ranked verse match, ready for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerseHit {
    /// Verse id of the matched document
    pub id: i64,

    /// Canonical reference, e.g. `Genesis 1:1`
    pub reference: String,

    /// Highlighted fragment, or the raw verse text when nothing was highlighted
    pub text: String,

    /// Book name from the document, not parsed from `reference`
    pub book: String,

    pub chapter: u32,
    pub verse: u32,

    /// Relevance score reported by the engine
    pub score: Option<f64>,
}

impl From<SearchHit> for VerseHit {
    fn from(hit: SearchHit) -> Self {
        let text = hit
            .fragment("text")
            .map(str::to_string)
            .unwrap_or_else(|| hit.source.text.clone());

        Self {
            id: hit.source.verse_id,
            reference: hit.source.reference,
            text,
            book: hit.source.book_name,
            chapter: hit.source.chapter,
            verse: hit.source.verse,
            score: hit.score,
        }
    }
}

/// Searches the verse index. Stateless apart from the shared client handle,
/// so it can serve concurrent queries.
#[derive(Debug, Clone)]
pub struct QueryService {
    client: ElasticClient,
    index_name: String,
}

impl QueryService {
    pub fn new(client: ElasticClient, index_name: &str) -> Self {
        Self {
            client,
            index_name: index_name.to_string(),
        }
    }

    /// Search with [`DEFAULT_RESULT_SIZE`]
    pub async fn search_default(&self, query: &str) -> Result<Vec<VerseHit>> {
        self.search(query, DEFAULT_RESULT_SIZE).await
    }

    /// Search for `query`, returning at most `size` hits in relevance order.
    ///
    /// A blank query returns no hits without contacting the index. Any
    /// connection, status or decoding failure is reported as
    /// [`VersedexError::SearchFailed`]; no matches is `Ok` with an empty list.
    pub async fn search(&self, query: &str, size: usize) -> Result<Vec<VerseHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        log::debug!("Searching {} for '{}' (size {})", self.index_name, query, size);

        let response = self
            .client
            .search(&self.index_name, &build_query(query, size))
            .await
            .map_err(|e| {
                log::error!("Error searching Elasticsearch: {}", e);
                VersedexError::SearchFailed(e.to_string())
            })?;

        let hits = map_hits(response);
        log::debug!("Found {} results for '{}'", hits.len(), query);
        Ok(hits)
    }

    /// Whether the search service answers a ping. Never fails.
    pub async fn check_status(&self) -> bool {
        self.client.ping().await
    }
}

/// Request body for `query`: fuzzy match (boost 2) or phrase match with slop 1
/// (boost 3), highlighting matched spans of `text`.
pub fn build_query(query: &str, size: usize) -> Value {
    json!({
        "size": size,
        "query": {
            "bool": {
                "should": [
                    {
                        "match": {
                            "text": {
                                "query": query,
                                "fuzziness": "AUTO",
                                "prefix_length": 1,
                                "fuzzy_transpositions": true,
                                "boost": 2
                            }
                        }
                    },
                    {
                        "match_phrase": {
                            "text": {
                                "query": query,
                                "slop": 1,
                                "boost": 3
                            }
                        }
                    }
                ],
                "minimum_should_match": 1
            }
        },
        "highlight": {
            "fields": {
                "text": {}
            },
            "pre_tags": [HIGHLIGHT_PRE_TAG],
            "post_tags": [HIGHLIGHT_POST_TAG]
        }
    })
}

/// Map hits to verse matches, preserving engine order
pub fn map_hits(response: SearchResponse) -> Vec<VerseHit> {
    response.hits.hits.into_iter().map(VerseHit::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_shape() {
        let body = build_query("beginning", 10);

        assert_eq!(body["size"], 10);
        let should = &body["query"]["bool"]["should"];
        assert_eq!(body["query"]["bool"]["minimum_should_match"], 1);

        let fuzzy = &should[0]["match"]["text"];
        assert_eq!(fuzzy["query"], "beginning");
        assert_eq!(fuzzy["fuzziness"], "AUTO");
        assert_eq!(fuzzy["prefix_length"], 1);
        assert_eq!(fuzzy["fuzzy_transpositions"], true);
        assert_eq!(fuzzy["boost"], 2);

        let phrase = &should[1]["match_phrase"]["text"];
        assert_eq!(phrase["slop"], 1);
        assert_eq!(phrase["boost"], 3);

        assert_eq!(body["highlight"]["pre_tags"][0], "<strong>");
        assert_eq!(body["highlight"]["post_tags"][0], "</strong>");
        assert!(body["highlight"]["fields"]["text"].is_object());
    }

    #[test]
    fn test_hits_keep_engine_order_and_fallback_text() {
        let response: SearchResponse = serde_json::from_str(
            r#"{"hits":{"total":{"value":2},"hits":[
                {"_id":"7","_score":1.5,
                 "_source":{"verse_id":7,"book_id":9,"book_name":"1 Samuel","chapter":3,"verse":10,
                            "text":"Speak, for your servant is listening.","reference":"1 Samuel 3:10"}},
                {"_id":"1","_score":4.0,
                 "_source":{"verse_id":1,"book_id":1,"book_name":"Genesis","chapter":1,"verse":1,
                            "text":"In the beginning","reference":"Genesis 1:1"},
                 "highlight":{"text":["In the <strong>beginning</strong>"]}}
            ]}}"#,
        )
        .unwrap();

        let hits = map_hits(response);
        assert_eq!(hits.len(), 2);

        // Engine order is kept even though the second score is higher
        assert_eq!(hits[0].id, 7);
        assert_eq!(hits[0].book, "1 Samuel");
        assert_eq!(hits[0].text, "Speak, for your servant is listening.");
        assert_eq!(hits[1].text, "In the <strong>beginning</strong>");
        assert_eq!(hits[1].reference, "Genesis 1:1");
    }

    #[tokio::test]
    async fn test_blank_query_skips_request() {
        let mut server = mockito::Server::new_async().await;
        let search = server
            .mock("POST", "/bible_verses/_search")
            .expect(0)
            .create_async()
            .await;

        let client = ElasticClient::new(&server.url(), std::time::Duration::from_secs(5)).unwrap();
        let service = QueryService::new(client, "bible_verses");

        assert!(service.search("   \t ", 10).await.unwrap().is_empty());
        search.assert_async().await;
    }
}
