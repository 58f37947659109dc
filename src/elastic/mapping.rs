//! Index settings and mappings for the verse index
//!
//! `text` is analyzed with a language-specific pipeline (standard tokenizer,
//! lowercase, stemmer, stop words) and keeps a `keyword` sub-field for exact
//! matching. Book names and references are exact-match keywords.

use serde_json::{Value, json};

/// Name of the custom analyzer for `language`
pub fn analyzer_name(language: &str) -> String {
    format!("{}_analyzer", language)
}

/// Analysis settings for `language` (e.g. `russian`, `english`)
pub fn analysis_settings(language: &str) -> Value {
    let analyzer = analyzer_name(language);
    let stemmer = format!("{}_stemmer", language);
    let stop = format!("{}_stop", language);

    json!({
        "analysis": {
            "analyzer": {
                analyzer: {
                    "type": "custom",
                    "tokenizer": "standard",
                    "filter": ["lowercase", stemmer.clone(), stop.clone()]
                }
            },
            "filter": {
                stop: {
                    "type": "stop",
                    "stopwords": format!("_{}_", language)
                },
                stemmer: {
                    "type": "stemmer",
                    "language": language
                }
            }
        }
    })
}

/// Field mappings of the verse document
pub fn verse_mappings(language: &str) -> Value {
    json!({
        "properties": {
            "verse_id": { "type": "integer" },
            "book_id": { "type": "integer" },
            "book_name": { "type": "keyword" },
            "chapter": { "type": "integer" },
            "verse": { "type": "integer" },
            "text": {
                "type": "text",
                "analyzer": analyzer_name(language),
                "fields": {
                    "keyword": { "type": "keyword" }
                }
            },
            "reference": { "type": "keyword" }
        }
    })
}

/// Complete `PUT /{index}` body
pub fn index_config(language: &str) -> Value {
    json!({
        "settings": analysis_settings(language),
        "mappings": verse_mappings(language)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_russian_analyzer_pipeline() {
        let config = index_config("russian");

        let analyzer = &config["settings"]["analysis"]["analyzer"]["russian_analyzer"];
        assert_eq!(analyzer["type"], "custom");
        assert_eq!(analyzer["tokenizer"], "standard");
        assert_eq!(
            analyzer["filter"],
            json!(["lowercase", "russian_stemmer", "russian_stop"])
        );

        let filters = &config["settings"]["analysis"]["filter"];
        assert_eq!(filters["russian_stop"]["stopwords"], "_russian_");
        assert_eq!(filters["russian_stemmer"]["language"], "russian");
    }

    #[test]
    fn test_field_types() {
        let config = index_config("english");
        let properties = &config["mappings"]["properties"];

        for field in ["verse_id", "book_id", "chapter", "verse"] {
            assert_eq!(properties[field]["type"], "integer", "field {}", field);
        }
        assert_eq!(properties["book_name"]["type"], "keyword");
        assert_eq!(properties["reference"]["type"], "keyword");
        assert_eq!(properties["text"]["type"], "text");
        assert_eq!(properties["text"]["analyzer"], "english_analyzer");
        assert_eq!(properties["text"]["fields"]["keyword"]["type"], "keyword");
    }
}
