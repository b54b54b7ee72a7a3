use serde::{Deserialize, Serialize};

/// A document as stored in the search index.
///
/// `text_vector` is populated only by the provisioning path; query-time
/// projections never select it, so it stays `None` on retrieved hits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexDocument {
    /// Unique key within the index.
    pub chunk_id: String,
    /// Optional grouping key shared by chunks of the same parent document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Body text of the chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_vector: Option<Vec<f32>>,
}

/// One ranked result from a hybrid query, in index-assigned order.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub document: IndexDocument,
    /// Relevance score assigned by the index (higher = better).
    pub score: f32,
}

/// Options for a hybrid query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Fields matched by the lexical leg.
    pub search_fields: Vec<String>,
    /// Field compared by the vector leg.
    pub vector_field: String,
    /// Nearest neighbors requested for the vector leg. The token budget is
    /// enforced downstream by the assembler, not by narrowing retrieval.
    pub k_nearest: usize,
    /// Fields projected back. Vectors are never re-returned.
    pub select: Vec<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            search_fields: vec!["title".to_string(), "chunk".to_string()],
            vector_field: "text_vector".to_string(),
            k_nearest: 2,
            select: vec![
                "chunk_id".to_string(),
                "parent_id".to_string(),
                "chunk".to_string(),
                "title".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let options = SearchOptions::default();
        assert_eq!(options.search_fields, vec!["title", "chunk"]);
        assert_eq!(options.vector_field, "text_vector");
        assert_eq!(options.k_nearest, 2);
        assert!(!options.select.contains(&"text_vector".to_string()));
    }

    #[test]
    fn test_document_deserializes_with_missing_fields() {
        let doc: IndexDocument =
            serde_json::from_value(serde_json::json!({ "chunk_id": "7" })).expect("parse");
        assert_eq!(doc.chunk_id, "7");
        assert!(doc.chunk.is_none());
        assert!(doc.text_vector.is_none());
    }
}
