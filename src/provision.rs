//! One-shot index provisioning.
//!
//! Offline collaborator of the retrieval core: creates the index if absent
//! and upserts documents with precomputed embeddings. Nothing here is
//! invoked from the retrieval path, which treats the index as read-only.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use crate::config::SearchConfig;
use crate::errors::RetrievalError;
use crate::search::IndexDocument;

/// Creates the index schema and bulk-loads documents.
pub struct IndexProvisioner {
    client: Client,
    endpoint: String,
    index_name: String,
    api_key: String,
    api_version: String,
    /// Dimensionality of the vector field, matching the embedding backend.
    dimensions: usize,
}

impl IndexProvisioner {
    pub fn new(config: &SearchConfig, dimensions: usize) -> Result<Self, RetrievalError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(RetrievalError::config)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            index_name: config.index_name.clone(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            dimensions,
        })
    }

    /// Create the index if it does not exist yet.
    ///
    /// A concurrent creation racing us reports a conflict; that is treated
    /// as success.
    pub async fn create_index_if_not_exists(&self) -> Result<(), RetrievalError> {
        let url = format!(
            "{}/indexes/{}?api-version={}",
            self.endpoint, self.index_name, self.api_version
        );
        let definition = index_definition(&self.index_name, self.dimensions);

        let res = self
            .client
            .put(&url)
            .header("api-key", &self.api_key)
            .json(&definition)
            .send()
            .await
            .map_err(RetrievalError::search)?;

        if res.status().is_success() || res.status() == StatusCode::CONFLICT {
            tracing::info!(index = %self.index_name, "index ready");
            return Ok(());
        }

        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        Err(RetrievalError::Search(format!(
            "index creation failed ({}): {}",
            status, text
        )))
    }

    /// Upsert a batch of documents with their embeddings.
    pub async fn upsert_documents(&self, documents: &[IndexDocument]) -> Result<(), RetrievalError> {
        if documents.is_empty() {
            return Ok(());
        }

        let url = format!(
            "{}/indexes/{}/docs/index?api-version={}",
            self.endpoint, self.index_name, self.api_version
        );
        let actions: Vec<Value> = documents
            .iter()
            .map(upsert_action)
            .collect::<Result<_, _>>()?;
        let body = json!({ "value": actions });

        let res = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(RetrievalError::search)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(RetrievalError::Search(format!(
                "document upsert failed ({}): {}",
                status, text
            )));
        }

        tracing::info!(count = documents.len(), "documents upserted");
        Ok(())
    }
}

fn upsert_action(document: &IndexDocument) -> Result<Value, RetrievalError> {
    let mut value = serde_json::to_value(document).map_err(RetrievalError::search)?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("@search.action".to_string(), json!("mergeOrUpload"));
    }
    Ok(value)
}

fn index_definition(name: &str, dimensions: usize) -> Value {
    json!({
        "name": name,
        "fields": [
            { "name": "chunk_id", "type": "Edm.String", "key": true, "filterable": true, "sortable": true },
            { "name": "parent_id", "type": "Edm.String", "filterable": true },
            { "name": "chunk", "type": "Edm.String", "searchable": true },
            { "name": "title", "type": "Edm.String", "searchable": true },
            {
                "name": "text_vector",
                "type": "Collection(Edm.Single)",
                "searchable": true,
                "dimensions": dimensions,
                "vectorSearchProfile": "vector-profile"
            }
        ],
        "vectorSearch": {
            "algorithms": [{ "name": "hnsw-config", "kind": "hnsw" }],
            "profiles": [{ "name": "vector-profile", "algorithm": "hnsw-config" }]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_definition_schema() {
        let definition = index_definition("idx-docs", 1536);
        assert_eq!(definition["name"], "idx-docs");

        let fields = definition["fields"].as_array().expect("fields");
        let names: Vec<&str> = fields
            .iter()
            .filter_map(|f| f["name"].as_str())
            .collect();
        assert_eq!(names, ["chunk_id", "parent_id", "chunk", "title", "text_vector"]);

        let vector_field = &fields[4];
        assert_eq!(vector_field["dimensions"], 1536);
        assert_eq!(vector_field["vectorSearchProfile"], "vector-profile");
    }

    #[test]
    fn test_upsert_action_payload() {
        let document = IndexDocument {
            chunk_id: "1".to_string(),
            parent_id: None,
            chunk: Some("body".to_string()),
            title: Some("Doc1".to_string()),
            text_vector: Some(vec![0.1, 0.2]),
        };

        let action = upsert_action(&document).expect("action");
        assert_eq!(action["@search.action"], "mergeOrUpload");
        assert_eq!(action["chunk_id"], "1");
        assert_eq!(action["chunk"], "body");
        // Unset optional fields are omitted, not sent as null.
        assert!(action.get("parent_id").is_none());
    }
}
