use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::EmbeddingConfig;
use crate::errors::RetrievalError;

use super::provider::EmbeddingProvider;

/// Azure OpenAI embedding deployment client.
#[derive(Clone)]
pub struct AzureOpenAiEmbeddings {
    client: Client,
    endpoint: String,
    deployment: String,
    api_key: String,
    api_version: String,
}

impl AzureOpenAiEmbeddings {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, RetrievalError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(RetrievalError::config)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            deployment: config.deployment.clone(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
        })
    }

    fn embeddings_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/embeddings?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}

#[async_trait]
impl EmbeddingProvider for AzureOpenAiEmbeddings {
    fn name(&self) -> &str {
        "azure-openai"
    }

    async fn health_check(&self) -> Result<bool, RetrievalError> {
        let url = format!(
            "{}/openai/deployments?api-version={}",
            self.endpoint, self.api_version
        );
        let res = self
            .client
            .get(&url)
            .header("api-key", &self.api_key)
            .send()
            .await;
        match res {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError> {
        let body = json!({ "input": inputs });

        let res = self
            .client
            .post(self.embeddings_url())
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(RetrievalError::embedding)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(RetrievalError::Embedding(format!(
                "backend returned {}: {}",
                status, text
            )));
        }

        let payload: Value = res.json().await.map_err(RetrievalError::embedding)?;
        parse_embedding_response(&payload)
    }
}

fn parse_embedding_response(payload: &Value) -> Result<Vec<Vec<f32>>, RetrievalError> {
    let mut embeddings = Vec::new();
    if let Some(data) = payload["data"].as_array() {
        for item in data {
            if let Some(vals) = item["embedding"].as_array() {
                let vector: Vec<f32> = vals
                    .iter()
                    .filter_map(|v| v.as_f64().map(|f| f as f32))
                    .collect();
                embeddings.push(vector);
            }
        }
    }

    if embeddings.is_empty() {
        return Err(RetrievalError::Embedding(
            "backend response contained no embeddings".into(),
        ));
    }

    Ok(embeddings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_embedding_response() {
        let payload = json!({
            "data": [
                { "embedding": [0.1, 0.2, 0.3] },
                { "embedding": [0.4, 0.5, 0.6] }
            ]
        });

        let vectors = parse_embedding_response(&payload).expect("parse");
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0].len(), 3);
        assert!((vectors[1][0] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_parse_embedding_response_empty_data() {
        let payload = json!({ "data": [] });
        assert!(matches!(
            parse_embedding_response(&payload),
            Err(RetrievalError::Embedding(_))
        ));
    }

    #[test]
    fn test_parse_embedding_response_missing_data() {
        let payload = json!({ "status": "failure" });
        assert!(parse_embedding_response(&payload).is_err());
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_embedding() {
        use crate::config::RetrieverConfig;

        let config = RetrieverConfig::from_env().expect("config from env");
        let provider = AzureOpenAiEmbeddings::new(&config.embedding).expect("client");
        let vector = provider.embed_one("hello").await.expect("embedding");
        assert!(!vector.is_empty());
    }
}
