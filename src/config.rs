//! Configuration for the retrieval pipeline.
//!
//! Config can come from a TOML file (`RetrieverConfig::from_toml_file`) or
//! from the environment (`RetrieverConfig::from_env`, matching the variable
//! names the deployment scripts already export). Both paths validate before
//! returning.

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::RetrievalError;
use crate::search::SearchOptions;

fn default_source_name() -> String {
    "search-context".to_string()
}

fn default_embedding_api_version() -> String {
    "2023-05-15".to_string()
}

fn default_search_api_version() -> String {
    "2024-07-01".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Connection settings for the embedding deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub endpoint: String,
    pub api_key: String,
    /// Deployment name of the embedding model.
    pub deployment: String,
    #[serde(default = "default_embedding_api_version")]
    pub api_version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Connection settings for the search index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub endpoint: String,
    pub api_key: String,
    pub index_name: String,
    #[serde(default = "default_search_api_version")]
    pub api_version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Top-level configuration for a retrieval data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieverConfig {
    /// Name used to bind the data source in prompt templates.
    #[serde(default = "default_source_name")]
    pub name: String,
    pub embedding: EmbeddingConfig,
    pub search: SearchConfig,
    #[serde(default)]
    pub options: SearchOptions,
}

impl RetrieverConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, RetrievalError> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(RetrievalError::config)?;
        let config: Self = toml::from_str(&raw).map_err(RetrievalError::config)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from environment variables.
    ///
    /// Expects `AZURE_OPENAI_ENDPOINT`, `AZURE_OPENAI_API_KEY`,
    /// `AZURE_OPENAI_EMBEDDING_DEPLOYMENT_NAME`, `AZURE_SEARCH_ENDPOINT`,
    /// `AZURE_SEARCH_KEY` and `AZURE_SEARCH_INDEX`. `CONTEXT_SOURCE_NAME`
    /// is optional.
    pub fn from_env() -> Result<Self, RetrievalError> {
        let config = Self {
            name: env::var("CONTEXT_SOURCE_NAME").unwrap_or_else(|_| default_source_name()),
            embedding: EmbeddingConfig {
                endpoint: require_var("AZURE_OPENAI_ENDPOINT")?,
                api_key: require_var("AZURE_OPENAI_API_KEY")?,
                deployment: require_var("AZURE_OPENAI_EMBEDDING_DEPLOYMENT_NAME")?,
                api_version: default_embedding_api_version(),
                timeout_secs: default_timeout_secs(),
            },
            search: SearchConfig {
                endpoint: require_var("AZURE_SEARCH_ENDPOINT")?,
                api_key: require_var("AZURE_SEARCH_KEY")?,
                index_name: require_var("AZURE_SEARCH_INDEX")?,
                api_version: default_search_api_version(),
                timeout_secs: default_timeout_secs(),
            },
            options: SearchOptions::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would fail on first use.
    pub fn validate(&self) -> Result<(), RetrievalError> {
        if self.name.trim().is_empty() {
            return Err(RetrievalError::Config("data source name is empty".into()));
        }
        if self.embedding.endpoint.trim().is_empty() {
            return Err(RetrievalError::Config("embedding endpoint is empty".into()));
        }
        if self.embedding.api_key.trim().is_empty() {
            return Err(RetrievalError::Config("embedding api key is empty".into()));
        }
        if self.embedding.deployment.trim().is_empty() {
            return Err(RetrievalError::Config(
                "embedding deployment name is empty".into(),
            ));
        }
        if self.search.endpoint.trim().is_empty() {
            return Err(RetrievalError::Config("search endpoint is empty".into()));
        }
        if self.search.api_key.trim().is_empty() {
            return Err(RetrievalError::Config("search api key is empty".into()));
        }
        if self.search.index_name.trim().is_empty() {
            return Err(RetrievalError::Config("search index name is empty".into()));
        }
        if self.options.k_nearest == 0 {
            return Err(RetrievalError::Config(
                "k_nearest must be at least 1".into(),
            ));
        }
        if self.options.search_fields.is_empty() {
            return Err(RetrievalError::Config("search_fields is empty".into()));
        }
        if self.options.select.is_empty() {
            return Err(RetrievalError::Config("select is empty".into()));
        }
        Ok(())
    }
}

fn require_var(name: &str) -> Result<String, RetrievalError> {
    env::var(name)
        .map_err(|_| RetrievalError::Config(format!("missing environment variable {}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_config() -> RetrieverConfig {
        RetrieverConfig {
            name: "docs".to_string(),
            embedding: EmbeddingConfig {
                endpoint: "https://aoai.example.net".to_string(),
                api_key: "key-a".to_string(),
                deployment: "text-embedding-ada-002".to_string(),
                api_version: default_embedding_api_version(),
                timeout_secs: 30,
            },
            search: SearchConfig {
                endpoint: "https://search.example.net".to_string(),
                api_key: "key-b".to_string(),
                index_name: "idx-docs".to_string(),
                api_version: default_search_api_version(),
                timeout_secs: 30,
            },
            options: SearchOptions::default(),
        }
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_index() {
        let mut config = sample_config();
        config.search.index_name = String::new();
        assert!(matches!(
            config.validate(),
            Err(RetrievalError::Config(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_k() {
        let mut config = sample_config();
        config.options.k_nearest = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"
name = "docs"

[embedding]
endpoint = "https://aoai.example.net"
api_key = "key-a"
deployment = "text-embedding-ada-002"

[search]
endpoint = "https://search.example.net"
api_key = "key-b"
index_name = "idx-docs"

[options]
k_nearest = 4
"#
        )
        .expect("write config");

        let config = RetrieverConfig::from_toml_file(file.path()).expect("load config");
        assert_eq!(config.name, "docs");
        assert_eq!(config.embedding.api_version, default_embedding_api_version());
        assert_eq!(config.search.timeout_secs, 30);
        assert_eq!(config.options.k_nearest, 4);
        // Unset option fields fall back to defaults.
        assert_eq!(config.options.vector_field, "text_vector");
    }

    #[test]
    fn test_from_toml_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"
[embedding]
endpoint = ""
api_key = "key-a"
deployment = "d"

[search]
endpoint = "https://search.example.net"
api_key = "key-b"
index_name = "idx"
"#
        )
        .expect("write config");

        assert!(RetrieverConfig::from_toml_file(file.path()).is_err());
    }
}
