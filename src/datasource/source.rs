use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Serialize;

use crate::embedding::EmbeddingProvider;
use crate::errors::RetrievalError;
use crate::search::{HybridSearchClient, SearchHit, SearchOptions};
use crate::tokenize::TokenCounter;

/// A rendered, token-bounded context block plus usage metadata.
///
/// `tokens_used <= token_budget` always holds. `truncated` is true iff at
/// least one candidate was rejected for budget reasons.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssembledContext {
    pub text: String,
    pub tokens_used: usize,
    pub truncated: bool,
}

/// Surface exposed to the prompt-rendering layer.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Identifier used for prompt template binding.
    fn name(&self) -> &str;

    /// Retrieve and assemble context for `query` within `token_budget`.
    async fn retrieve(
        &self,
        query: &str,
        token_budget: usize,
    ) -> Result<AssembledContext, RetrievalError>;
}

/// Data source backed by an embedding provider and a hybrid search index.
pub struct SearchDataSource {
    name: String,
    embeddings: Arc<dyn EmbeddingProvider>,
    search: Arc<dyn HybridSearchClient>,
    tokens: Arc<dyn TokenCounter>,
    options: SearchOptions,
}

impl SearchDataSource {
    pub fn new(
        name: impl Into<String>,
        embeddings: Arc<dyn EmbeddingProvider>,
        search: Arc<dyn HybridSearchClient>,
        tokens: Arc<dyn TokenCounter>,
    ) -> Self {
        Self {
            name: name.into(),
            embeddings,
            search,
            tokens,
            options: SearchOptions::default(),
        }
    }

    /// Override the default query options.
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Wrap a hit in the delimiting marker the prompt renderer recognizes.
    fn format_document(hit: &SearchHit) -> String {
        let chunk = hit.document.chunk.as_deref().unwrap_or("");
        let title = hit.document.title.as_deref().unwrap_or("");
        format!("<context>{}\n Citation title:{}.</context>", chunk, title)
    }
}

#[async_trait]
impl DataSource for SearchDataSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn retrieve(
        &self,
        query: &str,
        token_budget: usize,
    ) -> Result<AssembledContext, RetrievalError> {
        // Blank input short-circuits before any network call.
        if query.trim().is_empty() {
            return Ok(AssembledContext::default());
        }

        let vector = self.embeddings.embed_one(query).await?;
        let mut hits = self.search.search(query, vector, &self.options).await?;

        let mut text = String::new();
        let mut tokens_used = 0;
        let mut truncated = false;

        while let Some(hit) = hits.next().await {
            let hit = hit?;
            let fragment = Self::format_document(&hit);
            let fragment_tokens = self.tokens.count(&fragment);

            // Whole candidates only: an oversized fragment is dropped,
            // never cut, so a citation can't be severed mid-token.
            if tokens_used + fragment_tokens > token_budget {
                truncated = true;
                break;
            }

            text.push_str(&fragment);
            tokens_used += fragment_tokens;
            tracing::debug!(
                chunk_id = %hit.document.chunk_id,
                fragment_tokens,
                tokens_used,
                "appended context fragment"
            );
        }

        Ok(AssembledContext {
            text,
            tokens_used,
            truncated,
        })
    }
}
