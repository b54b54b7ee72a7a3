use async_trait::async_trait;

use crate::errors::RetrievalError;

/// Converts free text into fixed-length dense vectors via a remote backend.
///
/// A failed call is fatal for the current retrieval attempt. Implementations
/// must never substitute a stale or zero vector, since that would silently
/// corrupt ranking.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider name (e.g. "azure-openai").
    fn name(&self) -> &str;

    /// Check if the backend is reachable.
    async fn health_check(&self) -> Result<bool, RetrievalError>;

    /// Generate one embedding per input, in input order.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError>;

    /// Embed a single text and return its vector.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        if vectors.is_empty() {
            return Err(RetrievalError::Embedding(
                "backend returned no vectors".into(),
            ));
        }
        Ok(vectors.swap_remove(0))
    }
}
