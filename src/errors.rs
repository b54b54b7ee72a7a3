use thiserror::Error;

/// Errors surfaced by the retrieval pipeline.
///
/// Empty queries and zero index matches are deliberately *not* errors:
/// both produce an empty, non-truncated context.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The embedding backend reported a non-success status or returned no
    /// vector. Never substituted with a stale or zero vector.
    #[error("embedding failed: {0}")]
    Embedding(String),
    /// The search index was unreachable or returned an error status.
    #[error("search failed: {0}")]
    Search(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("tokenizer error: {0}")]
    Tokenizer(String),
}

impl RetrievalError {
    pub fn embedding<E: std::fmt::Display>(err: E) -> Self {
        RetrievalError::Embedding(err.to_string())
    }

    pub fn search<E: std::fmt::Display>(err: E) -> Self {
        RetrievalError::Search(err.to_string())
    }

    pub fn config<E: std::fmt::Display>(err: E) -> Self {
        RetrievalError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RetrievalError::embedding("status 500");
        assert_eq!(err.to_string(), "embedding failed: status 500");

        let err = RetrievalError::search("connection refused");
        assert_eq!(err.to_string(), "search failed: connection refused");
    }
}
