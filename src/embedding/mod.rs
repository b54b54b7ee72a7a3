//! Embedding generation against a remote deployment.

mod azure;
mod provider;

pub use azure::AzureOpenAiEmbeddings;
pub use provider::EmbeddingProvider;
