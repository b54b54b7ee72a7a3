//! Token-budgeted hybrid retrieval core.
//!
//! This crate turns a user query into a grounded context block:
//! - `embedding`: generates a dense vector for the query via a remote
//!   embedding deployment
//! - `search`: runs a hybrid (lexical + vector) query against a remote
//!   search index and streams ranked hits lazily, page by page
//! - `datasource`: assembles formatted fragments into a single string
//!   until a caller-supplied token budget is exhausted
//! - `provision`: one-shot helpers to create the index and upsert
//!   documents (offline job, never called from the retrieval path)
//!
//! The surrounding chat runtime owns prompt rendering and turn handling;
//! it only sees the `DataSource` trait and the `AssembledContext` it
//! returns.

pub mod config;
pub mod datasource;
pub mod embedding;
pub mod errors;
pub mod logging;
pub mod provision;
pub mod search;
pub mod tokenize;

pub use config::{EmbeddingConfig, RetrieverConfig, SearchConfig};
pub use datasource::{AssembledContext, DataSource, SearchDataSource};
pub use embedding::{AzureOpenAiEmbeddings, EmbeddingProvider};
pub use errors::RetrievalError;
pub use search::{
    AzureAiSearchClient, HitStream, HybridSearchClient, IndexDocument, SearchHit, SearchOptions,
};
pub use tokenize::{HeuristicTokenCounter, HfTokenCounter, TokenCounter};
