//! Hybrid (lexical + vector) search against a remote index.
//!
//! The index fuses keyword relevance and vector similarity into one ranked
//! result set; this module never re-ranks. Results come back as a lazily
//! paged stream so the assembler can stop reading the moment its token
//! budget is spent.

mod client;
mod types;

pub use client::{AzureAiSearchClient, HitStream, HybridSearchClient};
pub use types::{IndexDocument, SearchHit, SearchOptions};
