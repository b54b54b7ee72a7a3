//! Offline provisioning job: create the index and load a document folder.
//!
//! Usage: `provision [data-dir]` with the same environment variables the
//! retrieval config reads. Each file in the data directory becomes one
//! document, embedded before upload.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use context_retriever::config::RetrieverConfig;
use context_retriever::embedding::{AzureOpenAiEmbeddings, EmbeddingProvider};
use context_retriever::logging;
use context_retriever::provision::IndexProvisioner;
use context_retriever::search::IndexDocument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = RetrieverConfig::from_env().context("loading configuration from environment")?;
    let data_dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));

    let embeddings = AzureOpenAiEmbeddings::new(&config.embedding)?;

    // Probe one embedding to learn the vector dimensionality the index
    // schema must declare.
    let probe = embeddings.embed_one("dimension probe").await?;
    let provisioner = IndexProvisioner::new(&config.search, probe.len())?;
    provisioner.create_index_if_not_exists().await?;

    let mut paths: Vec<PathBuf> = fs::read_dir(&data_dir)
        .with_context(|| format!("reading data directory {}", data_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let mut documents = Vec::new();
    for (i, path) in paths.iter().enumerate() {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(path = %path.display(), "skipping unreadable file: {}", err);
                continue;
            }
        };

        let title = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let vector = embeddings.embed_one(&content).await?;

        documents.push(IndexDocument {
            chunk_id: (i + 1).to_string(),
            parent_id: None,
            chunk: Some(content),
            title: Some(title),
            text_vector: Some(vector),
        });
    }

    provisioner.upsert_documents(&documents).await?;
    tracing::info!(
        index = %config.search.index_name,
        count = documents.len(),
        "provisioning complete"
    );

    Ok(())
}
