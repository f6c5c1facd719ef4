//! Retrieval seams.
//!
//! The pipeline ends at [`Chunk`]s; what stores and searches them is behind
//! [`VectorIndex`], and what turns retrieved context into an answer is behind
//! [`ChatModel`]. Backends implement these against whichever embedding store
//! or model provider they talk to.

use async_trait::async_trait;

use crate::dedup::deduplicate;
use crate::split::Chunk;
use crate::types::PipelineError;

/// An embedding-backed store of chunks.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Embeds and stores the chunks.
    async fn index(&self, chunks: Vec<Chunk>) -> Result<(), PipelineError>;

    /// Returns up to `k` chunks most similar to `query`, best first.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Chunk>, PipelineError>;
}

/// A model that answers a prompt given already-formatted retrieved context.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &str, context: &str) -> Result<String, PipelineError>;
}

/// Searches the index and deduplicates the hits on trimmed content,
/// preserving the ranking of first occurrences.
pub async fn retrieve_deduplicated(
    index: &dyn VectorIndex,
    query: &str,
    k: usize,
) -> Result<Vec<Chunk>, PipelineError> {
    let hits = index.search(query, k).await?;
    Ok(deduplicate(&hits))
}
