//! Embedder trait

use async_trait::async_trait;

use crate::Result;

/// Trait for text-embedding providers (e.g. the OpenAI embeddings API)
///
/// Embeddings are computed client-side and handed to the vector store, so
/// the store itself never needs to know which embedding model is in use.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, preserving input order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}
