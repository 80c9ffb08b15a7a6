//! Knowledge-store backends for ragserve
//!
//! This crate provides the text chunker, the Chroma HTTP adapter, the
//! OpenAI embeddings client, an in-memory store for tests and offline
//! runs, and the human-readable formatting of query results.

mod chroma;
mod chunker;
mod embeddings;
mod format;
mod memory;

pub use chroma::ChromaStore;
pub use chunker::chunk_text;
pub use embeddings::OpenAiEmbedder;
pub use format::format_query_results;
pub use memory::MemoryStore;

// Re-export core types for convenience
pub use ragserve_core::{
    DistanceMetric, Embedder, Error, Metadata, QueryHit, Result, VectorStore,
};
