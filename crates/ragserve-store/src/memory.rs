//! In-memory vector store

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use ragserve_core::{
    DistanceMetric, Error, Metadata, QueryHit, Result, VectorStore, normalize_batch,
};

struct StoredDocument {
    content: String,
    metadata: Metadata,
}

/// In-memory store with word-overlap similarity.
///
/// Stands in for the hosted store in tests and offline runs; distances are
/// reported as `1 - similarity` so they behave like cosine distances for
/// the scoring transform.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, StoredDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of query words contained in the content
    fn text_similarity(query: &str, content: &str) -> f32 {
        let content_lower = content.to_lowercase();
        let query_lower = query.to_lowercase();
        let query_words: Vec<&str> = query_lower.split_whitespace().collect();
        if query_words.is_empty() {
            return 0.0;
        }

        let matches = query_words
            .iter()
            .filter(|word| content_lower.contains(**word))
            .count();
        matches as f32 / query_words.len() as f32
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn add_documents(
        &self,
        documents: Vec<String>,
        metadatas: Option<Vec<Metadata>>,
        ids: Option<Vec<String>>,
    ) -> Result<()> {
        let batch = normalize_batch(documents, metadatas, ids)?;
        let mut docs = self
            .documents
            .write()
            .map_err(|e| Error::VectorStore(format!("lock poisoned: {e}")))?;
        for (id, content, metadata) in batch {
            docs.insert(id, StoredDocument { content, metadata });
        }
        Ok(())
    }

    async fn query(&self, text: &str, n_results: usize) -> Result<Option<Vec<QueryHit>>> {
        let docs = self
            .documents
            .read()
            .map_err(|e| Error::VectorStore(format!("lock poisoned: {e}")))?;
        if docs.is_empty() {
            return Ok(None);
        }

        let mut hits: Vec<QueryHit> = docs
            .values()
            .map(|doc| QueryHit {
                document: doc.content.clone(),
                metadata: doc.metadata.clone(),
                distance: Some(1.0 - Self::text_similarity(text, &doc.content)),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .unwrap_or(1.0)
                .total_cmp(&b.distance.unwrap_or(1.0))
        });
        hits.truncate(n_results.max(1));

        Ok(Some(hits))
    }

    async fn count(&self) -> Result<usize> {
        let docs = self
            .documents
            .read()
            .map_err(|e| Error::VectorStore(format!("lock poisoned: {e}")))?;
        Ok(docs.len())
    }

    fn metric(&self) -> DistanceMetric {
        DistanceMetric::Cosine
    }
}
