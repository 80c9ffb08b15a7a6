//! Vector store trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Metadata attached to a stored document (e.g. source URL, entity name)
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A single similarity-search hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryHit {
    pub document: String,
    pub metadata: Metadata,
    /// Raw distance as reported by the store, in the store's metric.
    pub distance: Option<f32>,
}

/// Distance metric used by a vector store.
///
/// The relevance-score transform is tied to the metric: `1 - d` is only
/// meaningful for cosine distance in `[0, 1]` and does not generalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    Cosine,
    Euclidean,
}

impl DistanceMetric {
    /// Convert a raw distance into a display score, higher is better.
    pub fn relevance_score(&self, distance: f32) -> f32 {
        match self {
            DistanceMetric::Cosine => 1.0 - distance,
            DistanceMetric::Euclidean => 1.0 / (1.0 + distance.max(0.0)),
        }
    }

    /// The `hnsw:space` value Chroma expects for this metric.
    pub fn chroma_space(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "l2",
        }
    }
}

/// Trait for vector-similarity document stores (e.g. Chroma)
///
/// Documents are append-only: there is no update or delete path. Ids are
/// unique across the store and generated when the caller does not supply
/// them.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store a batch of documents with optional metadata and ids.
    ///
    /// Documents without an id get a random unique one; documents without
    /// metadata get an empty mapping. The whole batch is sent in one call.
    async fn add_documents(
        &self,
        documents: Vec<String>,
        metadatas: Option<Vec<Metadata>>,
        ids: Option<Vec<String>>,
    ) -> Result<()>;

    /// Similarity-search for up to `n_results` nearest neighbors.
    ///
    /// Returns `None` when the store holds no documents at all, as distinct
    /// from `Some(vec![])` for a query with no matches.
    async fn query(&self, text: &str, n_results: usize) -> Result<Option<Vec<QueryHit>>>;

    /// Total number of stored documents
    async fn count(&self) -> Result<usize>;

    /// The distance metric this store is configured with
    fn metric(&self) -> DistanceMetric;
}

/// Normalize an insertion batch: fill in generated ids and empty metadata,
/// and reject mismatched or empty-id batches before they reach the backend.
pub fn normalize_batch(
    documents: Vec<String>,
    metadatas: Option<Vec<Metadata>>,
    ids: Option<Vec<String>>,
) -> Result<Vec<(String, String, Metadata)>> {
    let ids = ids.unwrap_or_else(|| {
        documents
            .iter()
            .map(|_| Uuid::new_v4().to_string())
            .collect()
    });
    let metadatas =
        metadatas.unwrap_or_else(|| documents.iter().map(|_| Metadata::new()).collect());

    if ids.len() != documents.len() || metadatas.len() != documents.len() {
        return Err(Error::InvalidInput(format!(
            "batch length mismatch: {} documents, {} metadatas, {} ids",
            documents.len(),
            metadatas.len(),
            ids.len()
        )));
    }
    if ids.iter().any(|id| id.trim().is_empty()) {
        return Err(Error::InvalidInput(
            "document ids must be non-empty".to_string(),
        ));
    }

    Ok(ids
        .into_iter()
        .zip(documents)
        .zip(metadatas)
        .map(|((id, doc), meta)| (id, doc, meta))
        .collect())
}
