//! Chroma HTTP adapter
//!
//! Thin client over Chroma's REST API. The store is a black box to us:
//! documents go in with client-side embeddings, similarity search comes
//! back as parallel arrays of documents, metadata and distances.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::OnceCell;

use ragserve_core::{
    DistanceMetric, Embedder, Error, Metadata, QueryHit, Result, VectorStore, normalize_batch,
};

pub const DEFAULT_COLLECTION: &str = "knowledge_base";

/// Vector store backed by a Chroma server
pub struct ChromaStore<E: Embedder> {
    client: Client,
    base_url: String,
    collection_name: String,
    collection_id: OnceCell<String>,
    embedder: Arc<E>,
    metric: DistanceMetric,
}

#[derive(Deserialize)]
struct CollectionResponse {
    id: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    documents: Option<Vec<Vec<Option<String>>>>,
    metadatas: Option<Vec<Vec<Option<Metadata>>>>,
    distances: Option<Vec<Vec<Option<f32>>>>,
}

impl<E: Embedder> ChromaStore<E> {
    /// Connect to a Chroma instance at `host:port`
    pub fn new(host: &str, port: u16, embedder: Arc<E>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: format!("http://{host}:{port}/api/v1"),
            collection_name: DEFAULT_COLLECTION.to_string(),
            collection_id: OnceCell::new(),
            embedder,
            metric: DistanceMetric::Cosine,
        })
    }

    /// Override the collection name
    pub fn with_collection(mut self, name: impl Into<String>) -> Self {
        self.collection_name = name.into();
        self
    }

    /// Resolve (and lazily create) the collection, caching its id
    async fn collection_id(&self) -> Result<&str> {
        self.collection_id
            .get_or_try_init(|| async {
                let response = self
                    .client
                    .post(format!("{}/collections", self.base_url))
                    .json(&json!({
                        "name": self.collection_name,
                        "metadata": { "hnsw:space": self.metric.chroma_space() },
                        "get_or_create": true,
                    }))
                    .send()
                    .await
                    .map_err(|e| Error::Network(e.to_string()))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "unknown error".to_string());
                    return Err(Error::VectorStore(format!(
                        "collection lookup failed with status {status}: {body}"
                    )));
                }

                let collection: CollectionResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::VectorStore(e.to_string()))?;
                Ok(collection.id)
            })
            .await
            .map(String::as_str)
    }
}

#[async_trait]
impl<E: Embedder + 'static> VectorStore for ChromaStore<E> {
    async fn add_documents(
        &self,
        documents: Vec<String>,
        metadatas: Option<Vec<Metadata>>,
        ids: Option<Vec<String>>,
    ) -> Result<()> {
        let batch = normalize_batch(documents, metadatas, ids)?;
        if batch.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = batch.iter().map(|(_, doc, _)| doc.clone()).collect();
        let embeddings = self.embedder.embed(&texts).await?;

        let collection_id = self.collection_id().await?;
        let response = self
            .client
            .post(format!("{}/collections/{collection_id}/add", self.base_url))
            .json(&json!({
                "ids": batch.iter().map(|(id, _, _)| id).collect::<Vec<_>>(),
                "documents": texts,
                "metadatas": batch.iter().map(|(_, _, meta)| meta).collect::<Vec<_>>(),
                "embeddings": embeddings,
            }))
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(Error::VectorStore(format!(
                "insert failed with status {status}: {body}"
            )));
        }

        tracing::debug!(count = texts.len(), "documents inserted");
        Ok(())
    }

    async fn query(&self, text: &str, n_results: usize) -> Result<Option<Vec<QueryHit>>> {
        let total = self.count().await?;
        if total == 0 {
            return Ok(None);
        }

        let embeddings = self.embedder.embed(&[text.to_string()]).await?;
        let collection_id = self.collection_id().await?;
        let response = self
            .client
            .post(format!(
                "{}/collections/{collection_id}/query",
                self.base_url
            ))
            .json(&json!({
                "query_embeddings": embeddings,
                "n_results": n_results.max(1).min(total),
                "include": ["documents", "metadatas", "distances"],
            }))
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(Error::VectorStore(format!(
                "query failed with status {status}: {body}"
            )));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::VectorStore(e.to_string()))?;

        // Chroma returns one row of parallel arrays per query embedding.
        let documents = parsed
            .documents
            .and_then(|rows| rows.into_iter().next())
            .unwrap_or_default();
        let mut metadatas = parsed
            .metadatas
            .and_then(|rows| rows.into_iter().next())
            .unwrap_or_default();
        let mut distances = parsed
            .distances
            .and_then(|rows| rows.into_iter().next())
            .unwrap_or_default();
        metadatas.resize(documents.len(), None);
        distances.resize(documents.len(), None);

        let hits = documents
            .into_iter()
            .zip(metadatas)
            .zip(distances)
            .map(|((document, metadata), distance)| QueryHit {
                document: document.unwrap_or_default(),
                metadata: metadata.unwrap_or_default(),
                distance,
            })
            .collect();

        Ok(Some(hits))
    }

    async fn count(&self) -> Result<usize> {
        let collection_id = self.collection_id().await?;
        let response = self
            .client
            .get(format!(
                "{}/collections/{collection_id}/count",
                self.base_url
            ))
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::VectorStore(format!(
                "count failed with status {status}"
            )));
        }

        response
            .json::<usize>()
            .await
            .map_err(|e| Error::VectorStore(e.to_string()))
    }

    fn metric(&self) -> DistanceMetric {
        self.metric
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![0.0, 1.0]).collect())
        }
    }

    fn store_for(server: &MockServer) -> ChromaStore<StubEmbedder> {
        let uri = server.uri();
        let address = uri.strip_prefix("http://").unwrap();
        let (host, port) = address.split_once(':').unwrap();
        ChromaStore::new(host, port.parse().unwrap(), Arc::new(StubEmbedder)).unwrap()
    }

    async fn mount_collection(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/v1/collections"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "col-1",
                "name": DEFAULT_COLLECTION,
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_query_on_empty_collection_returns_empty_signal() {
        let server = MockServer::start().await;
        mount_collection(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v1/collections/col-1/count"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(0)))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let result = store.query("anything", 4).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_query_parses_parallel_arrays() {
        let server = MockServer::start().await;
        mount_collection(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v1/collections/col-1/count"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(2)))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/collections/col-1/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [["first doc", "second doc"]],
                "metadatas": [[{"source": "a"}, null]],
                "distances": [[0.2, 0.5]],
            })))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let hits = store.query("question", 2).await.unwrap().unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document, "first doc");
        assert_eq!(hits[0].metadata["source"], "a");
        assert_eq!(hits[0].distance, Some(0.2));
        assert!(hits[1].metadata.is_empty());
    }

    #[tokio::test]
    async fn test_add_documents_posts_one_batch() {
        let server = MockServer::start().await;
        mount_collection(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/v1/collections/col-1/add"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!(true)))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server);
        store
            .add_documents(
                vec!["doc one".to_string(), "doc two".to_string()],
                None,
                None,
            )
            .await
            .unwrap();
    }
}
