//! services/api/src/adapters/chroma.rs
//!
//! This module contains the vector store adapter, the concrete implementation
//! of the `VectorStore` port from the `core` crate. It talks to a Chroma
//! instance over its REST API and obtains embeddings from an OpenAI-compatible
//! endpoint (Ollama's `/v1` in the default configuration).
//!
//! Every outbound call is bounded: the HTTP client carries a request timeout
//! and embedding calls are wrapped in `tokio::time::timeout`. Callers decide
//! how to degrade on `PortError::Adapter`.

use async_openai::{config::OpenAIConfig, types::embeddings::CreateEmbeddingRequestArgs, Client};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use recallmind_core::domain::{DocumentChunk, VectorSearchResult};
use recallmind_core::ports::{PortError, PortResult, VectorStore};

//=========================================================================================
// Wire Types (Chroma REST API)
//=========================================================================================

#[derive(Serialize)]
struct CreateCollectionRequest<'a> {
    name: &'a str,
    get_or_create: bool,
}

#[derive(Deserialize)]
struct CollectionResponse {
    id: String,
}

#[derive(Serialize)]
struct AddRequest {
    ids: Vec<String>,
    embeddings: Vec<Vec<f32>>,
    documents: Vec<String>,
    metadatas: Vec<ChunkMetadata>,
}

#[derive(Serialize, Deserialize)]
struct ChunkMetadata {
    source: String,
}

#[derive(Serialize)]
struct QueryRequest {
    query_embeddings: Vec<Vec<f32>>,
    n_results: usize,
    include: Vec<&'static str>,
}

/// Chroma nests one result list per query embedding; we always send one.
#[derive(Deserialize)]
struct QueryResponse {
    documents: Option<Vec<Vec<String>>>,
    metadatas: Option<Vec<Vec<Option<ChunkMetadata>>>>,
    distances: Option<Vec<Vec<f64>>>,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A vector store adapter backed by Chroma with external embeddings.
pub struct ChromaVectorStore {
    http: reqwest::Client,
    embeddings: Client<OpenAIConfig>,
    base_url: String,
    collection_name: String,
    embedding_model: String,
    timeout: Duration,
    /// Collection id resolved on first use; cleared again by `clear()`.
    collection_id: RwLock<Option<String>>,
}

impl ChromaVectorStore {
    /// Creates a new `ChromaVectorStore`. Fails only if the HTTP client
    /// cannot be constructed.
    pub fn new(
        chroma_url: &str,
        collection_name: &str,
        embeddings_url: &str,
        embedding_model: &str,
        timeout: Duration,
    ) -> PortResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Adapter(format!("Failed to build HTTP client: {}", e)))?;

        // Ollama ignores the API key but the client requires one.
        let embeddings_config = OpenAIConfig::new()
            .with_api_base(embeddings_url)
            .with_api_key("ollama");

        Ok(Self {
            http,
            embeddings: Client::with_config(embeddings_config),
            base_url: chroma_url.trim_end_matches('/').to_string(),
            collection_name: collection_name.to_string(),
            embedding_model: embedding_model.to_string(),
            timeout,
            collection_id: RwLock::new(None),
        })
    }

    /// Resolves (and caches) the collection id, creating the collection if it
    /// does not exist yet.
    async fn collection_id(&self) -> PortResult<String> {
        if let Some(id) = self.collection_id.read().await.clone() {
            return Ok(id);
        }

        let response = self
            .http
            .post(format!("{}/api/v1/collections", self.base_url))
            .json(&CreateCollectionRequest {
                name: &self.collection_name,
                get_or_create: true,
            })
            .send()
            .await
            .map_err(|e| PortError::Adapter(format!("Chroma collection request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| PortError::Adapter(format!("Chroma collection request failed: {}", e)))?;

        let collection: CollectionResponse = response
            .json()
            .await
            .map_err(|e| PortError::Adapter(format!("Invalid Chroma collection response: {}", e)))?;

        *self.collection_id.write().await = Some(collection.id.clone());
        Ok(collection.id)
    }

    /// Embeds a batch of texts through the OpenAI-compatible endpoint.
    async fn embed(&self, texts: Vec<String>) -> PortResult<Vec<Vec<f32>>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.embedding_model)
            .input(texts)
            .build()
            .map_err(|e| PortError::Adapter(format!("Failed to build embedding request: {}", e)))?;

        let response = tokio::time::timeout(self.timeout, self.embeddings.embeddings().create(request))
            .await
            .map_err(|_| PortError::Adapter("Embedding request timed out".to_string()))?
            .map_err(|e| PortError::Adapter(format!("Embedding request failed: {}", e)))?;

        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }
}

//=========================================================================================
// `VectorStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl VectorStore for ChromaVectorStore {
    async fn search(&self, query: &str, limit: usize) -> PortResult<Vec<VectorSearchResult>> {
        let collection_id = self.collection_id().await?;
        let mut query_embeddings = self.embed(vec![query.to_string()]).await?;
        let Some(query_embedding) = query_embeddings.pop() else {
            return Err(PortError::Adapter(
                "Embedding endpoint returned no vectors".to_string(),
            ));
        };

        let response = self
            .http
            .post(format!(
                "{}/api/v1/collections/{}/query",
                self.base_url, collection_id
            ))
            .json(&QueryRequest {
                query_embeddings: vec![query_embedding],
                n_results: limit,
                include: vec!["documents", "metadatas", "distances"],
            })
            .send()
            .await
            .map_err(|e| PortError::Adapter(format!("Chroma query failed: {}", e)))?
            .error_for_status()
            .map_err(|e| PortError::Adapter(format!("Chroma query failed: {}", e)))?;

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| PortError::Adapter(format!("Invalid Chroma query response: {}", e)))?;

        let documents = body.documents.and_then(|mut d| d.pop()).unwrap_or_default();
        let mut metadatas = body.metadatas.and_then(|mut m| m.pop()).unwrap_or_default();
        let mut distances = body.distances.and_then(|mut d| d.pop()).unwrap_or_default();
        metadatas.resize_with(documents.len(), || None);
        distances.resize(documents.len(), 0.0);

        let results = documents
            .into_iter()
            .zip(metadatas)
            .zip(distances)
            .map(|((content, metadata), distance)| VectorSearchResult {
                content,
                source: metadata.map(|m| m.source),
                // Distances are unbounded above; 1/(1+d) maps them into (0, 1].
                score: 1.0 / (1.0 + distance.max(0.0)),
            })
            .collect();

        Ok(results)
    }

    async fn add(&self, chunks: Vec<DocumentChunk>) -> PortResult<()> {
        if chunks.is_empty() {
            return Ok(());
        }
        let collection_id = self.collection_id().await?;

        let documents: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embed(documents.clone()).await?;
        if embeddings.len() != documents.len() {
            return Err(PortError::Adapter(format!(
                "Embedding endpoint returned {} vectors for {} documents",
                embeddings.len(),
                documents.len()
            )));
        }

        let request = AddRequest {
            ids: chunks.iter().map(|_| Uuid::new_v4().to_string()).collect(),
            embeddings,
            documents,
            metadatas: chunks
                .into_iter()
                .map(|c| ChunkMetadata { source: c.source })
                .collect(),
        };

        self.http
            .post(format!(
                "{}/api/v1/collections/{}/add",
                self.base_url, collection_id
            ))
            .json(&request)
            .send()
            .await
            .map_err(|e| PortError::Adapter(format!("Chroma add failed: {}", e)))?
            .error_for_status()
            .map_err(|e| PortError::Adapter(format!("Chroma add failed: {}", e)))?;

        Ok(())
    }

    async fn is_empty(&self) -> PortResult<bool> {
        // An unreachable or empty store reads as empty; the caller treats
        // that as "nothing ingested yet".
        let Ok(collection_id) = self.collection_id().await else {
            return Ok(true);
        };

        let count = self
            .http
            .get(format!(
                "{}/api/v1/collections/{}/count",
                self.base_url, collection_id
            ))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);

        match count {
            Ok(response) => {
                let n: u64 = response.json().await.map_err(|e| {
                    PortError::Adapter(format!("Invalid Chroma count response: {}", e))
                })?;
                Ok(n == 0)
            }
            Err(_) => Ok(true),
        }
    }

    async fn clear(&self) -> PortResult<()> {
        self.http
            .delete(format!(
                "{}/api/v1/collections/{}",
                self.base_url, self.collection_name
            ))
            .send()
            .await
            .map_err(|e| PortError::Adapter(format!("Chroma delete failed: {}", e)))?
            .error_for_status()
            .map_err(|e| PortError::Adapter(format!("Chroma delete failed: {}", e)))?;

        // The old id is gone with the collection; the next call recreates it.
        *self.collection_id.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_builds_clients_and_normalizes_base_url() {
        let store = ChromaVectorStore::new(
            "http://localhost:8000/",
            "recallmind",
            "http://localhost:11434/v1",
            "nomic-embed-text:latest",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(store.base_url, "http://localhost:8000");
        assert!(store.collection_id.try_read().unwrap().is_none());
    }
}
