//! services/api/src/services/init.rs
//!
//! The explicit startup phase: run once by the process entry point before the
//! server starts accepting traffic, never lazily from a request path.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use crate::services::ingestion::DocumentIngestionService;
use recallmind_core::ports::VectorStore;

pub struct InitializationService {
    vector: Arc<dyn VectorStore>,
    ingestion: Arc<DocumentIngestionService>,
    data_directory: PathBuf,
}

impl InitializationService {
    pub fn new(
        vector: Arc<dyn VectorStore>,
        ingestion: Arc<DocumentIngestionService>,
        data_directory: PathBuf,
    ) -> Self {
        Self {
            vector,
            ingestion,
            data_directory,
        }
    }

    /// Ingests the data directory when the vector store is empty.
    ///
    /// Returns `false` when ingestion was needed but failed; the application
    /// still serves, just without retrieval context.
    pub async fn initialize(&self) -> bool {
        info!("Initializing RecallMind application");

        let is_empty = match self.vector.is_empty().await {
            Ok(is_empty) => is_empty,
            Err(e) => {
                error!("Could not query the vector store during startup: {}", e);
                return false;
            }
        };

        if !is_empty {
            info!("Vector store already contains data, skipping ingestion");
            return true;
        }

        info!("Vector store is empty, starting automatic data ingestion");
        let success = self.ingestion.ingest_or_bootstrap(&self.data_directory).await;
        if success {
            info!("Startup data ingestion completed");
        } else {
            error!("Startup data ingestion failed; continuing with an empty store");
        }
        success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryVectorStore;
    use recallmind_core::domain::DocumentChunk;

    #[tokio::test]
    async fn initialize_ingests_into_an_empty_store() {
        let parent = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryVectorStore::new());
        let ingestion =
            Arc::new(DocumentIngestionService::new(store.clone(), 200, 20).unwrap());
        let init =
            InitializationService::new(store.clone(), ingestion, parent.path().join("data"));

        assert!(init.initialize().await);
        assert!(!store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn initialize_skips_a_populated_store() {
        let parent = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryVectorStore::new());
        store
            .add(vec![DocumentChunk {
                content: "already here".to_string(),
                source: "seed.md".to_string(),
            }])
            .await
            .unwrap();

        let ingestion =
            Arc::new(DocumentIngestionService::new(store.clone(), 200, 20).unwrap());
        let data_dir = parent.path().join("data");
        let init = InitializationService::new(store.clone(), ingestion, data_dir.clone());

        assert!(init.initialize().await);
        // No bootstrap files were written.
        assert!(!data_dir.exists());
    }
}
