//! services/api/src/services/ingestion.rs
//!
//! The document ingestion pipeline: loads markdown files from a directory,
//! splits them into overlapping chunks, and hands them to the vector store in
//! one batch write. Also owns the first-run bootstrap content and the
//! destructive re-ingestion path.
//!
//! Ingestion reports success as a boolean rather than an error: a missing
//! directory or an unreachable vector store degrades to `false` with a log
//! line, and the caller decides what to do about it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use recallmind_core::chunker::split_text;
use recallmind_core::domain::{DocumentChunk, SourceDocument};
use recallmind_core::ports::{PortError, PortResult, VectorStore};

/// Extension of ingestible source files.
const SOURCE_EXTENSION: &str = "md";

/// Fixed example content written on first run when no source data exists,
/// so the store is observable (and testable) out of the box.
const EXAMPLE_FILES: &[(&str, &str)] = &[
    (
        "welcome.md",
        "# Welcome to RecallMind\n\n\
         This is your personal study assistant powered by vector search.\n\n\
         ## Features\n\n\
         - Flashcard management: create and organize study decks\n\
         - Q&A over your notes: ask questions about your study materials\n\
         - Study sessions: track your learning progress and streaks\n\
         - Quiz generation: test your knowledge with generated quizzes\n\n\
         ## Getting started\n\n\
         1. Add your study materials as markdown files in this directory\n\
         2. Create flashcard decks in the application\n\
         3. Start studying and ask questions!\n",
    ),
    (
        "sample-notes.md",
        "# Sample Study Notes\n\n\
         ## Python Programming\n\n\
         ### Variables and Data Types\n\
         - String: text data enclosed in quotes\n\
         - Integer: whole numbers\n\
         - Float: decimal numbers\n\
         - Boolean: true or false values\n\n\
         ### Data Structures\n\
         - Lists: ordered, mutable collections\n\
         - Dictionaries: key-value pairs\n\
         - Tuples: ordered, immutable collections\n\n\
         ## Study Questions\n\n\
         1. What is the difference between a list and a tuple?\n\
         2. What are the main data types in Python?\n",
    ),
    (
        "mathematics.md",
        "# Mathematics Fundamentals\n\n\
         ## Algebra\n\n\
         A linear equation has the form ax + b = 0 where a and b are constants.\n\
         The quadratic formula is x = (-b \u{00b1} \u{221a}(b\u{00b2} - 4ac)) / 2a.\n\n\
         ## Geometry\n\n\
         - Rectangle area: length \u{00d7} width\n\
         - Circle area: \u{03c0}r\u{00b2}\n\
         - Triangle area: \u{00bd} \u{00d7} base \u{00d7} height\n",
    ),
];

pub struct DocumentIngestionService {
    vector: Arc<dyn VectorStore>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl DocumentIngestionService {
    /// Creates the pipeline, rejecting an unusable chunk configuration up
    /// front rather than on the first ingest.
    pub fn new(
        vector: Arc<dyn VectorStore>,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> PortResult<Self> {
        // Probe the configuration once; split_text carries the validation.
        split_text("", chunk_size, chunk_overlap)
            .map_err(|e| PortError::Validation(e.to_string()))?;
        Ok(Self {
            vector,
            chunk_size,
            chunk_overlap,
        })
    }

    /// Ingests every markdown file under `dir` into the vector store as one
    /// batch. Returns `false` when the directory is missing, holds no source
    /// files, or the store rejects the write.
    pub async fn ingest_from_directory(&self, dir: &Path) -> bool {
        if !dir.is_dir() {
            warn!(directory = %dir.display(), "Data directory does not exist");
            return false;
        }

        let files = find_source_files(dir);
        if files.is_empty() {
            warn!(directory = %dir.display(), "No markdown files found to ingest");
            return false;
        }

        let documents = match self.load_documents(&files).await {
            Ok(documents) => documents,
            Err(e) => {
                error!("Failed to load documents: {}", e);
                return false;
            }
        };
        info!(count = documents.len(), "Loaded documents");

        let mut chunks = Vec::new();
        for document in &documents {
            // The configuration was validated at construction.
            let Ok(pieces) = split_text(&document.content, self.chunk_size, self.chunk_overlap)
            else {
                continue;
            };
            chunks.extend(pieces.into_iter().map(|content| DocumentChunk {
                content,
                source: document.source.clone(),
            }));
        }
        info!(count = chunks.len(), "Split documents into chunks");

        match self.vector.add(chunks).await {
            Ok(()) => {
                info!("Documents successfully ingested into the vector store");
                true
            }
            Err(e) => {
                error!("Failed to ingest documents into the vector store: {}", e);
                false
            }
        }
    }

    /// Ingests `dir`, writing the fixed example documents first when the
    /// directory is absent or holds no source files.
    pub async fn ingest_or_bootstrap(&self, dir: &Path) -> bool {
        if !dir.is_dir() || find_source_files(dir).is_empty() {
            info!(directory = %dir.display(), "No source data found, creating example documents");
            if let Err(e) = write_example_files(dir).await {
                error!("Failed to create example documents: {}", e);
                return false;
            }
        }
        self.ingest_from_directory(dir).await
    }

    /// Clears the vector store, then ingests the current contents of `dir`.
    ///
    /// A clear failure is terminal: ingesting into a partially-cleared store
    /// would leave stale chunks mixed with fresh ones.
    pub async fn reingest(&self, dir: &Path) -> bool {
        info!("Starting data re-ingestion");
        if let Err(e) = self.vector.clear().await {
            error!("Failed to clear the vector store, aborting re-ingestion: {}", e);
            return false;
        }
        self.ingest_or_bootstrap(dir).await
    }

    async fn load_documents(&self, files: &[PathBuf]) -> std::io::Result<Vec<SourceDocument>> {
        let mut documents = Vec::with_capacity(files.len());
        for path in files {
            let content = tokio::fs::read_to_string(path).await?;
            documents.push(SourceDocument {
                content,
                source: path.display().to_string(),
            });
        }
        Ok(documents)
    }
}

/// Finds every markdown file under `dir`, recursively, in a stable order.
fn find_source_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let Ok(entries) = std::fs::read_dir(&current) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION) {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

async fn write_example_files(dir: &Path) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    for (name, content) in EXAMPLE_FILES {
        tokio::fs::write(dir.join(name), content).await?;
    }
    info!(count = EXAMPLE_FILES.len(), directory = %dir.display(), "Created example files");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryVectorStore;
    use async_trait::async_trait;
    use recallmind_core::domain::VectorSearchResult;

    /// A store whose destructive clear always fails, for the terminal-clear rule.
    struct ClearFailsStore {
        inner: MemoryVectorStore,
    }

    #[async_trait]
    impl VectorStore for ClearFailsStore {
        async fn search(&self, query: &str, limit: usize) -> PortResult<Vec<VectorSearchResult>> {
            self.inner.search(query, limit).await
        }
        async fn add(&self, chunks: Vec<DocumentChunk>) -> PortResult<()> {
            self.inner.add(chunks).await
        }
        async fn is_empty(&self) -> PortResult<bool> {
            self.inner.is_empty().await
        }
        async fn clear(&self) -> PortResult<()> {
            Err(PortError::Adapter("clear refused".to_string()))
        }
    }

    fn pipeline(store: Arc<dyn VectorStore>) -> DocumentIngestionService {
        DocumentIngestionService::new(store, 50, 10).unwrap()
    }

    #[tokio::test]
    async fn missing_directory_returns_false() {
        let store = Arc::new(MemoryVectorStore::new());
        let svc = pipeline(store.clone());
        assert!(!svc.ingest_from_directory(Path::new("/no/such/dir")).await);
        assert!(store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn directory_without_markdown_returns_false() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not markdown").unwrap();
        let store = Arc::new(MemoryVectorStore::new());
        let svc = pipeline(store.clone());
        assert!(!svc.ingest_from_directory(dir.path()).await);
        assert!(store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn ingest_loads_nested_markdown_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "alpha content").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/b.md"), "beta content").unwrap();
        std::fs::write(dir.path().join("skip.txt"), "ignored").unwrap();

        let store = Arc::new(MemoryVectorStore::new());
        let svc = pipeline(store.clone());
        assert!(svc.ingest_from_directory(dir.path()).await);

        assert!(!store.is_empty().await.unwrap());
        let hits = store.search("beta", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].source.as_deref().unwrap().ends_with("b.md"));
    }

    #[tokio::test]
    async fn bootstrap_creates_and_ingests_examples() {
        let parent = tempfile::tempdir().unwrap();
        let dir = parent.path().join("data");

        let store = Arc::new(MemoryVectorStore::new());
        let svc = pipeline(store.clone());
        assert!(svc.ingest_or_bootstrap(&dir).await);

        assert!(dir.join("welcome.md").exists());
        assert!(dir.join("sample-notes.md").exists());
        assert!(dir.join("mathematics.md").exists());
        assert!(!store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn reingest_replaces_prior_content() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("old.md"), "ancient wisdom").unwrap();

        let store = Arc::new(MemoryVectorStore::new());
        let svc = pipeline(store.clone());
        assert!(svc.ingest_from_directory(dir.path()).await);

        std::fs::remove_file(dir.path().join("old.md")).unwrap();
        std::fs::write(dir.path().join("new.md"), "fresh insight").unwrap();
        assert!(svc.reingest(dir.path()).await);

        assert!(store.search("ancient", 5).await.unwrap().is_empty());
        assert_eq!(store.search("fresh", 5).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reingest_aborts_when_clear_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("old.md"), "original content").unwrap();

        let inner = MemoryVectorStore::new();
        inner
            .add(vec![DocumentChunk {
                content: "original content".to_string(),
                source: "old.md".to_string(),
            }])
            .await
            .unwrap();
        let store = Arc::new(ClearFailsStore { inner });
        let svc = pipeline(store.clone());

        std::fs::write(dir.path().join("new.md"), "replacement").unwrap();
        assert!(!svc.reingest(dir.path()).await);

        // Nothing was ingested on top of the un-cleared store.
        assert!(store.search("replacement", 5).await.unwrap().is_empty());
        assert_eq!(store.search("original", 5).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn bad_chunk_configuration_fails_fast() {
        let store: Arc<dyn VectorStore> = Arc::new(MemoryVectorStore::new());
        let err = DocumentIngestionService::new(store, 100, 100).err().unwrap();
        assert!(matches!(err, PortError::Validation(_)));
    }
}
