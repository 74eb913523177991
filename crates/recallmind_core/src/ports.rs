//! crates/recallmind_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like storage backends
//! or the vector database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    CardReview, ChatMessage, Deck, DeckUpdate, DocumentChunk, Flashcard, FlashcardUpdate,
    SessionUpdate, StatsUpdate, StudySession, Test, TestUpdate, UserStats, VectorSearchResult,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., the
/// vector database, the embedding endpoint).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("External adapter failure: {0}")]
    Adapter(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Repository Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DeckRepository: Send + Sync {
    async fn get_all(&self) -> PortResult<Vec<Deck>>;
    async fn get_by_id(&self, deck_id: Uuid) -> PortResult<Option<Deck>>;
    async fn create(&self, deck: Deck) -> PortResult<Deck>;
    async fn update(&self, deck_id: Uuid, update: DeckUpdate) -> PortResult<Option<Deck>>;
    async fn delete(&self, deck_id: Uuid) -> PortResult<bool>;
}

#[async_trait]
pub trait FlashcardRepository: Send + Sync {
    async fn get_by_deck(&self, deck_id: Uuid) -> PortResult<Vec<Flashcard>>;
    async fn get_by_id(&self, card_id: Uuid) -> PortResult<Option<Flashcard>>;
    /// Every flashcard across all decks, in stable discovery order.
    async fn get_all(&self) -> PortResult<Vec<Flashcard>>;
    async fn create(&self, card: Flashcard) -> PortResult<Flashcard>;
    async fn update(&self, card_id: Uuid, update: FlashcardUpdate)
        -> PortResult<Option<Flashcard>>;
    async fn delete(&self, card_id: Uuid) -> PortResult<bool>;
}

#[async_trait]
pub trait StudySessionRepository: Send + Sync {
    async fn create(&self, session: StudySession) -> PortResult<StudySession>;
    async fn get_by_id(&self, session_id: Uuid) -> PortResult<Option<StudySession>>;
    async fn update(
        &self,
        session_id: Uuid,
        update: SessionUpdate,
    ) -> PortResult<Option<StudySession>>;
    /// Atomically moves an active session to its terminal state. `None` for
    /// an unknown session; a `Validation` error when the session has already
    /// ended. The check and the write happen under one lock, so two
    /// concurrent ends cannot both succeed.
    async fn end(
        &self,
        session_id: Uuid,
        end_time: DateTime<Utc>,
        duration: i64,
    ) -> PortResult<Option<StudySession>>;
}

#[async_trait]
pub trait CardReviewRepository: Send + Sync {
    async fn create(&self, review: CardReview) -> PortResult<CardReview>;
    async fn get_by_session(&self, session_id: Uuid) -> PortResult<Vec<CardReview>>;
}

#[async_trait]
pub trait TestRepository: Send + Sync {
    async fn create(&self, test: Test) -> PortResult<Test>;
    async fn get_by_id(&self, test_id: Uuid) -> PortResult<Option<Test>>;
    async fn get_by_deck(&self, deck_id: Uuid) -> PortResult<Vec<Test>>;
    async fn update(&self, test_id: Uuid, update: TestUpdate) -> PortResult<Option<Test>>;
}

#[async_trait]
pub trait ChatMessageRepository: Send + Sync {
    async fn create(&self, message: ChatMessage) -> PortResult<ChatMessage>;
    async fn get_all(&self) -> PortResult<Vec<ChatMessage>>;
}

#[async_trait]
pub trait UserStatsRepository: Send + Sync {
    async fn get(&self) -> PortResult<UserStats>;
    async fn update(&self, update: StatsUpdate) -> PortResult<UserStats>;
}

//=========================================================================================
// Vector Store Port
//=========================================================================================

/// The boundary to the external embeddings-backed vector database.
/// The core never inspects embedding internals; it hands over text and gets
/// back nearest-neighbor hits.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Nearest chunks for `query`, best first, at most `limit` results.
    async fn search(&self, query: &str, limit: usize) -> PortResult<Vec<VectorSearchResult>>;

    /// Adds a batch of chunks in one write.
    async fn add(&self, chunks: Vec<DocumentChunk>) -> PortResult<()>;

    /// Whether the store currently holds any chunks.
    async fn is_empty(&self) -> PortResult<bool>;

    /// Removes all stored chunks. Destructive and irreversible.
    async fn clear(&self) -> PortResult<()>;
}
