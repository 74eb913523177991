pub mod chunker;
pub mod domain;
pub mod ports;

pub use chunker::{split_text, ChunkError};
pub use domain::{
    CardReview, ChatMessage, ChatResponse, Deck, DifficultyLevel, DocumentChunk, Flashcard,
    QuizQuestion, ReviewDifficulty, SourceDocument, StudyProgress, StudySession, Test, TestType,
    UserStats, VectorSearchResult,
};
pub use ports::{
    CardReviewRepository, ChatMessageRepository, DeckRepository, FlashcardRepository, PortError,
    PortResult, StudySessionRepository, TestRepository, UserStatsRepository, VectorStore,
};
