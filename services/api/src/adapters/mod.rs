pub mod chroma;
pub mod memory;

pub use chroma::ChromaVectorStore;
pub use memory::{
    MemoryCardReviewRepository, MemoryChatMessageRepository, MemoryDeckRepository,
    MemoryFlashcardRepository, MemoryStudySessionRepository, MemoryTestRepository,
    MemoryUserStatsRepository, MemoryVectorStore,
};
