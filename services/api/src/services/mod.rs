pub mod ai;
pub mod deck;
pub mod flashcard;
pub mod ingestion;
pub mod init;
pub mod study;
pub mod testing;

pub use ai::AiService;
pub use deck::DeckService;
pub use flashcard::FlashcardService;
pub use ingestion::DocumentIngestionService;
pub use init::InitializationService;
pub use study::StudyService;
pub use testing::TestService;
