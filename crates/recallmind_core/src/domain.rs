//! crates/recallmind_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

//=========================================================================================
// Enums
//=========================================================================================

/// Difficulty tier declared on a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "beginner",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
        }
    }
}

impl std::str::FromStr for DifficultyLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(DifficultyLevel::Beginner),
            "intermediate" => Ok(DifficultyLevel::Intermediate),
            "advanced" => Ok(DifficultyLevel::Advanced),
            other => Err(ParseEnumError::new("difficulty level", other)),
        }
    }
}

/// The rating a user gives a card during review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDifficulty {
    Easy,
    Okay,
    Difficult,
}

impl ReviewDifficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewDifficulty::Easy => "easy",
            ReviewDifficulty::Okay => "okay",
            ReviewDifficulty::Difficult => "difficult",
        }
    }
}

impl std::str::FromStr for ReviewDifficulty {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(ReviewDifficulty::Easy),
            "okay" => Ok(ReviewDifficulty::Okay),
            "difficult" => Ok(ReviewDifficulty::Difficult),
            other => Err(ParseEnumError::new("review difficulty", other)),
        }
    }
}

/// The kind of knowledge test taken against a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestType {
    MultipleChoice,
    Flashcard,
}

impl TestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::MultipleChoice => "multiple-choice",
            TestType::Flashcard => "flashcard",
        }
    }
}

impl std::str::FromStr for TestType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "multiple-choice" => Ok(TestType::MultipleChoice),
            "flashcard" => Ok(TestType::Flashcard),
            other => Err(ParseEnumError::new("test type", other)),
        }
    }
}

/// Error returned when a string does not name a known enum variant.
#[derive(Debug, thiserror::Error)]
#[error("Invalid {kind}: '{value}'")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

//=========================================================================================
// Entities
//=========================================================================================

/// A named collection of flashcards.
#[derive(Debug, Clone)]
pub struct Deck {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub difficulty: DifficultyLevel,
    pub card_count: usize,
    pub created_at: DateTime<Utc>,
    pub last_studied: Option<DateTime<Utc>>,
}

/// One question/answer pair belonging to exactly one deck.
#[derive(Debug, Clone)]
pub struct Flashcard {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

/// A learning session against one deck.
///
/// Created in the active state; `end_time` being set makes it terminal.
#[derive(Debug, Clone)]
pub struct StudySession {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub cards_studied: usize,
    /// Elapsed wall-clock time in whole seconds, computed at end.
    pub duration: i64,
}

impl StudySession {
    pub fn is_ended(&self) -> bool {
        self.end_time.is_some()
    }
}

/// A user's rating of one card during a session. Append-only.
#[derive(Debug, Clone)]
pub struct CardReview {
    pub id: Uuid,
    pub session_id: Uuid,
    pub card_id: Uuid,
    pub difficulty: ReviewDifficulty,
    pub reviewed_at: DateTime<Utc>,
}

/// A graded knowledge test taken against a deck.
#[derive(Debug, Clone)]
pub struct Test {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub test_type: TestType,
    pub questions_count: usize,
    /// Percentage, 0..=100.
    pub score: u32,
    pub correct_answers: usize,
    pub total_questions: usize,
    /// In seconds.
    pub duration: i64,
    pub completed_at: DateTime<Utc>,
}

/// One answered question in the chat log. Append-only, immutable.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    /// Card ids used for context, in discovery order.
    pub relevant_cards: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Singleton aggregate of learning progress.
#[derive(Debug, Clone)]
pub struct UserStats {
    /// Consecutive calendar days with at least one ended study session.
    pub study_streak: u32,
    pub total_decks: usize,
    pub cards_studied: usize,
    /// Cumulative study time in seconds.
    pub study_time: i64,
    pub last_study_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            study_streak: 0,
            total_decks: 0,
            cards_studied: 0,
            study_time: 0,
            last_study_date: None,
            updated_at: Utc::now(),
        }
    }
}

//=========================================================================================
// Value Objects
//=========================================================================================

/// A generated multiple-choice quiz question.
#[derive(Debug, Clone)]
pub struct QuizQuestion {
    pub question: String,
    /// Shuffled option texts, at least two.
    pub options: Vec<String>,
    /// Index of the correct option after shuffling.
    pub correct_answer: usize,
    pub explanation: Option<String>,
}

/// The pair returned to the caller of the RAG query service.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub answer: String,
    pub relevant_cards: Vec<Uuid>,
}

/// Progress through a deck within one session.
#[derive(Debug, Clone)]
pub struct StudyProgress {
    pub current_card: usize,
    pub total_cards: usize,
    pub progress_percentage: f64,
}

/// One hit from the vector store, highest similarity first.
#[derive(Debug, Clone)]
pub struct VectorSearchResult {
    pub content: String,
    /// Originating file path, when the chunk carried one.
    pub source: Option<String>,
    pub score: f64,
}

/// A raw text document produced by the directory loader.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub content: String,
    pub source: String,
}

/// A bounded-length slice of an ingested document, the retrieval unit.
/// Carries its parent document's source metadata.
#[derive(Debug, Clone)]
pub struct DocumentChunk {
    pub content: String,
    pub source: String,
}

//=========================================================================================
// Update Commands
//=========================================================================================
// Typed per-entity updates: repositories apply only the fields that are set,
// so every mutation path goes through an explicit, reviewable command.

#[derive(Debug, Clone, Default)]
pub struct DeckUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub difficulty: Option<DifficultyLevel>,
    pub card_count: Option<usize>,
    pub last_studied: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct FlashcardUpdate {
    pub question: Option<String>,
    pub answer: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub cards_studied: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct TestUpdate {
    pub score: Option<u32>,
    pub correct_answers: Option<usize>,
    pub total_questions: Option<usize>,
    pub duration: Option<i64>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct StatsUpdate {
    pub study_streak: Option<u32>,
    pub total_decks: Option<usize>,
    pub cards_studied: Option<usize>,
    pub study_time: Option<i64>,
    pub last_study_date: Option<DateTime<Utc>>,
}
