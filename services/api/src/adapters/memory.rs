//! services/api/src/adapters/memory.rs
//!
//! In-memory adapters implementing the repository ports from the `core` crate.
//! Each store wraps its map in a `tokio::sync::RwLock`, so every
//! read-modify-write (typed update commands included) runs under the write
//! lock and concurrent mutations of the same record cannot lose increments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use recallmind_core::domain::{
    CardReview, ChatMessage, Deck, DeckUpdate, DocumentChunk, Flashcard, FlashcardUpdate,
    SessionUpdate, StatsUpdate, StudySession, Test, TestUpdate, UserStats, VectorSearchResult,
};
use recallmind_core::ports::{
    CardReviewRepository, ChatMessageRepository, DeckRepository, FlashcardRepository, PortError,
    PortResult, StudySessionRepository, TestRepository, UserStatsRepository, VectorStore,
};

//=========================================================================================
// Deck Repository
//=========================================================================================

#[derive(Default)]
pub struct MemoryDeckRepository {
    decks: RwLock<HashMap<Uuid, Deck>>,
    /// Insertion order, so `get_all` is stable across calls.
    order: RwLock<Vec<Uuid>>,
}

impl MemoryDeckRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeckRepository for MemoryDeckRepository {
    async fn get_all(&self) -> PortResult<Vec<Deck>> {
        let decks = self.decks.read().await;
        let order = self.order.read().await;
        Ok(order.iter().filter_map(|id| decks.get(id).cloned()).collect())
    }

    async fn get_by_id(&self, deck_id: Uuid) -> PortResult<Option<Deck>> {
        Ok(self.decks.read().await.get(&deck_id).cloned())
    }

    async fn create(&self, deck: Deck) -> PortResult<Deck> {
        let mut decks = self.decks.write().await;
        self.order.write().await.push(deck.id);
        decks.insert(deck.id, deck.clone());
        Ok(deck)
    }

    async fn update(&self, deck_id: Uuid, update: DeckUpdate) -> PortResult<Option<Deck>> {
        let mut decks = self.decks.write().await;
        let Some(deck) = decks.get_mut(&deck_id) else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            deck.name = name;
        }
        if let Some(description) = update.description {
            deck.description = description;
        }
        if let Some(difficulty) = update.difficulty {
            deck.difficulty = difficulty;
        }
        if let Some(card_count) = update.card_count {
            deck.card_count = card_count;
        }
        if let Some(last_studied) = update.last_studied {
            deck.last_studied = Some(last_studied);
        }
        Ok(Some(deck.clone()))
    }

    async fn delete(&self, deck_id: Uuid) -> PortResult<bool> {
        let removed = self.decks.write().await.remove(&deck_id).is_some();
        if removed {
            self.order.write().await.retain(|id| *id != deck_id);
        }
        Ok(removed)
    }
}

//=========================================================================================
// Flashcard Repository
//=========================================================================================

#[derive(Default)]
pub struct MemoryFlashcardRepository {
    cards: RwLock<HashMap<Uuid, Flashcard>>,
    order: RwLock<Vec<Uuid>>,
}

impl MemoryFlashcardRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FlashcardRepository for MemoryFlashcardRepository {
    async fn get_by_deck(&self, deck_id: Uuid) -> PortResult<Vec<Flashcard>> {
        let cards = self.cards.read().await;
        let order = self.order.read().await;
        Ok(order
            .iter()
            .filter_map(|id| cards.get(id))
            .filter(|card| card.deck_id == deck_id)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, card_id: Uuid) -> PortResult<Option<Flashcard>> {
        Ok(self.cards.read().await.get(&card_id).cloned())
    }

    async fn get_all(&self) -> PortResult<Vec<Flashcard>> {
        let cards = self.cards.read().await;
        let order = self.order.read().await;
        Ok(order.iter().filter_map(|id| cards.get(id).cloned()).collect())
    }

    async fn create(&self, card: Flashcard) -> PortResult<Flashcard> {
        let mut cards = self.cards.write().await;
        self.order.write().await.push(card.id);
        cards.insert(card.id, card.clone());
        Ok(card)
    }

    async fn update(
        &self,
        card_id: Uuid,
        update: FlashcardUpdate,
    ) -> PortResult<Option<Flashcard>> {
        let mut cards = self.cards.write().await;
        let Some(card) = cards.get_mut(&card_id) else {
            return Ok(None);
        };
        if let Some(question) = update.question {
            card.question = question;
        }
        if let Some(answer) = update.answer {
            card.answer = answer;
        }
        Ok(Some(card.clone()))
    }

    async fn delete(&self, card_id: Uuid) -> PortResult<bool> {
        let removed = self.cards.write().await.remove(&card_id).is_some();
        if removed {
            self.order.write().await.retain(|id| *id != card_id);
        }
        Ok(removed)
    }
}

//=========================================================================================
// Study Session Repository
//=========================================================================================

#[derive(Default)]
pub struct MemoryStudySessionRepository {
    sessions: RwLock<HashMap<Uuid, StudySession>>,
}

impl MemoryStudySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StudySessionRepository for MemoryStudySessionRepository {
    async fn create(&self, session: StudySession) -> PortResult<StudySession> {
        self.sessions.write().await.insert(session.id, session.clone());
        Ok(session)
    }

    async fn get_by_id(&self, session_id: Uuid) -> PortResult<Option<StudySession>> {
        Ok(self.sessions.read().await.get(&session_id).cloned())
    }

    async fn update(
        &self,
        session_id: Uuid,
        update: SessionUpdate,
    ) -> PortResult<Option<StudySession>> {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(&session_id) else {
            return Ok(None);
        };
        if let Some(cards_studied) = update.cards_studied {
            session.cards_studied = cards_studied;
        }
        Ok(Some(session.clone()))
    }

    async fn end(
        &self,
        session_id: Uuid,
        end_time: DateTime<Utc>,
        duration: i64,
    ) -> PortResult<Option<StudySession>> {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(&session_id) else {
            return Ok(None);
        };
        if session.end_time.is_some() {
            return Err(PortError::Validation(
                "Study session has already ended".to_string(),
            ));
        }
        session.end_time = Some(end_time);
        session.duration = duration;
        Ok(Some(session.clone()))
    }
}

//=========================================================================================
// Card Review Repository
//=========================================================================================

#[derive(Default)]
pub struct MemoryCardReviewRepository {
    reviews: RwLock<Vec<CardReview>>,
}

impl MemoryCardReviewRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CardReviewRepository for MemoryCardReviewRepository {
    async fn create(&self, review: CardReview) -> PortResult<CardReview> {
        self.reviews.write().await.push(review.clone());
        Ok(review)
    }

    async fn get_by_session(&self, session_id: Uuid) -> PortResult<Vec<CardReview>> {
        Ok(self
            .reviews
            .read()
            .await
            .iter()
            .filter(|review| review.session_id == session_id)
            .cloned()
            .collect())
    }
}

//=========================================================================================
// Test Repository
//=========================================================================================

#[derive(Default)]
pub struct MemoryTestRepository {
    tests: RwLock<HashMap<Uuid, Test>>,
    order: RwLock<Vec<Uuid>>,
}

impl MemoryTestRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TestRepository for MemoryTestRepository {
    async fn create(&self, test: Test) -> PortResult<Test> {
        let mut tests = self.tests.write().await;
        self.order.write().await.push(test.id);
        tests.insert(test.id, test.clone());
        Ok(test)
    }

    async fn get_by_id(&self, test_id: Uuid) -> PortResult<Option<Test>> {
        Ok(self.tests.read().await.get(&test_id).cloned())
    }

    async fn get_by_deck(&self, deck_id: Uuid) -> PortResult<Vec<Test>> {
        let tests = self.tests.read().await;
        let order = self.order.read().await;
        Ok(order
            .iter()
            .filter_map(|id| tests.get(id))
            .filter(|test| test.deck_id == deck_id)
            .cloned()
            .collect())
    }

    async fn update(&self, test_id: Uuid, update: TestUpdate) -> PortResult<Option<Test>> {
        let mut tests = self.tests.write().await;
        let Some(test) = tests.get_mut(&test_id) else {
            return Ok(None);
        };
        if let Some(score) = update.score {
            test.score = score;
        }
        if let Some(correct_answers) = update.correct_answers {
            test.correct_answers = correct_answers;
        }
        if let Some(total_questions) = update.total_questions {
            test.total_questions = total_questions;
        }
        if let Some(duration) = update.duration {
            test.duration = duration;
        }
        if let Some(completed_at) = update.completed_at {
            test.completed_at = completed_at;
        }
        Ok(Some(test.clone()))
    }
}

//=========================================================================================
// Chat Message Repository
//=========================================================================================

#[derive(Default)]
pub struct MemoryChatMessageRepository {
    messages: RwLock<Vec<ChatMessage>>,
}

impl MemoryChatMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatMessageRepository for MemoryChatMessageRepository {
    async fn create(&self, message: ChatMessage) -> PortResult<ChatMessage> {
        self.messages.write().await.push(message.clone());
        Ok(message)
    }

    async fn get_all(&self) -> PortResult<Vec<ChatMessage>> {
        Ok(self.messages.read().await.clone())
    }
}

//=========================================================================================
// User Stats Repository
//=========================================================================================

pub struct MemoryUserStatsRepository {
    stats: RwLock<UserStats>,
}

impl MemoryUserStatsRepository {
    pub fn new() -> Self {
        Self {
            stats: RwLock::new(UserStats::default()),
        }
    }
}

impl Default for MemoryUserStatsRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStatsRepository for MemoryUserStatsRepository {
    async fn get(&self) -> PortResult<UserStats> {
        Ok(self.stats.read().await.clone())
    }

    async fn update(&self, update: StatsUpdate) -> PortResult<UserStats> {
        let mut stats = self.stats.write().await;
        if let Some(study_streak) = update.study_streak {
            stats.study_streak = study_streak;
        }
        if let Some(total_decks) = update.total_decks {
            stats.total_decks = total_decks;
        }
        if let Some(cards_studied) = update.cards_studied {
            stats.cards_studied = cards_studied;
        }
        if let Some(study_time) = update.study_time {
            stats.study_time = study_time;
        }
        if let Some(last_study_date) = update.last_study_date {
            stats.last_study_date = Some(last_study_date);
        }
        stats.updated_at = Utc::now();
        Ok(stats.clone())
    }
}

//=========================================================================================
// In-Memory Vector Store
//=========================================================================================

/// A keyword-overlap scored stand-in for the real vector database.
///
/// Lets the service run (and be tested) without a Chroma instance. Scoring is
/// the fraction of query terms that appear in the chunk, so results land in
/// (0, 1] like the real adapter's similarity scores.
#[derive(Default)]
pub struct MemoryVectorStore {
    chunks: RwLock<Vec<DocumentChunk>>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn search(&self, query: &str, limit: usize) -> PortResult<Vec<VectorSearchResult>> {
        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let chunks = self.chunks.read().await;
        let mut hits: Vec<VectorSearchResult> = chunks
            .iter()
            .filter_map(|chunk| {
                let haystack = chunk.content.to_lowercase();
                let matched = terms.iter().filter(|t| haystack.contains(t.as_str())).count();
                if matched == 0 {
                    return None;
                }
                Some(VectorSearchResult {
                    content: chunk.content.clone(),
                    source: Some(chunk.source.clone()),
                    score: matched as f64 / terms.len() as f64,
                })
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn add(&self, chunks: Vec<DocumentChunk>) -> PortResult<()> {
        self.chunks.write().await.extend(chunks);
        Ok(())
    }

    async fn is_empty(&self) -> PortResult<bool> {
        Ok(self.chunks.read().await.is_empty())
    }

    async fn clear(&self) -> PortResult<()> {
        self.chunks.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recallmind_core::domain::DifficultyLevel;

    fn sample_deck() -> Deck {
        Deck {
            id: Uuid::new_v4(),
            name: "Biology".to_string(),
            description: None,
            difficulty: DifficultyLevel::Beginner,
            card_count: 0,
            created_at: Utc::now(),
            last_studied: None,
        }
    }

    #[tokio::test]
    async fn deck_update_touches_only_set_fields() {
        let repo = MemoryDeckRepository::new();
        let deck = repo.create(sample_deck()).await.unwrap();

        let updated = repo
            .update(
                deck.id,
                DeckUpdate {
                    card_count: Some(7),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.card_count, 7);
        assert_eq!(updated.name, "Biology");
        assert_eq!(updated.difficulty, DifficultyLevel::Beginner);
    }

    #[tokio::test]
    async fn deck_update_unknown_id_returns_none() {
        let repo = MemoryDeckRepository::new();
        let result = repo
            .update(Uuid::new_v4(), DeckUpdate::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn get_all_preserves_insertion_order() {
        let repo = MemoryFlashcardRepository::new();
        let deck_id = Uuid::new_v4();
        for n in 0..4 {
            repo.create(Flashcard {
                id: Uuid::new_v4(),
                deck_id,
                question: format!("q{}", n),
                answer: format!("a{}", n),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        }
        let all = repo.get_all().await.unwrap();
        let questions: Vec<&str> = all.iter().map(|c| c.question.as_str()).collect();
        assert_eq!(questions, vec!["q0", "q1", "q2", "q3"]);
    }

    #[tokio::test]
    async fn session_end_is_first_wins() {
        let repo = MemoryStudySessionRepository::new();
        let session = repo
            .create(StudySession {
                id: Uuid::new_v4(),
                deck_id: Uuid::new_v4(),
                start_time: Utc::now(),
                end_time: None,
                cards_studied: 0,
                duration: 0,
            })
            .await
            .unwrap();

        let end_time = Utc::now();
        let ended = repo.end(session.id, end_time, 5).await.unwrap().unwrap();
        assert_eq!(ended.end_time, Some(end_time));
        assert_eq!(ended.duration, 5);

        let err = repo.end(session.id, Utc::now(), 9).await.unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));
        // The losing end changed nothing.
        let stored = repo.get_by_id(session.id).await.unwrap().unwrap();
        assert_eq!(stored.duration, 5);

        assert!(repo.end(Uuid::new_v4(), Utc::now(), 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stats_update_refreshes_updated_at() {
        let repo = MemoryUserStatsRepository::new();
        let before = repo.get().await.unwrap();
        let after = repo
            .update(StatsUpdate {
                study_streak: Some(3),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(after.study_streak, 3);
        assert!(after.updated_at >= before.updated_at);
        // Untouched fields survive.
        assert_eq!(after.total_decks, before.total_decks);
    }

    #[tokio::test]
    async fn memory_vector_store_scores_by_term_overlap() {
        let store = MemoryVectorStore::new();
        store
            .add(vec![
                DocumentChunk {
                    content: "The mitochondria is the powerhouse of the cell".to_string(),
                    source: "bio.md".to_string(),
                },
                DocumentChunk {
                    content: "Rust ownership and borrowing".to_string(),
                    source: "rust.md".to_string(),
                },
            ])
            .await
            .unwrap();

        let hits = store.search("mitochondria cell", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source.as_deref(), Some("bio.md"));
        assert!((hits[0].score - 1.0).abs() < f64::EPSILON);

        store.clear().await.unwrap();
        assert!(store.is_empty().await.unwrap());
    }
}
