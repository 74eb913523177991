//! services/api/src/services/ai.rs
//!
//! The RAG query service and quiz generation. Answers are assembled from
//! retrieved chunks plus keyword-matched flashcards and rendered through a
//! fixed template; the only model-backed work (embedding, nearest-neighbor
//! search) lives behind the `VectorStore` port.

use chrono::Utc;
use rand::seq::{IndexedRandom, SliceRandom};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use recallmind_core::domain::{ChatMessage, ChatResponse, Flashcard, QuizQuestion};
use recallmind_core::ports::{
    ChatMessageRepository, FlashcardRepository, PortError, PortResult, VectorStore,
};

/// Returned when neither the vector store nor the flashcards yield context.
const FALLBACK_ANSWER: &str = "I don't have enough information to answer that question. \
Please make sure you have some study material loaded.";

/// Filler option texts used when the pool holds too few distractor cards.
const PLACEHOLDER_OPTIONS: [&str; 3] = ["Option A", "Option B", "Option C"];

/// Maximum number of flashcards folded into the context.
const MAX_RELEVANT_CARDS: usize = 5;

pub struct AiService {
    vector: Arc<dyn VectorStore>,
    chat: Arc<dyn ChatMessageRepository>,
    flashcards: Arc<dyn FlashcardRepository>,
    search_limit: usize,
}

impl AiService {
    pub fn new(
        vector: Arc<dyn VectorStore>,
        chat: Arc<dyn ChatMessageRepository>,
        flashcards: Arc<dyn FlashcardRepository>,
        search_limit: usize,
    ) -> Self {
        Self {
            vector,
            chat,
            flashcards,
            search_limit,
        }
    }

    /// Answers a question with retrieval-augmented context and records the
    /// exchange in the chat log.
    pub async fn answer_question(&self, question: &str) -> PortResult<ChatResponse> {
        // A failing vector store degrades to zero retrieval results; the
        // flashcards may still carry the answer.
        let relevant_docs = match self.vector.search(question, self.search_limit).await {
            Ok(docs) => docs,
            Err(e) => {
                warn!("Vector search failed, continuing without retrieval context: {}", e);
                Vec::new()
            }
        };

        let all_cards = self.flashcards.get_all().await?;
        let relevant_cards = find_relevant_cards(question, &all_cards);

        let mut context_parts: Vec<String> =
            relevant_docs.into_iter().map(|doc| doc.content).collect();
        for card in &relevant_cards {
            context_parts.push(format!("Q: {}\nA: {}", card.question, card.answer));
        }
        let context = context_parts.join("\n\n");

        let answer = generate_answer(question, &context);
        let relevant_card_ids: Vec<Uuid> = relevant_cards.iter().map(|card| card.id).collect();

        self.chat
            .create(ChatMessage {
                id: Uuid::new_v4(),
                question: question.to_string(),
                answer: answer.clone(),
                relevant_cards: relevant_card_ids.clone(),
                created_at: Utc::now(),
            })
            .await?;

        Ok(ChatResponse {
            answer,
            relevant_cards: relevant_card_ids,
        })
    }

    /// Generates a multiple-choice question for one deck. The prompt card is
    /// picked uniformly at random and the options are shuffled, so output is
    /// intentionally non-deterministic.
    pub async fn generate_quiz_question(&self, deck_id: Uuid) -> PortResult<QuizQuestion> {
        let deck_cards = self.flashcards.get_by_deck(deck_id).await?;
        let all_cards = self.flashcards.get_all().await?;

        let mut rng = rand::rng();
        let card = deck_cards
            .choose(&mut rng)
            .ok_or_else(|| PortError::NotFound("No flashcards found in deck".to_string()))?;

        let other_cards: Vec<&Flashcard> =
            all_cards.iter().filter(|c| c.id != card.id).collect();

        let mut options = vec![card.answer.clone()];
        if other_cards.len() >= 3 {
            options.extend(
                other_cards
                    .choose_multiple(&mut rng, 3)
                    .map(|c| c.answer.clone()),
            );
        } else {
            options.extend(PLACEHOLDER_OPTIONS.iter().map(|s| s.to_string()));
        }

        options.shuffle(&mut rng);
        let correct_answer = options
            .iter()
            .position(|option| *option == card.answer)
            .ok_or_else(|| {
                PortError::Unexpected("Correct answer missing from shuffled options".to_string())
            })?;

        Ok(QuizQuestion {
            question: card.question.clone(),
            options,
            correct_answer,
            explanation: Some(format!("Based on the flashcard: {}", card.answer)),
        })
    }

    pub async fn get_chat_history(&self) -> PortResult<Vec<ChatMessage>> {
        self.chat.get_all().await
    }
}

/// A flashcard is relevant when the lower-cased question appears in its
/// lower-cased question or answer text. Discovery order is preserved and the
/// result is capped, never similarity-ranked.
fn find_relevant_cards<'a>(question: &str, cards: &'a [Flashcard]) -> Vec<&'a Flashcard> {
    let needle = question.to_lowercase();
    cards
        .iter()
        .filter(|card| {
            card.question.to_lowercase().contains(&needle)
                || card.answer.to_lowercase().contains(&needle)
        })
        .take(MAX_RELEVANT_CARDS)
        .collect()
}

/// Renders the templated answer: up to three sentence bullets from the
/// context, closed by a line echoing the question verbatim.
fn generate_answer(question: &str, context: &str) -> String {
    if context.trim().is_empty() {
        return FALLBACK_ANSWER.to_string();
    }

    let mut answer = String::from("Based on your study materials:\n\n");
    for sentence in context.split('.').take(3) {
        let sentence = sentence.trim();
        if !sentence.is_empty() {
            answer.push_str(&format!("\u{2022} {}.\n", sentence));
        }
    }
    answer.push_str(&format!(
        "\nThis information should help answer your question: '{}'",
        question
    ));
    answer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        MemoryChatMessageRepository, MemoryFlashcardRepository, MemoryVectorStore,
    };
    use async_trait::async_trait;
    use recallmind_core::domain::{DocumentChunk, VectorSearchResult};

    struct BrokenVectorStore;

    #[async_trait]
    impl VectorStore for BrokenVectorStore {
        async fn search(&self, _: &str, _: usize) -> PortResult<Vec<VectorSearchResult>> {
            Err(PortError::Adapter("connection refused".to_string()))
        }
        async fn add(&self, _: Vec<DocumentChunk>) -> PortResult<()> {
            Err(PortError::Adapter("connection refused".to_string()))
        }
        async fn is_empty(&self) -> PortResult<bool> {
            Err(PortError::Adapter("connection refused".to_string()))
        }
        async fn clear(&self) -> PortResult<()> {
            Err(PortError::Adapter("connection refused".to_string()))
        }
    }

    struct Fixture {
        svc: AiService,
        cards: Arc<MemoryFlashcardRepository>,
        chat: Arc<MemoryChatMessageRepository>,
        store: Arc<MemoryVectorStore>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryVectorStore::new());
        let chat = Arc::new(MemoryChatMessageRepository::new());
        let cards = Arc::new(MemoryFlashcardRepository::new());
        let svc = AiService::new(store.clone(), chat.clone(), cards.clone(), 5);
        Fixture {
            svc,
            cards,
            chat,
            store,
        }
    }

    async fn add_card(cards: &MemoryFlashcardRepository, deck_id: Uuid, q: &str, a: &str) -> Flashcard {
        cards
            .create(Flashcard {
                id: Uuid::new_v4(),
                deck_id,
                question: q.to_string(),
                answer: a.to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn empty_context_returns_fallback_and_logs_the_exchange() {
        let f = fixture();
        let response = f.svc.answer_question("what is osmosis").await.unwrap();
        assert_eq!(response.answer, FALLBACK_ANSWER);
        assert!(response.relevant_cards.is_empty());

        let history = f.svc.get_chat_history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].question, "what is osmosis");
        assert!(history[0].relevant_cards.is_empty());
    }

    #[tokio::test]
    async fn empty_question_matches_every_card_up_to_the_cap() {
        let f = fixture();
        let deck_id = Uuid::new_v4();
        for n in 0..7 {
            add_card(&f.cards, deck_id, &format!("q{}", n), &format!("a{}", n)).await;
        }

        // The empty needle is a substring of every card, so the cap applies.
        let response = f.svc.answer_question("").await.unwrap();
        assert_eq!(response.relevant_cards.len(), MAX_RELEVANT_CARDS);
        assert_ne!(response.answer, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn broken_vector_store_degrades_to_card_context() {
        let chat = Arc::new(MemoryChatMessageRepository::new());
        let cards = Arc::new(MemoryFlashcardRepository::new());
        let deck_id = Uuid::new_v4();
        add_card(&cards, deck_id, "What is osmosis", "Diffusion of water across a membrane").await;
        let svc = AiService::new(Arc::new(BrokenVectorStore), chat, cards, 5);

        let response = svc.answer_question("osmosis").await.unwrap();
        assert_ne!(response.answer, FALLBACK_ANSWER);
        assert_eq!(response.relevant_cards.len(), 1);
    }

    #[tokio::test]
    async fn relevant_cards_are_capped_and_substring_matched() {
        let f = fixture();
        let deck_id = Uuid::new_v4();
        for n in 0..8 {
            add_card(&f.cards, deck_id, &format!("photosynthesis step {}", n), "chlorophyll").await;
        }
        add_card(&f.cards, deck_id, "unrelated question", "unrelated answer").await;

        let response = f.svc.answer_question("PHOTOSYNTHESIS").await.unwrap();
        assert_eq!(response.relevant_cards.len(), 5);

        let all = f.cards.get_all().await.unwrap();
        for id in &response.relevant_cards {
            let card = all.iter().find(|c| c.id == *id).unwrap();
            assert!(
                card.question.to_lowercase().contains("photosynthesis")
                    || card.answer.to_lowercase().contains("photosynthesis")
            );
        }
        // Discovery order: the first five matching cards, in creation order.
        let expected: Vec<Uuid> = all
            .iter()
            .filter(|c| c.question.contains("photosynthesis"))
            .take(5)
            .map(|c| c.id)
            .collect();
        assert_eq!(response.relevant_cards, expected);
    }

    #[tokio::test]
    async fn chunk_context_precedes_card_context() {
        let f = fixture();
        f.store
            .add(vec![DocumentChunk {
                content: "Mitosis is cell division".to_string(),
                source: "bio.md".to_string(),
            }])
            .await
            .unwrap();
        add_card(&f.cards, Uuid::new_v4(), "Define mitosis", "Cell division").await;

        let response = f.svc.answer_question("mitosis").await.unwrap();
        assert!(response.answer.starts_with("Based on your study materials:"));
        // The first bullet comes from the retrieved chunk, not the card.
        let first_bullet = response
            .answer
            .lines()
            .find(|l| l.starts_with('\u{2022}'))
            .unwrap();
        assert!(first_bullet.contains("Mitosis is cell division"));
        assert!(response.answer.ends_with("your question: 'mitosis'"));
    }

    #[tokio::test]
    async fn answer_has_at_most_three_bullets() {
        let f = fixture();
        f.store
            .add(vec![DocumentChunk {
                content: "One. Two. Three. Four. Five.".to_string(),
                source: "n.md".to_string(),
            }])
            .await
            .unwrap();
        let response = f.svc.answer_question("one two three").await.unwrap();
        let bullets = response
            .answer
            .lines()
            .filter(|l| l.starts_with('\u{2022}'))
            .count();
        assert!(bullets <= 3);
    }

    #[tokio::test]
    async fn quiz_on_empty_deck_is_not_found() {
        let f = fixture();
        let err = f.svc.generate_quiz_question(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn quiz_pads_with_placeholders_when_pool_is_small() {
        let f = fixture();
        let deck_id = Uuid::new_v4();
        add_card(&f.cards, deck_id, "Capital of France?", "Paris").await;

        let quiz = f.svc.generate_quiz_question(deck_id).await.unwrap();
        assert_eq!(quiz.question, "Capital of France?");
        assert_eq!(quiz.options.len(), 4);
        assert_eq!(quiz.options[quiz.correct_answer], "Paris");
        for placeholder in PLACEHOLDER_OPTIONS {
            assert!(quiz.options.iter().any(|o| o == placeholder));
        }
    }

    #[tokio::test]
    async fn quiz_invariants_hold_across_repeated_draws() {
        let f = fixture();
        let deck_id = Uuid::new_v4();
        let other_deck = Uuid::new_v4();
        add_card(&f.cards, deck_id, "q0", "answer zero").await;
        for n in 1..6 {
            add_card(&f.cards, other_deck, &format!("q{}", n), &format!("answer {}", n)).await;
        }

        for _ in 0..20 {
            let quiz = f.svc.generate_quiz_question(deck_id).await.unwrap();
            assert_eq!(quiz.options.len(), 4);
            assert_eq!(quiz.options[quiz.correct_answer], "answer zero");
            // Distractors are sampled without replacement, so all differ.
            let mut sorted = quiz.options.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), 4);
            // Distractors come from the whole pool, not the quizzed deck.
            assert!(quiz
                .options
                .iter()
                .filter(|o| *o != "answer zero")
                .all(|o| o.starts_with("answer ")));
        }
    }

    #[tokio::test]
    async fn chat_history_accumulates_in_order() {
        let f = fixture();
        f.svc.answer_question("first").await.unwrap();
        f.svc.answer_question("second").await.unwrap();
        let history = f.chat.get_all().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].question, "first");
        assert_eq!(history[1].question, "second");
    }
}
