//! services/api/src/services/flashcard.rs
//!
//! Business logic for flashcards. Every mutation refreshes the owning deck's
//! `card_count` from the store, so the counter can never drift from the
//! actual number of cards.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use recallmind_core::domain::{DeckUpdate, Flashcard, FlashcardUpdate};
use recallmind_core::ports::{DeckRepository, FlashcardRepository, PortError, PortResult};

pub struct FlashcardService {
    flashcards: Arc<dyn FlashcardRepository>,
    decks: Arc<dyn DeckRepository>,
}

impl FlashcardService {
    pub fn new(flashcards: Arc<dyn FlashcardRepository>, decks: Arc<dyn DeckRepository>) -> Self {
        Self { flashcards, decks }
    }

    pub async fn get_flashcards_by_deck(&self, deck_id: Uuid) -> PortResult<Vec<Flashcard>> {
        if self.decks.get_by_id(deck_id).await?.is_none() {
            return Err(PortError::NotFound(format!("Deck {}", deck_id)));
        }
        self.flashcards.get_by_deck(deck_id).await
    }

    pub async fn create_flashcard(
        &self,
        deck_id: Uuid,
        question: &str,
        answer: &str,
    ) -> PortResult<Flashcard> {
        if self.decks.get_by_id(deck_id).await?.is_none() {
            return Err(PortError::NotFound(format!("Deck {}", deck_id)));
        }
        let question = question.trim();
        let answer = answer.trim();
        if question.is_empty() {
            return Err(PortError::Validation("Question is required".to_string()));
        }
        if answer.is_empty() {
            return Err(PortError::Validation("Answer is required".to_string()));
        }

        let card = Flashcard {
            id: Uuid::new_v4(),
            deck_id,
            question: question.to_string(),
            answer: answer.to_string(),
            created_at: Utc::now(),
        };

        let created = self.flashcards.create(card).await?;
        self.refresh_card_count(deck_id).await?;
        Ok(created)
    }

    pub async fn update_flashcard(
        &self,
        card_id: Uuid,
        question: Option<&str>,
        answer: Option<&str>,
    ) -> PortResult<Flashcard> {
        let mut update = FlashcardUpdate::default();

        if let Some(question) = question {
            let question = question.trim();
            if question.is_empty() {
                return Err(PortError::Validation("Question cannot be empty".to_string()));
            }
            update.question = Some(question.to_string());
        }
        if let Some(answer) = answer {
            let answer = answer.trim();
            if answer.is_empty() {
                return Err(PortError::Validation("Answer cannot be empty".to_string()));
            }
            update.answer = Some(answer.to_string());
        }

        let updated = self
            .flashcards
            .update(card_id, update)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("Flashcard {}", card_id)))?;

        self.refresh_card_count(updated.deck_id).await?;
        Ok(updated)
    }

    pub async fn delete_flashcard(&self, card_id: Uuid) -> PortResult<()> {
        let card = self
            .flashcards
            .get_by_id(card_id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("Flashcard {}", card_id)))?;

        self.flashcards.delete(card_id).await?;
        self.refresh_card_count(card.deck_id).await?;
        Ok(())
    }

    async fn refresh_card_count(&self, deck_id: Uuid) -> PortResult<()> {
        let count = self.flashcards.get_by_deck(deck_id).await?.len();
        self.decks
            .update(
                deck_id,
                DeckUpdate {
                    card_count: Some(count),
                    ..Default::default()
                },
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MemoryDeckRepository, MemoryFlashcardRepository};
    use recallmind_core::domain::{Deck, DifficultyLevel};

    async fn fixture() -> (FlashcardService, Arc<MemoryDeckRepository>, Uuid) {
        let decks = Arc::new(MemoryDeckRepository::new());
        let cards = Arc::new(MemoryFlashcardRepository::new());
        let deck = decks
            .create(Deck {
                id: Uuid::new_v4(),
                name: "History".to_string(),
                description: None,
                difficulty: DifficultyLevel::Beginner,
                card_count: 0,
                created_at: Utc::now(),
                last_studied: None,
            })
            .await
            .unwrap();
        (FlashcardService::new(cards, decks.clone()), decks, deck.id)
    }

    #[tokio::test]
    async fn create_requires_existing_deck() {
        let (svc, _, _) = fixture().await;
        let err = svc
            .create_flashcard(Uuid::new_v4(), "q", "a")
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_validates_question_and_answer() {
        let (svc, _, deck_id) = fixture().await;
        assert!(matches!(
            svc.create_flashcard(deck_id, "  ", "a").await.unwrap_err(),
            PortError::Validation(_)
        ));
        assert!(matches!(
            svc.create_flashcard(deck_id, "q", "").await.unwrap_err(),
            PortError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn card_count_follows_mutations() {
        let (svc, decks, deck_id) = fixture().await;
        let card = svc.create_flashcard(deck_id, "q1", "a1").await.unwrap();
        svc.create_flashcard(deck_id, "q2", "a2").await.unwrap();
        assert_eq!(decks.get_by_id(deck_id).await.unwrap().unwrap().card_count, 2);

        svc.delete_flashcard(card.id).await.unwrap();
        assert_eq!(decks.get_by_id(deck_id).await.unwrap().unwrap().card_count, 1);
    }

    #[tokio::test]
    async fn update_trims_and_persists() {
        let (svc, _, deck_id) = fixture().await;
        let card = svc.create_flashcard(deck_id, "q", "a").await.unwrap();
        let updated = svc
            .update_flashcard(card.id, Some("  new question  "), None)
            .await
            .unwrap();
        assert_eq!(updated.question, "new question");
        assert_eq!(updated.answer, "a");
    }
}
