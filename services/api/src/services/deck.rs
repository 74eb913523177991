//! services/api/src/services/deck.rs
//!
//! Business logic for deck management: validated CRUD plus maintenance of the
//! `total_decks` figure in the user statistics singleton.

use chrono::Utc;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use recallmind_core::domain::{Deck, DeckUpdate, DifficultyLevel, Flashcard, StatsUpdate};
use recallmind_core::ports::{
    DeckRepository, FlashcardRepository, PortError, PortResult, UserStatsRepository,
};

/// A deck together with its cards, for detail views.
#[derive(Debug, Clone)]
pub struct DeckWithCards {
    pub deck: Deck,
    pub flashcards: Vec<Flashcard>,
}

pub struct DeckService {
    decks: Arc<dyn DeckRepository>,
    flashcards: Arc<dyn FlashcardRepository>,
    stats: Arc<dyn UserStatsRepository>,
}

impl DeckService {
    pub fn new(
        decks: Arc<dyn DeckRepository>,
        flashcards: Arc<dyn FlashcardRepository>,
        stats: Arc<dyn UserStatsRepository>,
    ) -> Self {
        Self {
            decks,
            flashcards,
            stats,
        }
    }

    pub async fn get_all_decks(&self) -> PortResult<Vec<Deck>> {
        self.decks.get_all().await
    }

    pub async fn get_deck_by_id(&self, deck_id: Uuid) -> PortResult<Deck> {
        self.decks
            .get_by_id(deck_id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("Deck {}", deck_id)))
    }

    pub async fn get_deck_with_cards(&self, deck_id: Uuid) -> PortResult<DeckWithCards> {
        let deck = self.get_deck_by_id(deck_id).await?;
        let flashcards = self.flashcards.get_by_deck(deck_id).await?;
        Ok(DeckWithCards { deck, flashcards })
    }

    pub async fn create_deck(
        &self,
        name: &str,
        description: Option<&str>,
        difficulty: &str,
    ) -> PortResult<Deck> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PortError::Validation("Deck name is required".to_string()));
        }
        let difficulty = DifficultyLevel::from_str(difficulty)
            .map_err(|e| PortError::Validation(e.to_string()))?;

        let deck = Deck {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            difficulty,
            card_count: 0,
            created_at: Utc::now(),
            last_studied: None,
        };

        let created = self.decks.create(deck).await?;
        self.refresh_total_decks().await?;
        Ok(created)
    }

    pub async fn update_deck(
        &self,
        deck_id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        difficulty: Option<&str>,
    ) -> PortResult<Deck> {
        let mut update = DeckUpdate::default();

        if let Some(name) = name {
            let name = name.trim();
            if name.is_empty() {
                return Err(PortError::Validation("Deck name cannot be empty".to_string()));
            }
            update.name = Some(name.to_string());
        }
        if let Some(description) = description {
            let description = description.trim();
            update.description = Some(if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            });
        }
        if let Some(difficulty) = difficulty {
            update.difficulty = Some(
                DifficultyLevel::from_str(difficulty)
                    .map_err(|e| PortError::Validation(e.to_string()))?,
            );
        }

        self.decks
            .update(deck_id, update)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("Deck {}", deck_id)))
    }

    /// Deletes a deck and all of its flashcards.
    pub async fn delete_deck(&self, deck_id: Uuid) -> PortResult<()> {
        if self.decks.get_by_id(deck_id).await?.is_none() {
            return Err(PortError::NotFound(format!("Deck {}", deck_id)));
        }

        for card in self.flashcards.get_by_deck(deck_id).await? {
            self.flashcards.delete(card.id).await?;
        }
        self.decks.delete(deck_id).await?;
        self.refresh_total_decks().await?;
        Ok(())
    }

    async fn refresh_total_decks(&self) -> PortResult<()> {
        let total = self.decks.get_all().await?.len();
        self.stats
            .update(StatsUpdate {
                total_decks: Some(total),
                ..Default::default()
            })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        MemoryDeckRepository, MemoryFlashcardRepository, MemoryUserStatsRepository,
    };
    use crate::services::flashcard::FlashcardService;

    fn service() -> (DeckService, FlashcardService, Arc<MemoryUserStatsRepository>) {
        let decks = Arc::new(MemoryDeckRepository::new());
        let cards = Arc::new(MemoryFlashcardRepository::new());
        let stats = Arc::new(MemoryUserStatsRepository::new());
        (
            DeckService::new(decks.clone(), cards.clone(), stats.clone()),
            FlashcardService::new(cards, decks),
            stats,
        )
    }

    #[tokio::test]
    async fn create_deck_validates_name_and_difficulty() {
        let (svc, _, _) = service();

        let err = svc.create_deck("  ", None, "beginner").await.unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));

        let err = svc.create_deck("Chem", None, "expert").await.unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));

        let deck = svc.create_deck(" Chem ", Some(" notes "), "ADVANCED").await.unwrap();
        assert_eq!(deck.name, "Chem");
        assert_eq!(deck.description.as_deref(), Some("notes"));
        assert_eq!(deck.difficulty, DifficultyLevel::Advanced);
        assert_eq!(deck.card_count, 0);
    }

    #[tokio::test]
    async fn deck_count_tracks_creates_and_deletes() {
        let (svc, _, stats) = service();
        let a = svc.create_deck("A", None, "beginner").await.unwrap();
        svc.create_deck("B", None, "beginner").await.unwrap();
        assert_eq!(stats.get().await.unwrap().total_decks, 2);

        svc.delete_deck(a.id).await.unwrap();
        assert_eq!(stats.get().await.unwrap().total_decks, 1);
    }

    #[tokio::test]
    async fn delete_deck_cascades_flashcards() {
        let (svc, cards, _) = service();
        let deck = svc.create_deck("A", None, "beginner").await.unwrap();
        cards.create_flashcard(deck.id, "q", "a").await.unwrap();
        cards.create_flashcard(deck.id, "q2", "a2").await.unwrap();

        svc.delete_deck(deck.id).await.unwrap();
        let err = svc.get_deck_by_id(deck.id).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_unknown_deck_is_not_found() {
        let (svc, _, _) = service();
        let err = svc
            .update_deck(Uuid::new_v4(), Some("x"), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }
}
