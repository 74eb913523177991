//! services/api/src/services/study.rs
//!
//! Session lifecycle, per-card review recording, and the user statistics
//! aggregate (cumulative study time, cards studied, consecutive-day streak).
//!
//! A session is ACTIVE from start until `end_session` sets its end time, and
//! terminal afterwards: reviews against an ended session and a second end are
//! both rejected rather than silently recomputed, since re-ending would
//! double-count into the stats aggregate.

use chrono::Utc;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use recallmind_core::domain::{
    CardReview, DeckUpdate, ReviewDifficulty, SessionUpdate, StatsUpdate, StudyProgress,
    StudySession, UserStats,
};
use recallmind_core::ports::{
    CardReviewRepository, DeckRepository, FlashcardRepository, PortError, PortResult,
    StudySessionRepository, UserStatsRepository,
};

pub struct StudyService {
    sessions: Arc<dyn StudySessionRepository>,
    reviews: Arc<dyn CardReviewRepository>,
    flashcards: Arc<dyn FlashcardRepository>,
    decks: Arc<dyn DeckRepository>,
    stats: Arc<dyn UserStatsRepository>,
}

impl StudyService {
    pub fn new(
        sessions: Arc<dyn StudySessionRepository>,
        reviews: Arc<dyn CardReviewRepository>,
        flashcards: Arc<dyn FlashcardRepository>,
        decks: Arc<dyn DeckRepository>,
        stats: Arc<dyn UserStatsRepository>,
    ) -> Self {
        Self {
            sessions,
            reviews,
            flashcards,
            decks,
            stats,
        }
    }

    /// Starts a new active session against a deck.
    pub async fn start_session(&self, deck_id: Uuid) -> PortResult<StudySession> {
        self.sessions
            .create(StudySession {
                id: Uuid::new_v4(),
                deck_id,
                start_time: Utc::now(),
                end_time: None,
                cards_studied: 0,
                duration: 0,
            })
            .await
    }

    /// Records one card review and refreshes the session's studied-card
    /// count. The count is the number of distinct cards reviewed so far, so
    /// re-rating the same card does not inflate it.
    pub async fn review_card(
        &self,
        session_id: Uuid,
        card_id: Uuid,
        difficulty: &str,
    ) -> PortResult<CardReview> {
        let difficulty = ReviewDifficulty::from_str(difficulty)
            .map_err(|e| PortError::Validation(e.to_string()))?;

        let session = self
            .sessions
            .get_by_id(session_id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("Study session {}", session_id)))?;
        if session.is_ended() {
            return Err(PortError::Validation(
                "Study session has already ended".to_string(),
            ));
        }

        let review = self
            .reviews
            .create(CardReview {
                id: Uuid::new_v4(),
                session_id,
                card_id,
                difficulty,
                reviewed_at: Utc::now(),
            })
            .await?;

        let distinct_cards: HashSet<Uuid> = self
            .reviews
            .get_by_session(session_id)
            .await?
            .into_iter()
            .map(|r| r.card_id)
            .collect();
        self.sessions
            .update(
                session_id,
                SessionUpdate {
                    cards_studied: Some(distinct_cards.len()),
                    ..Default::default()
                },
            )
            .await?;

        Ok(review)
    }

    /// Ends an active session, fixing its duration in whole seconds and
    /// folding the session into the user statistics. The repository applies
    /// the end atomically, so the session cannot be folded into the stats
    /// twice even under concurrent calls.
    pub async fn end_session(&self, session_id: Uuid) -> PortResult<StudySession> {
        let session = self
            .sessions
            .get_by_id(session_id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("Study session {}", session_id)))?;

        let end_time = Utc::now();
        let duration = (end_time - session.start_time).num_seconds().max(0);

        let ended = self
            .sessions
            .end(session_id, end_time, duration)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("Study session {}", session_id)))?;

        self.update_user_stats(&ended).await?;
        self.decks
            .update(
                ended.deck_id,
                DeckUpdate {
                    last_studied: Some(end_time),
                    ..Default::default()
                },
            )
            .await?;
        Ok(ended)
    }

    /// Progress through the deck within one session. Percentage is zero when
    /// the deck has no cards.
    pub async fn get_progress(&self, session_id: Uuid, deck_id: Uuid) -> PortResult<StudyProgress> {
        let session = self
            .sessions
            .get_by_id(session_id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("Study session {}", session_id)))?;

        let total_cards = self.flashcards.get_by_deck(deck_id).await?.len();
        let current_card = session.cards_studied;
        let progress_percentage = if total_cards > 0 {
            current_card as f64 / total_cards as f64 * 100.0
        } else {
            0.0
        };

        Ok(StudyProgress {
            current_card,
            total_cards,
            progress_percentage,
        })
    }

    pub async fn get_stats(&self) -> PortResult<UserStats> {
        self.stats.get().await
    }

    /// Folds one ended session into the aggregate: study time, cards
    /// studied, and the consecutive-calendar-day streak.
    async fn update_user_stats(&self, session: &StudySession) -> PortResult<()> {
        let stats = self.stats.get().await?;
        let now = Utc::now();
        let today = now.date_naive();

        let new_streak = match stats.last_study_date.map(|d| d.date_naive()) {
            // Already studied today, streak unchanged.
            Some(last) if last == today => stats.study_streak,
            // Consecutive day, streak grows.
            Some(last) if (today - last).num_days() == 1 => stats.study_streak + 1,
            // Gap of more than one day, or first session ever: restart at 1.
            _ => 1,
        };

        self.stats
            .update(StatsUpdate {
                study_time: Some(stats.study_time + session.duration),
                cards_studied: Some(stats.cards_studied + session.cards_studied),
                study_streak: Some(new_streak),
                last_study_date: Some(now),
                ..Default::default()
            })
            .await?;
        Ok(())
    }
}
