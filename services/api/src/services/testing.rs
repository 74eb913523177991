//! services/api/src/services/testing.rs
//!
//! Graded knowledge tests taken against a deck: creation, result submission
//! with score calculation, and per-deck listing. Quiz question content comes
//! from the AI service; this service keeps the score bookkeeping.

use chrono::Utc;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use recallmind_core::domain::{Test, TestType, TestUpdate};
use recallmind_core::ports::{FlashcardRepository, PortError, PortResult, TestRepository};

pub struct TestService {
    tests: Arc<dyn TestRepository>,
    flashcards: Arc<dyn FlashcardRepository>,
}

impl TestService {
    pub fn new(tests: Arc<dyn TestRepository>, flashcards: Arc<dyn FlashcardRepository>) -> Self {
        Self { tests, flashcards }
    }

    pub async fn create_test(
        &self,
        deck_id: Uuid,
        test_type: &str,
        questions_count: usize,
    ) -> PortResult<Test> {
        let test_type =
            TestType::from_str(test_type).map_err(|e| PortError::Validation(e.to_string()))?;
        if questions_count == 0 {
            return Err(PortError::Validation(
                "Questions count must be positive".to_string(),
            ));
        }

        let available = self.flashcards.get_by_deck(deck_id).await?.len();
        if available < questions_count {
            return Err(PortError::Validation(format!(
                "Not enough flashcards in deck for {} questions (have {})",
                questions_count, available
            )));
        }

        self.tests
            .create(Test {
                id: Uuid::new_v4(),
                deck_id,
                test_type,
                questions_count,
                score: 0,
                correct_answers: 0,
                total_questions: questions_count,
                duration: 0,
                completed_at: Utc::now(),
            })
            .await
    }

    pub async fn submit_results(
        &self,
        test_id: Uuid,
        correct_answers: usize,
        total_questions: usize,
        duration: i64,
    ) -> PortResult<Test> {
        if total_questions == 0 {
            return Err(PortError::Validation(
                "Total questions must be positive".to_string(),
            ));
        }
        if correct_answers > total_questions {
            return Err(PortError::Validation(
                "Correct answers cannot exceed total questions".to_string(),
            ));
        }
        if duration < 0 {
            return Err(PortError::Validation(
                "Duration must be non-negative".to_string(),
            ));
        }

        let score = calculate_score(correct_answers, total_questions);
        self.tests
            .update(
                test_id,
                TestUpdate {
                    score: Some(score),
                    correct_answers: Some(correct_answers),
                    total_questions: Some(total_questions),
                    duration: Some(duration),
                    completed_at: Some(Utc::now()),
                },
            )
            .await?
            .ok_or_else(|| PortError::NotFound(format!("Test {}", test_id)))
    }

    pub async fn get_tests_by_deck(&self, deck_id: Uuid) -> PortResult<Vec<Test>> {
        self.tests.get_by_deck(deck_id).await
    }
}

/// Score as a whole-number percentage of correct answers.
fn calculate_score(correct_answers: usize, total_questions: usize) -> u32 {
    if total_questions == 0 {
        return 0;
    }
    (correct_answers as f64 / total_questions as f64 * 100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MemoryFlashcardRepository, MemoryTestRepository};
    use recallmind_core::domain::Flashcard;

    async fn fixture_with_cards(count: usize) -> (TestService, Uuid) {
        let tests = Arc::new(MemoryTestRepository::new());
        let cards = Arc::new(MemoryFlashcardRepository::new());
        let deck_id = Uuid::new_v4();
        for n in 0..count {
            cards
                .create(Flashcard {
                    id: Uuid::new_v4(),
                    deck_id,
                    question: format!("q{}", n),
                    answer: format!("a{}", n),
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
        }
        (TestService::new(tests, cards), deck_id)
    }

    #[tokio::test]
    async fn create_rejects_bad_type_and_count() {
        let (svc, deck_id) = fixture_with_cards(5).await;
        assert!(matches!(
            svc.create_test(deck_id, "essay", 3).await.unwrap_err(),
            PortError::Validation(_)
        ));
        assert!(matches!(
            svc.create_test(deck_id, "flashcard", 0).await.unwrap_err(),
            PortError::Validation(_)
        ));
        assert!(matches!(
            svc.create_test(deck_id, "flashcard", 6).await.unwrap_err(),
            PortError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn submit_computes_percentage_score() {
        let (svc, deck_id) = fixture_with_cards(10).await;
        let test = svc.create_test(deck_id, "multiple-choice", 10).await.unwrap();
        let graded = svc.submit_results(test.id, 7, 10, 120).await.unwrap();
        assert_eq!(graded.score, 70);
        assert_eq!(graded.correct_answers, 7);
        assert_eq!(graded.duration, 120);
    }

    #[tokio::test]
    async fn submit_validates_bounds() {
        let (svc, deck_id) = fixture_with_cards(4).await;
        let test = svc.create_test(deck_id, "flashcard", 4).await.unwrap();
        assert!(matches!(
            svc.submit_results(test.id, 5, 4, 10).await.unwrap_err(),
            PortError::Validation(_)
        ));
        assert!(matches!(
            svc.submit_results(test.id, 1, 0, 10).await.unwrap_err(),
            PortError::Validation(_)
        ));
        assert!(matches!(
            svc.submit_results(test.id, 1, 4, -1).await.unwrap_err(),
            PortError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn submit_unknown_test_is_not_found() {
        let (svc, _) = fixture_with_cards(1).await;
        let err = svc.submit_results(Uuid::new_v4(), 1, 1, 0).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }
}
