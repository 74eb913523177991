//! services/api/src/web/study.rs
//!
//! Axum handlers for study sessions, reviews, progress, statistics, and
//! graded tests.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::{error_response, state::AppState, ErrorBody};
use recallmind_core::domain::{CardReview, StudySession, Test, UserStats};

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct StudySessionDto {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub cards_studied: usize,
    pub duration: i64,
}

impl From<StudySession> for StudySessionDto {
    fn from(session: StudySession) -> Self {
        Self {
            id: session.id,
            deck_id: session.deck_id,
            start_time: session.start_time,
            end_time: session.end_time,
            cards_studied: session.cards_studied,
            duration: session.duration,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CardReviewDto {
    pub id: Uuid,
    pub session_id: Uuid,
    pub card_id: Uuid,
    pub difficulty: String,
    pub reviewed_at: DateTime<Utc>,
}

impl From<CardReview> for CardReviewDto {
    fn from(review: CardReview) -> Self {
        Self {
            id: review.id,
            session_id: review.session_id,
            card_id: review.card_id,
            difficulty: review.difficulty.as_str().to_string(),
            reviewed_at: review.reviewed_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct StudyProgressDto {
    pub current_card: usize,
    pub total_cards: usize,
    pub progress_percentage: f64,
}

#[derive(Serialize, ToSchema)]
pub struct UserStatsDto {
    pub study_streak: u32,
    pub total_decks: usize,
    pub cards_studied: usize,
    pub study_time: i64,
    pub last_study_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserStats> for UserStatsDto {
    fn from(stats: UserStats) -> Self {
        Self {
            study_streak: stats.study_streak,
            total_decks: stats.total_decks,
            cards_studied: stats.cards_studied,
            study_time: stats.study_time,
            last_study_date: stats.last_study_date,
            updated_at: stats.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct TestDto {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub test_type: String,
    pub questions_count: usize,
    pub score: u32,
    pub correct_answers: usize,
    pub total_questions: usize,
    pub duration: i64,
    pub completed_at: DateTime<Utc>,
}

impl From<Test> for TestDto {
    fn from(test: Test) -> Self {
        Self {
            id: test.id,
            deck_id: test.deck_id,
            test_type: test.test_type.as_str().to_string(),
            questions_count: test.questions_count,
            score: test.score,
            correct_answers: test.correct_answers,
            total_questions: test.total_questions,
            duration: test.duration,
            completed_at: test.completed_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct StartSessionRequest {
    pub deck_id: Uuid,
}

#[derive(Deserialize, ToSchema)]
pub struct ReviewCardRequest {
    pub card_id: Uuid,
    pub difficulty: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateTestRequest {
    pub deck_id: Uuid,
    pub test_type: String,
    pub questions_count: usize,
}

#[derive(Deserialize, ToSchema)]
pub struct SubmitTestResultsRequest {
    pub correct_answers: usize,
    pub total_questions: usize,
    pub duration: i64,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Start a study session against a deck.
#[utoipa::path(
    post,
    path = "/api/study/sessions",
    request_body = StartSessionRequest,
    responses(
        (status = 201, description = "Session started", body = StudySessionDto)
    )
)]
pub async fn start_session(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<StartSessionRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let session = app_state
        .study
        .start_session(payload.deck_id)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(StudySessionDto::from(session))))
}

/// End a study session, fixing its duration and updating statistics.
#[utoipa::path(
    post,
    path = "/api/study/sessions/{session_id}/end",
    responses(
        (status = 200, description = "Session ended", body = StudySessionDto),
        (status = 400, description = "Session already ended", body = ErrorBody),
        (status = 404, description = "Session not found", body = ErrorBody)
    ),
    params(("session_id" = Uuid, Path, description = "Session id"))
)]
pub async fn end_session(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let session = app_state
        .study
        .end_session(session_id)
        .await
        .map_err(error_response)?;
    Ok(Json(StudySessionDto::from(session)))
}

/// Record a card review within a session.
#[utoipa::path(
    post,
    path = "/api/study/sessions/{session_id}/review",
    request_body = ReviewCardRequest,
    responses(
        (status = 201, description = "Review recorded", body = CardReviewDto),
        (status = 400, description = "Invalid difficulty or ended session", body = ErrorBody),
        (status = 404, description = "Session not found", body = ErrorBody)
    ),
    params(("session_id" = Uuid, Path, description = "Session id"))
)]
pub async fn review_card(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<ReviewCardRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let review = app_state
        .study
        .review_card(session_id, payload.card_id, &payload.difficulty)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(CardReviewDto::from(review))))
}

/// Progress through a deck within a session.
#[utoipa::path(
    get,
    path = "/api/study/sessions/{session_id}/progress/{deck_id}",
    responses(
        (status = 200, description = "Progress", body = StudyProgressDto),
        (status = 404, description = "Session not found", body = ErrorBody)
    ),
    params(
        ("session_id" = Uuid, Path, description = "Session id"),
        ("deck_id" = Uuid, Path, description = "Deck id")
    )
)]
pub async fn get_progress(
    State(app_state): State<Arc<AppState>>,
    Path((session_id, deck_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let progress = app_state
        .study
        .get_progress(session_id, deck_id)
        .await
        .map_err(error_response)?;
    Ok(Json(StudyProgressDto {
        current_card: progress.current_card,
        total_cards: progress.total_cards,
        progress_percentage: progress.progress_percentage,
    }))
}

/// Aggregate user statistics.
#[utoipa::path(
    get,
    path = "/api/study/stats",
    responses(
        (status = 200, description = "User statistics", body = UserStatsDto)
    )
)]
pub async fn get_stats(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let stats = app_state.study.get_stats().await.map_err(error_response)?;
    Ok(Json(UserStatsDto::from(stats)))
}

/// Create a graded test for a deck.
#[utoipa::path(
    post,
    path = "/api/tests",
    request_body = CreateTestRequest,
    responses(
        (status = 201, description = "Test created", body = TestDto),
        (status = 400, description = "Invalid type or question count", body = ErrorBody)
    )
)]
pub async fn create_test(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateTestRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let test = app_state
        .tests
        .create_test(payload.deck_id, &payload.test_type, payload.questions_count)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(TestDto::from(test))))
}

/// Submit results for a test; the score is computed server-side.
#[utoipa::path(
    post,
    path = "/api/tests/{test_id}/results",
    request_body = SubmitTestResultsRequest,
    responses(
        (status = 200, description = "Results recorded", body = TestDto),
        (status = 400, description = "Out-of-range results", body = ErrorBody),
        (status = 404, description = "Test not found", body = ErrorBody)
    ),
    params(("test_id" = Uuid, Path, description = "Test id"))
)]
pub async fn submit_test_results(
    State(app_state): State<Arc<AppState>>,
    Path(test_id): Path<Uuid>,
    Json(payload): Json<SubmitTestResultsRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let test = app_state
        .tests
        .submit_results(
            test_id,
            payload.correct_answers,
            payload.total_questions,
            payload.duration,
        )
        .await
        .map_err(error_response)?;
    Ok(Json(TestDto::from(test)))
}

/// List all tests taken against a deck.
#[utoipa::path(
    get,
    path = "/api/decks/{deck_id}/tests",
    responses(
        (status = 200, description = "The deck's tests", body = [TestDto])
    ),
    params(("deck_id" = Uuid, Path, description = "Deck id"))
)]
pub async fn list_tests(
    State(app_state): State<Arc<AppState>>,
    Path(deck_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let tests = app_state
        .tests
        .get_tests_by_deck(deck_id)
        .await
        .map_err(error_response)?;
    Ok(Json(tests.into_iter().map(TestDto::from).collect::<Vec<_>>()))
}
