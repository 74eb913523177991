//! services/api/src/web/mod.rs
//!
//! The HTTP surface: route registration plus the shared error mapping from
//! port errors to status codes.

pub mod chat;
pub mod decks;
pub mod flashcards;
pub mod rest;
pub mod state;
pub mod study;

use axum::{
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use recallmind_core::ports::PortError;
use state::AppState;

/// The JSON body returned for every failed request.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Maps a port error to the HTTP response for it.
pub(crate) fn error_response(err: PortError) -> (StatusCode, Json<ErrorBody>) {
    let status = match &err {
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::Validation(_) => StatusCode::BAD_REQUEST,
        PortError::Adapter(_) | PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Request failed: {}", err);
    }
    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
}

/// Builds the API router. The caller layers CORS and Swagger on top.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Decks
        .route("/api/decks", get(decks::list_decks).post(decks::create_deck))
        .route(
            "/api/decks/{deck_id}",
            get(decks::get_deck)
                .put(decks::update_deck)
                .delete(decks::delete_deck),
        )
        // Flashcards
        .route(
            "/api/decks/{deck_id}/cards",
            get(flashcards::list_flashcards).post(flashcards::create_flashcard),
        )
        .route(
            "/api/cards/{card_id}",
            put(flashcards::update_flashcard).delete(flashcards::delete_flashcard),
        )
        // Study sessions and stats
        .route("/api/study/sessions", post(study::start_session))
        .route("/api/study/sessions/{session_id}/end", post(study::end_session))
        .route(
            "/api/study/sessions/{session_id}/review",
            post(study::review_card),
        )
        .route(
            "/api/study/sessions/{session_id}/progress/{deck_id}",
            get(study::get_progress),
        )
        .route("/api/study/stats", get(study::get_stats))
        // Tests
        .route("/api/tests", post(study::create_test))
        .route("/api/tests/{test_id}/results", post(study::submit_test_results))
        .route("/api/decks/{deck_id}/tests", get(study::list_tests))
        // Chat, quiz, administration
        .route("/api/chat/messages", get(chat::get_chat_messages))
        .route("/api/chat/ask", post(chat::ask_question))
        .route("/api/quiz/generate/{deck_id}", post(chat::generate_quiz))
        .route("/api/admin/reingest", post(chat::reingest))
        .with_state(state)
}
