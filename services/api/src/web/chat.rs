//! services/api/src/web/chat.rs
//!
//! Axum handlers for the RAG chat endpoints, quiz generation, and the
//! administrative re-ingestion trigger.

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
use recallmind_core::domain::ChatMessage;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct ChatMessageDto {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub relevant_cards: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<ChatMessage> for ChatMessageDto {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.id,
            question: message.question,
            answer: message.answer,
            relevant_cards: message.relevant_cards,
            created_at: message.created_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct AskQuestionRequest {
    pub question: String,
}

#[derive(Serialize, ToSchema)]
pub struct ChatResponseDto {
    pub answer: String,
    pub relevant_cards: Vec<Uuid>,
}

#[derive(Serialize, ToSchema)]
pub struct QuizQuestionDto {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ReingestResponse {
    pub success: bool,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// The full chat history, oldest first.
#[utoipa::path(
    get,
    path = "/api/chat/messages",
    responses(
        (status = 200, description = "All chat messages", body = [ChatMessageDto])
    )
)]
pub async fn get_chat_messages(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let messages = app_state
        .ai
        .get_chat_history()
        .await
        .map_err(error_response)?;
    Ok(Json(
        messages
            .into_iter()
            .map(ChatMessageDto::from)
            .collect::<Vec<_>>(),
    ))
}

/// Answer a free-text question from the ingested notes and flashcards.
#[utoipa::path(
    post,
    path = "/api/chat/ask",
    request_body = AskQuestionRequest,
    responses(
        (status = 200, description = "The generated answer", body = ChatResponseDto)
    )
)]
pub async fn ask_question(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<AskQuestionRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let response = app_state
        .ai
        .answer_question(&payload.question)
        .await
        .map_err(error_response)?;
    Ok(Json(ChatResponseDto {
        answer: response.answer,
        relevant_cards: response.relevant_cards,
    }))
}

/// Generate a multiple-choice quiz question for a deck.
#[utoipa::path(
    post,
    path = "/api/quiz/generate/{deck_id}",
    responses(
        (status = 200, description = "A generated quiz question", body = QuizQuestionDto),
        (status = 404, description = "Deck has no flashcards", body = ErrorBody)
    ),
    params(("deck_id" = Uuid, Path, description = "Deck id"))
)]
pub async fn generate_quiz(
    State(app_state): State<Arc<AppState>>,
    Path(deck_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let quiz = app_state
        .ai
        .generate_quiz_question(deck_id)
        .await
        .map_err(error_response)?;
    Ok(Json(QuizQuestionDto {
        question: quiz.question,
        options: quiz.options,
        correct_answer: quiz.correct_answer,
        explanation: quiz.explanation,
    }))
}

/// Clear the vector store and re-ingest the data directory. Destructive.
#[utoipa::path(
    post,
    path = "/api/admin/reingest",
    responses(
        (status = 200, description = "Re-ingestion outcome", body = ReingestResponse)
    )
)]
pub async fn reingest(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let success = app_state
        .ingestion
        .reingest(&app_state.config.data_directory)
        .await;
    Ok(Json(ReingestResponse { success }))
}
