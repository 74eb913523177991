//! services/api/src/web/flashcards.rs
//!
//! Axum handlers for the flashcard endpoints.

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
use recallmind_core::domain::Flashcard;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct FlashcardDto {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl From<Flashcard> for FlashcardDto {
    fn from(card: Flashcard) -> Self {
        Self {
            id: card.id,
            deck_id: card.deck_id,
            question: card.question,
            answer: card.answer,
            created_at: card.created_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateFlashcardRequest {
    pub question: String,
    pub answer: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateFlashcardRequest {
    pub question: Option<String>,
    pub answer: Option<String>,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List all flashcards in a deck.
#[utoipa::path(
    get,
    path = "/api/decks/{deck_id}/cards",
    responses(
        (status = 200, description = "The deck's flashcards", body = [FlashcardDto]),
        (status = 404, description = "Deck not found", body = ErrorBody)
    ),
    params(("deck_id" = Uuid, Path, description = "Deck id"))
)]
pub async fn list_flashcards(
    State(app_state): State<Arc<AppState>>,
    Path(deck_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let cards = app_state
        .flashcards
        .get_flashcards_by_deck(deck_id)
        .await
        .map_err(error_response)?;
    Ok(Json(
        cards.into_iter().map(FlashcardDto::from).collect::<Vec<_>>(),
    ))
}

/// Create a flashcard in a deck.
#[utoipa::path(
    post,
    path = "/api/decks/{deck_id}/cards",
    request_body = CreateFlashcardRequest,
    responses(
        (status = 201, description = "Flashcard created", body = FlashcardDto),
        (status = 400, description = "Empty question or answer", body = ErrorBody),
        (status = 404, description = "Deck not found", body = ErrorBody)
    ),
    params(("deck_id" = Uuid, Path, description = "Deck id"))
)]
pub async fn create_flashcard(
    State(app_state): State<Arc<AppState>>,
    Path(deck_id): Path<Uuid>,
    Json(payload): Json<CreateFlashcardRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let card = app_state
        .flashcards
        .create_flashcard(deck_id, &payload.question, &payload.answer)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(FlashcardDto::from(card))))
}

/// Update a flashcard.
#[utoipa::path(
    put,
    path = "/api/cards/{card_id}",
    request_body = UpdateFlashcardRequest,
    responses(
        (status = 200, description = "Flashcard updated", body = FlashcardDto),
        (status = 400, description = "Empty question or answer", body = ErrorBody),
        (status = 404, description = "Flashcard not found", body = ErrorBody)
    ),
    params(("card_id" = Uuid, Path, description = "Flashcard id"))
)]
pub async fn update_flashcard(
    State(app_state): State<Arc<AppState>>,
    Path(card_id): Path<Uuid>,
    Json(payload): Json<UpdateFlashcardRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let card = app_state
        .flashcards
        .update_flashcard(card_id, payload.question.as_deref(), payload.answer.as_deref())
        .await
        .map_err(error_response)?;
    Ok(Json(FlashcardDto::from(card)))
}

/// Delete a flashcard.
#[utoipa::path(
    delete,
    path = "/api/cards/{card_id}",
    responses(
        (status = 204, description = "Flashcard deleted"),
        (status = 404, description = "Flashcard not found", body = ErrorBody)
    ),
    params(("card_id" = Uuid, Path, description = "Flashcard id"))
)]
pub async fn delete_flashcard(
    State(app_state): State<Arc<AppState>>,
    Path(card_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    app_state
        .flashcards
        .delete_flashcard(card_id)
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}
