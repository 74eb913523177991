//! services/api/src/web/decks.rs
//!
//! Axum handlers for the deck CRUD endpoints.

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

use crate::web::flashcards::FlashcardDto;
use crate::web::{error_response, state::AppState, ErrorBody};
use recallmind_core::domain::Deck;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct DeckDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub difficulty: String,
    pub card_count: usize,
    pub created_at: DateTime<Utc>,
    pub last_studied: Option<DateTime<Utc>>,
}

impl From<Deck> for DeckDto {
    fn from(deck: Deck) -> Self {
        Self {
            id: deck.id,
            name: deck.name,
            description: deck.description,
            difficulty: deck.difficulty.as_str().to_string(),
            card_count: deck.card_count,
            created_at: deck.created_at,
            last_studied: deck.last_studied,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct DeckWithCardsDto {
    #[serde(flatten)]
    pub deck: DeckDto,
    pub flashcards: Vec<FlashcardDto>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateDeckRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
}

fn default_difficulty() -> String {
    "beginner".to_string()
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateDeckRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<String>,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List all decks.
#[utoipa::path(
    get,
    path = "/api/decks",
    responses(
        (status = 200, description = "All decks", body = [DeckDto])
    )
)]
pub async fn list_decks(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let decks = app_state
        .decks
        .get_all_decks()
        .await
        .map_err(error_response)?;
    Ok(Json(decks.into_iter().map(DeckDto::from).collect::<Vec<_>>()))
}

/// Get one deck together with its flashcards.
#[utoipa::path(
    get,
    path = "/api/decks/{deck_id}",
    responses(
        (status = 200, description = "The deck with its cards", body = DeckWithCardsDto),
        (status = 404, description = "Deck not found", body = ErrorBody)
    ),
    params(("deck_id" = Uuid, Path, description = "Deck id"))
)]
pub async fn get_deck(
    State(app_state): State<Arc<AppState>>,
    Path(deck_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let detail = app_state
        .decks
        .get_deck_with_cards(deck_id)
        .await
        .map_err(error_response)?;
    Ok(Json(DeckWithCardsDto {
        deck: DeckDto::from(detail.deck),
        flashcards: detail
            .flashcards
            .into_iter()
            .map(FlashcardDto::from)
            .collect(),
    }))
}

/// Create a new deck.
#[utoipa::path(
    post,
    path = "/api/decks",
    request_body = CreateDeckRequest,
    responses(
        (status = 201, description = "Deck created", body = DeckDto),
        (status = 400, description = "Invalid name or difficulty", body = ErrorBody)
    )
)]
pub async fn create_deck(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateDeckRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let deck = app_state
        .decks
        .create_deck(
            &payload.name,
            payload.description.as_deref(),
            &payload.difficulty,
        )
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(DeckDto::from(deck))))
}

/// Update an existing deck.
#[utoipa::path(
    put,
    path = "/api/decks/{deck_id}",
    request_body = UpdateDeckRequest,
    responses(
        (status = 200, description = "Deck updated", body = DeckDto),
        (status = 400, description = "Invalid field value", body = ErrorBody),
        (status = 404, description = "Deck not found", body = ErrorBody)
    ),
    params(("deck_id" = Uuid, Path, description = "Deck id"))
)]
pub async fn update_deck(
    State(app_state): State<Arc<AppState>>,
    Path(deck_id): Path<Uuid>,
    Json(payload): Json<UpdateDeckRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    let deck = app_state
        .decks
        .update_deck(
            deck_id,
            payload.name.as_deref(),
            payload.description.as_deref(),
            payload.difficulty.as_deref(),
        )
        .await
        .map_err(error_response)?;
    Ok(Json(DeckDto::from(deck)))
}

/// Delete a deck and all of its flashcards.
#[utoipa::path(
    delete,
    path = "/api/decks/{deck_id}",
    responses(
        (status = 204, description = "Deck deleted"),
        (status = 404, description = "Deck not found", body = ErrorBody)
    ),
    params(("deck_id" = Uuid, Path, description = "Deck id"))
)]
pub async fn delete_deck(
    State(app_state): State<Arc<AppState>>,
    Path(deck_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorBody>)> {
    app_state
        .decks
        .delete_deck(deck_id)
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}
