//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use crate::config::Config;
use crate::services::{
    AiService, DeckService, DocumentIngestionService, FlashcardService, StudyService, TestService,
};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub decks: Arc<DeckService>,
    pub flashcards: Arc<FlashcardService>,
    pub study: Arc<StudyService>,
    pub ai: Arc<AiService>,
    pub tests: Arc<TestService>,
    pub ingestion: Arc<DocumentIngestionService>,
}
