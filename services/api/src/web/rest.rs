//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification, aggregating every
//! handler and schema in the web layer.

use utoipa::OpenApi;

use crate::web::{chat, decks, flashcards, study, ErrorBody};

#[derive(OpenApi)]
#[openapi(
    paths(
        decks::list_decks,
        decks::get_deck,
        decks::create_deck,
        decks::update_deck,
        decks::delete_deck,
        flashcards::list_flashcards,
        flashcards::create_flashcard,
        flashcards::update_flashcard,
        flashcards::delete_flashcard,
        study::start_session,
        study::end_session,
        study::review_card,
        study::get_progress,
        study::get_stats,
        study::create_test,
        study::submit_test_results,
        study::list_tests,
        chat::get_chat_messages,
        chat::ask_question,
        chat::generate_quiz,
        chat::reingest,
    ),
    components(
        schemas(
            ErrorBody,
            decks::DeckDto,
            decks::DeckWithCardsDto,
            decks::CreateDeckRequest,
            decks::UpdateDeckRequest,
            flashcards::FlashcardDto,
            flashcards::CreateFlashcardRequest,
            flashcards::UpdateFlashcardRequest,
            study::StudySessionDto,
            study::CardReviewDto,
            study::StudyProgressDto,
            study::UserStatsDto,
            study::TestDto,
            study::StartSessionRequest,
            study::ReviewCardRequest,
            study::CreateTestRequest,
            study::SubmitTestResultsRequest,
            chat::ChatMessageDto,
            chat::AskQuestionRequest,
            chat::ChatResponseDto,
            chat::QuizQuestionDto,
            chat::ReingestResponse,
        )
    ),
    tags(
        (name = "RecallMind API", description = "Flashcards, study tracking, and Q&A over ingested notes.")
    )
)]
pub struct ApiDoc;
