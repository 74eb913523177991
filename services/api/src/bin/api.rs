//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        ChromaVectorStore, MemoryCardReviewRepository, MemoryChatMessageRepository,
        MemoryDeckRepository, MemoryFlashcardRepository, MemoryStudySessionRepository,
        MemoryTestRepository, MemoryUserStatsRepository, MemoryVectorStore,
    },
    config::{Config, VectorBackend},
    error::ApiError,
    services::{
        AiService, DeckService, DocumentIngestionService, FlashcardService,
        InitializationService, StudyService, TestService,
    },
    web::{build_router, rest::ApiDoc, state::AppState},
};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Method,
};
use axum::Router;
use recallmind_core::ports::VectorStore;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize the Vector Store Adapter ---
    let vector: Arc<dyn VectorStore> = match config.vector_backend {
        VectorBackend::Chroma => {
            info!(url = %config.chroma_url, "Using the Chroma vector store");
            Arc::new(ChromaVectorStore::new(
                &config.chroma_url,
                &config.chroma_collection,
                &config.embeddings_url,
                &config.embedding_model,
                config.adapter_timeout,
            )?)
        }
        VectorBackend::Memory => {
            info!("Using the in-memory vector store");
            Arc::new(MemoryVectorStore::new())
        }
    };

    // --- 3. Initialize Repositories ---
    let deck_repo = Arc::new(MemoryDeckRepository::new());
    let flashcard_repo = Arc::new(MemoryFlashcardRepository::new());
    let session_repo = Arc::new(MemoryStudySessionRepository::new());
    let review_repo = Arc::new(MemoryCardReviewRepository::new());
    let test_repo = Arc::new(MemoryTestRepository::new());
    let chat_repo = Arc::new(MemoryChatMessageRepository::new());
    let stats_repo = Arc::new(MemoryUserStatsRepository::new());

    // --- 4. Build the Services ---
    let ingestion = Arc::new(DocumentIngestionService::new(
        vector.clone(),
        config.chunk_size,
        config.chunk_overlap,
    )?);
    let app_state = Arc::new(AppState {
        config: config.clone(),
        decks: Arc::new(DeckService::new(
            deck_repo.clone(),
            flashcard_repo.clone(),
            stats_repo.clone(),
        )),
        flashcards: Arc::new(FlashcardService::new(
            flashcard_repo.clone(),
            deck_repo.clone(),
        )),
        study: Arc::new(StudyService::new(
            session_repo,
            review_repo,
            flashcard_repo.clone(),
            deck_repo.clone(),
            stats_repo,
        )),
        ai: Arc::new(AiService::new(
            vector.clone(),
            chat_repo,
            flashcard_repo.clone(),
            config.vector_search_limit,
        )),
        tests: Arc::new(TestService::new(test_repo, flashcard_repo)),
        ingestion: ingestion.clone(),
    });

    // --- 5. Startup Ingestion Phase ---
    // Runs before the listener binds, so the first request already sees an
    // initialized store.
    let init = InitializationService::new(vector, ingestion, config.data_directory.clone());
    init.initialize().await;

    // --- 6. Create the Web Router ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    let app = Router::new()
        .merge(build_router(app_state).layer(cors))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(())
}
