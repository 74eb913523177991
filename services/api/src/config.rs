//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which vector store adapter to wire in at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VectorBackend {
    /// Chroma over its REST API, embeddings via an OpenAI-compatible endpoint.
    Chroma,
    /// Keyword-scored in-memory store, for development without a Chroma instance.
    Memory,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub vector_backend: VectorBackend,
    pub chroma_url: String,
    pub chroma_collection: String,
    pub embeddings_url: String,
    pub embedding_model: String,
    pub data_directory: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub vector_search_limit: usize,
    pub adapter_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Vector Store Settings ---
        let backend_str =
            std::env::var("VECTOR_STORE").unwrap_or_else(|_| "chroma".to_string());
        let vector_backend = match backend_str.to_lowercase().as_str() {
            "chroma" => VectorBackend::Chroma,
            "memory" => VectorBackend::Memory,
            other => {
                return Err(ConfigError::InvalidValue(
                    "VECTOR_STORE".to_string(),
                    format!("'{}' is not one of: chroma, memory", other),
                ))
            }
        };

        let chroma_url =
            std::env::var("CHROMA_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
        let chroma_collection =
            std::env::var("CHROMA_COLLECTION").unwrap_or_else(|_| "recallmind".to_string());
        let embeddings_url = std::env::var("EMBEDDINGS_URL")
            .unwrap_or_else(|_| "http://localhost:11434/v1".to_string());
        let embedding_model = std::env::var("EMBEDDING_MODEL")
            .unwrap_or_else(|_| "nomic-embed-text:latest".to_string());

        // --- Load Ingestion Settings ---
        let data_directory = std::env::var("DATA_DIRECTORY")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));
        let chunk_size = parse_var("CHUNK_SIZE", 1000)?;
        let chunk_overlap = parse_var("CHUNK_OVERLAP", 200)?;
        let vector_search_limit = parse_var("VECTOR_SEARCH_LIMIT", 5)?;
        let adapter_timeout_secs: u64 = parse_var("ADAPTER_TIMEOUT_SECS", 10)?;

        Ok(Self {
            bind_address,
            log_level,
            vector_backend,
            chroma_url,
            chroma_collection,
            embeddings_url,
            embedding_model,
            data_directory,
            chunk_size,
            chunk_overlap,
            vector_search_limit,
            adapter_timeout: Duration::from_secs(adapter_timeout_secs),
        })
    }
}

/// Parses an optional numeric environment variable, falling back to a default.
fn parse_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
