//! Error handling for the Weather Watch ingestion service

use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// The provider could not be reached or answered with a failure status
    #[error("weather source unavailable: {0}")]
    SourceUnavailable(String),

    /// The provider answered, but the document is missing required structure
    #[error("malformed source response: {0}")]
    MalformedResponse(String),

    // Store errors
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

/// Result type alias for the ingestion pipeline
pub type AppResult<T> = Result<T, AppError>;
