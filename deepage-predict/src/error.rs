//! Error types for deepage-predict
//!
//! Prediction itself never fails; these errors come from the edges
//! (settings storage, file IO, configuration).

use thiserror::Error;

/// Engine error type
#[derive(Debug, Error)]
pub enum EngineError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored setting that does not parse as its expected type
    #[error("Invalid setting {key}: {message}")]
    InvalidSetting { key: String, message: String },

    /// HTTP client construction error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// deepage-common error
    #[error("Common error: {0}")]
    Common(#[from] deepage_common::Error),
}

/// Result type alias for deepage-predict
pub type Result<T> = std::result::Result<T, EngineError>;
