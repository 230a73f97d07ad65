//! Inference provider abstraction
//!
//! A provider turns a rendered prompt into raw response text. Parsing and
//! validation happen in the strategy layer, so a provider only reports
//! transport-level failures.

use async_trait::async_trait;
use thiserror::Error;

/// Inference provider errors
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Request timeout")]
    Timeout,

    #[error("Rate limited")]
    RateLimited,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// External qualitative inference service
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Variant name reported in logs and on the prediction (e.g. the model id)
    fn name(&self) -> &str;

    /// Send a prompt and return the raw completion text
    async fn complete(&self, prompt: &str) -> Result<String, InferenceError>;
}
