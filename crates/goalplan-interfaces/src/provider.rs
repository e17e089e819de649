//! Text completion provider interfaces
//!
//! The planner core never talks to a language model directly. It sends a prompt
//! through [`TextCompletionProvider`] and receives plain text back.

use async_trait::async_trait;
use thiserror::Error;

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur when talking to a text completion provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider could not be reached at all
    #[error("Provider unreachable: {0}")]
    Unreachable(String),

    /// The provider did not answer within its own deadline
    #[error("Provider request timed out: {0}")]
    Timeout(String),

    /// The provider answered with a non-success status
    #[error("Provider returned status {status}: {message}")]
    Status {
        /// HTTP (or transport specific) status code
        status: u16,
        /// Body or reason returned alongside the status
        message: String,
    },

    /// The provider answered but the envelope could not be decoded
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// The requested model is not served by the provider
    #[error("Model '{model}' is not available. Available models: {available:?}")]
    ModelNotFound {
        /// The requested model identifier
        model: String,
        /// Models the provider reported instead
        available: Vec<String>,
    },
}

/// Contract for a text completion provider
#[async_trait]
pub trait TextCompletionProvider: Send + Sync {
    /// Contract: Sends `prompt` to the model identified by `model_id` and returns the raw completion text.
    /// - Returns `Err` only for transport level failures (unreachable, timeout, bad status, undecodable envelope).
    /// - The completion text itself is returned verbatim; no guarantee is made about its shape.
    async fn complete(&self, model_id: &str, prompt: &str) -> ProviderResult<String>;

    /// Contract: Lists the model identifiers the provider can serve.
    async fn list_models(&self) -> ProviderResult<Vec<String>>;
}
