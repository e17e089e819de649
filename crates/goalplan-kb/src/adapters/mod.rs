//! Adapters for external services

pub mod ollama;

// Re-export adapters for easier import
pub use ollama::{OllamaConfig, OllamaProvider};
