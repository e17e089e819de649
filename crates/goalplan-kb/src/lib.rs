//! Goal planner core
//!
//! Keeps a persistent directed graph of goals and their dependencies, and
//! merges goals extracted from language model replies into it.

// Core modules
pub mod data;
pub mod storage;
pub mod traits;
pub mod services;

// Implementation adapters
pub mod adapters;

pub mod config;
pub mod logging;

// Testing utilities
pub mod test_utils;

use std::sync::Arc;

// Re-export key types for convenient usage
pub use data::errors::{CoreError, PersistenceError};
pub use data::entities::{
    goal_attributes, Attributes, Dependency, Goal, GoalRecord, DESCRIPTION_KEY, NODE_ID_KEY,
    PRIORITY_KEY,
};
pub use storage::{GoalGraph, GraphStore};
pub use traits::{GoalReader, GoalWriter};
pub use config::PlannerConfig;

// Re-export core services
pub use services::{
    start, ExtractionOptions, ExtractionOutcome, ExtractionPipeline, ExtractionRequest,
    ExtractionService, GraphClient, GraphService, PlannerClient, PlannerHandles, QueryService,
};
pub use services::extraction::{validate_record, Rejection};

pub use adapters::{OllamaConfig, OllamaProvider};
pub use goalplan_interfaces::{ProviderError, TextCompletionProvider};

/// Builds the text completion provider described by `config`.
pub fn create_provider(config: &PlannerConfig) -> Result<Arc<dyn TextCompletionProvider>, CoreError> {
    let provider = OllamaProvider::new(config.provider_config())?;
    Ok(Arc::new(provider))
}

/// Opens the goal store at the configured path and starts the services.
pub fn start_planner(
    config: &PlannerConfig,
    provider: Arc<dyn TextCompletionProvider>,
) -> PlannerHandles {
    let store = GraphStore::open(config.goals_path());
    start(store, provider, config.extraction_options())
}
