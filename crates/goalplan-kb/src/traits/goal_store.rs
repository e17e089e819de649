//! Read and write access to the goal graph.
//!
//! Both traits are implemented by [`GraphClient`](crate::services::GraphClient),
//! which forwards every call to the single task that owns the store. The
//! extraction pipeline only needs [`GoalWriter`]; presentation code only gets
//! a [`GoalReader`].

use async_trait::async_trait;

use goalplan_interfaces::GraphView;

use crate::data::{Attributes, CoreError, Goal};

/// Mutating operations on the goal graph.
#[async_trait]
pub trait GoalWriter: Send + Sync {
    /// Adds a goal. `Ok(false)` when a goal with that name already exists.
    async fn add_goal(&self, name: &str, attributes: Attributes) -> Result<bool, CoreError>;

    /// Adds the edge `from -> to`. `Ok(false)` when an endpoint is missing or
    /// the edge already exists.
    async fn add_dependency(&self, from: &str, to: &str) -> Result<bool, CoreError>;

    async fn remove_goal(&self, name: &str) -> Result<bool, CoreError>;

    async fn clear(&self) -> Result<(), CoreError>;
}

/// Read-only views over the goal graph.
#[async_trait]
pub trait GoalReader: Send + Sync {
    async fn has_goal(&self, name: &str) -> Result<bool, CoreError>;

    async fn goals(&self) -> Result<Vec<Goal>, CoreError>;

    /// Predecessors of `name`, empty when the goal does not exist.
    async fn dependencies(&self, name: &str) -> Result<Vec<String>, CoreError>;

    /// Successors of `name`, empty when the goal does not exist.
    async fn dependents(&self, name: &str) -> Result<Vec<String>, CoreError>;

    async fn topological_order(&self) -> Result<Vec<String>, CoreError>;

    async fn summary(&self) -> Result<String, CoreError>;

    async fn graph_view(&self) -> Result<GraphView, CoreError>;
}
