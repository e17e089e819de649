//! Message types for service communication

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use uuid::Uuid;

use goalplan_interfaces::GraphView;

use crate::data::{Attributes, CoreError, Goal, GoalRecord};

/// Reply half handed to the graph service with each command.
pub type Reply<T> = oneshot::Sender<T>;

/// Commands understood by the [`GraphService`](super::GraphService).
#[derive(Debug)]
pub enum GraphCommand {
    AddGoal {
        name: String,
        attributes: Attributes,
        reply: Reply<Result<bool, CoreError>>,
    },
    AddDependency {
        from: String,
        to: String,
        reply: Reply<Result<bool, CoreError>>,
    },
    RemoveGoal {
        name: String,
        reply: Reply<Result<bool, CoreError>>,
    },
    Clear {
        reply: Reply<Result<(), CoreError>>,
    },
    HasGoal {
        name: String,
        reply: Reply<bool>,
    },
    GetGoals {
        reply: Reply<Vec<Goal>>,
    },
    GetDependencies {
        name: String,
        reply: Reply<Vec<String>>,
    },
    GetDependents {
        name: String,
        reply: Reply<Vec<String>>,
    },
    TopologicalOrder {
        reply: Reply<Result<Vec<String>, CoreError>>,
    },
    Summary {
        reply: Reply<String>,
    },
    View {
        reply: Reply<GraphView>,
    },
}

impl GraphCommand {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GraphCommand::AddGoal { .. } => "add_goal",
            GraphCommand::AddDependency { .. } => "add_dependency",
            GraphCommand::RemoveGoal { .. } => "remove_goal",
            GraphCommand::Clear { .. } => "clear",
            GraphCommand::HasGoal { .. } => "has_goal",
            GraphCommand::GetGoals { .. } => "get_goals",
            GraphCommand::GetDependencies { .. } => "get_dependencies",
            GraphCommand::GetDependents { .. } => "get_dependents",
            GraphCommand::TopologicalOrder { .. } => "topological_order",
            GraphCommand::Summary { .. } => "summary",
            GraphCommand::View { .. } => "view",
        }
    }
}

/// A piece of free-form text to run through goal extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    pub request_id: Uuid,
    pub text: String,
    /// Model to use; the service default applies when `None`.
    pub model: Option<String>,
}

impl ExtractionRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            text: text.into(),
            model: None,
        }
    }

    /// Wraps the contents of a loaded context file.
    pub fn from_context(context: &str) -> Self {
        Self::new(format!(
            "Process the following context for goals: {context}"
        ))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// An extraction request paired with the channel its result goes back on.
#[derive(Debug)]
pub struct ExtractionJob {
    pub request: ExtractionRequest,
    pub reply: Reply<Result<ExtractionOutcome, CoreError>>,
}

/// Result of one extraction run: either structured goals were found and
/// merged, or the model answered with plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ExtractionOutcome {
    Extracted(Vec<GoalRecord>),
    Conversational(String),
}

impl ExtractionOutcome {
    pub fn is_conversational(&self) -> bool {
        matches!(self, ExtractionOutcome::Conversational(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_context_wraps_text() {
        let request = ExtractionRequest::from_context("I want to learn Rust");
        assert_eq!(
            request.text,
            "Process the following context for goals: I want to learn Rust"
        );
        assert!(request.model.is_none());
    }

    #[test]
    fn test_requests_get_distinct_ids() {
        let a = ExtractionRequest::new("one").with_model("mistral");
        let b = ExtractionRequest::new("one");
        assert_ne!(a.request_id, b.request_id);
        assert_eq!(a.model.as_deref(), Some("mistral"));
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let outcome = ExtractionOutcome::Conversational("Hello".into());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["kind"], "conversational");
        assert!(outcome.is_conversational());
    }
}
