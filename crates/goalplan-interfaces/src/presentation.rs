//! Presentation layer payloads
//!
//! The core performs no rendering. It hands one of these payloads to whatever
//! presentation layer sits on top (a window, a terminal, a web page).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A goal as the presentation layer sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalView {
    /// Unique goal name
    pub name: String,

    /// Description, empty when none was given
    pub description: String,

    /// Priority label, empty when none was given
    pub priority: String,

    /// Every other attribute attached to the goal
    #[serde(default)]
    pub extra: Map<String, Value>,
}

/// A dependency edge: `from` must be completed before `to`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyView {
    /// Goal that must come first
    pub from: String,

    /// Goal that depends on `from`
    pub to: String,
}

/// Snapshot of the whole goal graph, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphView {
    /// All goals
    pub goals: Vec<GoalView>,

    /// All dependency edges
    pub dependencies: Vec<DependencyView>,
}

impl GraphView {
    /// Whether the snapshot holds no goals
    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }
}

/// What the core hands to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum PresentationPayload {
    /// A goal/edge collection for graph display
    Graph(GraphView),

    /// A plain textual summary of the graph
    Summary(String),

    /// Conversational text returned by the model
    Conversational(String),
}
