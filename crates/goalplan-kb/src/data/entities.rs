//! Core entity types for the goal planner

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use goalplan_interfaces::{DependencyView, GoalView};

use crate::data::errors::CoreError;

/// Open attribute map attached to each goal. Values are kept verbatim so
/// attributes the core does not interpret survive a load/save round trip.
pub type Attributes = Map<String, Value>;

/// Attribute key holding the goal description
pub const DESCRIPTION_KEY: &str = "description";

/// Attribute key holding the goal priority label
pub const PRIORITY_KEY: &str = "priority";

/// Key that carries the goal name in a persisted node. Reserved, so it never
/// appears among a goal's attributes.
pub const NODE_ID_KEY: &str = "id";

/// Node: a named unit of work or intent
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub name: String,
    pub attributes: Attributes,
}

impl Goal {
    /// Builds a goal, dropping any [`NODE_ID_KEY`] attribute.
    pub fn new(name: impl Into<String>, attributes: Attributes) -> Self {
        let attributes = if attributes.contains_key(NODE_ID_KEY) {
            attributes
                .into_iter()
                .filter(|(key, _)| key != NODE_ID_KEY)
                .collect()
        } else {
            attributes
        };
        Self {
            name: name.into(),
            attributes,
        }
    }

    /// Description attribute, empty when absent or not a string.
    pub fn description(&self) -> &str {
        self.text_attribute(DESCRIPTION_KEY)
    }

    /// Priority attribute, empty when absent or not a string.
    pub fn priority(&self) -> &str {
        self.text_attribute(PRIORITY_KEY)
    }

    fn text_attribute(&self, key: &str) -> &str {
        self.attributes
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn to_view(&self) -> GoalView {
        let extra = self
            .attributes
            .iter()
            .filter(|(key, _)| key.as_str() != DESCRIPTION_KEY && key.as_str() != PRIORITY_KEY)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        GoalView {
            name: self.name.clone(),
            description: self.description().to_string(),
            priority: self.priority().to_string(),
            extra,
        }
    }
}

/// Builds the attribute map for a goal with a description and priority.
pub fn goal_attributes(description: impl Into<String>, priority: impl Into<String>) -> Attributes {
    let mut attributes = Attributes::new();
    attributes.insert(DESCRIPTION_KEY.to_string(), Value::String(description.into()));
    attributes.insert(PRIORITY_KEY.to_string(), Value::String(priority.into()));
    attributes
}

/// Trims a goal name and rejects names that are empty afterwards.
pub fn normalize_goal_name(raw: &str, what: &str) -> Result<String, CoreError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(CoreError::invalid_argument(format!(
            "{what} must be a non-empty string"
        )));
    }
    Ok(name.to_string())
}

/// Edge: `from` must be completed before `to` (`to` depends on `from`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub from: String,
    pub to: String,
}

impl Dependency {
    /// Builds an edge from untrimmed names. Fails on empty names and on
    /// self-dependencies.
    pub fn new(from: &str, to: &str) -> Result<Self, CoreError> {
        let from = normalize_goal_name(from, "from_goal")?;
        let to = normalize_goal_name(to, "to_goal")?;

        if from == to {
            return Err(CoreError::invalid_argument(format!(
                "A goal cannot depend on itself: '{from}'"
            )));
        }

        Ok(Self { from, to })
    }

    pub fn touches(&self, name: &str) -> bool {
        self.from == name || self.to == name
    }

    pub fn to_view(&self) -> DependencyView {
        DependencyView {
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }
}

/// A goal record that passed validation, ready to merge into the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalRecord {
    pub name: String,
    pub description: String,
    pub priority: String,
    pub depends_on: Vec<String>,
}

impl GoalRecord {
    pub fn attributes(&self) -> Attributes {
        goal_attributes(self.description.clone(), self.priority.clone())
    }
}
