use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use goalplan_interfaces::GraphView;

use crate::data::{normalize_goal_name, Attributes, CoreError, Dependency, Goal};
use crate::storage::graph::GoalGraph;
use crate::storage::persistence::{load_graph, save_graph};

/// Owns the goal graph and the file it is persisted to.
///
/// Every successful mutation is written to disk before it returns. A failed
/// write is reported as [`CoreError::Persistence`] but the in-memory change
/// stays applied; the next successful save brings the file back in line.
#[derive(Debug)]
pub struct GraphStore {
    graph: GoalGraph,
    path: PathBuf,
}

impl GraphStore {
    /// Loads the graph stored at `path`, or starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let graph = load_graph(&path);
        info!(path = %path.display(), goals = graph.len(), "Goal store opened");
        Self { graph, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn graph(&self) -> &GoalGraph {
        &self.graph
    }

    pub fn add_goal(&mut self, name: &str, attributes: Attributes) -> Result<bool, CoreError> {
        let name = normalize_goal_name(name, "goal_name")?;
        if self.graph.contains_goal(&name) {
            debug!(goal = %name, "Goal already exists, not overwriting");
            return Ok(false);
        }

        self.graph.insert_goal(Goal::new(name.clone(), attributes));
        info!(goal = %name, "Added goal");
        self.save()?;
        Ok(true)
    }

    pub fn add_dependency(&mut self, from: &str, to: &str) -> Result<bool, CoreError> {
        let dependency = Dependency::new(from, to)?;

        for endpoint in [&dependency.from, &dependency.to] {
            if !self.graph.contains_goal(endpoint) {
                debug!(goal = %endpoint, "Dependency endpoint missing, edge not added");
                return Ok(false);
            }
        }
        if self.graph.contains_dependency(&dependency) {
            debug!(from = %dependency.from, to = %dependency.to, "Dependency already exists");
            return Ok(false);
        }

        info!(from = %dependency.from, to = %dependency.to, "Added dependency");
        self.graph.insert_dependency(dependency);
        self.save()?;
        Ok(true)
    }

    pub fn remove_goal(&mut self, name: &str) -> Result<bool, CoreError> {
        let name = normalize_goal_name(name, "goal_name")?;
        match self.graph.remove_goal(&name) {
            Some(dropped_edges) => {
                info!(goal = %name, dropped_edges, "Removed goal");
                self.save()?;
                Ok(true)
            }
            None => {
                debug!(goal = %name, "Goal not found, nothing removed");
                Ok(false)
            }
        }
    }

    pub fn clear(&mut self) -> Result<(), CoreError> {
        self.graph = GoalGraph::new();
        info!("Cleared goal graph");
        self.save()
    }

    pub fn has_goal(&self, name: &str) -> bool {
        self.graph.contains_goal(name.trim())
    }

    /// Every goal in insertion order.
    pub fn goals(&self) -> Vec<Goal> {
        self.graph.goals().cloned().collect()
    }

    /// Goals that must be completed before `name`; empty when `name` is unknown.
    pub fn dependencies(&self, name: &str) -> Vec<String> {
        self.graph.predecessors(name.trim())
    }

    /// Goals that depend on `name`; empty when `name` is unknown.
    pub fn dependents(&self, name: &str) -> Vec<String> {
        self.graph.successors(name.trim())
    }

    pub fn topological_order(&self) -> Result<Vec<String>, CoreError> {
        self.graph.topological_order()
    }

    pub fn summary(&self) -> String {
        self.graph.summary()
    }

    pub fn view(&self) -> GraphView {
        self.graph.view()
    }

    /// Writes the current graph to the store's file.
    pub fn save(&self) -> Result<(), CoreError> {
        save_graph(&self.path, &self.graph).map_err(|e| {
            error!(path = %self.path.display(), error = %e, "Failed to save goal graph");
            e
        })
    }
}
