//! In-memory goal dependency graph backed by petgraph.
//!
//! Node and edge handles are also kept in insertion order so that summaries,
//! listings and the topological order are deterministic for a fixed mutation
//! history.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Write as _;

use petgraph::algo;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::{Dfs, EdgeRef};
use petgraph::Direction;
use serde_json::Value;

use goalplan_interfaces::GraphView;

use crate::data::{CoreError, Dependency, Goal};

/// Directed graph of goals. Callers hand in already-normalized names; the
/// [`GraphStore`](super::GraphStore) is responsible for trimming and argument
/// validation.
#[derive(Debug, Clone, Default)]
pub struct GoalGraph {
    graph: StableDiGraph<Goal, ()>,
    node_map: HashMap<String, NodeIndex>,
    nodes: Vec<NodeIndex>,
    edges: Vec<EdgeIndex>,
}

impl PartialEq for GoalGraph {
    fn eq(&self, other: &Self) -> bool {
        self.goals().eq(other.goals()) && self.dependencies().eq(other.dependencies())
    }
}

impl GoalGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains_goal(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    pub fn contains_dependency(&self, dependency: &Dependency) -> bool {
        match (self.node_map.get(&dependency.from), self.node_map.get(&dependency.to)) {
            (Some(&from), Some(&to)) => self.graph.find_edge(from, to).is_some(),
            _ => false,
        }
    }

    pub fn goal(&self, name: &str) -> Option<&Goal> {
        self.node_map.get(name).map(|&node| &self.graph[node])
    }

    /// All goals, in insertion order.
    pub fn goals(&self) -> impl Iterator<Item = &Goal> + '_ {
        self.nodes.iter().map(|&node| &self.graph[node])
    }

    /// All edges, in insertion order.
    pub fn dependencies(&self) -> impl Iterator<Item = Dependency> + '_ {
        self.edges.iter().filter_map(|&edge| {
            let (from, to) = self.graph.edge_endpoints(edge)?;
            Some(Dependency {
                from: self.graph[from].name.clone(),
                to: self.graph[to].name.clone(),
            })
        })
    }

    /// Inserts `goal` unless a goal with the same name exists.
    pub fn insert_goal(&mut self, goal: Goal) -> bool {
        if self.node_map.contains_key(&goal.name) {
            return false;
        }
        let name = goal.name.clone();
        let node = self.graph.add_node(goal);
        self.node_map.insert(name, node);
        self.nodes.push(node);
        true
    }

    /// Inserts `dependency` if both endpoints exist and the edge is new.
    pub fn insert_dependency(&mut self, dependency: Dependency) -> bool {
        let (Some(&from), Some(&to)) = (
            self.node_map.get(&dependency.from),
            self.node_map.get(&dependency.to),
        ) else {
            return false;
        };
        if self.graph.find_edge(from, to).is_some() {
            return false;
        }
        let edge = self.graph.add_edge(from, to, ());
        self.edges.push(edge);
        true
    }

    /// Removes the goal and every edge touching it. Returns the number of
    /// edges dropped alongside the goal, or `None` when the goal is absent.
    pub fn remove_goal(&mut self, name: &str) -> Option<usize> {
        let node = self.node_map.remove(name)?;
        let incident: HashSet<EdgeIndex> = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .chain(self.graph.edges_directed(node, Direction::Outgoing))
            .map(|edge| edge.id())
            .collect();

        self.graph.remove_node(node);
        self.nodes.retain(|&n| n != node);
        self.edges.retain(|edge| !incident.contains(edge));
        Some(incident.len())
    }

    /// Goals that must be completed before `name`, in goal insertion order.
    pub fn predecessors(&self, name: &str) -> Vec<String> {
        self.neighbors(name, Direction::Incoming)
    }

    /// Goals that depend on `name`, in goal insertion order.
    pub fn successors(&self, name: &str) -> Vec<String> {
        self.neighbors(name, Direction::Outgoing)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Vec<String> {
        let Some(&node) = self.node_map.get(name) else {
            return Vec::new();
        };
        let adjacent: HashSet<NodeIndex> = self.graph.neighbors_directed(node, direction).collect();
        self.nodes
            .iter()
            .filter(|n| adjacent.contains(n))
            .map(|&n| self.graph[n].name.clone())
            .collect()
    }

    /// Orders goals so every edge's source comes before its target. Among
    /// goals that are ready at the same time the earliest inserted goes first.
    pub fn topological_order(&self) -> Result<Vec<String>, CoreError> {
        if algo::is_cyclic_directed(&self.graph) {
            return Err(CoreError::CycleDetected {
                remaining: self.unorderable(),
            });
        }

        let rank: HashMap<NodeIndex, usize> =
            self.nodes.iter().enumerate().map(|(rank, &node)| (node, rank)).collect();
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .nodes
            .iter()
            .map(|&node| {
                let degree = self.graph.neighbors_directed(node, Direction::Incoming).count();
                (node, degree)
            })
            .collect();
        let mut ready: BTreeMap<usize, NodeIndex> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(node, _)| (rank[node], *node))
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some((_, node)) = ready.pop_first() {
            order.push(self.graph[node].name.clone());
            for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if let Some(degree) = in_degree.get_mut(&next) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(rank[&next], next);
                    }
                }
            }
        }
        Ok(order)
    }

    /// Goals on a cycle plus everything downstream of one, in insertion order.
    fn unorderable(&self) -> Vec<String> {
        let mut blocked = HashSet::new();
        let mut dfs = Dfs::empty(&self.graph);
        for component in algo::tarjan_scc(&self.graph) {
            if component.len() < 2 {
                continue;
            }
            for start in component {
                dfs.move_to(start);
                while let Some(node) = dfs.next(&self.graph) {
                    blocked.insert(node);
                }
            }
        }
        self.nodes
            .iter()
            .filter(|node| blocked.contains(node))
            .map(|&node| self.graph[node].name.clone())
            .collect()
    }

    /// Human-readable listing of goals and edges in insertion order.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "Current Goal Graph:\n  (Graph is empty)\n".to_string();
        }

        let mut out = String::from("Current Goal Graph:\n  Goals (Nodes):\n");
        for goal in self.goals() {
            let attrs = goal
                .attributes
                .iter()
                .map(|(key, value)| format!("{key}={}", render_value(value)))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "    - {} ({})", goal.name, attrs);
        }

        out.push_str("  Dependencies (Edges):\n");
        if self.edges.is_empty() {
            out.push_str("    (No dependencies)\n");
        } else {
            for dep in self.dependencies() {
                let _ = writeln!(out, "    - {} -> {}", dep.from, dep.to);
            }
        }
        out
    }

    pub fn view(&self) -> GraphView {
        GraphView {
            goals: self.goals().map(Goal::to_view).collect(),
            dependencies: self.dependencies().map(|dep| dep.to_view()).collect(),
        }
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{goal_attributes, Attributes};
    use pretty_assertions::assert_eq;

    fn goal(name: &str) -> Goal {
        Goal::new(name, Attributes::new())
    }

    fn edge(from: &str, to: &str) -> Dependency {
        Dependency::new(from, to).unwrap()
    }

    fn graph_with(names: &[&str], edges: &[(&str, &str)]) -> GoalGraph {
        let mut graph = GoalGraph::new();
        for name in names {
            assert!(graph.insert_goal(goal(name)));
        }
        for (from, to) in edges {
            assert!(graph.insert_dependency(edge(from, to)));
        }
        graph
    }

    fn assert_respects_edges(graph: &GoalGraph, order: &[String]) {
        assert_eq!(order.len(), graph.len());
        let position = |name: &str| order.iter().position(|n| n == name).unwrap();
        for dep in graph.dependencies() {
            assert!(
                position(&dep.from) < position(&dep.to),
                "{} should precede {}",
                dep.from,
                dep.to
            );
        }
    }

    #[test]
    fn test_duplicate_goal_is_ignored() {
        let mut graph = GoalGraph::new();
        assert!(graph.insert_goal(Goal::new("A", goal_attributes("first", "High"))));
        assert!(!graph.insert_goal(Goal::new("A", goal_attributes("second", "Low"))));
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.goal("A").unwrap().description(), "first");
    }

    #[test]
    fn test_dangling_and_duplicate_edges_are_ignored() {
        let mut graph = graph_with(&["A", "B"], &[("A", "B")]);
        assert!(!graph.insert_dependency(edge("A", "B")));
        assert!(!graph.insert_dependency(edge("A", "Missing")));
        assert!(!graph.insert_dependency(edge("Missing", "B")));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_remove_goal_cascades_both_directions() {
        let mut graph = graph_with(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("A", "C")]);
        assert_eq!(graph.remove_goal("B"), Some(2));
        assert_eq!(graph.remove_goal("B"), None);
        assert_eq!(graph.predecessors("C"), vec!["A".to_string()]);
        assert!(graph.successors("B").is_empty());
        assert!(!graph.contains_dependency(&edge("A", "B")));
    }

    #[test]
    fn test_reinserted_goal_goes_last_after_removal() {
        let mut graph = graph_with(&["A", "B", "C"], &[("A", "C")]);
        graph.remove_goal("A");
        assert!(graph.insert_goal(goal("D")));
        assert!(graph.insert_dependency(edge("D", "B")));

        let names: Vec<&str> = graph.goals().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "D"]);
        assert_eq!(graph.topological_order().unwrap(), vec!["C", "D", "B"]);
        assert_eq!(graph.dependencies().collect::<Vec<_>>(), vec![edge("D", "B")]);
    }

    #[test]
    fn test_predecessors_and_successors_follow_goal_order() {
        let graph = graph_with(
            &["Goal 1", "Goal 2", "Goal 3"],
            &[("Goal 2", "Goal 3"), ("Goal 1", "Goal 3"), ("Goal 1", "Goal 2")],
        );
        assert_eq!(graph.predecessors("Goal 3"), vec!["Goal 1", "Goal 2"]);
        assert_eq!(graph.successors("Goal 1"), vec!["Goal 2", "Goal 3"]);
        assert!(graph.predecessors("Nope").is_empty());
    }

    #[test]
    fn test_topological_order_respects_every_edge() {
        let graph = graph_with(
            &["Deploy", "Write code", "Design", "Test"],
            &[
                ("Design", "Write code"),
                ("Write code", "Test"),
                ("Test", "Deploy"),
                ("Design", "Test"),
            ],
        );
        let order = graph.topological_order().unwrap();
        assert_respects_edges(&graph, &order);
        assert_eq!(order, vec!["Design", "Write code", "Test", "Deploy"]);
    }

    #[test]
    fn test_topological_order_is_repeatable() {
        let graph = graph_with(&["C", "A", "B", "D"], &[("A", "D"), ("B", "D")]);
        let first = graph.topological_order().unwrap();
        assert_eq!(first, graph.topological_order().unwrap());
        assert_eq!(first, vec!["C", "A", "B", "D"]);
    }

    #[test]
    fn test_topological_order_detects_cycle() {
        let graph = graph_with(
            &["A", "B", "C", "Free", "After"],
            &[("A", "B"), ("B", "C"), ("C", "A"), ("C", "After")],
        );
        match graph.topological_order() {
            Err(CoreError::CycleDetected { remaining }) => {
                assert_eq!(remaining, vec!["A", "B", "C", "After"]);
            }
            other => panic!("Expected CycleDetected, got {:?}", other),
        }
    }

    #[test]
    fn test_summary_of_empty_graph() {
        assert_eq!(GoalGraph::new().summary(), "Current Goal Graph:\n  (Graph is empty)\n");
    }

    #[test]
    fn test_summary_lists_goals_and_edges() {
        let mut graph = GoalGraph::new();
        graph.insert_goal(Goal::new("Learn Python", goal_attributes("Master Python", "High")));
        graph.insert_goal(Goal::new("Build Web App", goal_attributes("", "Medium")));
        graph.insert_dependency(edge("Learn Python", "Build Web App"));

        let expected = "Current Goal Graph:\n\
                        \x20 Goals (Nodes):\n\
                        \x20   - Learn Python (description=Master Python, priority=High)\n\
                        \x20   - Build Web App (description=, priority=Medium)\n\
                        \x20 Dependencies (Edges):\n\
                        \x20   - Learn Python -> Build Web App\n";
        assert_eq!(graph.summary(), expected);
    }

    #[test]
    fn test_summary_without_edges() {
        let graph = graph_with(&["Solo"], &[]);
        assert!(graph.summary().ends_with("  Dependencies (Edges):\n    (No dependencies)\n"));
    }
}
