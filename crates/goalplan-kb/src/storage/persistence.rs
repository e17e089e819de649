//! Node-link JSON codec for the goal graph and the atomic file writer.
//!
//! Documents look like
//! `{"directed": true, "multigraph": false, "graph": {}, "nodes": [{"id": ..}], "links": [{"source": .., "target": ..}]}`.
//! Decoding is lenient: anything that would break a graph invariant is
//! skipped with a warning instead of failing the whole load.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::data::{
    normalize_goal_name, Attributes, CoreError, Dependency, Goal, PersistenceError, NODE_ID_KEY,
};
use crate::storage::graph::GoalGraph;

#[derive(Debug, Serialize, Deserialize)]
struct NodeLinkDocument {
    #[serde(default = "default_directed")]
    directed: bool,
    #[serde(default)]
    multigraph: bool,
    #[serde(default)]
    graph: Map<String, Value>,
    #[serde(default)]
    nodes: Vec<Value>,
    #[serde(default, alias = "edges")]
    links: Vec<Value>,
}

fn default_directed() -> bool {
    true
}

/// Serializes `graph` as an indented node-link document.
pub fn encode_graph(graph: &GoalGraph) -> Result<Vec<u8>, serde_json::Error> {
    let nodes = graph
        .goals()
        .map(|goal| {
            let mut node = Map::new();
            node.insert(NODE_ID_KEY.to_string(), Value::String(goal.name.clone()));
            let attributes = goal.attributes.iter().filter(|(key, _)| key.as_str() != NODE_ID_KEY);
            for (key, value) in attributes {
                node.insert(key.clone(), value.clone());
            }
            Value::Object(node)
        })
        .collect();

    let links = graph
        .dependencies()
        .map(|dep| {
            let mut link = Map::new();
            link.insert("source".to_string(), Value::String(dep.from.clone()));
            link.insert("target".to_string(), Value::String(dep.to.clone()));
            Value::Object(link)
        })
        .collect();

    let document = NodeLinkDocument {
        directed: true,
        multigraph: false,
        graph: Map::new(),
        nodes,
        links,
    };

    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    document.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Parses a node-link document. Malformed nodes and links are skipped.
pub fn decode_graph(bytes: &[u8]) -> Result<GoalGraph, serde_json::Error> {
    let document: NodeLinkDocument = serde_json::from_slice(bytes)?;
    if !document.directed {
        warn!("Goal file declares an undirected graph, reading links as directed");
    }

    let mut graph = GoalGraph::new();

    for node in document.nodes {
        let Value::Object(fields) = node else {
            warn!("Skipping node that is not an object");
            continue;
        };
        let name = match fields.get(NODE_ID_KEY) {
            Some(Value::String(raw)) => match normalize_goal_name(raw, "node id") {
                Ok(name) => name,
                Err(_) => {
                    warn!("Skipping node with a blank id");
                    continue;
                }
            },
            other => {
                warn!(id = ?other, "Skipping node without a string id");
                continue;
            }
        };
        let attributes: Attributes = fields
            .into_iter()
            .filter(|(key, _)| key != NODE_ID_KEY)
            .collect();
        if !graph.insert_goal(Goal::new(name.clone(), attributes)) {
            warn!(goal = %name, "Skipping duplicate node");
        }
    }

    for link in document.links {
        let endpoints = (
            link.get("source").and_then(Value::as_str),
            link.get("target").and_then(Value::as_str),
        );
        let (Some(source), Some(target)) = endpoints else {
            warn!(link = %link, "Skipping link without string endpoints");
            continue;
        };
        match Dependency::new(source, target) {
            Ok(dependency) => {
                if !graph.insert_dependency(dependency) {
                    warn!(from = %source, to = %target, "Skipping dangling or duplicate link");
                }
            }
            Err(error) => warn!(from = %source, to = %target, %error, "Skipping invalid link"),
        }
    }

    Ok(graph)
}

/// Loads the graph stored at `path`.
///
/// A missing file yields an empty graph. So does an unreadable or
/// unparseable one, after logging a warning.
pub fn load_graph(path: &Path) -> GoalGraph {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "No goal file found, starting with an empty graph");
            return GoalGraph::new();
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "Could not read goal file, starting with an empty graph");
            return GoalGraph::new();
        }
    };

    match decode_graph(&bytes) {
        Ok(graph) => {
            info!(
                path = %path.display(),
                goals = graph.len(),
                dependencies = graph.edge_count(),
                "Loaded goal graph"
            );
            graph
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "Could not parse goal file, starting with an empty graph");
            GoalGraph::new()
        }
    }
}

/// Writes `graph` to `path` through a temporary file in the same directory,
/// so the target is either the old or the new document and never a mix.
pub fn save_graph(path: &Path, graph: &GoalGraph) -> Result<(), CoreError> {
    write_atomically(path, graph).map_err(|source| CoreError::persistence(path, source))?;
    debug!(
        path = %path.display(),
        goals = graph.len(),
        dependencies = graph.edge_count(),
        "Saved goal graph"
    );
    Ok(())
}

fn write_atomically(path: &Path, graph: &GoalGraph) -> Result<(), PersistenceError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let bytes = encode_graph(graph)?;
    let mut file = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        writer.write_all(&bytes)?;
        writer.flush()?;
    }
    file.as_file().sync_all()?;
    file.persist(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::goal_attributes;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_graph() -> GoalGraph {
        let mut graph = GoalGraph::new();
        graph.insert_goal(Goal::new("Learn Y", goal_attributes("Dependency for Learn X", "Low")));
        graph.insert_goal(Goal::new("Learn X", goal_attributes("Understand X", "High")));
        graph.insert_dependency(Dependency::new("Learn Y", "Learn X").unwrap());
        graph
    }

    #[test]
    fn test_encoded_document_shape() {
        let bytes = encode_graph(&sample_graph()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("{\n    \"directed\": true,"));

        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value,
            json!({
                "directed": true,
                "multigraph": false,
                "graph": {},
                "nodes": [
                    {"id": "Learn Y", "description": "Dependency for Learn X", "priority": "Low"},
                    {"id": "Learn X", "description": "Understand X", "priority": "High"}
                ],
                "links": [{"source": "Learn Y", "target": "Learn X"}]
            })
        );
    }

    #[test]
    fn test_decode_accepts_edges_alias() {
        let document = json!({
            "directed": true,
            "nodes": [{"id": "A"}, {"id": "B"}],
            "edges": [{"source": "A", "target": "B"}]
        });
        let graph = decode_graph(document.to_string().as_bytes()).unwrap();
        assert_eq!(graph.predecessors("B"), vec!["A".to_string()]);
    }

    #[test]
    fn test_decode_skips_invalid_entries() {
        let document = json!({
            "nodes": [
                {"id": "A", "owner": "me"},
                {"id": "  "},
                {"id": 7},
                "not a node",
                {"id": "A", "description": "duplicate"},
                {"id": "B"}
            ],
            "links": [
                {"source": "A", "target": "B"},
                {"source": "A", "target": "B"},
                {"source": "A", "target": "A"},
                {"source": "A", "target": "Ghost"},
                {"source": "B"}
            ]
        });
        let graph = decode_graph(document.to_string().as_bytes()).unwrap();

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.goal("A").unwrap().attributes["owner"], json!("me"));
    }

    #[test]
    fn test_load_missing_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("absent.json");
        assert!(load_graph(&missing).is_empty());

        let corrupt = dir.path().join("corrupt.json");
        fs::write(&corrupt, "{ this is not json").unwrap();
        assert!(load_graph(&corrupt).is_empty());
    }

    #[test]
    fn test_save_creates_directory_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("goals.json");
        let graph = sample_graph();

        save_graph(&path, &graph).unwrap();
        assert_eq!(load_graph(&path), graph);

        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("goals.json")]);
    }

    #[test]
    fn test_save_into_file_parent_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "plain file").unwrap();

        let result = save_graph(&blocker.join("goals.json"), &sample_graph());
        assert!(matches!(
            result,
            Err(CoreError::Persistence { source: PersistenceError::Io(_), .. })
        ));
    }
}
