//! Shared setup for goal planner integration tests
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use goalplan_kb::{
    services::start, ExtractionOptions, GraphStore, PlannerHandles, TextCompletionProvider,
};

/// A running planner backed by a goal file in a temporary directory.
pub struct TestPlanner {
    pub handles: PlannerHandles,
    pub goals_path: PathBuf,
    _dir: TempDir,
}

impl TestPlanner {
    pub fn start(provider: Arc<dyn TextCompletionProvider>) -> Self {
        Self::start_with(provider, ExtractionOptions::default())
    }

    pub fn start_with(provider: Arc<dyn TextCompletionProvider>, options: ExtractionOptions) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let goals_path = dir.path().join("User_Data").join("goals.json");
        let handles = start(GraphStore::open(&goals_path), provider, options);
        Self {
            handles,
            goals_path,
            _dir: dir,
        }
    }

    /// Starts a planner whose goal file can never be written.
    pub fn start_unwritable(provider: Arc<dyn TextCompletionProvider>) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let blocker = dir.path().join("occupied");
        std::fs::write(&blocker, "a file, not a directory").expect("write blocker");
        let goals_path = blocker.join("goals.json");
        let handles = start(GraphStore::open(&goals_path), provider, ExtractionOptions::default());
        Self {
            handles,
            goals_path,
            _dir: dir,
        }
    }

    pub fn goals_path(&self) -> &Path {
        &self.goals_path
    }

    /// Drops every client handle and waits for both services to stop.
    pub async fn shutdown(self) -> (PathBuf, TempDir) {
        let PlannerHandles {
            client,
            queries,
            graph_task,
            extraction_task,
        } = self.handles;
        drop(client);
        drop(queries);
        extraction_task.await.expect("extraction task");
        graph_task.await.expect("graph task");
        (self.goals_path, self._dir)
    }
}

pub const LEARN_X_REPLY: &str = r#"Sure, here is your plan:
{"goals": [
    {"name": "Learn X", "description": "Understand X", "priority": "High", "depends_on": ["Learn Y"]}
]}
Good luck!"#;
