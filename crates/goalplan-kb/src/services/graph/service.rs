use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::data::CoreError;
use crate::services::messages::GraphCommand;
use crate::storage::GraphStore;

/// Sole owner of the [`GraphStore`].
///
/// Commands are handled one at a time in arrival order, so every mutation
/// runs its invariant checks and its save without interleaving with another.
pub struct GraphService {
    store: GraphStore,
    command_rx: mpsc::Receiver<GraphCommand>,
}

impl GraphService {
    pub fn new(store: GraphStore, command_rx: mpsc::Receiver<GraphCommand>) -> Self {
        Self { store, command_rx }
    }

    /// Runs until every sender is dropped.
    pub async fn run(&mut self) -> Result<(), CoreError> {
        info!(path = %self.store.path().display(), "GraphService started");
        while let Some(command) = self.command_rx.recv().await {
            debug!(command = command.kind(), "Handling graph command");
            self.handle(command);
        }
        info!("GraphService channel closed, shutting down");
        Ok(())
    }

    /// Consumes the service and hands back the store it owned.
    pub fn into_store(self) -> GraphStore {
        self.store
    }

    fn handle(&mut self, command: GraphCommand) {
        let kind = command.kind();
        let delivered = match command {
            GraphCommand::AddGoal {
                name,
                attributes,
                reply,
            } => reply.send(self.store.add_goal(&name, attributes)).is_ok(),
            GraphCommand::AddDependency { from, to, reply } => {
                reply.send(self.store.add_dependency(&from, &to)).is_ok()
            }
            GraphCommand::RemoveGoal { name, reply } => {
                reply.send(self.store.remove_goal(&name)).is_ok()
            }
            GraphCommand::Clear { reply } => reply.send(self.store.clear()).is_ok(),
            GraphCommand::HasGoal { name, reply } => reply.send(self.store.has_goal(&name)).is_ok(),
            GraphCommand::GetGoals { reply } => reply.send(self.store.goals()).is_ok(),
            GraphCommand::GetDependencies { name, reply } => {
                reply.send(self.store.dependencies(&name)).is_ok()
            }
            GraphCommand::GetDependents { name, reply } => {
                reply.send(self.store.dependents(&name)).is_ok()
            }
            GraphCommand::TopologicalOrder { reply } => {
                reply.send(self.store.topological_order()).is_ok()
            }
            GraphCommand::Summary { reply } => reply.send(self.store.summary()).is_ok(),
            GraphCommand::View { reply } => reply.send(self.store.view()).is_ok(),
        };

        // The mutation has happened either way; only the answer is lost.
        if !delivered {
            warn!(command = kind, "Caller went away before the graph reply was sent");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Attributes;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_commands_are_applied_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel(8);
        let mut service = GraphService::new(GraphStore::open(dir.path().join("goals.json")), rx);

        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        let (edge_tx, edge_rx) = oneshot::channel();
        tx.send(GraphCommand::AddGoal { name: "A".into(), attributes: Attributes::new(), reply: first_tx })
            .await
            .unwrap();
        tx.send(GraphCommand::AddGoal { name: "B".into(), attributes: Attributes::new(), reply: second_tx })
            .await
            .unwrap();
        tx.send(GraphCommand::AddDependency { from: "A".into(), to: "B".into(), reply: edge_tx })
            .await
            .unwrap();
        drop(tx);

        service.run().await.unwrap();

        assert!(first_rx.await.unwrap().unwrap());
        assert!(second_rx.await.unwrap().unwrap());
        assert!(edge_rx.await.unwrap().unwrap());
        assert_eq!(service.into_store().dependencies("B"), vec!["A".to_string()]);
    }

    #[tokio::test]
    async fn test_dropped_reply_still_mutates() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel(8);
        let mut service = GraphService::new(GraphStore::open(dir.path().join("goals.json")), rx);

        let (reply, reply_rx) = oneshot::channel();
        drop(reply_rx);
        tx.send(GraphCommand::AddGoal { name: "Orphan".into(), attributes: Attributes::new(), reply })
            .await
            .unwrap();
        drop(tx);

        service.run().await.unwrap();
        assert!(service.into_store().has_goal("Orphan"));
    }
}
