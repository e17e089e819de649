use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use goalplan_interfaces::GraphView;

use crate::data::{Attributes, CoreError, Goal};
use crate::services::messages::{ExtractionJob, ExtractionOutcome, ExtractionRequest, GraphCommand};
use crate::traits::{GoalReader, GoalWriter};

const GRAPH_CHANNEL: &str = "Graph command";
const GRAPH_REPLY_CHANNEL: &str = "Graph reply";
const EXTRACTION_CHANNEL: &str = "Extraction";
const EXTRACTION_REPLY_CHANNEL: &str = "Extraction reply";

/// Handle to the [`GraphService`](super::GraphService). Cheap to clone; every
/// clone talks to the same store.
#[derive(Clone)]
pub struct GraphClient {
    command_tx: mpsc::Sender<GraphCommand>,
}

impl GraphClient {
    pub fn new(command_tx: mpsc::Sender<GraphCommand>) -> Self {
        Self { command_tx }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> GraphCommand,
    ) -> Result<T, CoreError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| CoreError::channel_closed(GRAPH_CHANNEL))?;
        reply_rx
            .await
            .map_err(|_| CoreError::channel_closed(GRAPH_REPLY_CHANNEL))
    }
}

#[async_trait]
impl GoalWriter for GraphClient {
    async fn add_goal(&self, name: &str, attributes: Attributes) -> Result<bool, CoreError> {
        let name = name.to_string();
        self.request(|reply| GraphCommand::AddGoal { name, attributes, reply })
            .await?
    }

    async fn add_dependency(&self, from: &str, to: &str) -> Result<bool, CoreError> {
        let (from, to) = (from.to_string(), to.to_string());
        self.request(|reply| GraphCommand::AddDependency { from, to, reply })
            .await?
    }

    async fn remove_goal(&self, name: &str) -> Result<bool, CoreError> {
        let name = name.to_string();
        self.request(|reply| GraphCommand::RemoveGoal { name, reply }).await?
    }

    async fn clear(&self) -> Result<(), CoreError> {
        self.request(|reply| GraphCommand::Clear { reply }).await?
    }
}

#[async_trait]
impl GoalReader for GraphClient {
    async fn has_goal(&self, name: &str) -> Result<bool, CoreError> {
        let name = name.to_string();
        self.request(|reply| GraphCommand::HasGoal { name, reply }).await
    }

    async fn goals(&self) -> Result<Vec<Goal>, CoreError> {
        self.request(|reply| GraphCommand::GetGoals { reply }).await
    }

    async fn dependencies(&self, name: &str) -> Result<Vec<String>, CoreError> {
        let name = name.to_string();
        self.request(|reply| GraphCommand::GetDependencies { name, reply })
            .await
    }

    async fn dependents(&self, name: &str) -> Result<Vec<String>, CoreError> {
        let name = name.to_string();
        self.request(|reply| GraphCommand::GetDependents { name, reply })
            .await
    }

    async fn topological_order(&self) -> Result<Vec<String>, CoreError> {
        self.request(|reply| GraphCommand::TopologicalOrder { reply })
            .await?
    }

    async fn summary(&self) -> Result<String, CoreError> {
        self.request(|reply| GraphCommand::Summary { reply }).await
    }

    async fn graph_view(&self) -> Result<GraphView, CoreError> {
        self.request(|reply| GraphCommand::View { reply }).await
    }
}

/// Entry point for front ends: submits extraction requests and reaches the
/// goal graph through the same handle.
#[derive(Clone)]
pub struct PlannerClient {
    graph: GraphClient,
    extraction_tx: mpsc::Sender<ExtractionJob>,
}

impl PlannerClient {
    pub fn new(graph: GraphClient, extraction_tx: mpsc::Sender<ExtractionJob>) -> Self {
        Self {
            graph,
            extraction_tx,
        }
    }

    /// Direct access to the goal graph.
    pub fn graph(&self) -> &GraphClient {
        &self.graph
    }

    /// Queues `request` and returns immediately. The receiver resolves once
    /// the worker has finished with it.
    pub async fn submit(
        &self,
        request: ExtractionRequest,
    ) -> Result<oneshot::Receiver<Result<ExtractionOutcome, CoreError>>, CoreError> {
        let (reply, reply_rx) = oneshot::channel();
        self.extraction_tx
            .send(ExtractionJob { request, reply })
            .await
            .map_err(|_| CoreError::channel_closed(EXTRACTION_CHANNEL))?;
        Ok(reply_rx)
    }

    /// Queues `request` and waits for its outcome.
    pub async fn extract(&self, request: ExtractionRequest) -> Result<ExtractionOutcome, CoreError> {
        let pending = self.submit(request).await?;
        pending
            .await
            .map_err(|_| CoreError::channel_closed(EXTRACTION_REPLY_CHANNEL))?
    }
}
