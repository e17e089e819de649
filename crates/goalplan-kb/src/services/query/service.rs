use std::sync::Arc;

use tracing::{debug, instrument, warn};

use goalplan_interfaces::{GraphView, PresentationPayload};

use crate::data::{CoreError, Goal};
use crate::services::messages::ExtractionOutcome;
use crate::traits::GoalReader;

/// Read-only facade handed to the presentation layer. It holds a
/// [`GoalReader`] and nothing that can mutate the graph.
#[derive(Clone)]
pub struct QueryService {
    reader: Arc<dyn GoalReader>,
}

impl QueryService {
    pub fn new(reader: Arc<dyn GoalReader>) -> Self {
        Self { reader }
    }

    #[instrument(skip(self))]
    pub async fn dependencies(&self, goal: &str) -> Result<Vec<String>, CoreError> {
        self.reader.dependencies(goal).await
    }

    #[instrument(skip(self))]
    pub async fn dependents(&self, goal: &str) -> Result<Vec<String>, CoreError> {
        self.reader.dependents(goal).await
    }

    pub async fn topological_order(&self) -> Result<Vec<String>, CoreError> {
        let order = self.reader.topological_order().await;
        if let Err(CoreError::CycleDetected { remaining }) = &order {
            warn!(?remaining, "Goal graph contains a cycle");
        }
        order
    }

    pub async fn summary(&self) -> Result<String, CoreError> {
        self.reader.summary().await
    }

    pub async fn goals(&self) -> Result<Vec<Goal>, CoreError> {
        self.reader.goals().await
    }

    pub async fn has_goal(&self, goal: &str) -> Result<bool, CoreError> {
        self.reader.has_goal(goal).await
    }

    pub async fn graph_view(&self) -> Result<GraphView, CoreError> {
        let view = self.reader.graph_view().await?;
        debug!(
            goals = view.goals.len(),
            dependencies = view.dependencies.len(),
            "Built graph view"
        );
        Ok(view)
    }

    pub async fn summary_payload(&self) -> Result<PresentationPayload, CoreError> {
        Ok(PresentationPayload::Summary(self.summary().await?))
    }

    pub async fn graph_payload(&self) -> Result<PresentationPayload, CoreError> {
        Ok(PresentationPayload::Graph(self.graph_view().await?))
    }

    /// What to show once an extraction finishes: the model's text as is, or
    /// the refreshed graph when goals were merged.
    pub async fn outcome_payload(
        &self,
        outcome: ExtractionOutcome,
    ) -> Result<PresentationPayload, CoreError> {
        match outcome {
            ExtractionOutcome::Conversational(text) => Ok(PresentationPayload::Conversational(text)),
            ExtractionOutcome::Extracted(_) => self.graph_payload().await,
        }
    }
}
