//! Services for the goal planner: the graph owner, the extraction worker and
//! the read-only query facade.

pub mod client;
pub mod extraction;
pub mod graph;
pub mod messages;
pub mod query;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::error;

use goalplan_interfaces::TextCompletionProvider;

use crate::storage::GraphStore;

// Re-exports
pub use client::{GraphClient, PlannerClient};
pub use extraction::{ExtractionOptions, ExtractionPipeline, ExtractionService};
pub use graph::GraphService;
pub use messages::{ExtractionJob, ExtractionOutcome, ExtractionRequest, GraphCommand};
pub use query::QueryService;

/// Queue depth for both service channels.
pub const CHANNEL_CAPACITY: usize = 100;

/// Handles to a running planner.
pub struct PlannerHandles {
    pub client: PlannerClient,
    pub queries: QueryService,
    pub graph_task: JoinHandle<()>,
    pub extraction_task: JoinHandle<()>,
}

/// Spawns the graph owner and the extraction worker on the current runtime.
///
/// Both tasks stop once every client handle has been dropped.
pub fn start(
    store: GraphStore,
    provider: Arc<dyn TextCompletionProvider>,
    options: ExtractionOptions,
) -> PlannerHandles {
    let (command_tx, command_rx) = mpsc::channel::<GraphCommand>(CHANNEL_CAPACITY);
    let (job_tx, job_rx) = mpsc::channel::<ExtractionJob>(CHANNEL_CAPACITY);

    let graph = GraphClient::new(command_tx);
    let pipeline = ExtractionPipeline::new(provider, Arc::new(graph.clone()), options);

    let mut graph_service = GraphService::new(store, command_rx);
    let mut extraction_service = ExtractionService::new(pipeline, job_rx);

    let graph_task = tokio::spawn(async move {
        if let Err(e) = graph_service.run().await {
            error!("Graph service error: {:?}", e);
        }
    });
    let extraction_task = tokio::spawn(async move {
        if let Err(e) = extraction_service.run().await {
            error!("Extraction service error: {:?}", e);
        }
    });

    PlannerHandles {
        queries: QueryService::new(Arc::new(graph.clone())),
        client: PlannerClient::new(graph, job_tx),
        graph_task,
        extraction_task,
    }
}
