use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use goalplan_interfaces::{ProviderError, TextCompletionProvider};

use crate::data::{goal_attributes, CoreError, GoalRecord};
use crate::services::extraction::payload::{parse_payload, Payload};
use crate::services::extraction::prompt::build_prompt;
use crate::services::extraction::validator::validate_record;
use crate::services::messages::{ExtractionJob, ExtractionOutcome, ExtractionRequest};
use crate::traits::GoalWriter;

/// Priority given to goals created only because something depends on them.
pub const PLACEHOLDER_PRIORITY: &str = "Low";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOptions {
    /// Model used when a request does not name one.
    pub default_model: String,
    /// Ask the provider for its model list before each request.
    pub verify_model: bool,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            default_model: "llama2".to_string(),
            verify_model: false,
        }
    }
}

/// Turns free text into goal graph mutations.
///
/// The provider call is the only await that leaves the process, and it
/// happens before any mutation, so a provider failure never leaves a
/// half-applied batch behind.
#[derive(Clone)]
pub struct ExtractionPipeline {
    provider: Arc<dyn TextCompletionProvider>,
    goals: Arc<dyn GoalWriter>,
    options: ExtractionOptions,
}

impl ExtractionPipeline {
    pub fn new(
        provider: Arc<dyn TextCompletionProvider>,
        goals: Arc<dyn GoalWriter>,
        options: ExtractionOptions,
    ) -> Self {
        Self {
            provider,
            goals,
            options,
        }
    }

    pub fn options(&self) -> &ExtractionOptions {
        &self.options
    }

    #[instrument(skip(self, request), fields(request_id = %request.request_id))]
    pub async fn process(&self, request: ExtractionRequest) -> Result<ExtractionOutcome, CoreError> {
        let text = request.text.trim();
        if text.is_empty() {
            return Err(CoreError::invalid_argument(
                "Extraction text must be a non-empty string",
            ));
        }
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.options.default_model);

        if self.options.verify_model {
            self.ensure_model_available(model).await?;
        }

        let reply = self
            .provider
            .complete(model, &build_prompt(text))
            .await
            .map_err(|e| {
                error!(model = %model, error = %e, "Text completion provider failed");
                CoreError::ProviderUnavailable(e)
            })?;
        debug!(model = %model, reply_len = reply.len(), "Received model reply");

        let entries = match parse_payload(&reply) {
            Payload::Goals(entries) => entries,
            Payload::Conversational(reason) => {
                info!(reason, "Treating model reply as conversational");
                return Ok(ExtractionOutcome::Conversational(reply));
            }
        };

        let total = entries.len();
        let records: Vec<GoalRecord> = entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match validate_record(entry) {
                Ok(record) => Some(record),
                Err(rejection) => {
                    warn!(index, %rejection, "Dropping invalid goal record");
                    None
                }
            })
            .collect();

        for record in &records {
            self.merge_record(record).await?;
        }

        info!(
            accepted = records.len(),
            rejected = total - records.len(),
            "Goals extracted and merged"
        );
        Ok(ExtractionOutcome::Extracted(records))
    }

    async fn merge_record(&self, record: &GoalRecord) -> Result<(), CoreError> {
        let added = self.goals.add_goal(&record.name, record.attributes()).await?;
        if !added {
            debug!(goal = %record.name, "Goal already present, keeping existing attributes");
        }

        for dep in &record.depends_on {
            let placeholder = goal_attributes(
                format!("Dependency for {}", record.name),
                PLACEHOLDER_PRIORITY,
            );
            if self.goals.add_goal(dep, placeholder).await? {
                info!(goal = %dep, dependent = %record.name, "Created placeholder goal for dependency");
            }
            self.goals.add_dependency(dep, &record.name).await?;
        }
        Ok(())
    }

    async fn ensure_model_available(&self, model: &str) -> Result<(), CoreError> {
        let available = self.provider.list_models().await?;
        if available.iter().any(|name| name == model) {
            return Ok(());
        }
        warn!(model = %model, ?available, "Requested model is not available");
        Err(ProviderError::ModelNotFound {
            model: model.to_string(),
            available,
        }
        .into())
    }
}

/// Worker that drains extraction jobs, running each one on its own task.
pub struct ExtractionService {
    pipeline: ExtractionPipeline,
    job_rx: mpsc::Receiver<ExtractionJob>,
}

impl ExtractionService {
    pub fn new(pipeline: ExtractionPipeline, job_rx: mpsc::Receiver<ExtractionJob>) -> Self {
        Self { pipeline, job_rx }
    }

    pub async fn run(&mut self) -> Result<(), CoreError> {
        info!(model = %self.pipeline.options().default_model, "ExtractionService started");
        while let Some(ExtractionJob { request, reply }) = self.job_rx.recv().await {
            let pipeline = self.pipeline.clone();
            tokio::spawn(async move {
                let request_id = request.request_id;
                let result = pipeline.process(request).await;
                if let Err(e) = &result {
                    warn!(%request_id, error = %e, "Extraction request failed");
                }
                if reply.send(result).is_err() {
                    debug!(%request_id, "Requester dropped before extraction finished");
                }
            });
        }
        info!("ExtractionService channel closed, shutting down");
        Ok(())
    }
}
