use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use goalplan_interfaces::{ProviderError, ProviderResult, TextCompletionProvider};

/// A prompt the fake provider was asked to complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub model: String,
    pub prompt: String,
}

/// Fake provider that replays scripted replies in order.
///
/// Once the script runs out, every further call gets the fallback reply.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<ProviderResult<String>>>,
    fallback: String,
    models: Vec<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: "I'm not sure what you mean.".to_string(),
            models: vec!["llama2".to_string()],
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Provider that answers every prompt with `reply`.
    pub fn always(reply: impl Into<String>) -> Self {
        Self {
            fallback: reply.into(),
            ..Self::new()
        }
    }

    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.push(Ok(reply.into()));
        self
    }

    pub fn with_failure(self, error: ProviderError) -> Self {
        self.push(Err(error));
        self
    }

    pub fn with_models(mut self, models: &[&str]) -> Self {
        self.models = models.iter().map(|m| m.to_string()).collect();
        self
    }

    fn push(&self, reply: ProviderResult<String>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ScriptedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedProvider")
            .field("models", &self.models)
            .finish()
    }
}

#[async_trait]
impl TextCompletionProvider for ScriptedProvider {
    async fn complete(&self, model_id: &str, prompt: &str) -> ProviderResult<String> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: model_id.to_string(),
            prompt: prompt.to_string(),
        });
        let next = self.replies.lock().unwrap().pop_front();
        debug!(model = %model_id, scripted = next.is_some(), "Fake provider called");
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }

    async fn list_models(&self) -> ProviderResult<Vec<String>> {
        Ok(self.models.clone())
    }
}
