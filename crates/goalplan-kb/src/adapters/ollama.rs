use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use goalplan_interfaces::{ProviderError, ProviderResult, TextCompletionProvider};

/// Configuration for the Ollama provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server
    pub base_url: String,
    /// Timeout in seconds for HTTP requests
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Text completion provider backed by a local Ollama server
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    config: OllamaConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    size: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl OllamaProvider {
    pub fn new(config: OllamaConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Unreachable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn with_url_and_timeout(base_url: impl Into<String>, timeout_secs: u64) -> ProviderResult<Self> {
        Self::new(OllamaConfig {
            base_url: base_url.into(),
            timeout_secs,
        })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Smallest installed model, if any.
    pub async fn default_model(&self) -> ProviderResult<Option<String>> {
        Ok(self.list_models().await?.into_iter().next())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn map_http_error(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Timeout(format!("Request timeout: {}", error))
        } else if error.is_connect() {
            ProviderError::Unreachable(format!("Connection error: {}", error))
        } else {
            ProviderError::Unreachable(format!("HTTP error: {}", error))
        }
    }

    async fn error_for_status(response: reqwest::Response) -> ProviderError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| format!("HTTP error: {}", status));
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|parsed| parsed.error)
            .unwrap_or(body);
        warn!(status = status.as_u16(), %message, "Ollama returned an error status");
        ProviderError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl TextCompletionProvider for OllamaProvider {
    #[instrument(skip(self, prompt), fields(model = %model_id, prompt_len = prompt.len()))]
    async fn complete(&self, model_id: &str, prompt: &str) -> ProviderResult<String> {
        let request = ChatRequest {
            model: model_id,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let response = self
            .client
            .post(self.url("/api/chat"))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_http_error(e))?;

        match response.status() {
            StatusCode::OK => {
                let chat: ChatResponse = response.json().await.map_err(|e| {
                    ProviderError::InvalidResponse(format!("Failed to parse chat response: {}", e))
                })?;
                debug!(reply_len = chat.message.content.len(), "Chat completed");
                Ok(chat.message.content)
            }
            _ => Err(Self::error_for_status(response).await),
        }
    }

    #[instrument(skip(self))]
    async fn list_models(&self) -> ProviderResult<Vec<String>> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .send()
            .await
            .map_err(|e| self.map_http_error(e))?;

        if response.status() != StatusCode::OK {
            return Err(Self::error_for_status(response).await);
        }

        let tags: TagsResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse model list: {}", e))
        })?;

        let mut models: Vec<(u64, String)> = tags
            .models
            .into_iter()
            .filter_map(|entry| {
                let name = entry.model.or(entry.name)?;
                (!name.is_empty()).then_some((entry.size, name))
            })
            .collect();
        models.sort_by_key(|(size, _)| *size);

        debug!(count = models.len(), "Listed models");
        Ok(models.into_iter().map(|(_, name)| name).collect())
    }
}
