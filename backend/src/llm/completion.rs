//! Chat completion client
//!
//! One POST per call to an OpenAI-compatible `chat/completions` endpoint.
//! No retry and no streaming; failures abort the calling pipeline.

use crate::config::CompletionConfig;
use async_trait::async_trait;
use fitness_coach_shared::errors::PlanError;
use fitness_coach_shared::prompt::ChatMessage;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

/// Anything that can turn a conversation into one completion text
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, PlanError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Upstream bodies are truncated before they reach logs or errors
const MAX_ERROR_BODY: usize = 500;

/// HTTPS client for the hosted completion endpoint
#[derive(Clone)]
pub struct HttpCompletionClient {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl HttpCompletionClient {
    pub fn new(config: &CompletionConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY).collect()
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    #[instrument(skip(self, messages), fields(model = %self.model, messages = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, PlanError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            PlanError::Configuration("No API key configured for the completion endpoint".to_string())
        })?;

        let request = CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!("Sending chat completion request");
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach completion endpoint: {}", e);
                metrics::counter!("completion_requests_total", "outcome" => "transport_error")
                    .increment(1);
                PlanError::transport(format!("Failed to connect: {}", e))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PlanError::transport(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            error!(status = status.as_u16(), "Completion endpoint returned an error");
            metrics::counter!("completion_requests_total", "outcome" => "upstream_error")
                .increment(1);
            return Err(PlanError::Upstream {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        let parsed: CompletionResponse =
            serde_json::from_str(&body).map_err(|e| PlanError::Upstream {
                status: status.as_u16(),
                body: format!("Unexpected response shape: {}", e),
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| PlanError::Upstream {
                status: status.as_u16(),
                body: "Response has no choices[0].message.content".to_string(),
            })?;

        metrics::counter!("completion_requests_total", "outcome" => "ok").increment(1);
        debug!(chars = content.len(), "Received completion");
        Ok(content)
    }
}
