//! OpenAI-compatible chat completions client.

use super::{CompletionClient, CompletionError, CompletionRequest};
use crate::config::ModelConfig;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Message in the chat request.
#[derive(Debug, Clone, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Chat completions request body.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

/// Client for `POST {base_url}/chat/completions`.
pub struct ChatCompletionClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model_name: String,
    timeout_seconds: u64,
}

impl ChatCompletionClient {
    /// Create a client, or `None` when no API key is configured.
    pub fn from_config(config: &ModelConfig) -> Result<Option<Self>, CompletionError> {
        let Some(api_key) = config.api_key.clone().filter(|k| !k.is_empty()) else {
            return Ok(None);
        };

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Some(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model_name: config.name.clone(),
            timeout_seconds: config.timeout_seconds,
        }))
    }
}

#[async_trait]
impl CompletionClient for ChatCompletionClient {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = ChatRequest {
            model: &self.model_name,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        debug!("Sending completion request to {}", url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout(self.timeout_seconds)
                } else if e.is_connect() {
                    CompletionError::Connect(self.base_url.clone())
                } else {
                    CompletionError::Transport(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status { status, body });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;

        extract_content(&payload)
    }
}

/// Pull `choices[0].message.content` out of a completion payload.
fn extract_content(payload: &Value) -> Result<String, CompletionError> {
    let content = payload
        .pointer("/choices/0/message/content")
        .ok_or_else(|| CompletionError::Malformed("missing choices[0].message.content".into()))?;

    match content {
        Value::String(text) if !text.trim().is_empty() => Ok(text.clone()),
        Value::String(_) | Value::Null => Err(CompletionError::Empty),
        _ => Err(CompletionError::Malformed("content is not a string".into())),
    }
}
