//! Text-completion service access.
//!
//! This module provides the completion capability used by the narrative
//! producer and an OpenAI-compatible implementation of it.

pub mod client;

pub use client::ChatCompletionClient;

use async_trait::async_trait;

/// A single system/user completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Reasons a completion attempt produced no usable text.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("cannot connect to completion service at {0}")]
    Connect(String),

    #[error("failed to send request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("completion service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed completion payload: {0}")]
    Malformed(String),

    #[error("completion service returned no content")]
    Empty,
}

/// Capability the narrative producer depends on.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Model identifier, for reporting.
    fn model_name(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}
