use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::types::{ChatMessage, CompletionRequest};

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding service unreachable: {0}")]
    Transport(String),
    #[error("embedding service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed embedding payload: {0}")]
    Malformed(String),
    #[error("embedding call timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion service unreachable: {0}")]
    Transport(String),
    #[error("completion service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion service returned no choices")]
    NoChoices,
    #[error("malformed completion payload: {0}")]
    Malformed(String),
    #[error("completion call timed out after {0:?}")]
    Timeout(Duration),
}

/// Turns text into a fixed-dimensional vector.
#[async_trait]
pub trait EmbeddingGateway: Send + Sync {
    /// short backend name used in logs (e.g. "azure", "openai")
    fn name(&self) -> &str;

    /// embed a single text; one outbound call per invocation, no caching
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Submits a dialogue to a chat-completion service.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    fn name(&self) -> &str;

    /// returns the first choice as an assistant message
    async fn complete(&self, request: CompletionRequest) -> Result<ChatMessage, CompletionError>;
}
