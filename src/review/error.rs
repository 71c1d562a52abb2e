use thiserror::Error;

use crate::llm::{CompletionError, EmbeddingError};
use crate::rag::RetrievalError;
use crate::report::RenderError;

/// First failure of a review run. Any variant aborts the remaining stages.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("malformed stage result: {0}")]
    MalformedResult(String),
    #[error("invalid submission: {0}")]
    InvalidSubmission(String),
}

impl ReviewError {
    /// Stable machine-readable kind for API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            ReviewError::Embedding(_) => "embedding_error",
            ReviewError::Retrieval(_) => "retrieval_error",
            ReviewError::Completion(_) => "completion_error",
            ReviewError::Render(_) => "render_error",
            ReviewError::MalformedResult(_) => "malformed_result",
            ReviewError::InvalidSubmission(_) => "invalid_submission",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ReviewError::Embedding(EmbeddingError::Timeout(_))
                | ReviewError::Retrieval(RetrievalError::Timeout(_))
                | ReviewError::Completion(CompletionError::Timeout(_))
                | ReviewError::Render(RenderError::Timeout(_))
        )
    }
}
