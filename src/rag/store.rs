//! RetrievalClient trait: abstract interface over a namespaced vector index.
//!
//! The service queries `PineconeIndex` in the `pinecone` module; the test
//! suite also runs against `MemoryIndex`.

use std::cmp::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("invalid retrieval request: {0}")]
    InvalidRequest(String),
    #[error("vector index unreachable: {0}")]
    Transport(String),
    #[error("vector index returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed retrieval payload: {0}")]
    Malformed(String),
    #[error("retrieval call timed out after {0:?}")]
    Timeout(Duration),
}

/// One ranked neighbour returned by a similarity query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    /// Relevance score (higher = better).
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Match {
    /// Metadata value rendered as plain text.
    ///
    /// Strings come back unquoted, other scalars use their JSON text and a
    /// missing key yields an empty string.
    pub fn metadata_text(&self, key: &str) -> String {
        match self.metadata.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Matches ranked by non-increasing score.
///
/// The length is at most the requested top-k but may be anything below it,
/// including zero. Consumers read through `top` rather than by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetrievalResult {
    matches: Vec<Match>,
}

impl RetrievalResult {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Normalises raw index output: ranks by descending score and caps at `top_k`.
    pub fn ranked(mut matches: Vec<Match>, top_k: usize) -> Self {
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        matches.truncate(top_k);
        Self { matches }
    }

    /// Up to `limit` best matches; fewer when fewer are available.
    pub fn top(&self, limit: usize) -> &[Match] {
        &self.matches[..self.matches.len().min(limit)]
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

#[async_trait]
pub trait RetrievalClient: Send + Sync {
    fn name(&self) -> &str;

    /// Top-k nearest neighbours of `vector` inside `namespace`.
    ///
    /// An empty corpus yields an empty result, not an error.
    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<RetrievalResult, RetrievalError>;
}

pub(crate) fn validate_query(namespace: &str, top_k: usize) -> Result<(), RetrievalError> {
    if top_k == 0 {
        return Err(RetrievalError::InvalidRequest("top_k must be positive".to_string()));
    }
    if namespace.trim().is_empty() {
        return Err(RetrievalError::InvalidRequest("namespace must not be empty".to_string()));
    }
    Ok(())
}
