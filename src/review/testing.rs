//! Scripted gateways shared by the review, state and server tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::llm::{
    ChatMessage, CompletionError, CompletionGateway, CompletionRequest, Dialogue, EmbeddingError,
    EmbeddingGateway,
};
use crate::rag::{Match, RetrievalClient, RetrievalError, RetrievalResult};

pub(crate) fn record(id: &str, metadata: Value) -> Match {
    Match {
        id: id.to_string(),
        score: 0.9,
        metadata: metadata.as_object().cloned().unwrap_or_default(),
    }
}

/// Returns the same vector for every text and remembers what it embedded.
pub(crate) struct ScriptedEmbedder {
    vector: Vec<f32>,
    delay: Option<Duration>,
    pub(crate) texts: Mutex<Vec<String>>,
}

impl ScriptedEmbedder {
    pub(crate) fn new(vector: Vec<f32>) -> Self {
        Self {
            vector,
            delay: None,
            texts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn slow(vector: Vec<f32>, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(vector)
        }
    }

    pub(crate) fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingGateway for ScriptedEmbedder {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.texts.lock().unwrap().push(text.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.vector.clone())
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Text(String),
    NoChoices,
    Slow(Duration, String),
}

/// Plays back replies in order and records every dialogue it receives.
/// Once the script runs out the last reply is repeated.
pub(crate) struct ScriptedCompleter {
    replies: Mutex<VecDeque<Reply>>,
    last: Mutex<Option<Reply>>,
    pub(crate) dialogues: Mutex<Vec<Dialogue>>,
}

impl ScriptedCompleter {
    pub(crate) fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            dialogues: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn texts(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Reply::Text(r.to_string())).collect())
    }

    pub(crate) fn dialogues(&self) -> Vec<Dialogue> {
        self.dialogues.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionGateway for ScriptedCompleter {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<ChatMessage, CompletionError> {
        self.dialogues.lock().unwrap().push(request.dialogue);
        let reply = {
            let next = self.replies.lock().unwrap().pop_front();
            let mut last = self.last.lock().unwrap();
            if let Some(next) = next {
                *last = Some(next);
            }
            last.clone()
        };
        match reply {
            Some(Reply::Text(text)) => Ok(ChatMessage::assistant(text)),
            Some(Reply::Slow(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(ChatMessage::assistant(text))
            }
            Some(Reply::NoChoices) | None => Err(CompletionError::NoChoices),
        }
    }
}

/// Fixed matches per namespace; records `(namespace, top_k)` of each query.
#[derive(Default)]
pub(crate) struct StaticIndex {
    corpus: HashMap<String, Vec<Match>>,
    pub(crate) queries: Mutex<Vec<(String, usize)>>,
}

impl StaticIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, namespace: &str, matches: Vec<Match>) -> Self {
        self.corpus.insert(namespace.to_string(), matches);
        self
    }

    pub(crate) fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RetrievalClient for StaticIndex {
    fn name(&self) -> &str {
        "static"
    }

    async fn query(
        &self,
        namespace: &str,
        _vector: &[f32],
        top_k: usize,
        _include_metadata: bool,
    ) -> Result<RetrievalResult, RetrievalError> {
        self.queries
            .lock()
            .unwrap()
            .push((namespace.to_string(), top_k));
        let matches = self.corpus.get(namespace).cloned().unwrap_or_default();
        Ok(RetrievalResult::ranked(matches, top_k))
    }
}
