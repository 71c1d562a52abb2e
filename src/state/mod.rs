use std::sync::Arc;

use crate::core::config::AppConfig;
use crate::llm::{CompletionGateway, EmbeddingGateway, OpenAiClient};
use crate::rag::{PineconeIndex, RetrievalClient};
use crate::report::{build_renderer, DocumentRenderer, ReportTemplate};
use crate::review::ReviewService;

pub mod error;

pub use error::InitializationError;

/// Application state shared by every route.
///
/// Gateways are built once and shared; nothing in here is mutated per request.
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub review: ReviewService,
}

impl AppState {
    /// Builds the HTTP gateways and the renderer from a loaded configuration.
    pub fn initialize(config: AppConfig) -> Result<Arc<Self>, InitializationError> {
        let timeout = config.review.call_timeout();

        let embedder: Arc<dyn EmbeddingGateway> = Arc::new(
            OpenAiClient::new(&config.embedding, timeout).map_err(|source| {
                InitializationError::HttpClient {
                    service: "embedding",
                    source,
                }
            })?,
        );
        let completer: Arc<dyn CompletionGateway> = Arc::new(
            OpenAiClient::new(&config.completion, timeout).map_err(|source| {
                InitializationError::HttpClient {
                    service: "completion",
                    source,
                }
            })?,
        );
        let index: Arc<dyn RetrievalClient> = Arc::new(
            PineconeIndex::new(&config.retrieval, timeout).map_err(|source| {
                InitializationError::HttpClient {
                    service: "vector index",
                    source,
                }
            })?,
        );

        let template = match &config.report.template_path {
            Some(path) => ReportTemplate::from_path(path)?,
            None => ReportTemplate::builtin()?,
        };
        let renderer = build_renderer(&config.render, template, timeout)?;

        tracing::info!(
            embedding = embedder.name(),
            completion = completer.name(),
            index = index.name(),
            renderer = renderer.name(),
            "Review gateways ready"
        );

        Ok(Self::from_parts(config, embedder, index, completer, renderer))
    }

    /// Assembles state from already-built gateways.
    pub fn from_parts(
        config: AppConfig,
        embedder: Arc<dyn EmbeddingGateway>,
        index: Arc<dyn RetrievalClient>,
        completer: Arc<dyn CompletionGateway>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Arc<Self> {
        let review = ReviewService::from_config(&config, embedder, index, completer, renderer);
        Arc::new(Self {
            config: Arc::new(config),
            review,
        })
    }
}
