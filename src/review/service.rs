use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde_json::Value;

use super::error::ReviewError;
use super::orchestrator::{bounded, ReviewOrchestrator};
use super::plan::{PhaseKind, ReviewPlan};
use super::prompts::ReviewPrompts;
use crate::core::config::AppConfig;
use crate::llm::{ChatMessage, CompletionGateway, EmbeddingGateway};
use crate::rag::{RetrievalClient, RetrievalResult};
use crate::report::{DocumentRenderer, RenderError, ReportCompiler, ReportRecord, Submission};

/// Rendered report ready to be sent over HTTP.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub file_name: String,
}

/// Both review flows end to end: submission in, answer or document out.
pub struct ReviewService {
    orchestrator: ReviewOrchestrator,
    answer_plan: ReviewPlan,
    report_plan: ReviewPlan,
    compiler: ReportCompiler,
    renderer: Arc<dyn DocumentRenderer>,
    max_submission_chars: usize,
}

impl ReviewService {
    pub fn new(
        orchestrator: ReviewOrchestrator,
        answer_plan: ReviewPlan,
        report_plan: ReviewPlan,
        compiler: ReportCompiler,
        renderer: Arc<dyn DocumentRenderer>,
        max_submission_chars: usize,
    ) -> Self {
        Self {
            orchestrator,
            answer_plan,
            report_plan,
            compiler,
            renderer,
            max_submission_chars,
        }
    }

    pub fn from_config(
        config: &AppConfig,
        embedder: Arc<dyn EmbeddingGateway>,
        index: Arc<dyn RetrievalClient>,
        completer: Arc<dyn CompletionGateway>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        let review = &config.review;
        let orchestrator = ReviewOrchestrator::new(embedder, index, completer)
            .with_prompts(ReviewPrompts::from_overrides(&review.prompts))
            .with_call_timeout(review.call_timeout())
            .with_sampling(config.completion.temperature, config.completion.max_tokens);

        Self::new(
            orchestrator,
            ReviewPlan::answer(&config.retrieval, &review.answer),
            ReviewPlan::report(&config.retrieval, &review.report),
            ReportCompiler::new(&config.report, review.report.findings_limit),
            renderer,
            config.server.max_submission_chars,
        )
    }

    pub fn renderer_name(&self) -> &str {
        self.renderer.name()
    }

    /// Two-phase answer: prior art, then patent law.
    pub async fn answer(&self, body: Value) -> Result<ChatMessage, ReviewError> {
        let submission = Submission::from_body(body, self.max_submission_chars)?;
        let outcome = self
            .orchestrator
            .run(&self.answer_plan, submission.query_text())
            .await?;
        Ok(outcome.answer)
    }

    pub async fn compile_report(&self, body: Value) -> Result<ReportRecord, ReviewError> {
        self.compile_report_at(body, Local::now().date_naive()).await
    }

    pub(crate) async fn compile_report_at(
        &self,
        body: Value,
        today: NaiveDate,
    ) -> Result<ReportRecord, ReviewError> {
        let submission = Submission::from_body(body, self.max_submission_chars)?;
        let outcome = self
            .orchestrator
            .run(&self.report_plan, submission.query_text())
            .await?;

        let empty = RetrievalResult::empty();
        let prior_art = outcome.retrieval(PhaseKind::PriorArt).unwrap_or(&empty);
        Ok(self
            .compiler
            .compile_at(&submission, prior_art, &outcome.answer.content, today))
    }

    /// Single-pass review compiled into a report and rendered.
    pub async fn report(&self, body: Value) -> Result<RenderedDocument, ReviewError> {
        let record = self.compile_report(body).await?;
        let bytes = bounded(
            self.orchestrator.call_timeout(),
            self.renderer.render(&record),
            RenderError::Timeout,
        )
        .await?;
        if bytes.is_empty() {
            return Err(ReviewError::MalformedResult(format!(
                "{} renderer returned an empty document",
                self.renderer.name()
            )));
        }
        tracing::info!(
            renderer = self.renderer.name(),
            bytes = bytes.len(),
            "Report rendered"
        );

        Ok(RenderedDocument {
            bytes,
            content_type: self.renderer.content_type(),
            file_name: self.renderer.file_name().to_string(),
        })
    }
}
