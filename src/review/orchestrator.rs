//! Review orchestrator.
//!
//! Runs a `ReviewPlan` phase by phase: embed, retrieve, assemble dialogue,
//! complete. The first phase embeds the submission; every later phase embeds
//! the previous answer and extends the previous dialogue. The first failure
//! aborts the run.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;
use uuid::Uuid;

use super::dialogue::{append_follow_up, build_initial_dialogue};
use super::error::ReviewError;
use super::plan::{PhaseKind, PhasePlan, ReviewPlan};
use super::prompts::ReviewPrompts;
use crate::llm::{
    ChatMessage, CompletionError, CompletionGateway, CompletionRequest, Dialogue, EmbeddingError,
    EmbeddingGateway,
};
use crate::rag::{grounding_context, RetrievalClient, RetrievalError, RetrievalResult};

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStage {
    Idle,
    TechRetrieved,
    TechAnswered,
    LawRetrieved,
    LawAnswered,
    /// Terminal state of a single-pass (report) run.
    Answered,
}

impl ReviewStage {
    fn retrieved(kind: PhaseKind) -> Self {
        match kind {
            PhaseKind::PriorArt => ReviewStage::TechRetrieved,
            PhaseKind::PatentLaw => ReviewStage::LawRetrieved,
        }
    }

    fn answered(kind: PhaseKind, last: bool) -> Self {
        match (kind, last) {
            (PhaseKind::PatentLaw, _) => ReviewStage::LawAnswered,
            (PhaseKind::PriorArt, true) => ReviewStage::Answered,
            (PhaseKind::PriorArt, false) => ReviewStage::TechAnswered,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PhaseRecord {
    pub kind: PhaseKind,
    pub namespace: String,
    pub retrieval: RetrievalResult,
    pub answer: ChatMessage,
}

#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub review_id: Uuid,
    pub phases: Vec<PhaseRecord>,
    /// Last phase's answer.
    pub answer: ChatMessage,
    /// Dialogue submitted in the last phase.
    pub dialogue: Dialogue,
    pub stage: ReviewStage,
}

impl ReviewOutcome {
    /// Matches retrieved by the first phase of the given kind.
    pub fn retrieval(&self, kind: PhaseKind) -> Option<&RetrievalResult> {
        self.phases
            .iter()
            .find(|p| p.kind == kind)
            .map(|p| &p.retrieval)
    }
}

pub struct ReviewOrchestrator {
    embedder: Arc<dyn EmbeddingGateway>,
    index: Arc<dyn RetrievalClient>,
    completer: Arc<dyn CompletionGateway>,
    prompts: ReviewPrompts,
    call_timeout: Duration,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
}

impl ReviewOrchestrator {
    pub fn new(
        embedder: Arc<dyn EmbeddingGateway>,
        index: Arc<dyn RetrievalClient>,
        completer: Arc<dyn CompletionGateway>,
    ) -> Self {
        Self {
            embedder,
            index,
            completer,
            prompts: ReviewPrompts::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_prompts(mut self, prompts: ReviewPrompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_sampling(mut self, temperature: Option<f64>, max_tokens: Option<u32>) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    pub async fn run(&self, plan: &ReviewPlan, query_text: &str) -> Result<ReviewOutcome, ReviewError> {
        let review_id = Uuid::new_v4();
        let span = tracing::info_span!("review", %review_id, plan = plan.name);
        self.execute(review_id, plan, query_text)
            .instrument(span)
            .await
    }

    async fn execute(
        &self,
        review_id: Uuid,
        plan: &ReviewPlan,
        query_text: &str,
    ) -> Result<ReviewOutcome, ReviewError> {
        let mut stage = ReviewStage::Idle;
        match self.run_plan(review_id, plan, query_text, &mut stage).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                tracing::warn!(stage = ?stage, error = %err, "Review aborted");
                Err(err)
            }
        }
    }

    /// Runs every phase; `stage` is left at the last stage reached, also on failure.
    async fn run_plan(
        &self,
        review_id: Uuid,
        plan: &ReviewPlan,
        query_text: &str,
        stage: &mut ReviewStage,
    ) -> Result<ReviewOutcome, ReviewError> {
        if plan.phases.is_empty() {
            return Err(ReviewError::MalformedResult(format!(
                "review plan '{}' has no phases",
                plan.name
            )));
        }

        let mut phases: Vec<PhaseRecord> = Vec::with_capacity(plan.phases.len());
        let mut dialogue: Option<Dialogue> = None;

        for (position, phase) in plan.phases.iter().enumerate() {
            let last = position + 1 == plan.phases.len();
            let previous = phases.last().map(|p| p.answer.clone());

            let (record, submitted) = self
                .run_phase(phase, query_text, previous, dialogue.take(), last, stage)
                .await?;

            tracing::info!(
                phase = phase.kind.as_str(),
                matches = record.retrieval.len(),
                "Phase complete"
            );

            phases.push(record);
            dialogue = Some(submitted);
        }

        let answer = phases
            .last()
            .map(|p| p.answer.clone())
            .ok_or_else(|| ReviewError::MalformedResult("review produced no answer".to_string()))?;
        let dialogue = dialogue
            .ok_or_else(|| ReviewError::MalformedResult("review produced no dialogue".to_string()))?;

        Ok(ReviewOutcome {
            review_id,
            phases,
            answer,
            dialogue,
            stage: *stage,
        })
    }

    async fn run_phase(
        &self,
        phase: &PhasePlan,
        query_text: &str,
        previous: Option<ChatMessage>,
        dialogue: Option<Dialogue>,
        last: bool,
        stage: &mut ReviewStage,
    ) -> Result<(PhaseRecord, Dialogue), ReviewError> {
        let embed_text = previous
            .as_ref()
            .map(|answer| answer.content.as_str())
            .unwrap_or(query_text);
        let vector = self.embed(embed_text).await?;

        let retrieval = self.retrieve(phase, &vector).await?;
        advance(stage, ReviewStage::retrieved(phase.kind));

        let prompt = self.prompt_for(phase.kind);
        let submitted = match (dialogue, previous) {
            (Some(dialogue), Some(previous)) => append_follow_up(
                &dialogue,
                previous,
                grounding_context(prompt, retrieval.matches(), phase.context_limit),
            ),
            _ => build_initial_dialogue(
                prompt,
                retrieval.top(phase.context_limit),
                &self.prompts.patent_law,
                query_text,
            ),
        };

        let answer = self.complete(submitted.clone()).await?;
        if !last && answer.content.trim().is_empty() {
            return Err(ReviewError::MalformedResult(format!(
                "{} phase returned an empty answer",
                phase.kind.as_str()
            )));
        }
        advance(stage, ReviewStage::answered(phase.kind, last));

        Ok((
            PhaseRecord {
                kind: phase.kind,
                namespace: phase.namespace.clone(),
                retrieval,
                answer,
            },
            submitted,
        ))
    }

    fn prompt_for(&self, kind: PhaseKind) -> &str {
        match kind {
            PhaseKind::PriorArt => &self.prompts.prior_art,
            PhaseKind::PatentLaw => &self.prompts.patent_law,
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ReviewError> {
        let vector = bounded(
            self.call_timeout,
            self.embedder.embed(text),
            EmbeddingError::Timeout,
        )
        .await?;
        if vector.is_empty() {
            return Err(ReviewError::MalformedResult(format!(
                "{} returned an empty embedding",
                self.embedder.name()
            )));
        }
        Ok(vector)
    }

    async fn retrieve(&self, phase: &PhasePlan, vector: &[f32]) -> Result<RetrievalResult, ReviewError> {
        let result = bounded(
            self.call_timeout,
            self.index.query(&phase.namespace, vector, phase.top_k, true),
            RetrievalError::Timeout,
        )
        .await?;
        // Normalise whatever the backend returned: ranked and capped at top_k.
        Ok(RetrievalResult::ranked(result.matches().to_vec(), phase.top_k))
    }

    async fn complete(&self, dialogue: Dialogue) -> Result<ChatMessage, ReviewError> {
        let request =
            CompletionRequest::new(dialogue).with_sampling(self.temperature, self.max_tokens);
        Ok(bounded(
            self.call_timeout,
            self.completer.complete(request),
            CompletionError::Timeout,
        )
        .await?)
    }
}

fn advance(stage: &mut ReviewStage, next: ReviewStage) {
    *stage = next;
    tracing::debug!("Review stage: {:?}", next);
}

/// Runs `fut` under `limit`; expiry becomes the stage's own timeout error.
pub(crate) async fn bounded<T, E, F>(
    limit: Duration,
    fut: F,
    on_timeout: impl FnOnce(Duration) -> E,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout(limit)),
    }
}
