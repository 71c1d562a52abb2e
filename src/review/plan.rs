//! Review plans: the answer and report flows are the same phase loop run
//! with different phase lists.

use crate::core::config::{AnswerPlanConfig, ReportPlanConfig, RetrievalConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    PriorArt,
    PatentLaw,
}

impl PhaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseKind::PriorArt => "prior_art",
            PhaseKind::PatentLaw => "patent_law",
        }
    }
}

/// One retrieval + dialogue + completion cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhasePlan {
    pub kind: PhaseKind,
    pub namespace: String,
    pub top_k: usize,
    /// How many of the retrieved matches go into the grounding context.
    pub context_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPlan {
    pub name: &'static str,
    pub phases: Vec<PhasePlan>,
}

impl ReviewPlan {
    /// Two phases: prior art from the submission, then patent law from the
    /// prior-art answer.
    pub fn answer(retrieval: &RetrievalConfig, config: &AnswerPlanConfig) -> Self {
        Self {
            name: "answer",
            phases: vec![
                PhasePlan {
                    kind: PhaseKind::PriorArt,
                    namespace: retrieval.prior_art_namespace.clone(),
                    top_k: config.prior_art_top_k,
                    context_limit: config.prior_art_top_k,
                },
                PhasePlan {
                    kind: PhaseKind::PatentLaw,
                    namespace: retrieval.patent_law_namespace.clone(),
                    top_k: config.patent_law_top_k,
                    context_limit: config.patent_law_top_k,
                },
            ],
        }
    }

    /// Single prior-art phase.
    pub fn report(retrieval: &RetrievalConfig, config: &ReportPlanConfig) -> Self {
        Self {
            name: "report",
            phases: vec![PhasePlan {
                kind: PhaseKind::PriorArt,
                namespace: retrieval.prior_art_namespace.clone(),
                top_k: config.prior_art_top_k,
                context_limit: config.grounding_limit,
            }],
        }
    }
}
