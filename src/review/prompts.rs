//! Built-in system prompts. Either can be replaced through `review.prompts`.

use crate::core::config::PromptOverrides;

pub const PRIOR_ART_PROMPT: &str = "You are a patent examiner assessing whether the submitted \
invention is novel and inventive. Compare the submission against the prior-art records that \
follow. Each record is a JSON object with at least a registration number and a title. Cite \
records by registration number, point out overlapping technical features, and state which \
features of the submission are not disclosed by any record. Prior-art records: ";

pub const PATENT_LAW_PROMPT: &str = "You are a patent attorney. Judge the submission against \
the statutory requirements for registration: industrial applicability, novelty, inventive \
step, and the grounds for refusal. Quote the provisions you rely on and conclude with an \
overall opinion on the likelihood of registration. Relevant provisions: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPrompts {
    pub prior_art: String,
    pub patent_law: String,
}

impl Default for ReviewPrompts {
    fn default() -> Self {
        Self {
            prior_art: PRIOR_ART_PROMPT.to_string(),
            patent_law: PATENT_LAW_PROMPT.to_string(),
        }
    }
}

impl ReviewPrompts {
    pub fn from_overrides(overrides: &PromptOverrides) -> Self {
        let defaults = Self::default();
        Self {
            prior_art: overrides.prior_art.clone().unwrap_or(defaults.prior_art),
            patent_law: overrides.patent_law.clone().unwrap_or(defaults.patent_law),
        }
    }
}
