//! Report compilation: review output → `ReportRecord`.

use std::fmt::Write;

use chrono::{Local, NaiveDate};

use super::types::{PriorArtEntry, ReportFindings, ReportInfo, ReportRecord, Submission};
use crate::core::config::ReportConfig;
use crate::rag::{Match, RetrievalResult};

const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct ReportCompiler {
    title: String,
    date_format: String,
    findings_limit: usize,
}

impl ReportCompiler {
    pub fn new(config: &ReportConfig, findings_limit: usize) -> Self {
        Self {
            title: config.title.clone(),
            date_format: config.date_format.clone(),
            findings_limit,
        }
    }

    pub fn compile(
        &self,
        submission: &Submission,
        retrieval: &RetrievalResult,
        opinion: &str,
    ) -> ReportRecord {
        self.compile_at(submission, retrieval, opinion, Local::now().date_naive())
    }

    /// Same as `compile` with an explicit report date.
    pub fn compile_at(
        &self,
        submission: &Submission,
        retrieval: &RetrievalResult,
        opinion: &str,
        today: NaiveDate,
    ) -> ReportRecord {
        let other_patents = retrieval
            .top(self.findings_limit)
            .iter()
            .map(prior_art_entry)
            .collect();

        ReportRecord {
            info: ReportInfo {
                registration: String::new(),
                register_date: submission.date(),
                company: submission.organization(),
                now_date: self.format_date(today),
                name: submission.name(),
                report: self.title.clone(),
                summary: submission.description(),
            },
            result: ReportFindings {
                other_patents,
                opinion: opinion.to_string(),
                probability: None,
            },
        }
    }

    fn format_date(&self, date: NaiveDate) -> String {
        let mut out = String::new();
        if write!(out, "{}", date.format(&self.date_format)).is_ok() {
            return out;
        }
        tracing::warn!(
            "Invalid report.date_format '{}', falling back to {}",
            self.date_format,
            FALLBACK_DATE_FORMAT
        );
        date.format(FALLBACK_DATE_FORMAT).to_string()
    }
}

fn prior_art_entry(m: &Match) -> PriorArtEntry {
    PriorArtEntry {
        index: m.id.clone(),
        registration: m.metadata_text("registration"),
        register_date: String::new(),
        company: String::new(),
        name: m.metadata_text("name"),
        similarity: None,
    }
}
