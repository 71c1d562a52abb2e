use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::review::ReviewError;

/// Inbound review request.
///
/// The whole body, serialised with its original field order, is the query
/// text; a few well-known fields also feed the report header.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    fields: Map<String, Value>,
    query_text: String,
}

impl Submission {
    pub fn from_body(body: Value, max_chars: usize) -> Result<Self, ReviewError> {
        let Value::Object(fields) = body else {
            return Err(ReviewError::InvalidSubmission(
                "request body must be a JSON object".to_string(),
            ));
        };
        if fields.is_empty() {
            return Err(ReviewError::InvalidSubmission(
                "request body has no fields".to_string(),
            ));
        }

        let query_text = serde_json::to_string(&fields)
            .map_err(|e| ReviewError::InvalidSubmission(e.to_string()))?;
        let length = query_text.chars().count();
        if length > max_chars {
            return Err(ReviewError::InvalidSubmission(format!(
                "submission is {} characters long, limit is {}",
                length, max_chars
            )));
        }

        Ok(Self { fields, query_text })
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn date(&self) -> String {
        self.field_text("date")
    }

    pub fn organization(&self) -> String {
        self.field_text("organization")
    }

    pub fn name(&self) -> String {
        self.field_text("name")
    }

    pub fn description(&self) -> String {
        self.field_text("description")
    }

    fn field_text(&self, key: &str) -> String {
        match self.fields.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Compiled report handed to the renderer. Field names follow the template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub info: ReportInfo,
    pub result: ReportFindings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInfo {
    pub registration: String,
    pub register_date: String,
    pub company: String,
    pub now_date: String,
    pub name: String,
    pub report: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFindings {
    pub other_patents: Vec<PriorArtEntry>,
    pub opinion: String,
    /// Reserved for a scoring stage; never filled by this pipeline.
    pub probability: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorArtEntry {
    pub index: String,
    pub registration: String,
    pub register_date: String,
    pub company: String,
    pub name: String,
    pub similarity: Option<String>,
}
