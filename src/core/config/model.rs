//! Typed view of the merged configuration.
//!
//! Every section has defaults so a bare `config.yml` (or none at all) still
//! yields a complete `AppConfig`; credentials usually arrive via env overrides.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub embedding: ModelEndpointConfig,
    pub completion: ModelEndpointConfig,
    pub retrieval: RetrievalConfig,
    pub review: ReviewConfig,
    pub report: ReportConfig,
    pub render: RenderConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_submission_chars: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_allowed_origins: Vec::new(),
            max_submission_chars: 20_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFlavor {
    #[default]
    Azure,
    #[serde(rename = "openai")]
    OpenAi,
}

impl ApiFlavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiFlavor::Azure => "azure",
            ApiFlavor::OpenAi => "openai",
        }
    }
}

/// Connection settings shared by the embedding and chat-completion clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelEndpointConfig {
    pub flavor: ApiFlavor,
    pub endpoint: String,
    pub api_key: String,
    /// Azure deployment name, or model id for OpenAI-compatible servers.
    pub model: String,
    pub api_version: String,
    /// Expected embedding dimensionality; unchecked when absent.
    pub dimensions: Option<usize>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl Default for ModelEndpointConfig {
    fn default() -> Self {
        Self {
            flavor: ApiFlavor::Azure,
            endpoint: String::new(),
            api_key: String::new(),
            model: String::new(),
            api_version: "2024-02-01".to_string(),
            dimensions: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub index_host: String,
    pub api_key: String,
    pub api_version: String,
    pub prior_art_namespace: String,
    pub patent_law_namespace: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            index_host: String::new(),
            api_key: String::new(),
            api_version: "2024-07".to_string(),
            prior_art_namespace: "prior_patent".to_string(),
            patent_law_namespace: "patent_law".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub call_timeout_secs: u64,
    pub answer: AnswerPlanConfig,
    pub report: ReportPlanConfig,
    pub prompts: PromptOverrides,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: 60,
            answer: AnswerPlanConfig::default(),
            report: ReportPlanConfig::default(),
            prompts: PromptOverrides::default(),
        }
    }
}

impl ReviewConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerPlanConfig {
    pub prior_art_top_k: usize,
    pub patent_law_top_k: usize,
}

impl Default for AnswerPlanConfig {
    fn default() -> Self {
        Self {
            prior_art_top_k: 5,
            patent_law_top_k: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportPlanConfig {
    pub prior_art_top_k: usize,
    /// How many prior-art matches are injected into the dialogue.
    pub grounding_limit: usize,
    /// How many prior-art matches are cited in the report.
    pub findings_limit: usize,
}

impl Default for ReportPlanConfig {
    fn default() -> Self {
        Self {
            prior_art_top_k: 5,
            grounding_limit: 3,
            findings_limit: 3,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptOverrides {
    pub prior_art: Option<String>,
    pub patent_law: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    pub date_format: String,
    pub template_path: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Patentability Diagnostic Report".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            template_path: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderBackend {
    #[default]
    Native,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub backend: RenderBackend,
    /// HTML→PDF conversion endpoint used by the remote backend.
    pub remote_url: String,
    pub paper: String,
    pub orientation: Orientation,
    pub margin_mm: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            backend: RenderBackend::Native,
            remote_url: String::new(),
            paper: "A4".to_string(),
            orientation: Orientation::Portrait,
            margin_mm: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
