pub mod model;
pub mod paths;
pub mod service;
pub mod validation;

use std::path::PathBuf;

use thiserror::Error;

pub use model::{
    AnswerPlanConfig, ApiFlavor, AppConfig, LoggingConfig, ModelEndpointConfig, Orientation,
    PromptOverrides, RenderBackend, RenderConfig, ReportConfig, ReportPlanConfig,
    RetrievalConfig, ReviewConfig, ServerConfig,
};
pub use paths::AppPaths;
pub use service::{redact_sensitive_values, resolve_config, ConfigService};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{0}")]
    Invalid(String),
    #[error("config does not match the expected shape: {0}")]
    Deserialize(#[source] serde_json::Error),
}
