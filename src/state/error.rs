use thiserror::Error;

use crate::report::RenderError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to build {service} client: {source}")]
    HttpClient {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to prepare report renderer: {0}")]
    Render(#[from] RenderError),
}
