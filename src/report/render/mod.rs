//! Document rendering: `ReportRecord` → document bytes.
//!
//! Every call builds its document in memory; nothing is shared between
//! concurrent renders.

mod pdf;
mod remote;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use pdf::NativePdfRenderer;
pub use remote::RemotePdfRenderer;

use super::template::ReportTemplate;
use super::types::ReportRecord;
use crate::core::config::{Orientation, RenderBackend, RenderConfig};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(String),
    #[error("pdf generation failed: {0}")]
    Pdf(String),
    #[error("renderer unreachable: {0}")]
    Transport(String),
    #[error("renderer returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("render call timed out after {0:?}")]
    Timeout(Duration),
    #[error(
        "native renderer cannot encode {ch:?} (U+{code:04X}); set render.backend to remote for non-Latin text"
    )]
    UnsupportedText { ch: char, code: u32 },
}

impl RenderError {
    pub(crate) fn unsupported(ch: char) -> Self {
        RenderError::UnsupportedText {
            ch,
            code: ch as u32,
        }
    }
}

#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    fn name(&self) -> &str;

    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn file_name(&self) -> &str {
        "report.pdf"
    }

    async fn render(&self, report: &ReportRecord) -> Result<Vec<u8>, RenderError>;
}

/// Page size and margins in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

const POINTS_PER_MM: f32 = 72.0 / 25.4;

impl PageGeometry {
    pub fn from_config(config: &RenderConfig) -> Result<Self, RenderError> {
        let (width, height) = match config.paper.to_ascii_lowercase().as_str() {
            "a3" => (841.89, 1190.55),
            "a4" => (595.28, 841.89),
            "a5" => (419.53, 595.28),
            "letter" => (612.0, 792.0),
            "legal" => (612.0, 1008.0),
            other => {
                return Err(RenderError::Template(format!("unsupported paper size: {}", other)))
            }
        };
        let (width, height) = match config.orientation {
            Orientation::Portrait => (width, height),
            Orientation::Landscape => (height, width),
        };
        Ok(Self {
            width,
            height,
            margin: config.margin_mm * POINTS_PER_MM,
        })
    }

    pub fn content_width(&self) -> f32 {
        (self.width - 2.0 * self.margin).max(1.0)
    }
}

pub fn build_renderer(
    config: &RenderConfig,
    template: ReportTemplate,
    timeout: Duration,
) -> Result<Arc<dyn DocumentRenderer>, RenderError> {
    let geometry = PageGeometry::from_config(config)?;
    match config.backend {
        RenderBackend::Native => Ok(Arc::new(NativePdfRenderer::new(geometry))),
        RenderBackend::Remote => Ok(Arc::new(RemotePdfRenderer::new(
            &config.remote_url,
            template,
            geometry,
            config.orientation,
            timeout,
        )?)),
    }
}
