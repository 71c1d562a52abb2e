pub mod compiler;
pub mod render;
pub mod template;
pub mod types;

pub use compiler::ReportCompiler;
pub use render::{build_renderer, DocumentRenderer, PageGeometry, RenderError};
pub use template::ReportTemplate;
pub use types::{PriorArtEntry, ReportFindings, ReportInfo, ReportRecord, Submission};
