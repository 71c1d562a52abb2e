//! Review pipeline.
//!
//! - `dialogue`: pure dialogue assembly
//! - `plan`: phase lists for the answer and report flows
//! - `orchestrator`: runs a plan against the injected gateways
//! - `service`: submission in, answer or rendered report out

pub mod dialogue;
pub mod error;
pub mod orchestrator;
pub mod plan;
pub mod prompts;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use dialogue::{append_follow_up, build_initial_dialogue};
pub use error::ReviewError;
pub use orchestrator::{PhaseRecord, ReviewOrchestrator, ReviewOutcome, ReviewStage};
pub use plan::{PhaseKind, PhasePlan, ReviewPlan};
pub use prompts::ReviewPrompts;
pub use service::{RenderedDocument, ReviewService};
