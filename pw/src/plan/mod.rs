//! Plan generation
//!
//! - [`types`] - the plan schema returned to clients and stored per user
//! - [`fence`] - pulls the JSON payload out of markdown-fenced model output
//! - [`generator`] - prompt, model chain with fallback, parse

pub mod fence;
mod generator;
mod types;

pub use fence::{Extracted, FenceKind, extract_json_payload};
pub use generator::{AttemptFailure, Generation, GenerationError, PlanGenerator};
pub use types::{GeneratedPlan, Phase, PhaseColor, RiskAssessment, RiskLevel, Task, UNTITLED_PROJECT};

#[cfg(test)]
pub(crate) use types::fixtures;
