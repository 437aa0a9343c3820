//! Prompt Template System
//!
//! Template loading chain:
//! 1. `.planwright/prompts/{name}.pmt` (user override)
//! 2. `prompts/{name}.pmt` (repo default)
//! 3. Embedded fallback in code
//!
//! Templates use Handlebars syntax for variable substitution.

pub mod embedded;
mod loader;

pub use loader::{PlanPromptContext, PromptLoader};
