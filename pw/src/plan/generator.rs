//! Plan generator
//!
//! Renders the plan prompt, walks the model chain until one call succeeds,
//! then extracts and parses the JSON plan from the response text.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::fence::extract_json_payload;
use super::types::GeneratedPlan;
use crate::config::LlmConfig;
use crate::llm::{CompletionRequest, LlmClient, LlmError, create_client};
use crate::prompts::PromptLoader;

/// One failed model call in the chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptFailure {
    pub model: String,
    /// `LlmError::kind()` of the failure
    pub kind: &'static str,
    pub reason: String,
}

impl AttemptFailure {
    fn new(model: &str, err: &LlmError) -> Self {
        Self {
            model: model.to_string(),
            kind: err.kind(),
            reason: err.to_string(),
        }
    }
}

/// Why a plan could not be produced
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("No models configured")]
    NoModels,

    #[error("Failed to render prompt: {0}")]
    Prompt(String),

    #[error("All models failed: {}", summarize(.attempts))]
    ModelsExhausted { attempts: Vec<AttemptFailure> },

    #[error("Model {model} returned an empty response")]
    EmptyResponse { model: String },

    #[error("Model {model} returned an invalid plan: {source}")]
    Parse {
        model: String,
        #[source]
        source: serde_json::Error,
    },
}

impl GenerationError {
    /// Short label distinguishing unreachable models from unusable output
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::NoModels | GenerationError::Prompt(_) => "configuration",
            GenerationError::ModelsExhausted { .. } => "model_unavailable",
            GenerationError::EmptyResponse { .. } | GenerationError::Parse { .. } => "invalid_output",
        }
    }
}

fn summarize(attempts: &[AttemptFailure]) -> String {
    attempts
        .iter()
        .map(|a| format!("{}: {}", a.model, a.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// A successfully generated plan and how it was obtained
#[derive(Debug, Clone)]
pub struct Generation {
    pub plan: GeneratedPlan,
    /// Model that produced the plan
    pub model: String,
    /// Models tried before it, in order
    pub fallbacks: Vec<AttemptFailure>,
}

impl Generation {
    pub fn used_fallback(&self) -> bool {
        !self.fallbacks.is_empty()
    }
}

/// Builds plans by prompting the model chain
pub struct PlanGenerator {
    llm: Arc<dyn LlmClient>,
    prompts: PromptLoader,
    models: Vec<String>,
    max_tokens: u32,
}

impl PlanGenerator {
    /// `models` is tried in order; each model gets exactly one call
    pub fn new(llm: Arc<dyn LlmClient>, prompts: PromptLoader, models: Vec<String>, max_tokens: u32) -> Self {
        debug!(?models, %max_tokens, "PlanGenerator::new: called");
        Self {
            llm,
            prompts,
            models,
            max_tokens,
        }
    }

    /// Generator for the configured provider and model chain
    pub fn from_config(config: &LlmConfig, prompts: PromptLoader) -> Result<Self, LlmError> {
        let llm = create_client(config)?;
        Ok(Self::new(llm, prompts, config.model_chain(), config.max_tokens))
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Generate a plan for `description` due by `deadline`
    ///
    /// Inputs are expected to be non-empty; that check belongs to the caller.
    /// Every failure comes back as a `GenerationError` value.
    pub async fn generate(&self, description: &str, deadline: &str) -> Result<Generation, GenerationError> {
        debug!(description_len = description.len(), %deadline, "generate: called");
        let prompt = self
            .prompts
            .plan_prompt(description, deadline)
            .map_err(|e| GenerationError::Prompt(e.to_string()))?;

        let (model, text, fallbacks) = self.call_chain(&prompt).await?;

        let Some(text) = text else {
            warn!(%model, "generate: empty model response");
            return Err(GenerationError::EmptyResponse { model });
        };

        let extracted = extract_json_payload(&text);
        debug!(kind = ?extracted.kind, payload_len = extracted.payload.len(), "generate: extracted payload");

        match serde_json::from_str::<GeneratedPlan>(extracted.payload) {
            Ok(plan) => {
                info!(
                    %model,
                    phases = plan.phases.len(),
                    tasks = plan.task_count(),
                    fallback = !fallbacks.is_empty(),
                    "generate: plan ready"
                );
                Ok(Generation { plan, model, fallbacks })
            }
            Err(source) => {
                warn!(%model, error = %source, "generate: response is not a valid plan");
                Err(GenerationError::Parse { model, source })
            }
        }
    }

    /// Try each model once, in order, stopping at the first success
    async fn call_chain(
        &self,
        prompt: &str,
    ) -> Result<(String, Option<String>, Vec<AttemptFailure>), GenerationError> {
        if self.models.is_empty() {
            return Err(GenerationError::NoModels);
        }

        let mut attempts = Vec::new();
        for model in &self.models {
            let request = CompletionRequest::new(model.as_str(), prompt, self.max_tokens);
            match self.llm.complete(request).await {
                Ok(response) => {
                    debug!(%model, usage = response.usage.total(), stop_reason = ?response.stop_reason, "call_chain: success");
                    let text = response.text_content().map(str::to_string);
                    return Ok((model.clone(), text, attempts));
                }
                Err(e) => {
                    warn!(%model, error = %e, retry_after = ?e.retry_after(), "call_chain: model failed, trying next");
                    attempts.push(AttemptFailure::new(model, &e));
                }
            }
        }

        Err(GenerationError::ModelsExhausted { attempts })
    }
}
