//! LLM request/response types
//!
//! Provider-agnostic: each client maps these onto its own wire format.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A completion request - everything needed for one LLM call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Model identifier; the same client serves every model in the chain
    pub model: String,

    /// The full prompt, sent as a single user turn
    pub prompt: String,

    /// Max tokens for response (from config)
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>, max_tokens: u32) -> Self {
        let model = model.into();
        debug!(%model, "CompletionRequest::new: called");
        Self {
            model,
            prompt: prompt.into(),
            max_tokens,
        }
    }
}

/// Response from a completion request
#[derive(Debug, Clone, Default)]
pub struct CompletionResponse {
    /// Text content, `None` when the model produced no text
    pub content: Option<String>,

    /// Why the model stopped
    pub stop_reason: StopReason,

    /// Token usage statistics
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Convenience constructor for a plain text answer
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    /// The text content, treating whitespace-only output as absent
    pub fn text_content(&self) -> Option<&str> {
        self.content.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Why the model stopped generating
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    #[default]
    EndTurn,
    MaxTokens,
    /// Output withheld by the provider's safety filters
    Safety,
    Other(String),
}

impl StopReason {
    /// Map a Gemini `finishReason`
    pub fn from_gemini(reason: Option<&str>) -> Self {
        match reason {
            None | Some("STOP") => StopReason::EndTurn,
            Some("MAX_TOKENS") => StopReason::MaxTokens,
            Some("SAFETY") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT") => StopReason::Safety,
            Some(other) => StopReason::Other(other.to_string()),
        }
    }

    /// Map an OpenAI `finish_reason`
    pub fn from_openai(reason: Option<&str>) -> Self {
        match reason {
            None | Some("stop") => StopReason::EndTurn,
            Some("length") => StopReason::MaxTokens,
            Some("content_filter") => StopReason::Safety,
            Some(other) => StopReason::Other(other.to_string()),
        }
    }
}

/// Token usage for a single call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}
