//! Google Gemini API client implementation
//!
//! Implements the LlmClient trait for the Generative Language REST API
//! (`models/{model}:generateContent`).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError, StopReason, TokenUsage, check_status};
use crate::config::LlmConfig;

/// Gemini API client
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
    timeout: Duration,
}

impl GeminiClient {
    /// Create a new client from configuration
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(base_url = %config.base_url, "GeminiClient::from_config: called");
        let api_key = config
            .api_key()
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Self::new(api_key, &config.base_url, config.max_tokens, Duration::from_millis(config.timeout_ms))
    }

    pub fn new(api_key: String, base_url: &str, max_tokens: u32, timeout: Duration) -> Result<Self, LlmError> {
        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            max_tokens,
            timeout,
        })
    }

    /// Build the request body for generateContent
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(model = %request.model, %request.max_tokens, "build_request_body: called");
        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }],
            }],
            "generationConfig": {
                "maxOutputTokens": request.max_tokens.min(self.max_tokens),
            },
        })
    }

    /// Model names may arrive as `gemini-pro` or `models/gemini-pro`
    fn model_path(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        }
    }

    /// Parse the Gemini API response
    fn parse_response(api_response: GeminiResponse) -> CompletionResponse {
        debug!(candidates = api_response.candidates.len(), "parse_response: called");
        let candidate = api_response.candidates.into_iter().next();

        let (content, stop_reason) = match candidate {
            Some(c) => {
                let text: String = c
                    .content
                    .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
                    .unwrap_or_default();
                let content = if text.is_empty() { None } else { Some(text) };
                (content, StopReason::from_gemini(c.finish_reason.as_deref()))
            }
            None => {
                // Prompt was blocked before any candidate was produced
                let reason = api_response.prompt_feedback.and_then(|f| f.block_reason);
                debug!(?reason, "parse_response: no candidates");
                (None, if reason.is_some() { StopReason::Safety } else { StopReason::EndTurn })
            }
        };

        let usage = api_response
            .usage_metadata
            .map(|u| TokenUsage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        CompletionResponse {
            content,
            stop_reason,
            usage,
        }
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(model = %request.model, %request.max_tokens, "complete: called");
        let url = format!("{}/v1beta/{}:generateContent", self.base_url, Self::model_path(&request.model));
        let body = self.build_request_body(&request);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::from_transport(e, self.timeout))?;

        let response = check_status(response).await?;

        debug!("complete: success");
        let api_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        Ok(Self::parse_response(api_response))
    }

    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        debug!("list_models: called");
        let url = format!("{}/v1beta/models", self.base_url);

        let response = self
            .http
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| LlmError::from_transport(e, self.timeout))?;

        let response = check_status(response).await?;
        let listing: GeminiModelList = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Ok(generation_models(listing))
    }
}

/// Names of the listed models that support `generateContent`
fn generation_models(listing: GeminiModelList) -> Vec<String> {
    listing
        .models
        .into_iter()
        .filter(|m| m.supported_generation_methods.iter().any(|g| g == "generateContent"))
        .map(|m| m.name)
        .collect()
}

// Gemini API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[derive(Debug, Deserialize)]
struct GeminiModelList {
    #[serde(default)]
    models: Vec<GeminiModel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModel {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}
