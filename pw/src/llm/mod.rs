//! LLM client module for Planwright
//!
//! Provides the provider-agnostic client trait and the Gemini and
//! OpenAI-compatible implementations.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

pub mod client;
mod error;
mod gemini;
mod openai;
mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use gemini::GeminiClient;
pub use openai::OpenAIClient;
pub use types::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};

use crate::config::LlmConfig;

/// Create an LLM client based on the provider specified in config
///
/// Supports "gemini" and "openai" providers.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "gemini" => {
            debug!("create_client: creating Gemini client");
            Ok(Arc::new(GeminiClient::from_config(config)?))
        }
        "openai" => {
            debug!("create_client: creating OpenAI client");
            Ok(Arc::new(OpenAIClient::from_config(config)?))
        }
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::InvalidResponse(format!(
                "Unknown LLM provider: '{}'. Supported: gemini, openai",
                other
            )))
        }
    }
}

/// Map non-success HTTP statuses onto `LlmError`
///
/// 429 becomes `RateLimited` (honouring `retry-after`, default 60s); every
/// other non-2xx status becomes `ApiError` carrying the response body.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status().as_u16();

    if status == 429 {
        debug!("check_status: rate limited (429)");
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);

        return Err(LlmError::RateLimited {
            retry_after: Duration::from_secs(retry_after),
        });
    }

    if !response.status().is_success() {
        debug!(%status, "check_status: API error");
        let text = response.text().await.unwrap_or_default();
        return Err(LlmError::ApiError { status, message: text });
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_unknown_provider() {
        let config = LlmConfig {
            provider: "carrier-pigeon".to_string(),
            ..LlmConfig::default()
        };
        let err = create_client(&config).err().unwrap();
        assert!(err.to_string().contains("carrier-pigeon"));
    }

    #[test]
    fn test_create_client_missing_key() {
        let config = LlmConfig {
            api_key_env: "PLANWRIGHT_TEST_NEVER_SET_KEY".to_string(),
            ..LlmConfig::default()
        };
        assert!(create_client(&config).is_err());
    }

    fn http_response(status: u16, retry_after: Option<&str>, body: &'static str) -> reqwest::Response {
        let mut builder = axum::http::Response::builder().status(status);
        if let Some(value) = retry_after {
            builder = builder.header("retry-after", value);
        }
        reqwest::Response::from(builder.body(body).unwrap())
    }

    #[tokio::test]
    async fn test_check_status_rate_limited_honours_retry_after() {
        let err = check_status(http_response(429, Some("7"), "slow down")).await.unwrap_err();
        assert!(matches!(err, LlmError::RateLimited { retry_after } if retry_after == Duration::from_secs(7)));
    }

    #[tokio::test]
    async fn test_check_status_rate_limited_default_wait() {
        let err = check_status(http_response(429, None, "")).await.unwrap_err();
        assert_eq!(err.retry_after(), Some(Duration::from_secs(60)));

        let err = check_status(http_response(429, Some("soon"), "")).await.unwrap_err();
        assert_eq!(err.retry_after(), Some(Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn test_check_status_api_error_keeps_body() {
        let err = check_status(http_response(500, None, "backend exploded")).await.unwrap_err();
        assert!(matches!(
            err,
            LlmError::ApiError { status: 500, ref message } if message == "backend exploded"
        ));
    }

    #[tokio::test]
    async fn test_check_status_passes_success_through() {
        let response = check_status(http_response(200, None, "{}")).await.unwrap();
        assert_eq!(response.text().await.unwrap(), "{}");
    }
}
