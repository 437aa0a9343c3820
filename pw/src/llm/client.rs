//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent
///
/// The model is chosen per request, so a single client instance can walk the
/// whole model chain without being rebuilt.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// List models that support text generation
    async fn list_models(&self) -> Result<Vec<String>, LlmError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::debug;

    /// Mock LLM client for unit tests
    ///
    /// Replays scripted results in order and records every request.
    pub struct MockLlmClient {
        responses: Mutex<Vec<Result<CompletionResponse, LlmError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
        call_count: AtomicUsize,
    }

    impl MockLlmClient {
        pub fn new(responses: Vec<Result<CompletionResponse, LlmError>>) -> Self {
            debug!(response_count = %responses.len(), "MockLlmClient::new: called");
            let mut responses = responses;
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
                call_count: AtomicUsize::new(0),
            }
        }

        /// Mock that answers every call with the same text, up to `n` calls
        pub fn replying(text: &str, n: usize) -> Self {
            Self::new((0..n).map(|_| Ok(CompletionResponse::text(text))).collect())
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            debug!(model = %request.model, "MockLlmClient::complete: called");
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request);
            self.responses.lock().unwrap().pop().unwrap_or_else(|| {
                debug!("MockLlmClient::complete: no more mock responses");
                Err(LlmError::InvalidResponse("No more mock responses".to_string()))
            })
        }

        async fn list_models(&self) -> Result<Vec<String>, LlmError> {
            Ok(vec!["mock-primary".to_string(), "mock-fallback".to_string()])
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_client_returns_responses_in_order() {
            let client = MockLlmClient::new(vec![
                Ok(CompletionResponse::text("Response 1")),
                Err(LlmError::InvalidResponse("boom".to_string())),
            ]);

            let req = CompletionRequest::new("m", "Test", 1000);

            let resp1 = client.complete(req.clone()).await.unwrap();
            assert_eq!(resp1.content, Some("Response 1".to_string()));

            assert!(client.complete(req.clone()).await.is_err());
            assert_eq!(client.call_count(), 2);
            assert_eq!(client.requests().len(), 2);
        }

        #[tokio::test]
        async fn test_mock_client_errors_when_exhausted() {
            let client = MockLlmClient::new(vec![]);
            let result = client.complete(CompletionRequest::new("m", "Test", 1000)).await;
            assert!(result.is_err());
        }
    }
}
