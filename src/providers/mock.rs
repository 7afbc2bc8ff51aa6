/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different backend behaviors:
 * - `MockProvider::working()` - Always succeeds, echoing the prompt payload
 * - `MockProvider::rate_limited()` - Always answers with a throttling error
 * - `MockProvider::failing()` - Always fails with a server error
 * - `MockProvider::malformed()` - Succeeds with text that is not a usable table
 *
 * Clones share the request counter, so a test can keep a handle on a provider
 * that was moved into a translator and still read how often it was called.
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Mock request for testing
#[derive(Debug, Clone, PartialEq)]
pub struct MockRequest {
    /// The full prompt
    pub prompt: String,
}

impl MockRequest {
    /// The text after the prompt's instruction line, i.e. what was asked to be translated
    pub fn payload(&self) -> &str {
        self.prompt
            .split_once(":\n")
            .map(|(_, payload)| payload)
            .unwrap_or(&self.prompt)
    }
}

/// Mock response for testing
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// The translated text
    pub text: String,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Every request is throttled
    RateLimited,
    /// The first `times` requests are throttled, the rest succeed
    RateLimitedTimes { times: usize },
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with a server error
    Failing,
    /// Succeeds with prose instead of a grid
    Malformed,
    /// Returns an empty response
    Empty,
    /// Simulates slow response
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&MockRequest) -> String>,
    /// Per-request delay in milliseconds, applied before any behavior (optional)
    delay: Option<fn(&MockRequest) -> u64>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
            delay: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock provider that is always rate limited
    pub fn rate_limited() -> Self {
        Self::new(MockBehavior::RateLimited)
    }

    /// Create a mock provider that is rate limited for the first `times` requests
    pub fn rate_limited_times(times: usize) -> Self {
        Self::new(MockBehavior::RateLimitedTimes { times })
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that answers with prose instead of a table
    pub fn malformed() -> Self {
        Self::new(MockBehavior::Malformed)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that waits before answering
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom response generator used by the succeeding behaviors
    pub fn with_custom_response(mut self, generator: fn(&MockRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Delay each request by a duration derived from the request itself
    pub fn with_delay(mut self, delay_ms: fn(&MockRequest) -> u64) -> Self {
        self.delay = Some(delay_ms);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn respond(&self, request: &MockRequest) -> MockResponse {
        let text = match self.custom_response {
            Some(generator) => generator(request),
            None => request.payload().to_string(),
        };
        MockResponse { text }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            custom_response: self.custom_response,
            delay: self.delay,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = MockRequest;
    type Response = MockResponse;

    fn build_request(&self, prompt: &str) -> Self::Request {
        MockRequest {
            prompt: prompt.to_string(),
        }
    }

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        if let Some(delay_ms) = self.delay {
            tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms(&request))).await;
        }

        match self.behavior {
            MockBehavior::Working => Ok(self.respond(&request)),

            MockBehavior::RateLimited => Err(ProviderError::RateLimited(
                "Rate limit reached for requests".to_string(),
            )),

            MockBehavior::RateLimitedTimes { times } => {
                if count < times {
                    Err(ProviderError::RateLimited(format!(
                        "Rate limit reached (request #{})",
                        count + 1
                    )))
                } else {
                    Ok(self.respond(&request))
                }
            }

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(self.respond(&request))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Malformed => Ok(MockResponse {
                text: "I am unable to format this as requested.\nHere is a summary instead".to_string(),
            }),

            MockBehavior::Empty => Ok(MockResponse { text: String::new() }),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(self.respond(&request))
            }
        }
    }

    fn extract_text(response: &Self::Response) -> Result<String, ProviderError> {
        Ok(response.text.clone())
    }
}
