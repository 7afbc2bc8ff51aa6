/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the supported backends:
 * - ChatGLM: a local model service reached over plain HTTP
 * - OpenAI: the OpenAI completion APIs (chat and legacy completions)
 * - Mock: a scriptable provider for tests
 *
 * Providers perform exactly one HTTP exchange per `complete` call and map
 * every failure into `ProviderError`. Retrying is the caller's concern.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the translation model.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Wrap a prompt into a request for this provider
    fn build_request(&self, prompt: &str) -> Self::Request;

    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Self::Response, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Extract text from the provider response
    ///
    /// A response without any completion in it is a `ParseError`.
    fn extract_text(response: &Self::Response) -> Result<String, ProviderError>;
}

/// Map a transport failure from reqwest into the provider taxonomy
pub(crate) fn request_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout(error.to_string())
    } else if error.is_connect() {
        ProviderError::ConnectionError(error.to_string())
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

/// Pass successful responses through, turn the others into provider errors
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());

    Err(match status.as_u16() {
        429 => ProviderError::RateLimited(body),
        401 | 403 => ProviderError::AuthenticationError(body),
        status_code => ProviderError::ApiError {
            status_code,
            message: body,
        },
    })
}

/// Read a response body and decode it as JSON
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, ProviderError> {
    let text = response.text().await.map_err(request_error)?;
    serde_json::from_str(&text).map_err(|e| {
        let preview: String = text.chars().take(200).collect();
        ProviderError::ParseError(format!("{} (body: {})", e, preview))
    })
}

pub mod chatglm;
pub mod mock;
pub mod openai;
