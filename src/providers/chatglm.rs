use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{check_status, read_json, request_error, Provider};

/// Client for a ChatGLM model served over HTTP
#[derive(Debug, Clone)]
pub struct ChatGlm {
    /// HTTP client for making requests
    client: Client,
    /// Full URL requests are posted to
    endpoint: String,
}

/// Request body: a prompt and an empty conversation history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatGlmRequest {
    pub prompt: String,
    pub history: Vec<(String, String)>,
}

/// Response body; only the generated text is used
#[derive(Debug, Clone, Deserialize)]
pub struct ChatGlmResponse {
    pub response: String,
    #[serde(default)]
    pub status: Option<u16>,
}

impl ChatGlm {
    /// Create a client posting to `endpoint` with a per-request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder().timeout(timeout).build().unwrap_or_default(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Provider for ChatGlm {
    type Request = ChatGlmRequest;
    type Response = ChatGlmResponse;

    fn build_request(&self, prompt: &str) -> Self::Request {
        ChatGlmRequest {
            prompt: prompt.to_string(),
            history: Vec::new(),
        }
    }

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(request_error)?;

        let response = check_status(response).await?;
        read_json(response).await
    }

    fn extract_text(response: &Self::Response) -> Result<String, ProviderError> {
        Ok(response.response.clone())
    }
}
