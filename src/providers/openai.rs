use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{check_status, read_json, request_error, Provider};

/// OpenAI client supporting the chat and legacy completion endpoints
#[derive(Debug, Clone)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base URL, e.g. `https://api.openai.com/v1`
    endpoint: String,
    /// Model name
    model: String,
    /// Sampling temperature
    temperature: f32,
    /// Token limit for legacy completion requests
    max_tokens: u32,
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Body of a `/chat/completions` request
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// Body of a legacy `/completions` request
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A request for either endpoint
#[derive(Debug, Clone)]
pub enum OpenAIRequest {
    Chat(ChatRequest),
    Completion(CompletionRequest),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    pub text: String,
}

/// A response from either endpoint
#[derive(Debug, Clone)]
pub enum OpenAIResponse {
    Chat(Vec<ChatChoice>),
    Completion(Vec<CompletionChoice>),
}

#[derive(Debug, Deserialize)]
struct ChatBody {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionBody {
    choices: Vec<CompletionChoice>,
}

impl OpenAI {
    /// Create a new OpenAI client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder().timeout(timeout).build().unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            temperature: 0.0,
            max_tokens: 1024,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether the model is served by the chat endpoint rather than legacy completions
    pub fn uses_chat_api(model: &str) -> bool {
        let model = model.to_lowercase();
        let legacy = model.contains("instruct")
            || ["text-", "davinci", "babbage", "curie", "ada"]
                .iter()
                .any(|prefix| model.starts_with(prefix));
        !legacy
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl Provider for OpenAI {
    type Request = OpenAIRequest;
    type Response = OpenAIResponse;

    fn build_request(&self, prompt: &str) -> Self::Request {
        if Self::uses_chat_api(&self.model) {
            OpenAIRequest::Chat(ChatRequest {
                model: self.model.clone(),
                messages: vec![ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                }],
                temperature: self.temperature,
            })
        } else {
            OpenAIRequest::Completion(CompletionRequest {
                model: self.model.clone(),
                prompt: prompt.to_string(),
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            })
        }
    }

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let builder = match &request {
            OpenAIRequest::Chat(body) => self.client.post(self.url("chat/completions")).json(body),
            OpenAIRequest::Completion(body) => self.client.post(self.url("completions")).json(body),
        };

        let response = builder
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(request_error)?;
        let response = check_status(response).await?;

        match request {
            OpenAIRequest::Chat(_) => {
                let body: ChatBody = read_json(response).await?;
                Ok(OpenAIResponse::Chat(body.choices))
            }
            OpenAIRequest::Completion(_) => {
                let body: CompletionBody = read_json(response).await?;
                Ok(OpenAIResponse::Completion(body.choices))
            }
        }
    }

    fn extract_text(response: &Self::Response) -> Result<String, ProviderError> {
        match response {
            OpenAIResponse::Chat(choices) => choices.first().map(|c| c.message.content.clone()),
            OpenAIResponse::Completion(choices) => choices.first().map(|c| c.text.clone()),
        }
        .ok_or_else(|| ProviderError::ParseError("Response contains no choices".to_string()))
    }
}
