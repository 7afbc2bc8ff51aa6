/*!
 * Integration tests for provider API interactions against a local HTTP mock
 */

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ai_translator::book::{Book, Content, ContentState, Page};
use ai_translator::errors::ProviderError;
use ai_translator::logging::CaptureLog;
use ai_translator::providers::chatglm::ChatGlm;
use ai_translator::providers::openai::OpenAI;
use ai_translator::providers::Provider;
use ai_translator::translation::{BookTranslator, ModelTranslator, RetryPolicy, TranslationModel};

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_chatglm_complete_shouldPostPromptWithEmptyHistory() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"prompt": "Translate the following text into Chinese:\nHello", "history": []})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "  你好\n",
            "history": [],
            "status": 200,
            "time": "2024-01-01 00:00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let model = ModelTranslator::new(
        "ChatGLM",
        ChatGlm::new(server.uri(), TIMEOUT),
        RetryPolicy::single_attempt(),
        Arc::new(CaptureLog::new()),
    );

    let text = model
        .make_request("Translate the following text into Chinese:\nHello", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(text, "你好");
}

/// The local backend is tried once, whatever the failure
#[tokio::test]
async fn test_chatglm_withServerError_shouldNotRetry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("CUDA out of memory"))
        .expect(1)
        .mount(&server)
        .await;

    let model = ModelTranslator::new(
        "ChatGLM",
        ChatGlm::new(server.uri(), TIMEOUT),
        RetryPolicy::single_attempt(),
        Arc::new(CaptureLog::new()),
    );

    let result = model.make_request("prompt", &CancellationToken::new()).await;

    match result {
        Err(ProviderError::ApiError { status_code, message }) => {
            assert_eq!(status_code, 500);
            assert!(message.contains("CUDA"));
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_chatglm_withUnexpectedBody_shouldBeParseError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .mount(&server)
        .await;

    let client = ChatGlm::new(server.uri(), TIMEOUT);
    let result = client.complete(client.build_request("prompt")).await;

    assert!(matches!(result, Err(ProviderError::ParseError(_))));
}

#[tokio::test]
async fn test_openai_chatModel_shouldUseChatCompletionsWithBearerKey() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "messages": [{"role": "user", "content": "Translate:\nHello"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "\n你好 "}, "finish_reason": "stop"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAI::new("sk-test", format!("{}/v1", server.uri()), "gpt-3.5-turbo", TIMEOUT);
    let response = client.complete(client.build_request("Translate:\nHello")).await.unwrap();

    assert_eq!(OpenAI::extract_text(&response).unwrap(), "\n你好 ");
}

#[tokio::test]
async fn test_openai_instructModel_shouldUseLegacyCompletions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .and(body_partial_json(json!({"model": "gpt-3.5-turbo-instruct", "prompt": "Translate:\nHi", "max_tokens": 1024})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"text": "嗨", "index": 0}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAI::new("sk-test", format!("{}/v1/", server.uri()), "gpt-3.5-turbo-instruct", TIMEOUT);
    let response = client.complete(client.build_request("Translate:\nHi")).await.unwrap();

    assert_eq!(OpenAI::extract_text(&response).unwrap(), "嗨");
}

/// A reply without choices fails the unit instead of translating it to nothing
#[tokio::test]
async fn test_openai_withNoChoices_shouldFailTheUnit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .expect(2)
        .mount(&server)
        .await;

    let model = Arc::new(ModelTranslator::new(
        "OpenAI",
        OpenAI::new("sk-test", format!("{}/v1", server.uri()), "gpt-3.5-turbo", TIMEOUT),
        RetryPolicy::rate_limited(3, Duration::from_millis(10), Duration::from_millis(1)),
        Arc::new(CaptureLog::new()),
    ));

    let result = model.make_request("Translate:\nHello", &CancellationToken::new()).await;
    assert!(matches!(result, Err(ProviderError::ParseError(m)) if m.contains("no choices")));

    let mut book = Book::with_pages("hello.pdf", vec![Page::with_contents(vec![Content::text("Hello")])]);
    let summary = BookTranslator::new(model, "Chinese", Arc::new(CaptureLog::new()))
        .translate_book(&mut book)
        .await
        .unwrap();

    assert_eq!((summary.translated, summary.failed), (0, 1));
    let (_, unit) = book.contents().next().unwrap();
    assert_eq!(unit.state(), ContentState::Failed);
    assert!(!unit.status());
    assert_eq!(unit.translated_text(), None);
}

/// Persistent throttling ends in a fatal error after exactly three requests
#[tokio::test]
async fn test_openai_withPersistentRateLimit_shouldFailAfterThreeAttempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "Rate limit reached for requests", "type": "requests"}
        })))
        .expect(3)
        .mount(&server)
        .await;

    let log = CaptureLog::new();
    let model = ModelTranslator::new(
        "OpenAI",
        OpenAI::new("sk-test", format!("{}/v1", server.uri()), "gpt-3.5-turbo", TIMEOUT),
        RetryPolicy::rate_limited(3, Duration::from_millis(10), Duration::from_millis(1)),
        Arc::new(log.clone()),
    );

    let result = model.make_request("Translate:\nHello", &CancellationToken::new()).await;

    assert_eq!(result, Err(ProviderError::RateLimitExceeded { attempts: 3 }));
    assert_eq!(log.count(log::Level::Warn), 2);
}

#[tokio::test]
async fn test_openai_withRejectedKey_shouldBeAuthenticationError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Incorrect API key provided"))
        .expect(1)
        .mount(&server)
        .await;

    let model = ModelTranslator::new(
        "OpenAI",
        OpenAI::new("sk-wrong", format!("{}/v1", server.uri()), "gpt-3.5-turbo", TIMEOUT),
        RetryPolicy::rate_limited(3, Duration::from_millis(10), Duration::from_millis(1)),
        Arc::new(CaptureLog::new()),
    );

    let result = model.make_request("prompt", &CancellationToken::new()).await;

    assert!(matches!(result, Err(ProviderError::AuthenticationError(m)) if m.contains("API key")));
}

#[tokio::test]
async fn test_openai_withUnreachableEndpoint_shouldBeTransportError() {
    let client = OpenAI::new("sk-test", "http://127.0.0.1:9", "gpt-3.5-turbo", Duration::from_secs(2));
    let result = client.complete(client.build_request("prompt")).await;

    assert!(matches!(
        result,
        Err(ProviderError::ConnectionError(_) | ProviderError::Timeout(_) | ProviderError::RequestFailed(_))
    ));
}
