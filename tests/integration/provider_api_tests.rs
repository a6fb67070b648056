/*!
 * Integration tests for provider API interactions
 *
 * The real HTTP clients talk to in-process stub servers on 127.0.0.1.
 */

use anyhow::Result;
use std::time::Duration;
use scenescript::app_config::ProviderKind;
use scenescript::providers::anthropic::Anthropic;
use scenescript::providers::openai::OpenAI;
use scenescript::providers::search::WebSearch;
use scenescript::providers::{ChatMessage, CompletionRequest, LlmProvider, SearchProvider};
use scenescript::ProviderError;
use crate::common::{self, stub_apis};

fn request(user: &str) -> CompletionRequest {
    CompletionRequest {
        messages: vec![ChatMessage::system("You are a screenwriter."), ChatMessage::user(user)],
        model: None,
        max_tokens: 64,
    }
}

/// Test a chat completion round trip through the OpenAI-compatible client
#[tokio::test]
async fn test_openai_complete_withStub_shouldReturnFirstChoice() -> Result<()> {
    common::init_logging();
    let base = common::spawn_stub(stub_apis::chat_router()).await;
    let client = OpenAI::new(ProviderKind::Groq, stub_apis::STUB_KEY, &base, "llama3-8b-8192", None);

    let text = client.complete(request("Plan a scene about cats")).await?;

    assert_eq!(text, stub_apis::PLAN_REPLY.trim());
    Ok(())
}

/// Test a rejected key surfaces as an authentication error
#[tokio::test]
async fn test_openai_complete_withWrongKey_shouldBeAuthenticationError() {
    let base = common::spawn_stub(stub_apis::chat_router()).await;
    let client = OpenAI::new(ProviderKind::OpenAI, "wrong", &base, "gpt-4o-mini", None);

    let err = client.complete(request("hi")).await.unwrap_err();

    assert!(matches!(err, ProviderError::AuthenticationError(_)), "got {:?}", err);
}

/// Test a 5xx answer surfaces as an API error carrying the status
#[tokio::test]
async fn test_openai_complete_withServerError_shouldCarryStatus() {
    let base = common::spawn_stub(stub_apis::failing_router()).await;
    let client = OpenAI::new(ProviderKind::Groq, stub_apis::STUB_KEY, &base, "m", None);

    match client.complete(request("hi")).await {
        Err(ProviderError::ApiError { status_code, message }) => {
            assert_eq!(status_code, 500);
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

/// Test an unreachable endpoint is a transport error, not a panic
#[tokio::test]
async fn test_openai_complete_withUnreachableEndpoint_shouldFail() {
    // Bind then drop a listener so the port is known to be closed
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let base = format!("http://{}", listener.local_addr().expect("addr"));
    drop(listener);

    let client = OpenAI::new(ProviderKind::Groq, stub_apis::STUB_KEY, &base, "m", Some(Duration::from_secs(5)));
    let err = client.complete(request("hi")).await.unwrap_err();

    assert!(
        matches!(err, ProviderError::ConnectionError(_) | ProviderError::RequestFailed(_)),
        "got {:?}",
        err
    );
}

/// Test the Anthropic client sends the system prompt out of band and trims the reply
#[tokio::test]
async fn test_anthropic_complete_withStub_shouldReturnTrimmedText() -> Result<()> {
    let base = common::spawn_stub(stub_apis::messages_router()).await;
    let client = Anthropic::new(stub_apis::STUB_KEY, &base, "claude-3-haiku-20240307", Duration::from_secs(30));

    let text = client.complete(request("Write 2 lines of dialogue about \"Cats\".")).await?;

    assert_eq!(text, stub_apis::DIALOGUE_REPLY.trim());
    Ok(())
}

/// Test the Anthropic client maps a bad key to an authentication error
#[tokio::test]
async fn test_anthropic_complete_withWrongKey_shouldBeAuthenticationError() {
    let base = common::spawn_stub(stub_apis::messages_router()).await;
    let client = Anthropic::new("nope", &base, "claude-3-haiku-20240307", Duration::from_secs(30));

    let err = client.complete(request("hi")).await.unwrap_err();

    assert!(matches!(err, ProviderError::AuthenticationError(_)), "got {:?}", err);
}

/// Test the search client sends the query and parses hits
#[tokio::test]
async fn test_search_withStub_shouldParseResults() -> Result<()> {
    let base = common::spawn_stub(stub_apis::search_router()).await;
    let client = WebSearch::new(stub_apis::STUB_KEY, format!("{}/v1/search", base), Duration::from_secs(15));

    let results = client.search("Photosynthesis a classroom", 3).await?;

    assert_eq!(results.results.len(), 3);
    assert_eq!(results.results[0].snippet, "Result for Photosynthesis a classroom");
    assert_eq!(results.images, vec!["https://img.test/leaf.png"]);
    Ok(())
}

/// Test a slow search service is cut off by the client timeout
#[tokio::test]
async fn test_search_withSlowService_shouldTimeOut() {
    let base = common::spawn_stub(stub_apis::slow_search_router()).await;
    let client = WebSearch::new(stub_apis::STUB_KEY, format!("{}/v1/search", base), Duration::from_millis(300));

    let err = client.search("Cats", 3).await.unwrap_err();

    assert!(matches!(err, ProviderError::Timeout(_)), "got {:?}", err);
}
