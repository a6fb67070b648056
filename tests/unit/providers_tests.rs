/*!
 * Tests for provider selection and the gateways over mock providers
 */

use anyhow::Result;
use std::collections::HashMap;
use scenescript::app_config::{Config, ProviderConfig, ProviderKind};
use scenescript::providers::mock::{MockProvider, MockSearch};
use scenescript::providers::{ChatMessage, ProviderRegistry};
use scenescript::{LlmGateway, SearchGateway};

fn config_with(pairs: &[(&str, &str)]) -> Result<Config> {
    let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    let mut config = Config::default();
    config.apply_vars(|name| env.get(name).cloned())?;
    Ok(config)
}

/// Test Groq wins when every key is present
#[test]
fn test_registry_withAllKeys_shouldPreferGroq() -> Result<()> {
    let config = config_with(&[("GROQ_API_KEY", "g"), ("OPENAI_API_KEY", "o"), ("ANTHROPIC_API_KEY", "a")])?;
    let registry = ProviderRegistry::from_config(&config);

    assert_eq!(registry.status().active_llm, Some(ProviderKind::Groq));
    Ok(())
}

/// Test OpenAI is chosen over Anthropic when Groq is absent
#[test]
fn test_registry_withoutGroq_shouldPreferOpenAI() -> Result<()> {
    let config = config_with(&[("OPENAI_API_KEY", "o"), ("ANTHROPIC_API_KEY", "a")])?;
    assert_eq!(ProviderRegistry::from_config(&config).status().active_llm, Some(ProviderKind::OpenAI));

    let config = config_with(&[("ANTHROPIC_API_KEY", "a")])?;
    assert_eq!(ProviderRegistry::from_config(&config).status().active_llm, Some(ProviderKind::Anthropic));
    Ok(())
}

/// Test the order of entries in the config file does not change selection
#[test]
fn test_registry_withReversedFileOrder_shouldStillPreferGroq() {
    let keyed = |kind| ProviderConfig {
        api_key: "k".to_string(),
        ..ProviderConfig::new(kind)
    };
    let config = Config {
        providers: vec![keyed(ProviderKind::Anthropic), keyed(ProviderKind::OpenAI), keyed(ProviderKind::Groq)],
        ..Config::default()
    };

    assert_eq!(ProviderRegistry::from_config(&config).status().active_llm, Some(ProviderKind::Groq));
}

/// Test no keys means no active provider and no search
#[test]
fn test_registry_withoutKeys_shouldBeEmpty() -> Result<()> {
    let config = config_with(&[("GROQ_API_KEY", "")])?;
    let status = ProviderRegistry::from_config(&config).status();

    assert_eq!(status.active_llm, None);
    assert!(!status.search_configured);
    Ok(())
}

/// Test the search provider follows SEARCH_API_KEY
#[test]
fn test_registry_withSearchKey_shouldConfigureSearch() -> Result<()> {
    let config = config_with(&[("SEARCH_API_KEY", "s")])?;
    assert!(ProviderRegistry::from_config(&config).status().search_configured);
    Ok(())
}

/// Test an unconfigured provider is skipped in favour of the next one
#[test]
fn test_registry_withUnconfiguredFirst_shouldSkipIt() {
    let registry = ProviderRegistry::new()
        .with_llm(Box::new(MockProvider::unconfigured(ProviderKind::Groq)))
        .with_llm(Box::new(MockProvider::replying(ProviderKind::Anthropic, "hi")));

    assert_eq!(registry.status().active_llm, Some(ProviderKind::Anthropic));
}

/// Test the model override and token budget reach the provider
#[tokio::test]
async fn test_callLlm_shouldForwardModelAndBudget() -> Result<()> {
    let provider = MockProvider::replying(ProviderKind::Groq, "  ok  ");
    let llm = LlmGateway::new(vec![Box::new(provider.clone())]);

    let text = llm
        .call_llm(&[ChatMessage::system("sys"), ChatMessage::user("hi")], Some("tiny-model"), 42)
        .await?;

    assert_eq!(text.trim(), "ok");
    let request = &provider.requests()[0];
    assert_eq!(request.model.as_deref(), Some("tiny-model"));
    assert_eq!(request.max_tokens, 42);
    assert_eq!(request.messages.len(), 2);
    Ok(())
}

/// Test search results become references and images
#[tokio::test]
async fn test_webSearch_withHits_shouldUseSnippetsThenTitles() {
    let search = MockSearch::with_hits(
        &[("Leaf", "Leaves hold chlorophyll."), ("Sunlight", ""), ("", "")],
        &["https://img.test/a.png"],
    );
    let gateway = SearchGateway::new(Some(Box::new(search.clone())), 3);

    let (references, from_search) = gateway.web_search("Photosynthesis", "a classroom").await;

    assert!(from_search);
    assert_eq!(references.references, vec!["Leaves hold chlorophyll.", "Sunlight"]);
    assert_eq!(references.images, vec!["https://img.test/a.png"]);
    assert_eq!(search.queries(), vec!["Photosynthesis a classroom"]);
}

/// Test an unknown setting is left out of the query
#[tokio::test]
async fn test_webSearch_withUnknownSetting_shouldQueryTopicOnly() {
    let search = MockSearch::with_hits(&[("Cats", "Cats purr.")], &[]);
    let gateway = SearchGateway::new(Some(Box::new(search.clone())), 3);

    gateway.web_search("Cats", "unknown").await;

    assert_eq!(search.queries(), vec!["Cats"]);
}

/// Test a failing search synthesizes the two fallback references
#[tokio::test]
async fn test_webSearch_withFailure_shouldSynthesizeReferences() {
    let gateway = SearchGateway::new(Some(Box::new(MockSearch::failing())), 3);

    let (references, from_search) = gateway.web_search("Cats", "a garden").await;

    assert!(!from_search);
    assert_eq!(references, SearchGateway::fallback("Cats", "a garden"));
    assert_eq!(references.references[0], "Facts about Cats gleaned from a web search.");
    assert_eq!(references.references[1], "Information about a garden for background.");
}
