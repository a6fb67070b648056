/*!
 * Provider implementations for the external services the pipeline calls.
 *
 * This module contains client implementations for:
 * - OpenAI-compatible chat completions (Groq, OpenAI)
 * - Anthropic messages API
 * - A single web search API
 *
 * plus the priority-ordered `ProviderRegistry` that selects the active LLM.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::app_config::ProviderKind;
use crate::errors::ProviderError;

/// A single chat message, shared by every LLM wire format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Provider-neutral completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Conversation to complete
    pub messages: Vec<ChatMessage>,
    /// Model override; `None` uses the provider's configured model
    pub model: Option<String>,
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
}

/// Common trait for all LLM providers
///
/// Implementations are held in a `ProviderRegistry` in priority order and
/// used interchangeably by the LLM gateway.
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// Which backend this provider talks to
    fn kind(&self) -> ProviderKind;

    /// Whether a credential is present; no network call is made
    fn is_configured(&self) -> bool;

    /// Complete a request and return the trimmed text of the first completion
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError>;
}

/// One search hit as returned by the search API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
}

/// Search API response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Common trait for web search providers
#[async_trait]
pub trait SearchProvider: Send + Sync + Debug {
    /// Whether a credential is present
    fn is_configured(&self) -> bool;

    /// Run a single query for at most `max_results` hits
    async fn search(&self, query: &str, max_results: usize) -> Result<SearchResults, ProviderError>;
}

pub mod anthropic;
pub mod mock;
pub mod openai;
pub mod registry;
pub mod search;

pub use registry::{ProviderRegistry, ProviderStatus};
