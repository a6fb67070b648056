/*!
 * Mock provider implementations for testing.
 *
 * These providers never touch the network:
 * - `MockProvider::replying()` - Always answers with the same text
 * - `MockProvider::scripted()` - Answers with queued texts, one per call
 * - `MockProvider::failing()` - Always fails with an API error
 * - `MockProvider::unconfigured()` - Reports a missing credential
 * - `MockSearch` - The same idea for the search provider
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::app_config::ProviderKind;
use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, LlmProvider, SearchHit, SearchProvider, SearchResults};

/// Behavior mode for the mock provider
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Always returns this text
    Reply(String),
    /// Returns queued texts in order, then fails once exhausted
    Script(VecDeque<String>),
    /// Always fails with an error
    Failing,
}

/// Mock LLM provider
#[derive(Debug, Clone)]
pub struct MockProvider {
    kind: ProviderKind,
    configured: bool,
    behavior: Arc<Mutex<MockBehavior>>,
    /// Every request received, shared between clones
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Create a configured mock with the specified behavior
    pub fn new(kind: ProviderKind, behavior: MockBehavior) -> Self {
        Self {
            kind,
            configured: true,
            behavior: Arc::new(Mutex::new(behavior)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn replying(kind: ProviderKind, text: impl Into<String>) -> Self {
        Self::new(kind, MockBehavior::Reply(text.into()))
    }

    pub fn scripted<I, S>(kind: ProviderKind, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(kind, MockBehavior::Script(replies.into_iter().map(Into::into).collect()))
    }

    pub fn failing(kind: ProviderKind) -> Self {
        Self::new(kind, MockBehavior::Failing)
    }

    /// A provider without a credential; it must never be called
    pub fn unconfigured(kind: ProviderKind) -> Self {
        Self {
            configured: false,
            ..Self::failing(kind)
        }
    }

    /// Number of requests received so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Copy of every request received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        self.requests.lock().push(request);

        match &mut *self.behavior.lock() {
            MockBehavior::Reply(text) => Ok(text.trim().to_string()),
            MockBehavior::Script(queue) => queue.pop_front().map(|text| text.trim().to_string()).ok_or_else(|| {
                ProviderError::ApiError {
                    status_code: 500,
                    message: "Mock script exhausted".to_string(),
                }
            }),
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),
        }
    }
}

/// Mock search provider
#[derive(Debug, Clone)]
pub struct MockSearch {
    configured: bool,
    results: Option<SearchResults>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl MockSearch {
    /// Answers every query with these results
    pub fn working(results: SearchResults) -> Self {
        Self {
            configured: true,
            results: Some(results),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Convenience: hits built from `(title, snippet)` pairs
    pub fn with_hits(hits: &[(&str, &str)], images: &[&str]) -> Self {
        Self::working(SearchResults {
            results: hits
                .iter()
                .map(|(title, snippet)| SearchHit {
                    title: title.to_string(),
                    snippet: snippet.to_string(),
                })
                .collect(),
            images: images.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn failing() -> Self {
        Self {
            configured: true,
            results: None,
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queries received so far
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<SearchResults, ProviderError> {
        self.queries.lock().push(query.to_string());

        match &self.results {
            Some(results) => Ok(SearchResults {
                results: results.results.iter().take(max_results).cloned().collect(),
                images: results.images.clone(),
            }),
            None => Err(ProviderError::Timeout("Simulated search timeout".to_string())),
        }
    }
}
