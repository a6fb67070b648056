/*!
 * Uniform call interfaces over the configured providers.
 *
 * `LlmGateway::call_llm` hides which chat API is active; `SearchGateway::web_search`
 * always yields usable references, synthesizing them when the search API is
 * absent or fails.
 */

use log::{debug, warn};

use crate::errors::{ProviderError, StageError};
use crate::providers::{
    ChatMessage, CompletionRequest, LlmProvider, ProviderRegistry, ProviderStatus, SearchProvider,
};
use crate::scene::model::References;

/// Gateway over the priority-ordered LLM providers
#[derive(Debug, Default)]
pub struct LlmGateway {
    providers: Vec<Box<dyn LlmProvider>>,
}

impl LlmGateway {
    pub fn new(providers: Vec<Box<dyn LlmProvider>>) -> Self {
        Self { providers }
    }

    /// The provider that `call_llm` would use
    pub fn active(&self) -> Option<&dyn LlmProvider> {
        self.providers.iter().find(|p| p.is_configured()).map(|p| p.as_ref())
    }

    pub fn is_configured(&self) -> bool {
        self.active().is_some()
    }

    /// Issue a single stateless completion against the active provider.
    pub async fn call_llm(
        &self,
        messages: &[ChatMessage],
        model: Option<&str>,
        max_tokens: u32,
    ) -> Result<String, StageError> {
        let provider = self.active().ok_or(StageError::NoProviderConfigured)?;

        debug!(
            "Calling {} with {} message(s), max_tokens={}",
            provider.kind().display_name(),
            messages.len(),
            max_tokens
        );

        let text = provider
            .complete(CompletionRequest {
                messages: messages.to_vec(),
                model: model.map(str::to_string),
                max_tokens,
            })
            .await?;

        let text = text.trim();
        if text.is_empty() {
            return Err(StageError::ResponseParseFailed(format!(
                "{} returned an empty completion",
                provider.kind().display_name()
            )));
        }

        Ok(text.to_string())
    }
}

/// Gateway over the optional search provider
#[derive(Debug)]
pub struct SearchGateway {
    provider: Option<Box<dyn SearchProvider>>,
    max_results: usize,
}

impl Default for SearchGateway {
    fn default() -> Self {
        Self::new(None, 3)
    }
}

impl SearchGateway {
    pub fn new(provider: Option<Box<dyn SearchProvider>>, max_results: usize) -> Self {
        Self { provider, max_results }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.as_ref().is_some_and(|p| p.is_configured())
    }

    /// Search for background material; never fails.
    ///
    /// Returns the references plus whether they came from the search API.
    pub async fn web_search(&self, topic: &str, setting: &str) -> (References, bool) {
        match self.try_search(topic, setting).await {
            Ok(references) => (references, true),
            Err(StageError::NoProviderConfigured) => (Self::fallback(topic, setting), false),
            Err(e) => {
                warn!("Web search failed, using synthesized references: {}", e);
                (Self::fallback(topic, setting), false)
            }
        }
    }

    async fn try_search(&self, topic: &str, setting: &str) -> Result<References, StageError> {
        let provider = self
            .provider
            .as_deref()
            .filter(|p| p.is_configured())
            .ok_or(StageError::NoProviderConfigured)?;

        let query = Self::query(topic, setting);
        let results = provider.search(&query, self.max_results).await?;

        let references: Vec<String> = results
            .results
            .iter()
            .take(self.max_results)
            .filter_map(|hit| {
                let text = if hit.snippet.trim().is_empty() { &hit.title } else { &hit.snippet };
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            })
            .collect();

        if references.is_empty() {
            return Err(StageError::ProviderCallFailed(ProviderError::ParseError(
                "search returned no usable results".to_string(),
            )));
        }

        Ok(References {
            references,
            images: results.images.into_iter().filter(|url| !url.trim().is_empty()).collect(),
        })
    }

    /// Query text sent to the search API
    pub fn query(topic: &str, setting: &str) -> String {
        if setting == "unknown" || setting.trim().is_empty() {
            topic.to_string()
        } else {
            format!("{} {}", topic, setting)
        }
    }

    /// Deterministic references used when search is unavailable
    pub fn fallback(topic: &str, setting: &str) -> References {
        References {
            references: vec![
                format!("Facts about {} gleaned from a web search.", topic),
                format!("Information about {} for background.", setting),
            ],
            images: Vec::new(),
        }
    }
}

/// Build both gateways from a provider registry
pub fn from_registry(registry: ProviderRegistry, max_results: usize) -> (LlmGateway, SearchGateway) {
    let (llm, search) = registry.into_parts();
    (LlmGateway::new(llm), SearchGateway::new(search, max_results))
}

/// Selection summary for a pair of gateways
pub fn status(llm: &LlmGateway, search: &SearchGateway) -> ProviderStatus {
    ProviderStatus {
        active_llm: llm.active().map(|p| p.kind()),
        search_configured: search.is_configured(),
    }
}
