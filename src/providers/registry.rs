/*!
 * Provider selection.
 *
 * The registry holds LLM providers in priority order. The active provider is
 * the first one whose credential is present; nothing is validated over the
 * network.
 */

use log::warn;
use serde::Serialize;

use crate::app_config::{Config, ProviderKind};
use crate::providers::anthropic::Anthropic;
use crate::providers::openai::OpenAI;
use crate::providers::search::WebSearch;
use crate::providers::{LlmProvider, SearchProvider};

/// Ordered set of LLM providers plus the optional search provider
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    llm: Vec<Box<dyn LlmProvider>>,
    search: Option<Box<dyn SearchProvider>>,
}

/// Snapshot of which backends are in use
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub active_llm: Option<ProviderKind>,
    pub search_configured: bool,
}

impl ProviderRegistry {
    /// Empty registry: every stage runs its deterministic path
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from configuration, ordered by `ProviderKind::PRIORITY`
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();

        for kind in ProviderKind::PRIORITY {
            let Some(provider_config) = config.get_provider_config(kind) else {
                continue;
            };
            if !provider_config.is_configured() {
                continue;
            }
            let provider: Box<dyn LlmProvider> = if kind.is_chat_completion() {
                Box::new(OpenAI::from_config(kind, provider_config))
            } else {
                Box::new(Anthropic::from_config(provider_config))
            };
            registry = registry.with_llm(provider);
        }

        if config.search.is_configured() {
            registry = registry.with_search(Box::new(WebSearch::from_config(&config.search)));
        }

        registry
    }

    /// Append an LLM provider at the lowest priority
    pub fn with_llm(mut self, provider: Box<dyn LlmProvider>) -> Self {
        self.llm.push(provider);
        self
    }

    /// Set the search provider
    pub fn with_search(mut self, provider: Box<dyn SearchProvider>) -> Self {
        if self.search.is_some() {
            warn!("Replacing previously registered search provider");
        }
        self.search = Some(provider);
        self
    }

    /// The first configured LLM provider, if any
    pub fn active_llm(&self) -> Option<&dyn LlmProvider> {
        self.llm.iter().find(|p| p.is_configured()).map(|p| p.as_ref())
    }

    /// The search provider, if one is configured
    pub fn search(&self) -> Option<&dyn SearchProvider> {
        self.search.as_deref().filter(|s| s.is_configured())
    }

    pub fn status(&self) -> ProviderStatus {
        ProviderStatus {
            active_llm: self.active_llm().map(|p| p.kind()),
            search_configured: self.search().is_some(),
        }
    }

    /// Split into the LLM list and the search provider
    pub fn into_parts(self) -> (Vec<Box<dyn LlmProvider>>, Option<Box<dyn SearchProvider>>) {
        (self.llm, self.search)
    }
}
