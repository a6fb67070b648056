use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app_config::{ProviderConfig, ProviderKind};
use crate::errors::ProviderError;
use crate::providers::{ChatMessage, CompletionRequest, LlmProvider};

/// Client for OpenAI-compatible chat completion APIs (OpenAI, Groq)
#[derive(Debug)]
pub struct OpenAI {
    /// Which backend the endpoint belongs to
    kind: ProviderKind,
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base URL, e.g. `https://api.openai.com/v1`
    endpoint: String,
    /// Model used when the request does not name one
    default_model: String,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<OpenAIMessage>,

    /// Maximum number of tokens to generate
    max_tokens: u32,
}

/// Chat message in OpenAI format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A single completion choice
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    pub choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

impl OpenAIRequest {
    /// Create a new chat completion request
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            max_tokens,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }
}

impl OpenAI {
    /// Create a new client
    pub fn new(
        kind: ProviderKind,
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        default_model: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Self {
        let client = match timeout {
            Some(timeout) => Client::builder().timeout(timeout).build().unwrap_or_default(),
            None => Client::new(),
        };

        Self {
            kind,
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            default_model: default_model.into(),
        }
    }

    /// Create a client from a provider configuration entry
    pub fn from_config(kind: ProviderKind, config: &ProviderConfig) -> Self {
        Self::new(
            kind,
            config.api_key.trim(),
            &config.endpoint,
            &config.model,
            config.timeout_secs.map(Duration::from_secs),
        )
    }

    /// Build the wire request for a provider-neutral completion request
    pub fn build_request(&self, request: &CompletionRequest) -> OpenAIRequest {
        let model = request.model.clone().unwrap_or_else(|| self.default_model.clone());
        request
            .messages
            .iter()
            .fold(OpenAIRequest::new(model, request.max_tokens), |req, ChatMessage { role, content }| {
                req.add_message(role.as_str(), content.as_str())
            })
    }

    /// Send a chat completion request
    pub async fn send(&self, request: &OpenAIRequest) -> Result<OpenAIResponse, ProviderError> {
        let api_url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .post(&api_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(self.kind.display_name(), e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("{} API error ({}): {}", self.kind.display_name(), status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        response
            .json::<OpenAIResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("{} response: {}", self.kind.display_name(), e)))
    }

    /// Token counts reported by the API, formatted for logs
    pub fn usage_summary(response: &OpenAIResponse) -> Option<String> {
        response.usage.as_ref().map(|usage| {
            format!(
                "{} prompt + {} completion = {} tokens",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            )
        })
    }

    /// Extract the trimmed text of the first choice
    pub fn extract_text(response: &OpenAIResponse) -> Option<String> {
        response.choices.first().map(|choice| choice.message.content.trim().to_string())
    }
}

#[async_trait]
impl LlmProvider for OpenAI {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let wire_request = self.build_request(&request);
        let response = self.send(&wire_request).await?;

        if let Some(usage) = Self::usage_summary(&response) {
            debug!("{} usage: {}", self.kind.display_name(), usage);
        }

        Self::extract_text(&response)
            .ok_or_else(|| ProviderError::ParseError(format!("{} returned no choices", self.kind.display_name())))
    }
}
