use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app_config::{ProviderConfig, ProviderKind};
use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, LlmProvider};

/// Anthropic client for interacting with Anthropic API
#[derive(Debug)]
pub struct Anthropic {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (optional, defaults to public API)
    endpoint: String,
    /// Model used when the request does not name one
    default_model: String,
}

/// Anthropic message request
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<AnthropicMessage>,

    /// System prompt to guide the AI
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,

    /// Maximum number of tokens to generate
    max_tokens: u32,
}

/// Anthropic message format
#[derive(Debug, Serialize, Deserialize)]
pub struct AnthropicMessage {
    /// Role of the message sender (user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens
    pub input_tokens: u32,
    /// Number of output tokens
    pub output_tokens: u32,
}

/// Anthropic response
#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    /// The content of the response
    pub content: Vec<AnthropicContent>,
    /// Token usage information
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

/// Individual content block in an Anthropic response
#[derive(Debug, Deserialize)]
pub struct AnthropicContent {
    /// The type of content
    #[serde(rename = "type")]
    pub content_type: String,

    /// The actual text content
    #[serde(default)]
    pub text: String,
}

impl AnthropicRequest {
    /// Create a new Anthropic request
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            system: None,
            max_tokens,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(AnthropicMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the system prompt, appending when one is already present
    pub fn system(mut self, system: impl Into<String>) -> Self {
        let system = system.into();
        self.system = Some(match self.system.take() {
            Some(existing) => format!("{}\n\n{}", existing, system),
            None => system,
        });
        self
    }
}

impl Anthropic {
    /// Create a new Anthropic client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        default_model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder().timeout(timeout).build().unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            default_model: default_model.into(),
        }
    }

    /// Create a client from a provider configuration entry
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(
            config.api_key.trim(),
            &config.endpoint,
            &config.model,
            Duration::from_secs(config.timeout_secs.unwrap_or(30)),
        )
    }

    /// Build the wire request; system messages move to the top-level field
    pub fn build_request(&self, request: &CompletionRequest) -> AnthropicRequest {
        let model = request.model.clone().unwrap_or_else(|| self.default_model.clone());
        let mut wire = AnthropicRequest::new(model, request.max_tokens);
        for message in &request.messages {
            wire = if message.role == "system" {
                wire.system(message.content.as_str())
            } else {
                wire.add_message(message.role.as_str(), message.content.as_str())
            };
        }
        wire
    }

    /// Complete a messages request
    pub async fn send(&self, request: &AnthropicRequest) -> Result<AnthropicResponse, ProviderError> {
        let api_url = if self.endpoint.is_empty() {
            "https://api.anthropic.com/v1/messages".to_string()
        } else {
            format!("{}/v1/messages", self.endpoint.trim_end_matches('/'))
        };

        let response = self
            .client
            .post(&api_url)
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport("Anthropic", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Anthropic API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        response
            .json::<AnthropicResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Anthropic response: {}", e)))
    }

    /// Token counts reported by the API, formatted for logs
    pub fn usage_summary(response: &AnthropicResponse) -> Option<String> {
        response
            .usage
            .as_ref()
            .map(|usage| format!("{} input + {} output tokens", usage.input_tokens, usage.output_tokens))
    }

    /// Extract the trimmed text of the first text content block
    pub fn extract_text(response: &AnthropicResponse) -> Option<String> {
        response
            .content
            .iter()
            .find(|c| c.content_type == "text")
            .map(|c| c.text.trim().to_string())
    }
}

#[async_trait]
impl LlmProvider for Anthropic {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let wire_request = self.build_request(&request);
        let response = self.send(&wire_request).await?;

        if let Some(usage) = Self::usage_summary(&response) {
            debug!("Anthropic usage: {}", usage);
        }

        Self::extract_text(&response)
            .ok_or_else(|| ProviderError::ParseError("Anthropic returned no text content".to_string()))
    }
}
