use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and overlaying environment credentials.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// LLM provider settings; selection order is fixed by `ProviderKind::PRIORITY`
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,

    /// Web search provider
    #[serde(default)]
    pub search: SearchConfig,

    /// Pipeline tuning
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// LLM provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    // @provider: Groq (OpenAI-compatible chat completions), primary
    Groq,
    // @provider: OpenAI chat completions, secondary
    OpenAI,
    // @provider: Anthropic messages API
    Anthropic,
}

impl ProviderKind {
    /// Fixed selection priority, highest first
    pub const PRIORITY: [ProviderKind; 3] = [Self::Groq, Self::OpenAI, Self::Anthropic];

    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Groq => "Groq",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Groq => "groq".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
        }
    }

    // @returns: Environment variable holding the API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::Groq => "GROQ_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// Whether the provider speaks the chat-completions wire format
    pub fn is_chat_completion(&self) -> bool {
        matches!(self, Self::Groq | Self::OpenAI)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Default model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Client timeout, None leaves the HTTP client default
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ProviderConfig {
    // @param kind: Provider enum
    // @returns: Provider config with defaults and no key
    pub fn new(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::Groq => Self {
                provider_type: kind.to_lowercase_string(),
                model: default_groq_model(),
                api_key: String::new(),
                endpoint: default_groq_endpoint(),
                timeout_secs: None,
            },
            ProviderKind::OpenAI => Self {
                provider_type: kind.to_lowercase_string(),
                model: default_openai_model(),
                api_key: String::new(),
                endpoint: default_openai_endpoint(),
                timeout_secs: None,
            },
            ProviderKind::Anthropic => Self {
                provider_type: kind.to_lowercase_string(),
                model: default_anthropic_model(),
                api_key: String::new(),
                endpoint: default_anthropic_endpoint(),
                timeout_secs: Some(default_anthropic_timeout_secs()),
            },
        }
    }

    /// Parsed provider kind
    pub fn kind(&self) -> Result<ProviderKind> {
        self.provider_type.parse()
    }

    /// Fill blank endpoint and model (and a missing Anthropic timeout) from the kind's defaults
    pub fn fill_defaults(&mut self) {
        let Ok(kind) = self.kind() else {
            return;
        };
        let defaults = Self::new(kind);
        if self.endpoint.trim().is_empty() {
            self.endpoint = defaults.endpoint;
        }
        if self.model.trim().is_empty() {
            self.model = defaults.model;
        }
        if self.timeout_secs.is_none() {
            self.timeout_secs = defaults.timeout_secs;
        }
    }

    /// A provider counts as configured when its key is non-blank
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Web search service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchConfig {
    /// API key for the service
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Search endpoint URL
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of results requested
    #[serde(default = "default_search_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_search_endpoint(),
            timeout_secs: default_search_timeout_secs(),
            max_results: default_search_max_results(),
        }
    }
}

impl SearchConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Pipeline tuning applied to the LLM-backed stage paths
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PipelineSettings {
    /// Upper bound on dialogue turns accepted from an LLM plan
    #[serde(default = "default_max_dialogue_turns")]
    pub max_dialogue_turns: u32,

    /// Token budget for the interpret stage
    #[serde(default = "default_interpret_max_tokens")]
    pub interpret_max_tokens: u32,

    /// Token budget for the plan stage
    #[serde(default = "default_plan_max_tokens")]
    pub plan_max_tokens: u32,

    /// Token budget for the dialogue stage
    #[serde(default = "default_dialogue_max_tokens")]
    pub dialogue_max_tokens: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_dialogue_turns: default_max_dialogue_turns(),
            interpret_max_tokens: default_interpret_max_tokens(),
            plan_max_tokens: default_plan_max_tokens(),
            dialogue_max_tokens: default_dialogue_max_tokens(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_providers() -> Vec<ProviderConfig> {
    ProviderKind::PRIORITY.iter().map(|kind| ProviderConfig::new(*kind)).collect()
}

fn default_anthropic_timeout_secs() -> u64 {
    30
}

fn default_search_timeout_secs() -> u64 {
    15
}

fn default_search_max_results() -> usize {
    3
}

fn default_max_dialogue_turns() -> u32 {
    24
}

fn default_interpret_max_tokens() -> u32 {
    512
}

fn default_plan_max_tokens() -> u32 {
    512
}

fn default_dialogue_max_tokens() -> u32 {
    1500
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_groq_endpoint() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_search_endpoint() -> String {
    "https://api.search.example.com/v1/search".to_string()
}

fn default_groq_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-haiku-20240307".to_string()
}

impl Config {
    /// Load configuration from a JSON file, or defaults when the file is absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let mut config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config.providers.iter_mut().for_each(ProviderConfig::fill_defaults);

        Ok(config)
    }

    /// Overlay credentials and port from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Overlay credentials and port using the given variable lookup
    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        for kind in ProviderKind::PRIORITY {
            let Some(key) = lookup(kind.api_key_env()) else {
                continue;
            };
            match self.providers.iter_mut().find(|p| p.kind().ok() == Some(kind)) {
                Some(provider) => provider.api_key = key,
                None => {
                    let mut provider = ProviderConfig::new(kind);
                    provider.api_key = key;
                    self.providers.push(provider);
                }
            }
        }

        if let Some(key) = lookup("SEARCH_API_KEY") {
            self.search.api_key = key;
        }

        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value: {}", port))?;
        }

        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        for provider in &self.providers {
            provider.kind()?;
        }

        if self.server.port == 0 {
            return Err(anyhow!("Server port must be greater than zero"));
        }

        if self.pipeline.max_dialogue_turns == 0 {
            return Err(anyhow!("max_dialogue_turns must be greater than zero"));
        }

        if self.search.max_results == 0 {
            return Err(anyhow!("search.max_results must be greater than zero"));
        }

        Ok(())
    }

    /// Get a provider configuration by kind
    pub fn get_provider_config(&self, kind: ProviderKind) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.kind().ok() == Some(kind))
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            providers: default_providers(),
            search: SearchConfig::default(),
            pipeline: PipelineSettings::default(),
            server: ServerConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
