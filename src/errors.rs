/*!
 * Error types for the scenescript application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request did not finish within the client timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Classify a reqwest transport error.
    pub fn from_transport(provider: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(format!("{}: {}", provider, error))
        } else if error.is_connect() {
            Self::ConnectionError(format!("{}: {}", provider, error))
        } else {
            Self::RequestFailed(format!("{}: {}", provider, error))
        }
    }

    /// Map a non-2xx status and body to the matching variant.
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

/// Stage-internal failures. Every variant is recoverable: the stage that
/// observes one falls back to its deterministic path.
#[derive(Error, Debug)]
pub enum StageError {
    /// No LLM credential is configured
    #[error("no LLM provider configured")]
    NoProviderConfigured,

    /// Network error, non-2xx status or timeout
    #[error("provider call failed: {0}")]
    ProviderCallFailed(#[from] ProviderError),

    /// The provider answered with something other than the expected JSON shape
    #[error("could not use provider response: {0}")]
    ResponseParseFailed(String),
}

/// Errors that escape the pipeline orchestrator.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A stage produced output that violates the script contract
    #[error("pipeline produced an invalid script: {0}")]
    InvalidScript(String),
}

/// Errors surfaced by the HTTP layer
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request body is not JSON or lacks a string `prompt` field
    #[error("Missing prompt")]
    MissingPrompt,

    /// Anything the pipeline could not recover from
    #[error("{0}")]
    Internal(#[from] PipelineError),
}
