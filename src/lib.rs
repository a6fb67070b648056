/*!
 * # SceneScript - one-sentence prompts to scene scripts
 *
 * A Rust library and HTTP service that turns a prompt such as
 * "A teacher and student discuss photosynthesis in a classroom." into a
 * structured script of dialogue and stage actions for animation rendering.
 *
 * ## Features
 *
 * - Five-stage pipeline: interpret, search, plan, dialogue, actions
 * - LLM-backed stages using the first configured provider:
 *   - Groq (OpenAI-compatible chat completions)
 *   - OpenAI
 *   - Anthropic
 * - Optional web search for background references
 * - Deterministic fallback for every stage when no provider is configured
 *   or a provider call fails
 * - `POST /generate_scene` HTTP endpoint
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management (JSON file + environment)
 * - `providers`: Client implementations and the provider registry
 * - `gateway`: Uniform LLM and search call interfaces
 * - `scene`: Data model, prompt templates and the staged pipeline
 * - `server`: axum HTTP API
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod gateway;
pub mod providers;
pub mod scene;
pub mod server;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{ApiError, PipelineError, ProviderError, StageError};
pub use gateway::{LlmGateway, SearchGateway};
pub use scene::{PipelineRun, ScenePipeline, Script, ScriptBlock};
