/*!
 * Scene pipeline for turning a prompt into a script.
 *
 * The pipeline processes a prompt through five stages:
 * 1. **Interpret**: topic, setting and characters
 * 2. **Search**: background references
 * 3. **Plan**: title, flow, camera plan and number of dialogue turns
 * 4. **Dialogue**: the spoken lines
 * 5. **Actions**: one stage direction per line
 *
 * Interpret, Plan and Dialogue try the LLM first and fall back to a
 * deterministic heuristic on any failure; Search falls back to synthesized
 * references; Actions is always deterministic.
 */

use log::{debug, warn};
use serde::Serialize;

use crate::errors::StageError;

pub mod action_pass;
pub mod dialogue_pass;
pub mod interpret_pass;
pub mod orchestrator;
pub mod plan_pass;
pub mod search_pass;

pub use orchestrator::{PipelineRun, ScenePipeline, StageSources};

/// Which path produced a stage's output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageSource {
    /// Parsed from an LLM completion
    Llm,
    /// Built from web search results
    Search,
    /// Deterministic heuristic
    Fallback,
}

/// Record a swallowed stage error before falling back.
pub(crate) fn log_fallback(stage: &str, error: &StageError) {
    match error {
        StageError::NoProviderConfigured => debug!("{}: no LLM provider, using heuristic", stage),
        other => warn!("{}: LLM path failed, using heuristic: {}", stage, other),
    }
}
