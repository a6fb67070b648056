/*!
 * Plan pass: metadata and references to a scene plan.
 */

use log::debug;

use crate::errors::StageError;
use crate::gateway::LlmGateway;
use crate::scene::json::parse_response;
use crate::scene::model::{References, SceneMetadata, ScenePlan};
use crate::scene::prompts;

use super::{log_fallback, StageSource};

/// Dialogue turns planned by the heuristic
pub const DEFAULT_DIALOGUE_TURNS: u32 = 8;

/// Configuration for the plan pass.
#[derive(Debug, Clone)]
pub struct PlanConfig {
    /// Token budget for the LLM request
    pub max_tokens: u32,
    /// Upper bound applied to `dialogue_turns` from the LLM
    pub max_dialogue_turns: u32,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            max_dialogue_turns: 24,
        }
    }
}

/// Plan pass for laying out the scene.
#[derive(Debug, Clone)]
pub struct PlanPass {
    config: PlanConfig,
}

impl PlanPass {
    pub fn new(config: PlanConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(PlanConfig::default())
    }

    /// Plan the scene, preferring the LLM when one is configured.
    pub async fn run(
        &self,
        llm: &LlmGateway,
        metadata: &SceneMetadata,
        references: &References,
    ) -> (ScenePlan, StageSource) {
        match self.plan_with_llm(llm, metadata, references).await {
            Ok(plan) => (plan, StageSource::Llm),
            Err(e) => {
                log_fallback("plan", &e);
                (Self::plan_heuristic(metadata, references), StageSource::Fallback)
            }
        }
    }

    async fn plan_with_llm(
        &self,
        llm: &LlmGateway,
        metadata: &SceneMetadata,
        references: &References,
    ) -> Result<ScenePlan, StageError> {
        let messages = prompts::plan_messages(metadata, references);
        let response = llm.call_llm(&messages, None, self.config.max_tokens).await?;
        let mut plan: ScenePlan = parse_response(&response)?;

        if plan.scene_title.trim().is_empty() {
            return Err(StageError::ResponseParseFailed("empty scene_title".to_string()));
        }

        if plan.dialogue_turns > self.config.max_dialogue_turns {
            debug!(
                "plan: clamping {} dialogue turns to {}",
                plan.dialogue_turns, self.config.max_dialogue_turns
            );
            plan.dialogue_turns = self.config.max_dialogue_turns;
        }

        Ok(plan)
    }

    /// Fixed plan used without a working LLM. References are not consulted.
    pub fn plan_heuristic(metadata: &SceneMetadata, _references: &References) -> ScenePlan {
        ScenePlan {
            scene_title: metadata.scene_topic.clone(),
            background: metadata.setting.clone(),
            flow: ["intro", "concept", "reaction", "wrap"].map(String::from).into(),
            dialogue_turns: DEFAULT_DIALOGUE_TURNS,
            camera_plan: ["wide", "close-up", "medium", "wide"].map(String::from).into(),
        }
    }
}
