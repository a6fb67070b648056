/*!
 * Pipeline orchestrator for coordinating the scene stages.
 *
 * Stages run strictly in order, each one's output feeding the next:
 * Interpret -> Search -> Plan -> Dialogue -> Actions.
 */

use log::info;
use serde::Serialize;
use std::time::{Duration, Instant};

use crate::app_config::{Config, PipelineSettings};
use crate::errors::PipelineError;
use crate::gateway::{self, LlmGateway, SearchGateway};
use crate::providers::{ProviderRegistry, ProviderStatus};
use crate::scene::model::{References, SceneMetadata, ScenePlan, Script};

use super::action_pass::ActionPass;
use super::dialogue_pass::DialoguePass;
use super::interpret_pass::InterpretPass;
use super::plan_pass::{PlanConfig, PlanPass};
use super::search_pass::SearchPass;
use super::StageSource;

/// Which path each stage took during one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageSources {
    pub interpret: StageSource,
    pub search: StageSource,
    pub plan: StageSource,
    pub dialogue: StageSource,
}

/// Everything produced by one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub metadata: SceneMetadata,
    pub references: References,
    pub plan: ScenePlan,
    pub script: Script,
    pub sources: StageSources,
    /// Total duration of pipeline execution
    #[serde(skip)]
    pub duration: Duration,
}

impl PipelineRun {
    /// One-line description for logs and the CLI.
    pub fn summary(&self) -> String {
        let dialogue = self.script.dialogue().count();
        let actions = self.script.actions().count();

        [
            format!("Duration: {:.2}s", self.duration.as_secs_f32()),
            format!("Scene: {} ({})", self.plan.scene_title, self.metadata.setting),
            format!("Script: {} dialogue + {} action blocks", dialogue, actions),
            format!(
                "Sources: interpret={:?} search={:?} plan={:?} dialogue={:?}",
                self.sources.interpret, self.sources.search, self.sources.plan, self.sources.dialogue
            ),
        ]
        .join(" | ")
    }
}

/// The main scene pipeline. Immutable once built; share it behind an `Arc`.
#[derive(Debug)]
pub struct ScenePipeline {
    llm: LlmGateway,
    search: SearchGateway,
    interpret_pass: InterpretPass,
    search_pass: SearchPass,
    plan_pass: PlanPass,
    dialogue_pass: DialoguePass,
    action_pass: ActionPass,
}

impl ScenePipeline {
    /// Create a pipeline over the given gateways.
    pub fn new(llm: LlmGateway, search: SearchGateway, settings: &PipelineSettings) -> Self {
        Self {
            llm,
            search,
            interpret_pass: InterpretPass::new(settings.interpret_max_tokens),
            search_pass: SearchPass::new(),
            plan_pass: PlanPass::new(PlanConfig {
                max_tokens: settings.plan_max_tokens,
                max_dialogue_turns: settings.max_dialogue_turns,
            }),
            dialogue_pass: DialoguePass::new(settings.dialogue_max_tokens),
            action_pass: ActionPass::new(),
        }
    }

    /// Create a pipeline from a provider registry.
    pub fn from_registry(registry: ProviderRegistry, settings: &PipelineSettings, max_results: usize) -> Self {
        let (llm, search) = gateway::from_registry(registry, max_results);
        Self::new(llm, search, settings)
    }

    /// Create a pipeline with the providers named in the configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::from_registry(
            ProviderRegistry::from_config(config),
            &config.pipeline,
            config.search.max_results,
        )
    }

    /// A pipeline with no providers: every stage runs its heuristic.
    pub fn offline() -> Self {
        Self::new(LlmGateway::default(), SearchGateway::default(), &PipelineSettings::default())
    }

    pub fn status(&self) -> ProviderStatus {
        gateway::status(&self.llm, &self.search)
    }

    /// Run every stage and return the script plus intermediate results.
    pub async fn run(&self, prompt: &str) -> Result<PipelineRun, PipelineError> {
        let start_time = Instant::now();
        info!("Generating scene for prompt: {:?}", prompt);

        let (metadata, interpret_source) = self.interpret_pass.run(&self.llm, prompt).await;
        let (references, search_source) = self.search_pass.run(&self.search, &metadata).await;
        let (plan, plan_source) = self.plan_pass.run(&self.llm, &metadata, &references).await;
        let (dialogue, dialogue_source) = self
            .dialogue_pass
            .run(&self.llm, &metadata.characters, plan.dialogue_turns, &metadata.scene_topic)
            .await;
        let actions = self.action_pass.run(&dialogue);

        let script = Script::assemble(dialogue, actions);
        if let Some(id) = script.duplicate_id() {
            return Err(PipelineError::InvalidScript(format!("duplicate block id {}", id)));
        }

        let run = PipelineRun {
            metadata,
            references,
            plan,
            script,
            sources: StageSources {
                interpret: interpret_source,
                search: search_source,
                plan: plan_source,
                dialogue: dialogue_source,
            },
            duration: start_time.elapsed(),
        };

        info!("{}", run.summary());
        Ok(run)
    }

    /// Run every stage and return only the script.
    pub async fn run_pipeline(&self, prompt: &str) -> Result<Script, PipelineError> {
        Ok(self.run(prompt).await?.script)
    }
}
