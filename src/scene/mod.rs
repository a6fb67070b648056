/*!
 * Scene generation: data model, prompt templates and the staged pipeline.
 */

pub mod json;
pub mod model;
pub mod pipeline;
pub mod prompts;

// Re-export commonly used types
pub use model::{
    ActionBlock, Character, DialogueBlock, References, SceneMetadata, ScenePlan, Script, ScriptBlock, Traits,
};
pub use pipeline::{PipelineRun, ScenePipeline, StageSource, StageSources};
