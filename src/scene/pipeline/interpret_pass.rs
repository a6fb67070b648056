/*!
 * Interpret pass: prompt to scene metadata.
 */

use crate::errors::StageError;
use crate::gateway::LlmGateway;
use crate::scene::json::parse_response;
use crate::scene::model::{Character, SceneMetadata};
use crate::scene::prompts;

use super::{log_fallback, StageSource};

/// Setting used when the prompt does not name one
pub const UNKNOWN_SETTING: &str = "unknown";

/// Interpret pass for extracting scene metadata from a prompt.
#[derive(Debug, Clone)]
pub struct InterpretPass {
    max_tokens: u32,
}

impl InterpretPass {
    pub fn new(max_tokens: u32) -> Self {
        Self { max_tokens }
    }

    pub fn with_defaults() -> Self {
        Self::new(512)
    }

    /// Interpret the prompt, preferring the LLM when one is configured.
    pub async fn run(&self, llm: &LlmGateway, prompt: &str) -> (SceneMetadata, StageSource) {
        match self.interpret_with_llm(llm, prompt).await {
            Ok(metadata) => (metadata, StageSource::Llm),
            Err(e) => {
                log_fallback("interpret", &e);
                (Self::interpret_heuristic(prompt), StageSource::Fallback)
            }
        }
    }

    async fn interpret_with_llm(&self, llm: &LlmGateway, prompt: &str) -> Result<SceneMetadata, StageError> {
        let response = llm.call_llm(&prompts::interpret_messages(prompt), None, self.max_tokens).await?;
        let metadata: SceneMetadata = parse_response(&response)?;

        if metadata.scene_topic.trim().is_empty() {
            return Err(StageError::ResponseParseFailed("empty scene_topic".to_string()));
        }
        if metadata.characters.is_empty() {
            return Err(StageError::ResponseParseFailed("no characters".to_string()));
        }
        if let Some(unnamed) = metadata.characters.iter().position(|c| c.name.trim().is_empty()) {
            return Err(StageError::ResponseParseFailed(format!("character {} has no name", unnamed)));
        }

        Ok(metadata)
    }

    /// Rule-based interpretation used without a working LLM.
    pub fn interpret_heuristic(prompt: &str) -> SceneMetadata {
        let clean = prompt.trim();

        let (topic, setting) = match clean.split_once(" in ") {
            Some((topic, setting)) => (strip_period(topic), strip_period(setting)),
            None => (strip_period(clean), UNKNOWN_SETTING),
        };

        let lower = clean.to_lowercase();
        let mut characters = Vec::new();
        if lower.contains("teacher") {
            characters.push(Character::teacher());
        }
        if lower.contains("student") {
            characters.push(Character::student());
        }
        if characters.is_empty() {
            characters.push(Character::narrator());
        }

        SceneMetadata {
            scene_topic: capitalize(topic),
            setting: setting.to_string(),
            scene_type: "conversation".to_string(),
            characters,
            target_length_seconds: 150,
        }
    }
}

fn strip_period(text: &str) -> &str {
    text.strip_suffix('.').unwrap_or(text)
}

/// Upper-case the first character and lower-case the rest.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    }
}
