/*!
 * Dialogue pass: characters, turn count and topic to dialogue lines.
 *
 * Dialogue ids are always the 1-based line position, on both paths, so the
 * action pass can offset its ids past them without collisions.
 */

use serde::Deserialize;

use crate::errors::StageError;
use crate::gateway::LlmGateway;
use crate::scene::json::parse_response;
use crate::scene::model::{Character, DialogueBlock};
use crate::scene::prompts;

use super::{log_fallback, StageSource};

/// Shortest duration a line may have, in seconds
pub const MIN_LINE_DURATION: f64 = 1.5;

/// Seconds of speech per word
pub const SECONDS_PER_WORD: f64 = 0.15;

/// One line as the LLM is asked to return it
#[derive(Debug, Deserialize)]
struct GeneratedLine {
    character: String,
    text: String,
    #[serde(default)]
    emotion: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
}

/// Dialogue pass for writing the spoken lines.
#[derive(Debug, Clone)]
pub struct DialoguePass {
    max_tokens: u32,
}

impl DialoguePass {
    pub fn new(max_tokens: u32) -> Self {
        Self { max_tokens }
    }

    pub fn with_defaults() -> Self {
        Self::new(1500)
    }

    /// Write `turns` lines, preferring the LLM when one is configured.
    pub async fn run(
        &self,
        llm: &LlmGateway,
        characters: &[Character],
        turns: u32,
        topic: &str,
    ) -> (Vec<DialogueBlock>, StageSource) {
        if turns == 0 || characters.is_empty() {
            return (Vec::new(), StageSource::Fallback);
        }

        match self.dialogue_with_llm(llm, characters, turns, topic).await {
            Ok(lines) => (lines, StageSource::Llm),
            Err(e) => {
                log_fallback("dialogue", &e);
                (Self::dialogue_heuristic(characters, turns, topic), StageSource::Fallback)
            }
        }
    }

    async fn dialogue_with_llm(
        &self,
        llm: &LlmGateway,
        characters: &[Character],
        turns: u32,
        topic: &str,
    ) -> Result<Vec<DialogueBlock>, StageError> {
        let messages = prompts::dialogue_messages(characters, turns, topic);
        let response = llm.call_llm(&messages, None, self.max_tokens).await?;
        let generated: Vec<GeneratedLine> = parse_response(&response)?;

        if generated.is_empty() {
            return Err(StageError::ResponseParseFailed("no dialogue lines".to_string()));
        }
        if let Some(blank) = generated.iter().position(|l| l.text.trim().is_empty()) {
            return Err(StageError::ResponseParseFailed(format!("line {} has no text", blank + 1)));
        }

        Ok(generated
            .into_iter()
            .take(turns as usize)
            .enumerate()
            .map(|(idx, line)| {
                let traits = characters
                    .iter()
                    .find(|c| c.name == line.character)
                    .map(|c| c.traits.clone())
                    .unwrap_or_default();
                let duration = match line.duration {
                    Some(d) if d.is_finite() && d > 0.0 => round2(d),
                    _ => line_duration(&line.text),
                };
                DialogueBlock {
                    id: (idx + 1).to_string(),
                    character: line.character,
                    traits,
                    emotion: line.emotion.filter(|e| !e.trim().is_empty()).unwrap_or_else(neutral),
                    text: line.text.trim().to_string(),
                    duration,
                    voice_url: String::new(),
                }
            })
            .collect())
    }

    /// Round-robin placeholder lines used without a working LLM.
    pub fn dialogue_heuristic(characters: &[Character], turns: u32, topic: &str) -> Vec<DialogueBlock> {
        characters
            .iter()
            .cycle()
            .zip(1..=turns)
            .map(|(speaker, i)| {
                let text = format!("This is line {} about {}.", i, topic);
                DialogueBlock {
                    id: i.to_string(),
                    character: speaker.name.clone(),
                    traits: speaker.traits.clone(),
                    emotion: neutral(),
                    duration: line_duration(&text),
                    text,
                    voice_url: String::new(),
                }
            })
            .collect()
    }
}

/// Spoken duration: 0.15 s per word, at least 1.5 s, two decimals.
pub fn line_duration(text: &str) -> f64 {
    let words = text.split_whitespace().count() as f64;
    round2((SECONDS_PER_WORD * words).max(MIN_LINE_DURATION))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn neutral() -> String {
    "neutral".to_string()
}
