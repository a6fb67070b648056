/*!
 * Prompt templates for the LLM-backed stage paths.
 *
 * Each template asks for a single JSON value of a fixed shape so the stage
 * can validate the answer before using it.
 */

use crate::providers::ChatMessage;
use crate::scene::model::{Character, References, SceneMetadata};

/// System prompt shared by every stage
pub const SCREENWRITER: &str = r#"You are a screenwriter preparing short animated scenes.
Return ONLY valid JSON matching the requested shape. Do not include any text outside the JSON."#;

const INTERPRET_TEMPLATE: &str = r#"Read this one-sentence scene request and describe the scene.

Request: {prompt}

Respond with a JSON object:
{"scene_topic": string, "setting": string, "scene_type": string,
 "characters": [{"name": string, "role": string, "traits": {string: string}}],
 "target_length_seconds": integer}"#;

const PLAN_TEMPLATE: &str = r#"Plan a scene about "{topic}" set in "{setting}".
Characters: {characters}
Background material:
{references}

Respond with a JSON object:
{"scene_title": string, "background": string, "flow": [string],
 "dialogue_turns": integer, "camera_plan": [string]}"#;

const DIALOGUE_TEMPLATE: &str = r#"Write {turns} lines of dialogue about "{topic}".
Speakers take turns in this order, repeating as needed: {speakers}
Character details: {characters}

Respond with a JSON array, one element per line:
[{"character": string, "emotion": string, "text": string, "duration": number}]"#;

fn describe_characters(characters: &[Character]) -> String {
    serde_json::to_string(characters).unwrap_or_else(|_| {
        characters.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", ")
    })
}

/// Messages for the interpret stage
pub fn interpret_messages(prompt: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SCREENWRITER),
        ChatMessage::user(INTERPRET_TEMPLATE.replace("{prompt}", prompt.trim())),
    ]
}

/// Messages for the plan stage
pub fn plan_messages(metadata: &SceneMetadata, references: &References) -> Vec<ChatMessage> {
    let mut material: Vec<String> = references.references.iter().map(|r| format!("- {}", r)).collect();
    if !references.images.is_empty() {
        material.push(format!("- Images: {}", references.images.join(", ")));
    }

    let body = PLAN_TEMPLATE
        .replace("{topic}", &metadata.scene_topic)
        .replace("{setting}", &metadata.setting)
        .replace("{characters}", &describe_characters(&metadata.characters))
        .replace("{references}", &material.join("\n"));

    vec![ChatMessage::system(SCREENWRITER), ChatMessage::user(body)]
}

/// Messages for the dialogue stage
pub fn dialogue_messages(characters: &[Character], turns: u32, topic: &str) -> Vec<ChatMessage> {
    let speakers = characters.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", ");

    let body = DIALOGUE_TEMPLATE
        .replace("{turns}", &turns.to_string())
        .replace("{topic}", topic)
        .replace("{speakers}", &speakers)
        .replace("{characters}", &describe_characters(characters));

    vec![ChatMessage::system(SCREENWRITER), ChatMessage::user(body)]
}
