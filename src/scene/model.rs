/*!
 * Data model threaded through the scene pipeline.
 *
 * Every value is created fresh per pipeline run and dropped after the
 * response is sent.
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form character traits (e.g. `"mood": "curious"`)
pub type Traits = BTreeMap<String, String>;

/// A character taking part in the scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub traits: Traits,
}

impl Character {
    pub fn new(name: &str, role: &str) -> Self {
        Self {
            name: name.to_string(),
            role: role.to_string(),
            traits: Traits::new(),
        }
    }

    pub fn teacher() -> Self {
        Self::new("Teacher", "teacher")
    }

    pub fn student() -> Self {
        Self::new("Student", "student")
    }

    pub fn narrator() -> Self {
        Self::new("Narrator", "narrator")
    }
}

/// What the prompt asks for: produced by the interpret stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneMetadata {
    pub scene_topic: String,
    pub setting: String,
    #[serde(default = "default_scene_type")]
    pub scene_type: String,
    pub characters: Vec<Character>,
    #[serde(default = "default_target_length_seconds")]
    pub target_length_seconds: u32,
}

/// Background material: produced by the search stage, read by the plan stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct References {
    pub references: Vec<String>,
    pub images: Vec<String>,
}

/// Scene structure: produced by the plan stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenePlan {
    pub scene_title: String,
    pub background: String,
    pub flow: Vec<String>,
    pub dialogue_turns: u32,
    pub camera_plan: Vec<String>,
}

/// A spoken line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueBlock {
    pub id: String,
    pub character: String,
    pub traits: Traits,
    pub emotion: String,
    pub text: String,
    /// Seconds, rounded to two decimals
    pub duration: f64,
    pub voice_url: String,
}

/// A stage direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionBlock {
    pub id: String,
    pub description: String,
    pub timing: String,
}

/// One unit of the output script, tagged by `"type"` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScriptBlock {
    Dialogue(DialogueBlock),
    Action(ActionBlock),
}

impl ScriptBlock {
    pub fn id(&self) -> &str {
        match self {
            Self::Dialogue(block) => &block.id,
            Self::Action(block) => &block.id,
        }
    }

    pub fn is_dialogue(&self) -> bool {
        matches!(self, Self::Dialogue(_))
    }
}

/// The final script: every dialogue block, then every action block.
///
/// Construction goes through [`Script::assemble`], so actions never
/// interleave with dialogue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    blocks: Vec<ScriptBlock>,
}

impl Script {
    pub fn assemble(dialogue: Vec<DialogueBlock>, actions: Vec<ActionBlock>) -> Self {
        let blocks = dialogue
            .into_iter()
            .map(ScriptBlock::Dialogue)
            .chain(actions.into_iter().map(ScriptBlock::Action))
            .collect();
        Self { blocks }
    }

    pub fn blocks(&self) -> &[ScriptBlock] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<ScriptBlock> {
        self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn dialogue(&self) -> impl Iterator<Item = &DialogueBlock> {
        self.blocks.iter().filter_map(|b| match b {
            ScriptBlock::Dialogue(d) => Some(d),
            ScriptBlock::Action(_) => None,
        })
    }

    pub fn actions(&self) -> impl Iterator<Item = &ActionBlock> {
        self.blocks.iter().filter_map(|b| match b {
            ScriptBlock::Action(a) => Some(a),
            ScriptBlock::Dialogue(_) => None,
        })
    }

    /// Id of the first block whose id repeats an earlier one
    pub fn duplicate_id(&self) -> Option<&str> {
        let mut seen = std::collections::HashSet::new();
        self.blocks.iter().map(ScriptBlock::id).find(|id| !seen.insert(*id))
    }
}

fn default_scene_type() -> String {
    "conversation".to_string()
}

fn default_target_length_seconds() -> u32 {
    150
}
