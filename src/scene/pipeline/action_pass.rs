/*!
 * Action pass: one stage direction after every dialogue line.
 */

use crate::scene::model::{ActionBlock, DialogueBlock};

/// Action pass. Always deterministic.
#[derive(Debug, Clone, Default)]
pub struct ActionPass;

impl ActionPass {
    pub fn new() -> Self {
        Self
    }

    /// Emit a gesture for each line. Action ids continue after the last
    /// dialogue position, so they never repeat a positional dialogue id.
    pub fn run(&self, dialogue: &[DialogueBlock]) -> Vec<ActionBlock> {
        let offset = dialogue.len();
        dialogue
            .iter()
            .enumerate()
            .map(|(idx, line)| ActionBlock {
                id: (offset + idx + 1).to_string(),
                description: format!("{} gestures while speaking.", line.character),
                timing: "after".to_string(),
            })
            .collect()
    }
}
