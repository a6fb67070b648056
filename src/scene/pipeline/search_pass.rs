/*!
 * Search pass: topic and setting to background references.
 */

use log::debug;

use crate::gateway::SearchGateway;
use crate::scene::model::{References, SceneMetadata};

use super::StageSource;

/// Search pass. Never fails: without a usable search API it returns
/// synthesized references.
#[derive(Debug, Clone, Default)]
pub struct SearchPass;

impl SearchPass {
    pub fn new() -> Self {
        Self
    }

    pub async fn run(&self, search: &SearchGateway, metadata: &SceneMetadata) -> (References, StageSource) {
        let (references, from_search) = search.web_search(&metadata.scene_topic, &metadata.setting).await;

        debug!(
            "search: {} reference(s), {} image(s)",
            references.references.len(),
            references.images.len()
        );

        let source = if from_search { StageSource::Search } else { StageSource::Fallback };
        (references, source)
    }
}
