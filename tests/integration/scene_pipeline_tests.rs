/*!
 * End-to-end pipeline tests driven through the real HTTP clients
 */

use anyhow::Result;
use scenescript::app_config::{Config, ProviderKind};
use scenescript::scene::StageSource;
use scenescript::ScenePipeline;
use crate::common::{self, stub_apis, CLASSROOM_PROMPT};

fn config_for(kind: ProviderKind, endpoint: &str) -> Config {
    let mut config = Config::default();
    for provider in &mut config.providers {
        if provider.kind().ok() == Some(kind) {
            provider.api_key = stub_apis::STUB_KEY.to_string();
            provider.endpoint = endpoint.to_string();
        }
    }
    config
}

/// Test every LLM stage and search take their provider path
#[tokio::test]
async fn test_pipeline_withGroqAndSearch_shouldUseProviderOutputs() -> Result<()> {
    common::init_logging();
    let llm_base = common::spawn_stub(stub_apis::chat_router()).await;
    let search_base = common::spawn_stub(stub_apis::search_router()).await;

    let mut config = config_for(ProviderKind::Groq, &llm_base);
    config.search.api_key = stub_apis::STUB_KEY.to_string();
    config.search.endpoint = format!("{}/v1/search", search_base);

    let run = ScenePipeline::from_config(&config).run(CLASSROOM_PROMPT).await?;

    assert_eq!(run.sources.interpret, StageSource::Llm);
    assert_eq!(run.sources.search, StageSource::Search);
    assert_eq!(run.sources.plan, StageSource::Llm);
    assert_eq!(run.sources.dialogue, StageSource::Llm);

    assert_eq!(run.metadata.scene_topic, "Photosynthesis");
    assert_eq!(run.references.references[0], "Result for Photosynthesis a greenhouse classroom");
    assert_eq!(run.references.references[1], "Chlorophyll");
    assert_eq!(run.references.references.len(), 2);
    assert_eq!(run.plan.scene_title, "How Leaves Eat Light");
    assert_eq!(run.plan.dialogue_turns, 3);

    let script = &run.script;
    assert_eq!(common::speakers(script), vec!["Ms. Green", "Leo", "Ms. Green"]);
    assert_eq!(common::block_ids(script), vec!["1", "2", "3", "4", "5", "6"]);
    let first = script.dialogue().next().expect("first line");
    assert_eq!(first.traits.get("tone").map(String::as_str), Some("warm"));
    assert_eq!(first.emotion, "cheerful");
    assert_eq!(script.dialogue().nth(2).map(|d| d.duration), Some(2.5));
    assert_eq!(
        script.actions().map(|a| a.description.clone()).collect::<Vec<_>>(),
        vec![
            "Ms. Green gestures while speaking.",
            "Leo gestures while speaking.",
            "Ms. Green gestures while speaking.",
        ]
    );
    Ok(())
}

/// Test the Anthropic path produces the same script as the Groq path
#[tokio::test]
async fn test_pipeline_withAnthropicOnly_shouldMatchGroqScript() -> Result<()> {
    let chat_base = common::spawn_stub(stub_apis::chat_router()).await;
    let messages_base = common::spawn_stub(stub_apis::messages_router()).await;

    let groq = ScenePipeline::from_config(&config_for(ProviderKind::Groq, &chat_base));
    let anthropic = ScenePipeline::from_config(&config_for(ProviderKind::Anthropic, &messages_base));
    assert_eq!(anthropic.status().active_llm, Some(ProviderKind::Anthropic));

    let from_groq = groq.run_pipeline(CLASSROOM_PROMPT).await?;
    let from_anthropic = anthropic.run_pipeline(CLASSROOM_PROMPT).await?;

    assert_eq!(from_groq, from_anthropic);
    Ok(())
}

/// Test failing providers degrade to the offline script instead of erroring
#[tokio::test]
async fn test_pipeline_withFailingServices_shouldMatchOfflineScript() -> Result<()> {
    let base = common::spawn_stub(stub_apis::failing_router()).await;
    let mut config = config_for(ProviderKind::OpenAI, &base);
    config.search.api_key = stub_apis::STUB_KEY.to_string();
    config.search.endpoint = format!("{}/v1/search", base);

    let run = ScenePipeline::from_config(&config).run(CLASSROOM_PROMPT).await?;
    let offline = ScenePipeline::offline().run(CLASSROOM_PROMPT).await?;

    assert_eq!(run.script, offline.script);
    assert_eq!(run.references, offline.references);
    assert_eq!(run.sources, offline.sources);
    Ok(())
}

/// Test prose answers from the LLM fall back per stage
#[tokio::test]
async fn test_pipeline_withProseReplies_shouldFallBack() -> Result<()> {
    let base = common::spawn_stub(stub_apis::prose_router()).await;
    let pipeline = ScenePipeline::from_config(&config_for(ProviderKind::Groq, &base));

    let run = pipeline.run(CLASSROOM_PROMPT).await?;

    assert_eq!(run.sources.interpret, StageSource::Fallback);
    assert_eq!(run.sources.plan, StageSource::Fallback);
    assert_eq!(run.sources.dialogue, StageSource::Fallback);
    assert_eq!(run.script, ScenePipeline::offline().run_pipeline(CLASSROOM_PROMPT).await?);
    Ok(())
}
