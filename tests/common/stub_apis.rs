/*!
 * In-process stand-ins for the chat completion, messages and search APIs.
 *
 * Each stub answers the stage that built the request with a canned reply, so
 * the real HTTP clients can be exercised without network access.
 */

use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

/// Canned interpret reply
pub const INTERPRET_REPLY: &str = r#"{"scene_topic":"Photosynthesis","setting":"a greenhouse classroom",
 "scene_type":"lesson","characters":[{"name":"Ms. Green","role":"teacher","traits":{"tone":"warm"}},
 {"name":"Leo","role":"student","traits":{}}],"target_length_seconds":60}"#;

/// Canned plan reply, fenced the way chat models often answer
pub const PLAN_REPLY: &str = r#"Here you go:
```json
{"scene_title":"How Leaves Eat Light","background":"greenhouse","flow":["hook","explain","wrap"],
 "dialogue_turns":3,"camera_plan":["wide","close-up","wide"]}
```"#;

/// Canned dialogue reply with colliding ids
pub const DIALOGUE_REPLY: &str = r#"[{"id":"a","character":"Ms. Green","text":"Leaves catch sunlight.","emotion":"cheerful"},
 {"id":"a","character":"Leo","text":"And turn it into sugar?","emotion":"curious"},
 {"id":"a","character":"Ms. Green","text":"Exactly, with water and carbon dioxide.","duration":2.5}]"#;

/// API key the stubs accept
pub const STUB_KEY: &str = "test-key";

/// Pick the canned reply matching the stage that built `prompt`
pub fn canned_reply_for(prompt: &str) -> &'static str {
    if prompt.contains("Plan a scene") {
        PLAN_REPLY
    } else if prompt.contains("lines of dialogue") {
        DIALOGUE_REPLY
    } else {
        INTERPRET_REPLY
    }
}

fn last_user_message(body: &Value) -> String {
    body["messages"]
        .as_array()
        .and_then(|messages| messages.iter().rev().find(|m| m["role"] == "user"))
        .and_then(|m| m["content"].as_str())
        .unwrap_or_default()
        .to_string()
}

fn has_bearer(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", STUB_KEY))
}

async fn chat_completions(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !has_bearer(&headers) {
        return (StatusCode::UNAUTHORIZED, "invalid api key").into_response();
    }
    let reply = canned_reply_for(&last_user_message(&body));
    Json(json!({
        "id": "chatcmpl-test",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": reply}}],
        "usage": {"prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30}
    }))
    .into_response()
}

async fn messages(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let key_ok = headers.get("x-api-key").and_then(|v| v.to_str().ok()) == Some(STUB_KEY);
    let version_ok = headers.get("anthropic-version").is_some();
    if !key_ok || !version_ok {
        return (StatusCode::UNAUTHORIZED, "invalid x-api-key").into_response();
    }
    // System prompts travel in the top-level field, never as a message
    if body["messages"].as_array().is_some_and(|m| m.iter().any(|m| m["role"] == "system")) {
        return (StatusCode::BAD_REQUEST, "system role in messages").into_response();
    }
    let reply = canned_reply_for(&last_user_message(&body));
    Json(json!({
        "id": "msg-test",
        "content": [{"type": "text", "text": format!("  {}  ", reply)}],
        "usage": {"input_tokens": 10, "output_tokens": 20}
    }))
    .into_response()
}

async fn search(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Response {
    if !has_bearer(&headers) {
        return (StatusCode::FORBIDDEN, "bad search key").into_response();
    }
    let query = params.get("q").cloned().unwrap_or_default();
    Json(json!({
        "results": [
            {"title": "Photosynthesis", "snippet": format!("Result for {}", query)},
            {"title": "Chlorophyll", "snippet": ""},
            {"title": "", "snippet": ""}
        ],
        "images": ["https://img.test/leaf.png"]
    }))
    .into_response()
}

async fn always_fails() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
}

async fn garbage_reply() -> Response {
    Json(json!({
        "choices": [{"message": {"role": "assistant", "content": "I'd rather not answer in JSON."}}]
    }))
    .into_response()
}

async fn slow_search() -> Response {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({"results": [], "images": []})).into_response()
}

/// OpenAI-compatible chat completions at `/chat/completions`
pub fn chat_router() -> Router {
    Router::new().route("/chat/completions", post(chat_completions))
}

/// Anthropic messages at `/v1/messages`
pub fn messages_router() -> Router {
    Router::new().route("/v1/messages", post(messages))
}

/// Search API at `/v1/search`
pub fn search_router() -> Router {
    Router::new().route("/v1/search", get(search))
}

/// Every route answers 500
pub fn failing_router() -> Router {
    Router::new()
        .route("/chat/completions", post(always_fails))
        .route("/v1/messages", post(always_fails))
        .route("/v1/search", get(always_fails))
}

/// Chat completions that answer with prose instead of JSON
pub fn prose_router() -> Router {
    Router::new().route("/chat/completions", post(garbage_reply))
}

/// Search that answers after three seconds
pub fn slow_search_router() -> Router {
    Router::new().route("/v1/search", get(slow_search))
}
