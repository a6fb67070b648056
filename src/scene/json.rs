/*!
 * Extraction of JSON payloads from LLM completions.
 *
 * Models often wrap the requested JSON in prose or a markdown code fence.
 * The helpers here locate the payload and deserialize it into a typed shape.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::errors::StageError;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").expect("valid code fence pattern"));

/// Extract the JSON text from a potentially wrapped response.
pub fn extract_json(response: &str) -> Option<&str> {
    let trimmed = response.trim();

    if (trimmed.starts_with('{') && trimmed.ends_with('}')) || (trimmed.starts_with('[') && trimmed.ends_with(']')) {
        return Some(trimmed);
    }

    if let Some(body) = CODE_FENCE.captures(trimmed).and_then(|c| c.get(1)) {
        let body = body.as_str().trim();
        if body.starts_with('{') || body.starts_with('[') {
            return Some(body);
        }
    }

    // Outermost bracket pair, whichever kind opens first
    let open = trimmed.find(['{', '['])?;
    let close_char = if trimmed[open..].starts_with('{') { '}' } else { ']' };
    let close = trimmed.rfind(close_char)?;
    (close > open).then(|| &trimmed[open..=close])
}

/// Extract and deserialize a typed value from an LLM response.
pub fn parse_response<T: DeserializeOwned>(response: &str) -> Result<T, StageError> {
    let json = extract_json(response)
        .ok_or_else(|| StageError::ResponseParseFailed("no JSON found in response".to_string()))?;

    serde_json::from_str(json).map_err(|e| StageError::ResponseParseFailed(e.to_string()))
}
