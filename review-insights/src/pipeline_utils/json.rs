//! JSON extraction and strict decoding of LLM responses
//!
//! Models asked for a bare JSON body still like to wrap it in a Markdown
//! fence. The fence is removed before decoding; nothing else is repaired.

use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("response is empty after removing code fences")]
    Empty,

    #[error("response does not match the expected JSON shape: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("invalid value: {0}")]
    Invalid(String),
}

/// Extract JSON content from markdown code blocks or raw text
///
/// Handles:
/// - ```json blocks
/// - Generic ``` blocks
/// - Raw JSON text
pub fn extract_json(text: &str) -> &str {
    let body = if let Some(start) = text.find("```json") {
        let body_start = start + "```json".len();
        fence_body(text, body_start)
    } else if let Some(start) = text.find("```") {
        let body_start = start + "```".len();
        fence_body(text, body_start)
    } else {
        text
    };
    body.trim()
}

fn fence_body(text: &str, body_start: usize) -> &str {
    let rest = &text[body_start..];
    match rest.rfind("```") {
        Some(end) => &rest[..end],
        None => rest,
    }
}

/// Strip fences and decode into `T`, failing on any shape mismatch
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, DecodeError> {
    let body = extract_json(text);
    if body.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(serde_json::from_str(body)?)
}
