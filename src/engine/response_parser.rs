use serde_json::{Map, Value};

use crate::model::envelope::{DialogueMode, ResponseEnvelope};
use crate::model::error::DialogueError;

pub const FALLBACK_TEXT: &str = "I seem to be at a loss for words.";
pub const MAX_RESPONSE_OPTIONS: usize = 3;

/// Decode a raw model reply into a [`ResponseEnvelope`].
///
/// Code fences are stripped first. The payload must then be a JSON object;
/// `text` falls back to [`FALLBACK_TEXT`] when absent or empty,
/// `endConversation` defaults to `false`, and `responseOptions` entries are
/// stringified and capped at three. Options are dropped in unguided mode.
pub fn parse(raw: &str, mode: DialogueMode) -> Result<ResponseEnvelope, DialogueError> {
    let body = strip_code_fences(raw);

    let value: Value = serde_json::from_str(body)
        .map_err(|e| DialogueError::MalformedResponse(format!("invalid JSON: {e}")))?;

    let Value::Object(fields) = value else {
        return Err(DialogueError::MalformedResponse(
            "reply must be a JSON object".to_string(),
        ));
    };

    let text = decode_text(&fields)?;
    let end_conversation = decode_end(&fields)?;
    let response_options = match mode {
        DialogueMode::Guided => decode_options(&fields)?,
        DialogueMode::Unguided => Vec::new(),
    };

    Ok(ResponseEnvelope {
        text,
        end_conversation,
        response_options,
    })
}

/// Drops ```` ``` ```` / ```` ```json ```` wrappers the model likes to add.
fn strip_code_fences(raw: &str) -> &str {
    let mut body = raw.trim();

    if let Some(rest) = body.strip_prefix("```") {
        // Skip the language tag, if any, up to the end of the fence line.
        body = match rest.find('\n') {
            Some(idx) => &rest[idx + 1..],
            None => rest.trim_start_matches("json"),
        };
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }

    body.trim()
}

fn decode_text(fields: &Map<String, Value>) -> Result<String, DialogueError> {
    match fields.get("text") {
        None | Some(Value::Null) => Ok(FALLBACK_TEXT.to_string()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(FALLBACK_TEXT.to_string()),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(other) => Err(DialogueError::MalformedResponse(format!(
            "`text` must be a string, got {other}"
        ))),
    }
}

fn decode_end(fields: &Map<String, Value>) -> Result<bool, DialogueError> {
    match fields.get("endConversation") {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(DialogueError::MalformedResponse(format!(
            "`endConversation` must be a boolean, got {other}"
        ))),
    }
}

fn decode_options(fields: &Map<String, Value>) -> Result<Vec<String>, DialogueError> {
    match fields.get("responseOptions") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items
            .iter()
            .take(MAX_RESPONSE_OPTIONS)
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()),
        Some(other) => Err(DialogueError::MalformedResponse(format!(
            "`responseOptions` must be an array, got {other}"
        ))),
    }
}
