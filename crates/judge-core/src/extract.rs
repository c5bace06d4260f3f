use crate::error::ReplyError;
use crate::types::Verdict;

const FENCE: &str = "```";

/// Strip markdown code fences from a model reply.
///
/// A ```` ```json ```` fence wins over a bare fence. An unterminated fence
/// runs to the end of the text. Text without fences is returned trimmed.
pub fn strip_fences(text: &str) -> &str {
    let body = if let Some((_, rest)) = text.split_once("```json") {
        rest.split(FENCE).next().unwrap_or(rest)
    } else if let Some((_, rest)) = text.split_once(FENCE) {
        rest.split(FENCE).next().unwrap_or(rest)
    } else {
        text
    };
    body.trim()
}

/// Locate the JSON object inside a reply: fences first, then the outermost
/// `{ ... }` span, so prose on either side of the object is dropped.
pub fn locate_json(text: &str) -> Result<&str, ReplyError> {
    let stripped = strip_fences(text);
    match (stripped.find('{'), stripped.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&stripped[start..=end]),
        _ => Err(ReplyError::NoJson),
    }
}

/// Decode a verdict from the model's free-text reply.
pub fn decode_verdict(text: &str) -> Result<Verdict, ReplyError> {
    let json = locate_json(text)?;
    let value: serde_json::Value = serde_json::from_str(json).map_err(ReplyError::Malformed)?;
    serde_json::from_value(value).map_err(ReplyError::Shape)
}
