//! Classification of transfer-API rejections.
//!
//! Gateway answers failures with free text. The kinds below are recognised by substring
//! so callers can decide whether to top up, re-sign, or fix the request.

use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    InsufficientBalance,
    InvalidSignature,
    MalformedRequest,
    Other,
}

/// A remote rejection. `message` is the service's text, verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub kind: RejectionKind,
    pub status: u16,
    pub message: String,
}

const MALFORMED_MARKERS: [&str; 5] = ["malformed", "invalid", "validation", "bad request", "must be"];

/// Pull the human-readable message out of an error body.
///
/// Tries `error.message`, `error` (string), `message`, then falls back to the raw body.
pub fn extract_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    let json = match &json {
        Value::Array(items) => match items.iter().find(|item| has_error(item)).or(items.first()) {
            Some(item) => item,
            None => return body.trim().to_string(),
        },
        other => other,
    };
    json.get("error")
        .and_then(|e| e.get("message").and_then(Value::as_str).or_else(|| e.as_str()))
        .or_else(|| json.get("message").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

pub fn classify_message(status: u16, message: &str) -> RejectionKind {
    let lower = message.to_ascii_lowercase();
    if lower.contains("insufficient") {
        RejectionKind::InsufficientBalance
    } else if lower.contains("signature") {
        RejectionKind::InvalidSignature
    } else if status == 400
        || status == 422
        || MALFORMED_MARKERS.iter().any(|m| lower.contains(m))
    {
        RejectionKind::MalformedRequest
    } else {
        RejectionKind::Other
    }
}

pub fn classify_rejection(status: u16, body: &str) -> Rejection {
    let message = extract_message(body);
    Rejection {
        kind: classify_message(status, &message),
        status,
        message,
    }
}

fn has_error(json: &Value) -> bool {
    json.get("error").is_some_and(|e| !e.is_null())
}

/// True when a (possibly 2xx) body, or any element of an array body, carries an error.
pub fn body_has_error(json: &Value) -> bool {
    match json {
        Value::Array(items) => items.iter().any(has_error),
        other => has_error(other),
    }
}
