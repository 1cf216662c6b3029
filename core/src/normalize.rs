//! Reply normalization and sentinel classification.
//!
//! The upstream embeds HTML in its result messages and reports success as
//! a string flag. Its only error signal for a bad module or key is the
//! result text itself, so those messages are matched verbatim. This is an
//! upstream quirk, not a pattern.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::ApiError;

static MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>?").unwrap());
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());

/// Known upstream error messages, matched exactly against the normalized
/// result, with the error each one stands for.
pub const SENTINELS: &[(&str, fn(String) -> ApiError)] = &[
    ("Invalid Reseller Central API Module selected.", invalid_endpoint),
    ("Invalid Reseller Central API Key provided.", invalid_credential),
    ("No Reseller Central API Key provided.", invalid_credential),
];

fn invalid_endpoint(message: String) -> ApiError {
    ApiError::InvalidEndpoint { message }
}

fn invalid_credential(message: String) -> ApiError {
    ApiError::InvalidCredential { message }
}

/// Replace markup with spaces, collapse space runs and trim.
pub fn clean_message(raw: &str) -> String {
    let unmarked = MARKUP.replace_all(raw, " ");
    SPACES.replace_all(&unmarked, " ").trim().to_string()
}

/// Coerce the upstream success flag to a bool.
pub fn parse_boolean(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => match s.to_lowercase().as_str() {
            "true" => true,
            "false" => false,
            other => !other.is_empty(),
        },
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Normalize `result` and `success` in place.
///
/// Afterwards `success` is always a JSON bool and `result`, when present,
/// is a cleaned string.
pub fn normalize(body: &mut Map<String, Value>) {
    match body.get("result") {
        None | Some(Value::Null) => {
            body.remove("result");
        }
        Some(Value::String(s)) => {
            let cleaned = clean_message(s);
            body.insert("result".to_string(), Value::String(cleaned));
        }
        Some(other) => {
            let cleaned = clean_message(&other.to_string());
            body.insert("result".to_string(), Value::String(cleaned));
        }
    }
    let success = parse_boolean(body.get("success"));
    body.insert("success".to_string(), Value::Bool(success));
}

/// The error a normalized result message stands for, if any.
pub fn classify(result: &str) -> Option<ApiError> {
    SENTINELS
        .iter()
        .find(|(sentinel, _)| *sentinel == result)
        .map(|(_, error)| error(result.to_string()))
}
