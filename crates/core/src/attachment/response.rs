//! Caller-facing result envelopes.

use serde::Serialize;
use serde_json::{Map, Value, json};

use super::error::AttachmentError;

/// Build the structured response for an operation result.
///
/// Success carries the report's fields plus `"success": true`, and the
/// issue key when the report does not already name one. Failure
/// carries `"success": false`, the error message and its code, and the
/// issue key when one applies. Never fails: a report that does not
/// serialize to an object is returned under `"result"`.
pub fn to_response<T: Serialize>(
    issue_key: Option<&str>,
    result: &Result<T, AttachmentError>,
) -> Value {
    match result {
        Ok(report) => {
            let mut body = match serde_json::to_value(report) {
                Ok(Value::Object(fields)) => fields,
                Ok(other) => Map::from_iter([("result".to_string(), other)]),
                Err(e) => {
                    return json!({
                        "success": false,
                        "error": format!("could not serialize result: {e}"),
                        "error_code": "PAYLOAD_ERROR",
                    });
                }
            };
            if let Some(key) = issue_key {
                body.entry("issue_key")
                    .or_insert_with(|| Value::String(key.to_string()));
            }
            body.insert("success".to_string(), Value::Bool(true));
            Value::Object(body)
        }
        Err(e) => {
            let mut body = Map::new();
            body.insert("success".to_string(), Value::Bool(false));
            if let Some(key) = issue_key {
                body.insert("issue_key".to_string(), Value::String(key.to_string()));
            }
            body.insert("error".to_string(), Value::String(e.to_string()));
            body.insert(
                "error_code".to_string(),
                Value::String(e.error_code().to_string()),
            );
            Value::Object(body)
        }
    }
}
