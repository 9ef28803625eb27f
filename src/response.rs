//! Helpers for the service's response envelope.
//!
//! Successful calls answer `{"result": ...}`; API-level failures still come
//! back as HTTP 200 with `{"error": "...", "code": "..."}`.

use serde::Deserialize;
use serde_json::Value;

/// An error reported by the service inside a decoded response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteError {
    #[serde(rename = "error")]
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "UniSender error [{}]: {}", code, self.message),
            None => write!(f, "UniSender error: {}", self.message),
        }
    }
}

impl std::error::Error for RemoteError {}

/// Extracts the error envelope, if the response carries one.
pub fn remote_error(response: &Value) -> Option<RemoteError> {
    if response.get("error").is_none() {
        return None;
    }
    RemoteError::deserialize(response).ok()
}

/// Unwraps `result`, or returns the envelope's error.
///
/// Responses with neither member are returned whole.
pub fn into_result(response: Value) -> Result<Value, RemoteError> {
    if let Some(err) = remote_error(&response) {
        return Err(err);
    }
    match response {
        Value::Object(mut map) if map.contains_key("result") => {
            Ok(map.remove("result").unwrap_or(Value::Null))
        }
        other => Ok(other),
    }
}
