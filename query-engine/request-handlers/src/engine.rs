//! The transport seam towards the query engine.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Could not reach the query engine: {}", _0)]
    Unreachable(String),

    #[error("Invalid response from the query engine: {}", _0)]
    InvalidResponse(String),
}

/// Executes a serialized query document and returns the raw JSON response, `{ data }` on
/// success or `{ errors: [...] }` when the engine rejects the request.
#[async_trait]
pub trait QueryEngine {
    async fn request(&self, query: &str) -> Result<serde_json::Value, EngineError>;
}

/// Error sentences of an engine response, if it carries any.
pub(crate) fn response_errors(response: &serde_json::Value) -> Option<String> {
    let errors = response.get("errors")?.as_array()?;

    if errors.is_empty() {
        return None;
    }

    let messages: Vec<String> = errors
        .iter()
        .map(|error| {
            error
                .pointer("/user_facing_error/message")
                .or_else(|| error.get("error"))
                .or_else(|| error.get("message"))
                .and_then(serde_json::Value::as_str)
                .map(ToOwned::to_owned)
                .unwrap_or_else(|| error.to_string())
        })
        .collect();

    Some(messages.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_facing_messages_win() {
        let response = json!({
            "errors": [
                { "error": "raw", "user_facing_error": { "message": "Unique constraint failed" } },
                { "error": "Timed out" },
            ]
        });

        assert_eq!(
            response_errors(&response).unwrap(),
            "Unique constraint failed\nTimed out"
        );
    }

    #[test]
    fn data_responses_have_no_errors() {
        assert!(response_errors(&json!({ "data": {} })).is_none());
        assert!(response_errors(&json!({ "errors": [] })).is_none());
    }
}
