//! Error taxonomy for backend API calls.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field-keyed validation messages from a 422 response.
///
/// The backend responds to invalid input with
/// `{"message": "...", "errors": {"field": ["message", ...]}}`; forms render
/// these inline next to the offending field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    /// Human-readable summary line.
    #[serde(default)]
    pub message: String,
    /// Messages keyed by form field name.
    #[serde(default)]
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Messages for a single field (empty slice when the field is clean).
    #[must_use]
    pub fn field(&self, name: &str) -> &[String] {
        self.errors.get(name).map_or(&[], Vec::as_slice)
    }

    /// Whether any field has messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport-level failure (connection refused, DNS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 422 with field-keyed validation messages.
    #[error("validation failed: {}", .0.message)]
    Validation(ValidationErrors),

    /// 401 - the session cookie is missing or no longer valid.
    #[error("unauthenticated")]
    Unauthenticated,

    /// 409 - the backend refuses until a conflict is resolved
    /// (on the user fetch this means the email is unverified).
    #[error("conflict: {message}")]
    Conflict {
        /// Backend-provided detail.
        message: String,
    },

    /// Any other non-success status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        message: String,
    },

    /// The response body was not the JSON we expected.
    #[error("parse error: {0}")]
    Parse(String),
}

impl BackendError {
    /// Classify a non-success response by status code, consuming the body.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        match status {
            422 => serde_json::from_str::<ValidationErrors>(&body).map_or_else(
                |e| Self::Parse(format!("bad 422 body: {e}")),
                Self::Validation,
            ),
            401 => Self::Unauthenticated,
            409 => Self::Conflict {
                message: extract_message(&body),
            },
            _ => Self::Api {
                status,
                message: body.chars().take(200).collect(),
            },
        }
    }
}

/// Pull the `message` field out of an error body, falling back to raw text.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message")?.as_str().map(String::from))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_deserialize() {
        let body = r#"{"message":"The given data was invalid.","errors":{"password":["too short"],"email":["required"]}}"#;
        let errors: ValidationErrors = serde_json::from_str(body).unwrap();
        assert_eq!(errors.field("password"), ["too short".to_string()]);
        assert_eq!(errors.field("email"), ["required".to_string()]);
        assert!(errors.field("name").is_empty());
    }

    #[test]
    fn test_validation_errors_tolerate_missing_fields() {
        let errors: ValidationErrors = serde_json::from_str("{}").unwrap();
        assert!(errors.is_empty());
        assert!(errors.message.is_empty());
    }

    #[test]
    fn test_extract_message_json() {
        assert_eq!(
            extract_message(r#"{"message":"Your email address is not verified."}"#),
            "Your email address is not verified."
        );
    }

    #[test]
    fn test_extract_message_plain_text() {
        assert_eq!(extract_message("boom"), "boom");
    }
}
