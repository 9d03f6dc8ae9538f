//! GraphQL client error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Position of an error in the query document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

/// One entry of a response's `errors` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlSubError {
    pub message: String,
    #[serde(default)]
    pub locations: Vec<SourceLocation>,
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
    #[serde(default)]
    pub extensions: Option<serde_json::Map<String, serde_json::Value>>,
}

impl GraphqlSubError {
    /// `extensions.code`, the conventional machine-readable error class
    pub fn code(&self) -> Option<&str> {
        self.extensions
            .as_ref()?
            .get("code")
            .and_then(serde_json::Value::as_str)
    }

    /// Dotted response path, e.g. `registrationRequests.items.0`
    pub fn path_display(&self) -> Option<String> {
        if self.path.is_empty() {
            return None;
        }
        let segments: Vec<String> = self
            .path
            .iter()
            .map(|segment| match segment {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        Some(segments.join("."))
    }
}

/// GraphQL client errors
#[derive(Debug, Error)]
pub enum GraphqlError {
    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// Request never produced a response
    #[error("Request failed")]
    Transport(#[source] reqwest::Error),

    /// Non-2xx response without a GraphQL error body
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not the expected JSON
    #[error("Could not decode {operation} response: {message}")]
    Decode { operation: String, message: String },

    /// Server answered with an `errors` array
    #[error("{operation} returned {}", summarize(.errors))]
    Response {
        operation: String,
        status: u16,
        errors: Vec<GraphqlSubError>,
    },

    /// Neither data nor errors
    #[error("{0} returned no data")]
    MissingData(String),
}

impl GraphqlError {
    /// Structured sub-errors carried by the response, empty for other kinds
    pub fn sub_errors(&self) -> &[GraphqlSubError] {
        match self {
            GraphqlError::Response { errors, .. } => errors,
            _ => &[],
        }
    }

    /// The message followed by every underlying cause, `: `-separated.
    ///
    /// reqwest keeps the actual reason (refused connection, DNS, TLS) in the
    /// source chain, not in its own message.
    pub fn detail(&self) -> String {
        let mut detail = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            detail.push_str(": ");
            detail.push_str(&cause.to_string());
            source = cause.source();
        }
        detail
    }
}

fn summarize(errors: &[GraphqlSubError]) -> String {
    match errors {
        [] => "an empty error list".to_string(),
        [only] => format!("error: {}", only.message),
        [first, rest @ ..] => format!("error: {} (and {} more)", first.message, rest.len()),
    }
}
