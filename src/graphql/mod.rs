//! GraphQL-over-HTTP client
//!
//! Posts `{query, variables, operationName}` documents to a single endpoint
//! with bearer authorization and decodes the standard `{data, errors}`
//! envelope. Error arrays are surfaced as [`GraphqlError::Response`] with each
//! entry kept intact, even when the server pairs them with a non-2xx status.

mod error;
pub mod registration;

pub use error::{GraphqlError, GraphqlSubError, SourceLocation};
pub use registration::{GraphqlRegistrationApi, RegistrationApi};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Longest slice of an unexpected response body kept in error messages
const BODY_EXCERPT_LEN: usize = 500;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlRequest<'a, V: Serialize> {
    query: &'a str,
    variables: V,
    operation_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Vec<GraphqlSubError>,
}

/// Bearer-authenticated GraphQL client
pub struct GraphqlClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl std::fmt::Debug for GraphqlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphqlClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl GraphqlClient {
    /// Build a client for `endpoint`. No request is made here.
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, GraphqlError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("newsdesk-ops/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(GraphqlError::Client)?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }

    /// Execute one operation and decode its `data` member into `T`.
    pub async fn execute<V, T>(
        &self,
        operation: &str,
        query: &str,
        variables: V,
    ) -> Result<T, GraphqlError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        tracing::debug!(operation, endpoint = %self.endpoint, "Sending GraphQL request");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&GraphqlRequest {
                query,
                variables,
                operation_name: operation,
            })
            .send()
            .await
            .map_err(GraphqlError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(GraphqlError::Transport)?;

        decode_response(operation, status.as_u16(), status.is_success(), &body)
    }
}

fn decode_response<T: DeserializeOwned>(
    operation: &str,
    status: u16,
    success: bool,
    body: &str,
) -> Result<T, GraphqlError> {
    let envelope: GraphqlResponse = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) if !success => {
            return Err(GraphqlError::Status {
                status,
                body: excerpt(body),
            })
        }
        Err(e) => {
            return Err(GraphqlError::Decode {
                operation: operation.to_string(),
                message: e.to_string(),
            })
        }
    };

    if !envelope.errors.is_empty() {
        return Err(GraphqlError::Response {
            operation: operation.to_string(),
            status,
            errors: envelope.errors,
        });
    }

    if !success {
        return Err(GraphqlError::Status {
            status,
            body: excerpt(body),
        });
    }

    let data = match envelope.data {
        Some(serde_json::Value::Null) | None => {
            return Err(GraphqlError::MissingData(operation.to_string()))
        }
        Some(data) => data,
    };

    serde_json::from_value(data).map_err(|e| GraphqlError::Decode {
        operation: operation.to_string(),
        message: e.to_string(),
    })
}

fn excerpt(body: &str) -> String {
    match body.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
