//! Registration request queries
//!
//! Read-only operations against the admin registration API. The probe talks to
//! the [`RegistrationApi`] trait; [`GraphqlRegistrationApi`] is the HTTP
//! implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GraphqlClient, GraphqlError};
use crate::models::{RegistrationFilter, RegistrationPage, RegistrationStats, RegistrationStatus};

pub const STATS_OPERATION: &str = "RegistrationRequestStats";
pub const LIST_OPERATION: &str = "RegistrationRequests";

pub const STATS_QUERY: &str = r#"
query RegistrationRequestStats {
  registrationRequestStats {
    total
    pendingVerification
    pendingApproval
    approved
    rejected
    expired
  }
}
"#;

pub const LIST_QUERY: &str = r#"
query RegistrationRequests($status: RegistrationStatus, $limit: Int, $offset: Int) {
  registrationRequests(status: $status, limit: $limit, offset: $offset) {
    items {
      id
      email
      name
      requestedRole
      status
      verifiedAt
      reviewedAt
      reviewedBy
      ipAddress
      userAgent
      createdAt
      updatedAt
    }
    total
    hasMore
  }
}
"#;

/// Read access to registration requests
#[async_trait]
pub trait RegistrationApi: Send + Sync {
    /// Total and per-status counts
    async fn stats(&self) -> Result<RegistrationStats, GraphqlError>;

    /// One page of requests, optionally filtered by status
    async fn list(&self, filter: RegistrationFilter) -> Result<RegistrationPage, GraphqlError>;
}

#[derive(Debug, Serialize)]
struct ListVariables {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<RegistrationStatus>,
    limit: i64,
    offset: i64,
}

impl From<RegistrationFilter> for ListVariables {
    fn from(filter: RegistrationFilter) -> Self {
        Self {
            status: filter.status,
            limit: filter.limit,
            offset: filter.offset,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsData {
    registration_request_stats: RegistrationStats,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListData {
    registration_requests: RegistrationPage,
}

/// [`RegistrationApi`] over a [`GraphqlClient`]
#[derive(Debug)]
pub struct GraphqlRegistrationApi {
    client: GraphqlClient,
}

impl GraphqlRegistrationApi {
    pub fn new(client: GraphqlClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RegistrationApi for GraphqlRegistrationApi {
    async fn stats(&self) -> Result<RegistrationStats, GraphqlError> {
        let data: StatsData = self
            .client
            .execute(STATS_OPERATION, STATS_QUERY, serde_json::json!({}))
            .await?;
        Ok(data.registration_request_stats)
    }

    async fn list(&self, filter: RegistrationFilter) -> Result<RegistrationPage, GraphqlError> {
        let data: ListData = self
            .client
            .execute(LIST_OPERATION, LIST_QUERY, ListVariables::from(filter))
            .await?;
        tracing::debug!(
            status = ?filter.status,
            returned = data.registration_requests.items.len(),
            total = data.registration_requests.total,
            "Listed registration requests"
        );
        Ok(data.registration_requests)
    }
}
