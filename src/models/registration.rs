//! Registration request model
//!
//! Registration requests are only reachable through the GraphQL API; these
//! types mirror the API's JSON shapes (camelCase fields, SCREAMING_CASE
//! statuses).

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Lifecycle status of a registration request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    /// Email not yet verified
    PendingVerification,
    /// Verified, waiting for an admin decision
    PendingApproval,
    Approved,
    Rejected,
    /// Verification window elapsed
    Expired,
}

impl RegistrationStatus {
    /// Every status, in lifecycle order
    pub const ALL: [RegistrationStatus; 5] = [
        RegistrationStatus::PendingVerification,
        RegistrationStatus::PendingApproval,
        RegistrationStatus::Approved,
        RegistrationStatus::Rejected,
        RegistrationStatus::Expired,
    ];

    /// GraphQL enum value
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::PendingVerification => "PENDING_VERIFICATION",
            RegistrationStatus::PendingApproval => "PENDING_APPROVAL",
            RegistrationStatus::Approved => "APPROVED",
            RegistrationStatus::Rejected => "REJECTED",
            RegistrationStatus::Expired => "EXPIRED",
        }
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RegistrationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RegistrationStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("Invalid registration status: {}", s))
    }
}

/// A user-signup record moving through verification and approval
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub requested_role: Option<String>,
    pub status: RegistrationStatus,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub verified_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Id of the admin who approved or rejected the request
    #[serde(default)]
    pub reviewed_by: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Aggregate counts returned by the statistics query
///
/// Fields the server adds beyond the known counts are kept in `extra` and
/// serialized back alongside them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationStats {
    pub total: i64,
    pub pending_verification: i64,
    pub pending_approval: i64,
    pub approved: i64,
    pub rejected: i64,
    pub expired: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RegistrationStats {
    /// Count reported for one status
    pub fn count_for(&self, status: RegistrationStatus) -> i64 {
        match status {
            RegistrationStatus::PendingVerification => self.pending_verification,
            RegistrationStatus::PendingApproval => self.pending_approval,
            RegistrationStatus::Approved => self.approved,
            RegistrationStatus::Rejected => self.rejected,
            RegistrationStatus::Expired => self.expired,
        }
    }
}

/// Filter and window for the listing query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationFilter {
    pub status: Option<RegistrationStatus>,
    pub limit: i64,
    pub offset: i64,
}

impl RegistrationFilter {
    /// Unfiltered first page
    pub fn first_page(limit: i64) -> Self {
        Self {
            status: None,
            limit,
            offset: 0,
        }
    }

    /// First page restricted to one status
    pub fn with_status(status: RegistrationStatus, limit: i64) -> Self {
        Self {
            status: Some(status),
            limit,
            offset: 0,
        }
    }
}

/// One page of the listing query
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPage {
    pub items: Vec<RegistrationRequest>,
    pub total: i64,
    pub has_more: bool,
}

/// Accepts RFC 3339 strings as well as epoch milliseconds, sent either as a
/// JSON number or as a numeric string.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        Text(String),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    let millis_to_utc = |ms: i64| -> Result<DateTime<Utc>, D::Error> {
        Utc.timestamp_millis_opt(ms)
            .single()
            .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {}", ms)))
    };

    match raw {
        None => Ok(None),
        Some(Raw::Millis(ms)) => millis_to_utc(ms).map(Some),
        Some(Raw::Text(text)) => {
            if let Ok(ms) = text.parse::<i64>() {
                return millis_to_utc(ms).map(Some);
            }
            DateTime::parse_from_rfc3339(&text)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom)
        }
    }
}
