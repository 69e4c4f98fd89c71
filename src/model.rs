//! Wire types exchanged with the collaboration backend.
//!
//! ## Structure
//!
//! ```text
//! Collaborator          one user's grant on one project
//!   ├── id              collaboration id (permission updates)
//!   ├── collaborator_id user id (removal)
//!   ├── username
//!   ├── permission      read | write
//!   └── created_at
//! CandidateUser         a user that can still be invited
//! CollaboratedProject   a project the current user was invited to
//! ```

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{ModelError, ModelResult};

/// Identifier of the project a panel manages. Always positive.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(try_from = "i64", into = "i64")]
pub struct ProjectId(i64);

impl ProjectId {
    pub fn new(id: i64) -> ModelResult<Self> {
        if id <= 0 {
            return Err(ModelError::InvalidProjectId(id));
        }
        Ok(Self(id))
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for ProjectId {
    type Error = ModelError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        ProjectId::new(id)
    }
}

impl From<ProjectId> for i64 {
    fn from(id: ProjectId) -> Self {
        id.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Access level of a collaborator
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// View only
    #[default]
    Read,
    /// View and modify
    Write,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Permission {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Permission::Read),
            "write" => Ok(Permission::Write),
            _ => Err(ModelError::InvalidPermission(s.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Collaborator {
    pub id: i64,
    pub collaborator_id: i64,
    pub username: String,
    pub permission: Permission,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CandidateUser {
    pub id: i64,
    pub username: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CollaboratedProject {
    pub id: i64,
    pub name: String,
    pub owner_username: String,
    pub permission: Permission,
}

/// Success body of every mutation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collaboration_id: Option<i64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct InviteRequest {
    pub collaborator_id: i64,
    pub permission: Permission,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PermissionUpdate {
    pub permission: Permission,
}

/// Body of every non-2xx response
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

/// Parses the timestamp forms the backend emits: RFC 3339, or the SQL
/// `YYYY-MM-DD HH:MM:SS` form which carries no zone and is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| de::Error::custom(format!("unrecognised timestamp: {}", raw)))
}
