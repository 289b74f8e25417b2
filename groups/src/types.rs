//! Group types.

use serde::{Deserialize, Serialize};
use umbra_types::Timestamp;

/// Information about a registered group.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupInfo {
    /// Unique group identifier (human-readable).
    pub id: String,
    /// Display name of the group.
    pub name: String,
    /// Description of the group and its admission rules.
    pub description: String,
    /// Base URL of the group's verification API, for remotely managed groups.
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Number of members (self-reported by remote groups).
    #[serde(default)]
    pub member_count: u64,
}

impl GroupInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            endpoint_url: None,
            member_count: 0,
        }
    }

    pub fn with_endpoint(mut self, url: impl Into<String>, member_count: u64) -> Self {
        self.endpoint_url = Some(url.into());
        self.member_count = member_count;
        self
    }
}

/// A group's answer about one identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberStatus {
    pub group: String,
    /// Whether the identity currently belongs to the group.
    pub member: bool,
    /// When the identity joined, if the group reports it.
    #[serde(default)]
    pub joined_at: Option<Timestamp>,
}
