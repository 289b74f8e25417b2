//! HTTP membership queries against remotely managed groups.

use crate::error::GroupError;
use crate::registry::GroupRegistry;
use crate::types::MemberStatus;
use crate::GroupResolver;

use serde::Deserialize;
use std::time::Duration;
use umbra_types::{Timestamp, VoterId};

/// Default timeout for membership requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Asks a group's endpoint whether an identity belongs to it.
pub struct GroupClient {
    /// Reused across requests for connection pooling.
    http_client: reqwest::Client,
}

/// Body of `GET {endpoint}/members/{identity}`.
#[derive(Debug, Deserialize)]
struct MembershipResponse {
    member: bool,
    #[serde(default)]
    joined_at: Option<u64>,
}

impl GroupClient {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { http_client }
    }

    /// `GET {endpoint_url}/members/{identity}`.
    pub async fn check_membership(
        &self,
        group_id: &str,
        endpoint_url: &str,
        identity: &VoterId,
    ) -> Result<MemberStatus, GroupError> {
        let url = membership_url(endpoint_url, identity);

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                GroupError::Unreachable(format!("{group_id}: {e}"))
            } else {
                GroupError::RequestFailed(e.to_string())
            }
        })?;

        // Groups answer 404 for identities they have never seen.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(MemberStatus {
                group: group_id.to_string(),
                member: false,
                joined_at: None,
            });
        }
        if !response.status().is_success() {
            return Err(GroupError::RequestFailed(format!(
                "{group_id} answered HTTP {}",
                response.status()
            )));
        }

        let body: MembershipResponse = response
            .json()
            .await
            .map_err(|e| GroupError::InvalidResponse(format!("{group_id}: {e}")))?;

        Ok(MemberStatus {
            group: group_id.to_string(),
            member: body.member,
            joined_at: body.joined_at.map(Timestamp::new),
        })
    }
}

impl Default for GroupClient {
    fn default() -> Self {
        Self::new()
    }
}

fn membership_url(endpoint_url: &str, identity: &VoterId) -> String {
    format!(
        "{}/members/{}",
        endpoint_url.trim_end_matches('/'),
        identity.as_str()
    )
}

/// Resolver for remotely managed groups.
///
/// Endpoints and self-reported member counts come from the registry. Membership
/// itself is asked of the group's endpoint on every call.
pub struct RemoteGroupResolver {
    client: GroupClient,
    registry: GroupRegistry,
}

impl RemoteGroupResolver {
    pub fn new(client: GroupClient, registry: GroupRegistry) -> Self {
        Self { client, registry }
    }

    fn endpoint(&self, group_id: &str) -> Result<&str, GroupError> {
        let info = self
            .registry
            .get(group_id)
            .ok_or_else(|| GroupError::GroupNotFound(group_id.to_string()))?;
        info.endpoint_url
            .as_deref()
            .ok_or_else(|| GroupError::NoEndpoint(group_id.to_string()))
    }
}

#[async_trait::async_trait]
impl GroupResolver for RemoteGroupResolver {
    async fn is_member(&self, group_id: &str, identity: &VoterId) -> Result<bool, GroupError> {
        let endpoint = self.endpoint(group_id)?;
        let status = self.client.check_membership(group_id, endpoint, identity).await?;
        tracing::debug!(group = group_id, voter = %identity, member = status.member, "group membership checked");
        Ok(status.member)
    }

    async fn member_count(&self, group_id: &str) -> Result<u64, GroupError> {
        self.registry
            .get(group_id)
            .map(|info| info.member_count)
            .ok_or_else(|| GroupError::GroupNotFound(group_id.to_string()))
    }
}
