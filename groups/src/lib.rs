//! Group membership for named-group proposals.
//!
//! Groups are maintained outside the governance engine. The engine only asks
//! one question, "is this identity a member of that group?", through the
//! [`GroupResolver`] trait. Two resolvers are provided:
//! - [`GroupRegistry`]: static, in-process membership lists
//! - [`RemoteGroupResolver`]: queries each group's HTTP endpoint
//!   (`GET /members/{identity}` -> `{ "member": bool, "joined_at": u64? }`)

pub mod client;
pub mod error;
pub mod registry;
pub mod types;

pub use client::{GroupClient, RemoteGroupResolver};
pub use error::GroupError;
pub use registry::GroupRegistry;
pub use types::{GroupInfo, MemberStatus};

use umbra_types::VoterId;

/// Resolves named-group membership.
#[async_trait::async_trait]
pub trait GroupResolver: Send + Sync {
    /// Whether `identity` is currently a member of `group_id`.
    ///
    /// Returns [`GroupError::GroupNotFound`] for groups the resolver does not know.
    async fn is_member(&self, group_id: &str, identity: &VoterId) -> Result<bool, GroupError>;

    /// Number of members in the group, used as the eligible-weight snapshot
    /// for one-identity-one-vote group proposals.
    async fn member_count(&self, group_id: &str) -> Result<u64, GroupError>;
}
