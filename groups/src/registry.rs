//! Group registry: static, in-process membership lists.

use crate::error::GroupError;
use crate::types::GroupInfo;
use crate::GroupResolver;
use std::collections::{HashMap, HashSet};
use umbra_types::VoterId;

/// Registry of known groups and their members.
///
/// Populated up front, then shared read-only (typically behind an `Arc`).
pub struct GroupRegistry {
    groups: HashMap<String, GroupInfo>,
    members: HashMap<String, HashSet<VoterId>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self {
            groups: HashMap::new(),
            members: HashMap::new(),
        }
    }

    /// Register a new group (replacing any group with the same id).
    pub fn register(&mut self, info: GroupInfo) -> Result<(), GroupError> {
        if info.id.is_empty() {
            return Err(GroupError::InvalidGroupId);
        }
        self.members.entry(info.id.clone()).or_default();
        self.groups.insert(info.id.clone(), info);
        Ok(())
    }

    /// Add a member to a registered group.
    pub fn add_member(&mut self, group_id: &str, identity: VoterId) -> Result<(), GroupError> {
        let members = self
            .members
            .get_mut(group_id)
            .ok_or_else(|| GroupError::GroupNotFound(group_id.to_string()))?;
        members.insert(identity);
        Ok(())
    }

    /// Remove a member. Returns whether the identity was a member.
    pub fn remove_member(&mut self, group_id: &str, identity: &VoterId) -> bool {
        self.members
            .get_mut(group_id)
            .map(|m| m.remove(identity))
            .unwrap_or(false)
    }

    /// Look up a group by ID.
    pub fn get(&self, group_id: &str) -> Option<&GroupInfo> {
        self.groups.get(group_id)
    }

    /// Remove a group and its membership list.
    pub fn unregister(&mut self, group_id: &str) -> Option<GroupInfo> {
        self.members.remove(group_id);
        self.groups.remove(group_id)
    }

    /// List all registered groups.
    pub fn list(&self) -> Vec<&GroupInfo> {
        self.groups.values().collect()
    }
}

impl Default for GroupRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl GroupResolver for GroupRegistry {
    async fn is_member(&self, group_id: &str, identity: &VoterId) -> Result<bool, GroupError> {
        self.members
            .get(group_id)
            .map(|m| m.contains(identity))
            .ok_or_else(|| GroupError::GroupNotFound(group_id.to_string()))
    }

    async fn member_count(&self, group_id: &str) -> Result<u64, GroupError> {
        self.members
            .get(group_id)
            .map(|m| m.len() as u64)
            .ok_or_else(|| GroupError::GroupNotFound(group_id.to_string()))
    }
}
