//! Voter identity.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of a participant as supplied by the wallet/session layer.
///
/// In anonymity-preserving modes this may be a pseudonym; the engine only
/// requires it to be stable for the lifetime of a proposal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VoterId(String);

impl VoterId {
    /// Longest identity accepted.
    pub const MAX_LEN: usize = 128;

    /// Create an identity from a raw string.
    ///
    /// Rejects empty strings, whitespace and anything longer than [`Self::MAX_LEN`].
    pub fn new(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        if s.is_empty() || s.len() > Self::MAX_LEN || s.chars().any(char::is_whitespace) {
            return Err(TypesError::InvalidIdentity(s));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VoterId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for VoterId {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<VoterId> for String {
    fn from(id: VoterId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_identity() {
        let id = VoterId::new("addr_test1qz9").unwrap();
        assert_eq!(id.as_str(), "addr_test1qz9");
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        assert!(VoterId::new("").is_err());
        assert!(VoterId::new("two words").is_err());
    }

    #[test]
    fn rejects_overlong() {
        assert!(VoterId::new("x".repeat(VoterId::MAX_LEN + 1)).is_err());
        assert!(VoterId::new("x".repeat(VoterId::MAX_LEN)).is_ok());
    }

    #[test]
    fn deserialization_validates() {
        let ok: VoterId = serde_json::from_str("\"alice\"").unwrap();
        assert_eq!(ok.as_str(), "alice");
        assert!(serde_json::from_str::<VoterId>("\"\"").is_err());
    }
}
