//! Governance proposals: the creation request, its validation, and the
//! immutable rules a proposal carries for its whole life.

use crate::config::GovernanceConfig;
use crate::error::GovernanceError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use umbra_types::{ProposalId, Timestamp, TokenAmount, TokenKind, VoterId};

/// A minimum holding of one token kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequirement {
    pub kind: TokenKind,
    pub minimum: TokenAmount,
}

impl TokenRequirement {
    pub fn new(kind: TokenKind, minimum: u128) -> Self {
        Self {
            kind,
            minimum: TokenAmount::new(minimum),
        }
    }
}

/// Who may vote on a proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum EligibilityPolicy {
    /// Anyone holding the required tokens.
    TokenHolders,
    /// Only the listed identities.
    Whitelist(BTreeSet<VoterId>),
    /// Members of an externally managed group.
    NamedGroup(String),
}

/// How much of the vote is ever disclosed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum AnonymityMode {
    /// Reveals are checked by recomputing the commitment only.
    Public,
    /// Reveals may carry a zero-knowledge proof, verified by the proof service.
    FullZk,
    /// Like `FullZk`, and the result is only decisive once at least
    /// `reveal_percent`% of commitments have been revealed.
    ThresholdReveal { reveal_percent: u8 },
}

impl AnonymityMode {
    pub fn is_private(&self) -> bool {
        !matches!(self, Self::Public)
    }
}

/// Tokens a voter stakes behind a commitment. Their weight is the pledged
/// amount, capped at their balance of that kind when they commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pledge {
    pub kind: TokenKind,
    pub amount: TokenAmount,
}

impl Pledge {
    pub fn new(kind: TokenKind, amount: u128) -> Self {
        Self {
            kind,
            amount: TokenAmount::new(amount),
        }
    }
}

/// A request to create a proposal, as submitted by the presentation layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProposalSpec {
    pub title: String,
    pub description: String,
    pub creator: VoterId,
    /// End of the commit phase.
    pub voting_deadline: Timestamp,
    /// End of the reveal phase. Defaults to `voting_deadline + reveal_window_secs`.
    #[serde(default)]
    pub reveal_deadline: Option<Timestamp>,
    /// One or two token kinds with minimum amounts.
    #[serde(default)]
    pub required_tokens: Vec<TokenRequirement>,
    /// Percentage of yes/(yes+no) weight needed to pass, 1..=100.
    pub approval_threshold: u8,
    pub policy: EligibilityPolicy,
    pub anonymity: AnonymityMode,
    /// Percentage of eligible weight that must commit, 1..=100.
    #[serde(default)]
    pub quorum_percent: Option<u8>,
}

/// The voting rules fixed at creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRules {
    pub required_tokens: Vec<TokenRequirement>,
    pub approval_threshold: u8,
    pub policy: EligibilityPolicy,
    pub anonymity: AnonymityMode,
    pub quorum_percent: Option<u8>,
}

impl ProposalRules {
    /// The token kind that weighs votes and sizes the electorate: the first
    /// required kind. A second kind only gates eligibility. `None` for
    /// one-identity-one-vote proposals.
    pub fn primary_token(&self) -> Option<TokenKind> {
        self.required_tokens.first().map(|r| r.kind)
    }
}

/// A proposal's immutable attributes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    pub creator: VoterId,
    pub created_at: Timestamp,
    pub commit_deadline: Timestamp,
    pub reveal_deadline: Timestamp,
    pub rules: ProposalRules,
}

impl ProposalSpec {
    /// Check every creation invariant against `created_at` and the engine limits.
    pub fn validate(
        &self,
        created_at: Timestamp,
        config: &GovernanceConfig,
    ) -> Result<(), GovernanceError> {
        let title_len = self.title.trim().chars().count();
        if title_len == 0 {
            return Err(GovernanceError::EmptyTitle);
        }
        if title_len > config.max_title_len {
            return Err(GovernanceError::TitleTooLong {
                len: title_len,
                max: config.max_title_len,
            });
        }
        let description_len = self.description.chars().count();
        if description_len > config.max_description_len {
            return Err(GovernanceError::DescriptionTooLong {
                len: description_len,
                max: config.max_description_len,
            });
        }

        if !(1..=100).contains(&self.approval_threshold) {
            return Err(GovernanceError::InvalidThreshold(self.approval_threshold));
        }
        if let Some(q) = self.quorum_percent {
            if !(1..=100).contains(&q) {
                return Err(GovernanceError::InvalidQuorum(q));
            }
        }
        if let AnonymityMode::ThresholdReveal { reveal_percent } = self.anonymity {
            if !(1..=100).contains(&reveal_percent) {
                return Err(GovernanceError::InvalidRevealPercent(reveal_percent));
            }
        }

        if self.voting_deadline <= created_at {
            return Err(GovernanceError::DeadlineNotAfterCreation {
                deadline: self.voting_deadline,
                created_at,
            });
        }
        if let Some(reveal_deadline) = self.reveal_deadline {
            if reveal_deadline <= self.voting_deadline {
                return Err(GovernanceError::RevealDeadlineNotAfterDeadline {
                    reveal_deadline,
                    deadline: self.voting_deadline,
                });
            }
        }

        self.validate_tokens()?;

        match &self.policy {
            EligibilityPolicy::TokenHolders if self.required_tokens.is_empty() => Err(
                GovernanceError::InvalidTokenRequirement(
                    "token-holder proposals need at least one required token".into(),
                ),
            ),
            EligibilityPolicy::Whitelist(set) if set.is_empty() => {
                Err(GovernanceError::EmptyWhitelist)
            }
            EligibilityPolicy::NamedGroup(group) if group.trim().is_empty() => {
                Err(GovernanceError::EmptyGroupId)
            }
            _ => Ok(()),
        }
    }

    fn validate_tokens(&self) -> Result<(), GovernanceError> {
        if self.required_tokens.len() > TokenKind::ALL.len() {
            return Err(GovernanceError::InvalidTokenRequirement(format!(
                "at most {} token kinds, got {}",
                TokenKind::ALL.len(),
                self.required_tokens.len()
            )));
        }
        let mut seen = BTreeSet::new();
        for req in &self.required_tokens {
            if !seen.insert(req.kind) {
                return Err(GovernanceError::InvalidTokenRequirement(format!(
                    "{} listed twice",
                    req.kind
                )));
            }
            if req.minimum.is_zero() {
                return Err(GovernanceError::InvalidTokenRequirement(format!(
                    "{} minimum must be > 0",
                    req.kind
                )));
            }
        }
        Ok(())
    }

    /// Validate and freeze into a [`Proposal`].
    pub fn into_proposal(
        self,
        id: ProposalId,
        created_at: Timestamp,
        config: &GovernanceConfig,
    ) -> Result<Proposal, GovernanceError> {
        self.validate(created_at, config)?;
        let reveal_deadline = self.reveal_deadline.unwrap_or_else(|| {
            self.voting_deadline
                .saturating_add_secs(config.reveal_window_secs)
        });
        Ok(Proposal {
            id,
            title: self.title.trim().to_string(),
            description: self.description,
            creator: self.creator,
            created_at,
            commit_deadline: self.voting_deadline,
            reveal_deadline,
            rules: ProposalRules {
                required_tokens: self.required_tokens,
                approval_threshold: self.approval_threshold,
                policy: self.policy,
                anonymity: self.anonymity,
                quorum_percent: self.quorum_percent,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voter(name: &str) -> VoterId {
        VoterId::new(name).unwrap()
    }

    fn spec() -> ProposalSpec {
        ProposalSpec {
            title: "Fund the block explorer".into(),
            description: "Six months of hosting".into(),
            creator: voter("alice"),
            voting_deadline: Timestamp::new(1_000),
            reveal_deadline: None,
            required_tokens: vec![TokenRequirement::new(TokenKind::Night, 100)],
            approval_threshold: 60,
            policy: EligibilityPolicy::TokenHolders,
            anonymity: AnonymityMode::Public,
            quorum_percent: None,
        }
    }

    fn check(spec: &ProposalSpec) -> Result<(), GovernanceError> {
        spec.validate(Timestamp::new(100), &GovernanceConfig::default())
    }

    #[test]
    fn valid_spec_passes() {
        assert!(check(&spec()).is_ok());
    }

    #[test]
    fn threshold_bounds() {
        for bad in [0u8, 101] {
            let mut s = spec();
            s.approval_threshold = bad;
            assert!(matches!(check(&s), Err(GovernanceError::InvalidThreshold(_))));
        }
        for good in [1u8, 100] {
            let mut s = spec();
            s.approval_threshold = good;
            assert!(check(&s).is_ok());
        }
    }

    #[test]
    fn deadline_must_be_strictly_after_creation() {
        let mut s = spec();
        s.voting_deadline = Timestamp::new(100);
        assert!(matches!(
            check(&s),
            Err(GovernanceError::DeadlineNotAfterCreation { .. })
        ));
    }

    #[test]
    fn reveal_deadline_must_follow_voting_deadline() {
        let mut s = spec();
        s.reveal_deadline = Some(Timestamp::new(1_000));
        assert!(matches!(
            check(&s),
            Err(GovernanceError::RevealDeadlineNotAfterDeadline { .. })
        ));
    }

    #[test]
    fn title_and_description_bounds() {
        let mut s = spec();
        s.title = "   ".into();
        assert!(matches!(check(&s), Err(GovernanceError::EmptyTitle)));

        let mut s = spec();
        s.title = "x".repeat(121);
        assert!(matches!(check(&s), Err(GovernanceError::TitleTooLong { .. })));

        let mut s = spec();
        s.description = "y".repeat(2001);
        assert!(matches!(
            check(&s),
            Err(GovernanceError::DescriptionTooLong { .. })
        ));
    }

    #[test]
    fn token_requirements_are_checked() {
        let mut s = spec();
        s.required_tokens = vec![];
        assert!(matches!(
            check(&s),
            Err(GovernanceError::InvalidTokenRequirement(_))
        ));

        let mut s = spec();
        s.required_tokens = vec![
            TokenRequirement::new(TokenKind::Night, 1),
            TokenRequirement::new(TokenKind::Night, 2),
        ];
        assert!(check(&s).is_err());

        let mut s = spec();
        s.required_tokens = vec![TokenRequirement::new(TokenKind::Dust, 0)];
        assert!(check(&s).is_err());
    }

    #[test]
    fn whitelist_without_tokens_is_fine_but_must_be_non_empty() {
        let mut s = spec();
        s.required_tokens = vec![];
        s.policy = EligibilityPolicy::Whitelist(BTreeSet::new());
        assert!(matches!(check(&s), Err(GovernanceError::EmptyWhitelist)));

        s.policy = EligibilityPolicy::Whitelist([voter("bob")].into_iter().collect());
        assert!(check(&s).is_ok());
    }

    #[test]
    fn reveal_percent_bounds() {
        let mut s = spec();
        s.anonymity = AnonymityMode::ThresholdReveal { reveal_percent: 0 };
        assert!(matches!(
            check(&s),
            Err(GovernanceError::InvalidRevealPercent(0))
        ));
    }

    #[test]
    fn into_proposal_defaults_reveal_deadline() {
        let config = GovernanceConfig::default();
        let p = spec()
            .into_proposal(ProposalId::new([1; 32]), Timestamp::new(100), &config)
            .unwrap();
        assert_eq!(p.commit_deadline, Timestamp::new(1_000));
        assert_eq!(
            p.reveal_deadline,
            Timestamp::new(1_000 + config.reveal_window_secs)
        );
        assert_eq!(p.rules.primary_token(), Some(TokenKind::Night));
    }

    #[test]
    fn spec_deserializes_from_json() {
        let json = r#"{
            "title": "t",
            "description": "",
            "creator": "alice",
            "voting_deadline": 500,
            "approval_threshold": 51,
            "policy": {"type": "named_group", "value": "stewards"},
            "anonymity": {"type": "threshold_reveal", "reveal_percent": 40}
        }"#;
        let s: ProposalSpec = serde_json::from_str(json).unwrap();
        assert_eq!(s.policy, EligibilityPolicy::NamedGroup("stewards".into()));
        assert_eq!(
            s.anonymity,
            AnonymityMode::ThresholdReveal { reveal_percent: 40 }
        );
        assert!(s.required_tokens.is_empty());
    }

    #[test]
    fn unknown_policy_is_rejected_at_parse_time() {
        let json = r#"{"type": "lottery"}"#;
        assert!(serde_json::from_str::<EligibilityPolicy>(json).is_err());
    }
}
