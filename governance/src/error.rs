use crate::lifecycle::ProposalPhase;
use thiserror::Error;
use umbra_groups::GroupError;
use umbra_types::{ProposalId, Timestamp, TokenKind};
use umbra_zk::ProofError;

/// Coarse error category, for callers that surface failures by kind
/// ("you already voted" vs. "insufficient NIGHT balance").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed proposal spec or configuration.
    Validation,
    /// The voter may not participate in this proposal.
    Eligibility,
    /// Operation attempted outside its valid phase.
    Phase,
    /// Second commitment or reveal for the same (proposal, voter).
    Duplicate,
    /// Reveal does not open the stored commitment, or its proof failed.
    Integrity,
    /// Unknown proposal or missing commitment.
    NotFound,
    /// Actor is not allowed to trigger this transition.
    Authorization,
    /// A collaborator (ledger, proof service, group resolver) failed.
    /// The only kind a caller may reasonably retry.
    External,
}

#[derive(Debug, Error)]
pub enum EligibilityError {
    #[error("insufficient {kind} balance: have {have}, need {need}")]
    InsufficientBalance { kind: TokenKind, have: u128, need: u128 },

    #[error("voter {0} is not on the proposal whitelist")]
    NotWhitelisted(String),

    #[error("voter {voter} is not a member of group {group}")]
    NotInGroup { group: String, voter: String },

    #[error("unknown eligibility policy: {0}")]
    UnknownPolicy(String),

    #[error("pledged {0}, but votes on this proposal are weighed in its primary token")]
    PledgeKindNotAccepted(TokenKind),

    #[error("invalid pledge: {0}")]
    InvalidPledge(String),

    #[error("group resolver failed: {0}")]
    Resolver(#[from] GroupError),
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    #[error("unknown account: {0}")]
    UnknownAccount(String),

    #[error("no wallet connected")]
    NotConnected,

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum GovernanceError {
    // ── Validation ────────────────────────────────────────────────────
    #[error("proposal title must not be empty")]
    EmptyTitle,

    #[error("proposal title is {len} chars, limit is {max}")]
    TitleTooLong { len: usize, max: usize },

    #[error("proposal description is {len} chars, limit is {max}")]
    DescriptionTooLong { len: usize, max: usize },

    #[error("approval threshold must be in 1..=100, got {0}")]
    InvalidThreshold(u8),

    #[error("quorum must be in 1..=100, got {0}")]
    InvalidQuorum(u8),

    #[error("reveal percentage must be in 1..=100, got {0}")]
    InvalidRevealPercent(u8),

    #[error("voting deadline {deadline} is not after creation time {created_at}")]
    DeadlineNotAfterCreation {
        deadline: Timestamp,
        created_at: Timestamp,
    },

    #[error("reveal deadline {reveal_deadline} is not after voting deadline {deadline}")]
    RevealDeadlineNotAfterDeadline {
        reveal_deadline: Timestamp,
        deadline: Timestamp,
    },

    #[error("invalid token requirement: {0}")]
    InvalidTokenRequirement(String),

    #[error("whitelist policy needs at least one identity")]
    EmptyWhitelist,

    #[error("named-group policy needs a group id")]
    EmptyGroupId,

    #[error("config error: {0}")]
    Config(String),

    // ── Eligibility ───────────────────────────────────────────────────
    #[error("not eligible: {0}")]
    Eligibility(#[from] EligibilityError),

    // ── Phase ─────────────────────────────────────────────────────────
    #[error("cannot {operation} while proposal is in phase {phase}")]
    InvalidPhase {
        operation: &'static str,
        phase: ProposalPhase,
    },

    // ── Duplicate ─────────────────────────────────────────────────────
    #[error("voter {0} has already committed on this proposal")]
    DuplicateCommitment(String),

    #[error("voter {0} has already revealed on this proposal")]
    DuplicateReveal(String),

    // ── Integrity ─────────────────────────────────────────────────────
    #[error("reveal from {0} does not match the stored commitment")]
    CommitmentMismatch(String),

    #[error("proof from {0} failed verification")]
    ProofRejected(String),

    #[error("this proposal requires a proof with every reveal")]
    MissingProof,

    // ── Not found ─────────────────────────────────────────────────────
    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("no commitment from voter {0} on this proposal")]
    NoMatchingCommitment(String),

    // ── Authorization ─────────────────────────────────────────────────
    #[error("only the proposer can trigger this transition")]
    NotProposer,

    // ── External ──────────────────────────────────────────────────────
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("proof service error: {0}")]
    Proof(#[from] ProofError),
}

impl GovernanceError {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyTitle
            | Self::TitleTooLong { .. }
            | Self::DescriptionTooLong { .. }
            | Self::InvalidThreshold(_)
            | Self::InvalidQuorum(_)
            | Self::InvalidRevealPercent(_)
            | Self::DeadlineNotAfterCreation { .. }
            | Self::RevealDeadlineNotAfterDeadline { .. }
            | Self::InvalidTokenRequirement(_)
            | Self::EmptyWhitelist
            | Self::EmptyGroupId
            | Self::Config(_) => ErrorKind::Validation,
            Self::Eligibility(EligibilityError::Resolver(_)) => ErrorKind::External,
            Self::Eligibility(_) => ErrorKind::Eligibility,
            Self::InvalidPhase { .. } => ErrorKind::Phase,
            Self::DuplicateCommitment(_) | Self::DuplicateReveal(_) => ErrorKind::Duplicate,
            Self::CommitmentMismatch(_) | Self::ProofRejected(_) | Self::MissingProof => {
                ErrorKind::Integrity
            }
            Self::ProposalNotFound(_) | Self::NoMatchingCommitment(_) => ErrorKind::NotFound,
            Self::NotProposer => ErrorKind::Authorization,
            Self::Ledger(_) | Self::Proof(_) => ErrorKind::External,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(GovernanceError::InvalidThreshold(0).kind(), ErrorKind::Validation);
        assert_eq!(
            GovernanceError::DuplicateCommitment("a".into()).kind(),
            ErrorKind::Duplicate
        );
        assert_eq!(
            GovernanceError::InvalidPhase {
                operation: "commit",
                phase: ProposalPhase::Reveal
            }
            .kind(),
            ErrorKind::Phase
        );
        assert_eq!(
            GovernanceError::NoMatchingCommitment("a".into()).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn resolver_failures_are_external_not_eligibility() {
        let err: GovernanceError =
            EligibilityError::Resolver(GroupError::Unreachable("timeout".into())).into();
        assert_eq!(err.kind(), ErrorKind::External);

        let err: GovernanceError = EligibilityError::NotWhitelisted("bob".into()).into();
        assert_eq!(err.kind(), ErrorKind::Eligibility);
    }

    #[test]
    fn insufficient_balance_message_names_token() {
        let err = EligibilityError::InsufficientBalance {
            kind: TokenKind::Night,
            have: 50,
            need: 100,
        };
        assert_eq!(err.to_string(), "insufficient NIGHT balance: have 50, need 100");
    }
}
