//! Read-only snapshots handed to the presentation layer.

use crate::lifecycle::{PhaseChange, ProposalPhase};
use crate::proposal::ProposalRules;
use crate::tally::TallyResult;
use serde::{Deserialize, Serialize};
use umbra_types::{ProposalId, Timestamp, TokenAmount, VoterId};

/// A consistent snapshot of one proposal.
#[derive(Clone, Debug, Serialize)]
pub struct ProposalView {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    pub creator: VoterId,
    pub created_at: Timestamp,
    pub commit_deadline: Timestamp,
    pub reveal_deadline: Timestamp,
    pub rules: ProposalRules,
    pub phase: ProposalPhase,
    /// Number of accepted commitments.
    pub vote_count: usize,
    /// Number of accepted reveals.
    pub reveal_count: usize,
    pub committed_weight: TokenAmount,
    pub eligible_weight: TokenAmount,
    /// Committed weight as a share of eligible weight, in basis points.
    /// Revealed participation lives in [`TallyResult::participation_bps`].
    pub commit_participation_bps: u32,
    /// Present once the proposal is closed. Never changes afterwards.
    pub results: Option<TallyResult>,
    pub history: Vec<PhaseChange>,
}

impl ProposalView {
    pub fn is_closed(&self) -> bool {
        self.phase == ProposalPhase::Closed
    }
}

/// Whether a voter has taken part in a proposal so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterStatus {
    pub has_committed: bool,
    pub has_revealed: bool,
}

/// Selects proposals for [`GovernanceEngine::list_proposals`](crate::GovernanceEngine::list_proposals).
/// Unset fields match everything.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProposalFilter {
    #[serde(default)]
    pub phase: Option<ProposalPhase>,
    #[serde(default)]
    pub creator: Option<VoterId>,
}

impl ProposalFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn in_phase(phase: ProposalPhase) -> Self {
        Self {
            phase: Some(phase),
            creator: None,
        }
    }

    pub fn by_creator(creator: VoterId) -> Self {
        Self {
            phase: None,
            creator: Some(creator),
        }
    }

    pub fn matches(&self, view: &ProposalView) -> bool {
        self.phase.map_or(true, |p| p == view.phase)
            && self.creator.as_ref().map_or(true, |c| *c == view.creator)
    }
}
