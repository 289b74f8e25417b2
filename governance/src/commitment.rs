//! Sealed votes for one proposal.
//!
//! The store only ever sees the commitment hash. Which way a voter went is
//! unknown until they reveal.

use crate::error::GovernanceError;
use crate::proposal::Pledge;
use serde::Serialize;
use std::collections::HashMap;
use umbra_types::{CommitmentHash, Timestamp, TokenAmount, VoterId};

/// One voter's sealed vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VoteCommitment {
    pub voter: VoterId,
    pub commitment: CommitmentHash,
    /// What the voter staked, if the proposal is token-weighted.
    pub pledge: Option<Pledge>,
    /// Weight fixed at submission time.
    pub weight: TokenAmount,
    pub submitted_at: Timestamp,
}

/// Commitments for a single proposal, at most one per voter.
#[derive(Clone, Debug, Default)]
pub struct CommitmentStore {
    by_voter: HashMap<VoterId, VoteCommitment>,
    total_weight: TokenAmount,
}

impl CommitmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a commitment. A second one from the same voter is rejected and
    /// the first is left untouched.
    pub fn submit(
        &mut self,
        voter: VoterId,
        commitment: CommitmentHash,
        weight: TokenAmount,
        pledge: Option<Pledge>,
        at: Timestamp,
    ) -> Result<&VoteCommitment, GovernanceError> {
        use std::collections::hash_map::Entry;
        match self.by_voter.entry(voter) {
            Entry::Occupied(e) => Err(GovernanceError::DuplicateCommitment(e.key().to_string())),
            Entry::Vacant(e) => {
                self.total_weight = self.total_weight.saturating_add(weight);
                let voter = e.key().clone();
                Ok(e.insert(VoteCommitment {
                    voter,
                    commitment,
                    pledge,
                    weight,
                    submitted_at: at,
                }))
            }
        }
    }

    pub fn get(&self, voter: &VoterId) -> Option<&VoteCommitment> {
        self.by_voter.get(voter)
    }

    pub fn contains(&self, voter: &VoterId) -> bool {
        self.by_voter.contains_key(voter)
    }

    pub fn len(&self) -> usize {
        self.by_voter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_voter.is_empty()
    }

    /// Sum of the weights of every commitment.
    pub fn total_weight(&self) -> TokenAmount {
        self.total_weight
    }

    pub fn iter(&self) -> impl Iterator<Item = &VoteCommitment> {
        self.by_voter.values()
    }
}
