//! Opened votes for one proposal, each checked against its commitment.

use crate::commitment::CommitmentStore;
use crate::error::GovernanceError;
use serde::Serialize;
use std::collections::HashMap;
use umbra_crypto::verify_commitment;
use umbra_types::{Secret, Timestamp, TokenAmount, VoteChoice, VoterId};

/// A disclosed vote.
#[derive(Clone, Debug, Serialize)]
pub struct VoteReveal {
    pub voter: VoterId,
    pub choice: VoteChoice,
    #[serde(skip)]
    pub secret: Secret,
    /// Carried over from the matching commitment.
    pub weight: TokenAmount,
    pub revealed_at: Timestamp,
}

/// Reveals for a single proposal, at most one per voter.
#[derive(Clone, Debug, Default)]
pub struct RevealStore {
    by_voter: HashMap<VoterId, VoteReveal>,
}

impl RevealStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a reveal iff `commit(choice, secret)` reproduces the voter's
    /// stored commitment. Nothing is recorded on failure.
    pub fn reveal(
        &mut self,
        commitments: &CommitmentStore,
        voter: &VoterId,
        choice: VoteChoice,
        secret: Secret,
        at: Timestamp,
    ) -> Result<&VoteReveal, GovernanceError> {
        let stored = commitments
            .get(voter)
            .ok_or_else(|| GovernanceError::NoMatchingCommitment(voter.to_string()))?;
        if self.by_voter.contains_key(voter) {
            return Err(GovernanceError::DuplicateReveal(voter.to_string()));
        }
        if !verify_commitment(choice, &secret, &stored.commitment) {
            return Err(GovernanceError::CommitmentMismatch(voter.to_string()));
        }

        let reveal = VoteReveal {
            voter: voter.clone(),
            choice,
            secret,
            weight: stored.weight,
            revealed_at: at,
        };
        Ok(self.by_voter.entry(voter.clone()).or_insert(reveal))
    }

    pub fn get(&self, voter: &VoterId) -> Option<&VoteReveal> {
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

    pub fn iter(&self) -> impl Iterator<Item = &VoteReveal> {
        self.by_voter.values()
    }
}
