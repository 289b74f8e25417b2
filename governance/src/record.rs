//! Everything the engine holds for one proposal.
//!
//! All mutation goes through `&mut self` methods that check the phase and
//! write in the same call, so a caller holding the record's lock sees
//! check-then-act as one step.

use crate::commitment::{CommitmentStore, VoteCommitment};
use crate::error::GovernanceError;
use crate::lifecycle::{DueTransition, ProposalLifecycle, ProposalPhase};
use crate::proposal::{Pledge, Proposal};
use crate::reveal::{RevealStore, VoteReveal};
use crate::tally::{ratio_bps, TallyEngine, TallyResult};
use crate::view::{ProposalView, VoterStatus};
use umbra_types::{CommitmentHash, Secret, Timestamp, TokenAmount, VoteChoice, VoterId};

pub struct ProposalRecord {
    proposal: Proposal,
    lifecycle: ProposalLifecycle,
    commitments: CommitmentStore,
    reveals: RevealStore,
    eligible_weight: TokenAmount,
    result: Option<TallyResult>,
}

impl ProposalRecord {
    pub fn new(proposal: Proposal) -> Self {
        let lifecycle = ProposalLifecycle::new(proposal.created_at);
        Self {
            proposal,
            lifecycle,
            commitments: CommitmentStore::new(),
            reveals: RevealStore::new(),
            eligible_weight: TokenAmount::ZERO,
            result: None,
        }
    }

    pub fn proposal(&self) -> &Proposal {
        &self.proposal
    }

    pub fn phase(&self) -> ProposalPhase {
        self.lifecycle.phase()
    }

    /// Fail with `InvalidPhase` unless the proposal is in `expected`.
    pub fn ensure_phase(
        &self,
        expected: ProposalPhase,
        operation: &'static str,
    ) -> Result<(), GovernanceError> {
        self.lifecycle.ensure(expected, operation)
    }

    pub fn result(&self) -> Option<&TallyResult> {
        self.result.as_ref()
    }

    pub fn commitment(&self, voter: &VoterId) -> Option<&VoteCommitment> {
        self.commitments.get(voter)
    }

    /// `Pending → Commit`, fixing the electorate size.
    pub fn activate(
        &mut self,
        at: Timestamp,
        eligible_weight: TokenAmount,
    ) -> Result<(), GovernanceError> {
        self.lifecycle.activate(at)?;
        self.eligible_weight = eligible_weight;
        Ok(())
    }

    /// `Commit → Reveal`.
    pub fn close_commit(&mut self, at: Timestamp) -> Result<(), GovernanceError> {
        self.lifecycle.close_commit(at)
    }

    /// `Reveal → Tallying → Closed`, computing the result in between.
    ///
    /// Runs as one step: callers never observe `Tallying` without the result.
    pub fn finalize(&mut self, at: Timestamp) -> Result<&TallyResult, GovernanceError> {
        self.lifecycle.ensure(ProposalPhase::Reveal, "close the reveal phase")?;
        let result = TallyEngine::tally(
            &self.proposal.rules,
            &self.commitments,
            &self.reveals,
            self.eligible_weight,
        );
        self.lifecycle.begin_tally(at)?;
        self.lifecycle.close(at)?;
        Ok(self.result.insert(result))
    }

    /// Apply every deadline that has passed by `now`. Each transition is
    /// stamped with its deadline, not with `now`. Returns the phase if it moved.
    pub fn apply_deadlines(&mut self, now: Timestamp) -> Option<ProposalPhase> {
        let before = self.phase();
        while let Some(due) = self.lifecycle.due_transition(
            now,
            self.proposal.commit_deadline,
            self.proposal.reveal_deadline,
        ) {
            let applied = match due {
                DueTransition::CloseCommit(at) => self.close_commit(at),
                DueTransition::CloseReveal(at) => self.finalize(at).map(|_| ()),
            };
            if let Err(e) = applied {
                tracing::warn!(proposal = %self.proposal.id, error = %e, "deadline transition failed");
                break;
            }
        }
        let after = self.phase();
        (after != before).then_some(after)
    }

    /// Fail unless a commitment from `voter` could be accepted right now.
    pub fn check_commit_open(&self, voter: &VoterId) -> Result<(), GovernanceError> {
        self.lifecycle.ensure(ProposalPhase::Commit, "submit a commitment")?;
        if self.commitments.contains(voter) {
            return Err(GovernanceError::DuplicateCommitment(voter.to_string()));
        }
        Ok(())
    }

    pub fn submit_commitment(
        &mut self,
        voter: VoterId,
        commitment: CommitmentHash,
        weight: TokenAmount,
        pledge: Option<Pledge>,
        at: Timestamp,
    ) -> Result<&VoteCommitment, GovernanceError> {
        self.lifecycle.ensure(ProposalPhase::Commit, "submit a commitment")?;
        self.commitments.submit(voter, commitment, weight, pledge, at)
    }

    /// Fail unless a reveal from `voter` could be accepted right now.
    /// Returns the stored commitment it will be checked against.
    pub fn check_reveal_open(&self, voter: &VoterId) -> Result<&VoteCommitment, GovernanceError> {
        self.lifecycle.ensure(ProposalPhase::Reveal, "submit a reveal")?;
        let stored = self
            .commitments
            .get(voter)
            .ok_or_else(|| GovernanceError::NoMatchingCommitment(voter.to_string()))?;
        if self.reveals.contains(voter) {
            return Err(GovernanceError::DuplicateReveal(voter.to_string()));
        }
        Ok(stored)
    }

    pub fn submit_reveal(
        &mut self,
        voter: &VoterId,
        choice: VoteChoice,
        secret: Secret,
        at: Timestamp,
    ) -> Result<&VoteReveal, GovernanceError> {
        self.lifecycle.ensure(ProposalPhase::Reveal, "submit a reveal")?;
        self.reveals.reveal(&self.commitments, voter, choice, secret, at)
    }

    pub fn voter_status(&self, voter: &VoterId) -> VoterStatus {
        VoterStatus {
            has_committed: self.commitments.contains(voter),
            has_revealed: self.reveals.contains(voter),
        }
    }

    pub fn view(&self) -> ProposalView {
        let p = &self.proposal;
        let committed_weight = self.commitments.total_weight();
        ProposalView {
            id: p.id,
            title: p.title.clone(),
            description: p.description.clone(),
            creator: p.creator.clone(),
            created_at: p.created_at,
            commit_deadline: p.commit_deadline,
            reveal_deadline: p.reveal_deadline,
            rules: p.rules.clone(),
            phase: self.phase(),
            vote_count: self.commitments.len(),
            reveal_count: self.reveals.len(),
            committed_weight,
            eligible_weight: self.eligible_weight,
            commit_participation_bps: ratio_bps(committed_weight, self.eligible_weight),
            results: self.result.clone(),
            history: self.lifecycle.history().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::{AnonymityMode, EligibilityPolicy, ProposalRules};
    use umbra_crypto::commit;
    use umbra_types::ProposalId;

    fn ts(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    fn voter(name: &str) -> VoterId {
        VoterId::new(name).unwrap()
    }

    fn record() -> ProposalRecord {
        let proposal = Proposal {
            id: ProposalId::new([9; 32]),
            title: "t".into(),
            description: String::new(),
            creator: voter("alice"),
            created_at: ts(0),
            commit_deadline: ts(100),
            reveal_deadline: ts(200),
            rules: ProposalRules {
                required_tokens: vec![],
                approval_threshold: 50,
                policy: EligibilityPolicy::TokenHolders,
                anonymity: AnonymityMode::Public,
                quorum_percent: None,
            },
        };
        let mut rec = ProposalRecord::new(proposal);
        rec.activate(ts(0), TokenAmount::new(10)).unwrap();
        rec
    }

    #[test]
    fn deadlines_walk_to_closed_stamped_with_deadline_times() {
        let mut rec = record();
        assert_eq!(rec.apply_deadlines(ts(99)), None);
        assert_eq!(rec.apply_deadlines(ts(500)), Some(ProposalPhase::Closed));

        let stamps: Vec<_> = rec.view().history.iter().map(|c| (c.phase, c.at)).collect();
        assert_eq!(
            stamps,
            vec![
                (ProposalPhase::Pending, ts(0)),
                (ProposalPhase::Commit, ts(0)),
                (ProposalPhase::Reveal, ts(100)),
                (ProposalPhase::Tallying, ts(200)),
                (ProposalPhase::Closed, ts(200)),
            ]
        );
        assert!(rec.result().is_some());
    }

    #[test]
    fn late_commitment_is_a_phase_error_and_changes_nothing() {
        let mut rec = record();
        rec.apply_deadlines(ts(100));
        let err = rec
            .submit_commitment(voter("bob"), CommitmentHash::new([1; 32]), TokenAmount::new(1), None, ts(100))
            .unwrap_err();
        assert!(matches!(
            err,
            GovernanceError::InvalidPhase {
                phase: ProposalPhase::Reveal,
                ..
            }
        ));
        assert_eq!(rec.view().vote_count, 0);
    }

    #[test]
    fn finalize_fixes_result_once() {
        let mut rec = record();
        let secret = Secret::from_bytes([4; 32]);
        rec.submit_commitment(voter("bob"), commit(VoteChoice::Yes, &secret), TokenAmount::new(1), None, ts(10))
            .unwrap();
        rec.close_commit(ts(20)).unwrap();
        rec.submit_reveal(&voter("bob"), VoteChoice::Yes, secret, ts(30)).unwrap();

        let first = rec.finalize(ts(40)).unwrap().clone();
        assert!(first.approved);
        assert!(rec.finalize(ts(50)).is_err());
        assert_eq!(rec.view().results, Some(first));
        assert_eq!(rec.apply_deadlines(ts(1_000)), None);
    }

    #[test]
    fn voter_status_tracks_both_steps() {
        let mut rec = record();
        let bob = voter("bob");
        let secret = Secret::from_bytes([4; 32]);
        assert_eq!(rec.voter_status(&bob), VoterStatus::default());
        rec.submit_commitment(bob.clone(), commit(VoteChoice::No, &secret), TokenAmount::new(1), None, ts(10))
            .unwrap();
        assert!(rec.voter_status(&bob).has_committed);
        rec.close_commit(ts(20)).unwrap();
        rec.submit_reveal(&bob, VoteChoice::No, secret, ts(30)).unwrap();
        assert_eq!(
            rec.voter_status(&bob),
            VoterStatus {
                has_committed: true,
                has_revealed: true
            }
        );
    }
}
