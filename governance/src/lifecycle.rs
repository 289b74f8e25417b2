//! Proposal lifecycle state machine.
//!
//! `Pending → Commit → Reveal → Tallying → Closed`. Phases only move forward,
//! one step at a time. `Closed` is terminal.

use crate::error::GovernanceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use umbra_types::Timestamp;

/// The phases of a proposal, in lifecycle order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalPhase {
    /// Created, not yet accepting votes.
    Pending,
    /// Active: accepting commitments.
    Commit,
    /// Active: accepting reveals.
    Reveal,
    /// Reveals frozen, results being computed.
    Tallying,
    /// Results fixed. Terminal state.
    Closed,
}

impl ProposalPhase {
    /// The phase that follows this one, if any.
    pub fn next(&self) -> Option<ProposalPhase> {
        match self {
            Self::Pending => Some(Self::Commit),
            Self::Commit => Some(Self::Reveal),
            Self::Reveal => Some(Self::Tallying),
            Self::Tallying => Some(Self::Closed),
            Self::Closed => None,
        }
    }

    /// Whether the proposal is accepting votes (commit or reveal).
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Commit | Self::Reveal)
    }
}

impl fmt::Display for ProposalPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Commit => "commit",
            Self::Reveal => "reveal",
            Self::Tallying => "tallying",
            Self::Closed => "closed",
        })
    }
}

/// One recorded phase entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseChange {
    pub phase: ProposalPhase,
    pub at: Timestamp,
}

/// A deadline-driven transition that is due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DueTransition {
    /// The commit deadline has passed.
    CloseCommit(Timestamp),
    /// The reveal deadline has passed.
    CloseReveal(Timestamp),
}

/// Tracks the current phase of one proposal and every phase it has been in.
#[derive(Clone, Debug)]
pub struct ProposalLifecycle {
    phase: ProposalPhase,
    history: Vec<PhaseChange>,
}

impl ProposalLifecycle {
    /// Start a lifecycle in `Pending`.
    pub fn new(created_at: Timestamp) -> Self {
        Self {
            phase: ProposalPhase::Pending,
            history: vec![PhaseChange {
                phase: ProposalPhase::Pending,
                at: created_at,
            }],
        }
    }

    pub fn phase(&self) -> ProposalPhase {
        self.phase
    }

    /// Every phase entered so far, oldest first.
    pub fn history(&self) -> &[PhaseChange] {
        &self.history
    }

    pub fn is_closed(&self) -> bool {
        self.phase == ProposalPhase::Closed
    }

    /// Fail with `InvalidPhase` unless the proposal is in `expected`.
    pub fn ensure(
        &self,
        expected: ProposalPhase,
        operation: &'static str,
    ) -> Result<(), GovernanceError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GovernanceError::InvalidPhase {
                operation,
                phase: self.phase,
            })
        }
    }

    /// `Pending → Commit`.
    pub fn activate(&mut self, at: Timestamp) -> Result<(), GovernanceError> {
        self.advance(ProposalPhase::Commit, "activate", at)
    }

    /// `Commit → Reveal`.
    pub fn close_commit(&mut self, at: Timestamp) -> Result<(), GovernanceError> {
        self.advance(ProposalPhase::Reveal, "close the commit phase", at)
    }

    /// `Reveal → Tallying`.
    pub fn begin_tally(&mut self, at: Timestamp) -> Result<(), GovernanceError> {
        self.advance(ProposalPhase::Tallying, "close the reveal phase", at)
    }

    /// `Tallying → Closed`.
    pub fn close(&mut self, at: Timestamp) -> Result<(), GovernanceError> {
        self.advance(ProposalPhase::Closed, "close", at)
    }

    /// The next deadline-driven transition that is due at `now`, if any.
    pub fn due_transition(
        &self,
        now: Timestamp,
        commit_deadline: Timestamp,
        reveal_deadline: Timestamp,
    ) -> Option<DueTransition> {
        match self.phase {
            ProposalPhase::Commit if commit_deadline.has_passed(now) => {
                Some(DueTransition::CloseCommit(commit_deadline))
            }
            ProposalPhase::Reveal if reveal_deadline.has_passed(now) => {
                Some(DueTransition::CloseReveal(reveal_deadline))
            }
            _ => None,
        }
    }

    fn advance(
        &mut self,
        to: ProposalPhase,
        operation: &'static str,
        at: Timestamp,
    ) -> Result<(), GovernanceError> {
        if self.phase.next() != Some(to) {
            return Err(GovernanceError::InvalidPhase {
                operation,
                phase: self.phase,
            });
        }
        // Recorded times never run backwards, even when a lazily applied
        // deadline is older than an explicit transition already recorded.
        let last = self.history.last().map(|c| c.at).unwrap_or(at);
        self.phase = to;
        self.history.push(PhaseChange {
            phase: to,
            at: at.max(last),
        });
        Ok(())
    }
}
