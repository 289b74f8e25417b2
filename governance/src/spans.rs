//! Pre-built [`tracing::Span`] constructors for engine operations.
//!
//! Every span carries the proposal id so a single proposal's history can be
//! pulled out of the logs with one filter.

use tracing::{info_span, Span};
use umbra_types::{ProposalId, VoterId};

/// Span covering creation or a manual transition of a proposal.
pub fn proposal_span(operation: &str, proposal: &ProposalId) -> Span {
    info_span!("proposal", op = %operation, proposal = %proposal)
}

/// Span covering one commitment submission.
pub fn commit_span(proposal: &ProposalId, voter: &VoterId) -> Span {
    info_span!("commit", proposal = %proposal, voter = %voter)
}

/// Span covering one reveal submission.
pub fn reveal_span(proposal: &ProposalId, voter: &VoterId) -> Span {
    info_span!("reveal", proposal = %proposal, voter = %voter)
}

/// Span covering the tally and close of a proposal.
pub fn tally_span(proposal: &ProposalId) -> Span {
    info_span!("tally", proposal = %proposal)
}
