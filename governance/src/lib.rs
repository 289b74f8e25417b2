//! Token-gated, commit-reveal governance.
//!
//! A proposal moves `Pending → Commit → Reveal → Tallying → Closed`. During
//! `Commit` eligible voters submit a hash binding them to a hidden choice.
//! During `Reveal` they open it by disclosing the choice and the secret, and
//! the engine recomputes the hash. When the reveal phase ends, revealed votes
//! are weighed against the approval threshold and the result is fixed.
//!
//! [`GovernanceEngine`] is the entry point. It owns every proposal and calls
//! out to a [`TokenLedgerView`], a [`GroupResolver`](umbra_groups::GroupResolver)
//! and a [`ProofService`](umbra_zk::ProofService) supplied at construction.

pub mod commitment;
pub mod config;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod proposal;
pub mod record;
pub mod reveal;
pub mod scheduler;
pub mod spans;
pub mod tally;
pub mod view;

pub use commitment::{CommitmentStore, VoteCommitment};
pub use config::GovernanceConfig;
pub use eligibility::{EligibilityEvaluator, EligibilitySnapshot};
pub use engine::GovernanceEngine;
pub use error::{EligibilityError, ErrorKind, GovernanceError, LedgerError};
pub use ledger::{TokenLedgerView, WalletProvider, WalletSession};
pub use lifecycle::{PhaseChange, ProposalLifecycle, ProposalPhase};
pub use proposal::{
    AnonymityMode, EligibilityPolicy, Pledge, Proposal, ProposalRules, ProposalSpec,
    TokenRequirement,
};
pub use reveal::{RevealStore, VoteReveal};
pub use scheduler::PhaseScheduler;
pub use tally::{ChoiceTotals, TallyEngine, TallyResult};
pub use view::{ProposalFilter, ProposalView, VoterStatus};
