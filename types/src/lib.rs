//! Fundamental types for Umbra governance.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! voter identities, proposal ids, commitment hashes, token amounts, balance
//! snapshots, timestamps and the vote choice enum.

pub mod amount;
pub mod balances;
pub mod error;
pub mod hash;
pub mod identity;
pub mod time;
pub mod vote;

pub use amount::{TokenAmount, TokenKind};
pub use balances::Balances;
pub use error::TypesError;
pub use hash::{CommitmentHash, ProposalId};
pub use identity::VoterId;
pub use time::{Clock, SystemClock, Timestamp};
pub use vote::{Secret, VoteChoice};
