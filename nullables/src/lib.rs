//! Nullable collaborators for deterministic testing.
//!
//! Everything the governance engine calls out to (clock, token ledger,
//! wallet, proof service) has an in-memory stand-in here that:
//! - returns deterministic values
//! - can be steered programmatically, including into failure
//! - never touches the network
//!
//! Usage: hand these to `GovernanceEngine::new` in place of the real ones.

pub mod clock;
pub mod ledger;
pub mod proofs;

pub use clock::NullClock;
pub use ledger::NullLedger;
pub use proofs::NullProofService;
