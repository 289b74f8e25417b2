//! Cryptographic primitives for Umbra governance.
//!
//! - Domain-separated **Blake2b-256** for hashing
//! - A domain-separated hash commitment over `(choice, secret)` for commit-reveal voting
//! - OS-sourced secret nonces and proposal ids

pub mod commitment;
pub mod error;
pub mod hash;
pub mod ids;

pub use commitment::{commit, generate_secret, secret_from_hex, secret_to_hex, verify_commitment};
pub use error::CryptoError;
pub use hash::tagged_hash;
pub use ids::derive_proposal_id;
