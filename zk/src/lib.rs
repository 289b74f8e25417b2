//! Zero-knowledge proof service for private reveals.
//!
//! The proof system itself lives outside this workspace. This crate defines
//! the contract the governance engine calls (`verify`) and the one clients
//! call (`prove_choice`), plus an HTTP client for a remote prover.

pub mod error;
pub mod remote;

pub use error::ProofError;
pub use remote::RemoteProofService;

use serde::{Deserialize, Serialize};
use umbra_types::{CommitmentHash, Secret, VoteChoice};

/// Trait for an external proving/verification service.
#[async_trait::async_trait]
pub trait ProofService: Send + Sync {
    /// Produce a proof that `commit(choice, secret)` opens to `choice`.
    async fn prove_choice(&self, choice: VoteChoice, secret: &Secret)
        -> Result<ZkProof, ProofError>;

    /// Verify a proof against a stored commitment.
    async fn verify(&self, proof: &ZkProof, commitment: &CommitmentHash)
        -> Result<bool, ProofError>;

    /// Human-readable name of this proof backend.
    fn name(&self) -> &str;
}

/// An opaque proof blob tagged with the proof system that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkProof {
    /// Identifier of the proving system / circuit version.
    pub system: String,
    /// Serialized proof bytes.
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
}

impl ZkProof {
    pub fn new(system: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            system: system.into(),
            data,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
