//! Nullable proof service.
//!
//! A "proof" here is just the commitment the prover computed, so `verify`
//! accepts exactly the proofs that open the commitment they are checked
//! against. Tests can also force every verification to fail or error.

use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use umbra_crypto::commit;
use umbra_types::{CommitmentHash, Secret, VoteChoice};
use umbra_zk::{ProofError, ProofService, ZkProof};

const SYSTEM: &str = "null-v1";

const HONEST: u8 = 0;
const REJECT_ALL: u8 = 1;
const FAILING: u8 = 2;

pub struct NullProofService {
    mode: AtomicU8,
    verifications: AtomicUsize,
}

impl NullProofService {
    pub fn new() -> Self {
        Self {
            mode: AtomicU8::new(HONEST),
            verifications: AtomicUsize::new(0),
        }
    }

    /// Every verification returns `false`.
    pub fn reject_all(&self) {
        self.mode.store(REJECT_ALL, Ordering::SeqCst);
    }

    /// Every call fails as if the service were down.
    pub fn fail_all(&self) {
        self.mode.store(FAILING, Ordering::SeqCst);
    }

    pub fn honest(&self) {
        self.mode.store(HONEST, Ordering::SeqCst);
    }

    /// How many times `verify` has been called.
    pub fn verifications(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }
}

impl Default for NullProofService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ProofService for NullProofService {
    async fn prove_choice(
        &self,
        choice: VoteChoice,
        secret: &Secret,
    ) -> Result<ZkProof, ProofError> {
        if self.mode.load(Ordering::SeqCst) == FAILING {
            return Err(ProofError::Unreachable("null prover switched off".into()));
        }
        Ok(ZkProof::new(SYSTEM, commit(choice, secret).as_bytes().to_vec()))
    }

    async fn verify(
        &self,
        proof: &ZkProof,
        commitment: &CommitmentHash,
    ) -> Result<bool, ProofError> {
        self.verifications.fetch_add(1, Ordering::SeqCst);
        match self.mode.load(Ordering::SeqCst) {
            FAILING => Err(ProofError::Unreachable("null verifier switched off".into())),
            REJECT_ALL => Ok(false),
            _ => Ok(proof.system == SYSTEM && proof.data == commitment.as_bytes()),
        }
    }

    fn name(&self) -> &str {
        SYSTEM
    }
}
