//! Proposal id derivation.

use crate::hash::tagged_hash;
use rand::rngs::OsRng;
use rand::RngCore;
use umbra_types::{ProposalId, Timestamp, VoterId};

const PROPOSAL_ID_DOMAIN: &str = "umbra/proposal-id/v1";

/// Derive a fresh, unique proposal id.
///
/// Mixes the creator and creation time with 16 bytes of OS randomness so two
/// proposals created by the same identity in the same second still differ.
pub fn derive_proposal_id(creator: &VoterId, created_at: Timestamp) -> ProposalId {
    let mut salt = [0u8; 16];
    OsRng.fill_bytes(&mut salt);
    ProposalId::new(tagged_hash(
        PROPOSAL_ID_DOMAIN,
        &[
            creator.as_str().as_bytes(),
            &created_at.as_secs().to_le_bytes(),
            &salt,
        ],
    ))
}
