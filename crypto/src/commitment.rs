//! Vote commitment scheme.
//!
//! `commit(choice, secret) = tagged_hash(DOMAIN, choice_byte || secret)`.
//! Binding follows from collision resistance of Blake2b; hiding follows from
//! the 256-bit uniformly random secret. The domain tag keeps commitments from
//! colliding with any other hash the protocol computes.

use crate::error::CryptoError;
use crate::hash::tagged_hash;
use rand::rngs::OsRng;
use rand::RngCore;
use umbra_types::{CommitmentHash, Secret, VoteChoice};

const COMMIT_DOMAIN: &str = "umbra/vote-commitment/v1";

/// Compute the commitment a voter submits during the commit phase.
pub fn commit(choice: VoteChoice, secret: &Secret) -> CommitmentHash {
    let choice_byte = [choice.as_byte()];
    CommitmentHash::new(tagged_hash(
        COMMIT_DOMAIN,
        &[&choice_byte[..], &secret.as_bytes()[..]],
    ))
}

/// Re-derive the commitment from a disclosed `(choice, secret)` and compare.
///
/// The comparison does not short-circuit on the first differing byte.
pub fn verify_commitment(choice: VoteChoice, secret: &Secret, expected: &CommitmentHash) -> bool {
    let derived = commit(choice, secret);
    derived
        .as_bytes()
        .iter()
        .zip(expected.as_bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Draw a fresh secret nonce from the OS RNG.
pub fn generate_secret() -> Secret {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    Secret::from_bytes(bytes)
}

pub fn secret_to_hex(secret: &Secret) -> String {
    hex::encode(secret.as_bytes())
}

pub fn secret_from_hex(s: &str) -> Result<Secret, CryptoError> {
    let bytes = hex::decode(s).map_err(|e| CryptoError::InvalidSecret(e.to_string()))?;
    let array: [u8; 32] = bytes
        .try_into()
        .map_err(|v: Vec<u8>| CryptoError::InvalidSecret(format!("got {} bytes", v.len())))?;
    Ok(Secret::from_bytes(array))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_then_verify() {
        let secret = generate_secret();
        let c = commit(VoteChoice::Yes, &secret);
        assert!(verify_commitment(VoteChoice::Yes, &secret, &c));
    }

    #[test]
    fn altered_choice_fails() {
        let secret = generate_secret();
        let c = commit(VoteChoice::Yes, &secret);
        assert!(!verify_commitment(VoteChoice::No, &secret, &c));
        assert!(!verify_commitment(VoteChoice::Abstain, &secret, &c));
    }

    #[test]
    fn altered_secret_fails() {
        let c = commit(VoteChoice::No, &Secret::from_bytes([1; 32]));
        assert!(!verify_commitment(VoteChoice::No, &Secret::from_bytes([2; 32]), &c));
    }

    #[test]
    fn same_choice_different_secrets_hide() {
        let a = commit(VoteChoice::Yes, &generate_secret());
        let b = commit(VoteChoice::Yes, &generate_secret());
        assert_ne!(a, b);
    }

    #[test]
    fn hex_secret_parses_back() {
        let s = Secret::from_bytes([0x5a; 32]);
        assert_eq!(secret_from_hex(&secret_to_hex(&s)).unwrap(), s);
    }

    #[test]
    fn hex_secret_wrong_length() {
        assert!(matches!(
            secret_from_hex("abcd"),
            Err(CryptoError::InvalidSecret(_))
        ));
        assert!(secret_from_hex("not hex").is_err());
    }
}
