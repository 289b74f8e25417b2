//! Domain-separated Blake2b-256.
//!
//! Every hash the workspace computes goes through [`tagged_hash`], so a vote
//! commitment can never equal a proposal id or any other digest.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

/// Hash `parts` in order under `domain`.
///
/// The tag is length-prefixed, so `("ab", "c")` and `("a", "bc")` differ.
pub fn tagged_hash(domain: &str, parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update((domain.len() as u64).to_le_bytes());
    hasher.update(domain.as_bytes());
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_input_same_digest() {
        assert_eq!(
            tagged_hash("umbra/test", &[b"vote".as_slice()]),
            tagged_hash("umbra/test", &[b"vote".as_slice()])
        );
    }

    #[test]
    fn parts_concatenate() {
        assert_eq!(
            tagged_hash("umbra/test", &[b"hello".as_slice(), b"world".as_slice()]),
            tagged_hash("umbra/test", &[b"helloworld".as_slice()])
        );
    }

    #[test]
    fn domain_boundary_is_unambiguous() {
        assert_ne!(tagged_hash("ab", &[b"c".as_slice()]), tagged_hash("a", &[b"bc".as_slice()]));
        assert_ne!(tagged_hash("umbra/a", &[b"x".as_slice()]), tagged_hash("umbra/b", &[b"x".as_slice()]));
    }
}
