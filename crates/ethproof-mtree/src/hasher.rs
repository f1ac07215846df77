//! Domain hashing scheme binding DAG words and node digests into the
//! tree committed to on chain.
//!
//! Two compression functions are supported, selected at tree
//! construction: Keccak-256 and SHA-256. The byte-shaping rules are
//! identical for both:
//!
//! - A leaf hashes the 128-byte word as `[a|b|c|d]` with every 32-byte
//!   lane byte-reversed (`H(rev(a)||rev(b)||rev(c)||rev(d))`). The
//!   verifier reads 256-bit EVM words big-endian; the reversal converts
//!   the DAG's little-endian lanes to that form.
//! - An internal node hashes its children zero-extended to 32 bytes
//!   (`H(zero_16 || left || zero_16 || right)`).
//! - Every digest is truncated to bytes `[16..32]` of the 32-byte hash
//!   output, so two sibling digests pack into one EVM word.

use sha2::{Digest, Sha256};
use sha3::Keccak256;

use crate::types::{Hash, Word, HASH_LENGTH};

/// Hash function variant used for every node of one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DagHasher {
    /// Keccak-256 (the EVM-native variant).
    Keccak256,
    /// SHA-256 (cheaper for non-EVM verifiers).
    Sha256,
}

impl DagHasher {
    /// Digest of a leaf word.
    pub fn element_hash(&self, word: &Word) -> Hash {
        let (first, second) = conventional_word(word);
        self.truncated(&first, &second)
    }

    /// Digest of an internal node from its two child digests.
    pub fn node_hash(&self, left: Hash, right: Hash) -> Hash {
        let mut first = [0u8; 32];
        let mut second = [0u8; 32];
        first[HASH_LENGTH..].copy_from_slice(&left.0);
        second[HASH_LENGTH..].copy_from_slice(&right.0);
        self.truncated(&first, &second)
    }

    fn truncated(&self, first: &[u8], second: &[u8]) -> Hash {
        let digest: [u8; 32] = match self {
            DagHasher::Keccak256 => {
                let mut hasher = Keccak256::new();
                hasher.update(first);
                hasher.update(second);
                hasher.finalize().into()
            }
            DagHasher::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(first);
                hasher.update(second);
                hasher.finalize().into()
            }
        };
        let mut out = [0u8; HASH_LENGTH];
        out.copy_from_slice(&digest[HASH_LENGTH..]);
        Hash(out)
    }
}

/// Split a word into its two 64-byte hash inputs, each 32-byte lane
/// byte-reversed. Does not mutate the input.
fn conventional_word(word: &Word) -> ([u8; 64], [u8; 64]) {
    let mut first = [0u8; 64];
    let mut second = [0u8; 64];
    first[..32].copy_from_slice(&reverse32(&word.0[..32]));
    first[32..].copy_from_slice(&reverse32(&word.0[32..64]));
    second[..32].copy_from_slice(&reverse32(&word.0[64..96]));
    second[32..].copy_from_slice(&reverse32(&word.0[96..128]));
    (first, second)
}

/// Byte-reverse one 32-byte lane into a fresh array.
fn reverse32(lane: &[u8]) -> [u8; 32] {
    debug_assert_eq!(lane.len(), 32);
    let mut out = [0u8; 32];
    for (i, b) in lane.iter().enumerate() {
        out[31 - i] = *b;
    }
    out
}
