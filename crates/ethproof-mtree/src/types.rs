//! Fixed-size wire types shared with the on-chain verifier.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Size of a node digest in bytes.
pub const HASH_LENGTH: usize = 16;

/// Size of a DAG element in bytes (two 64-byte Ethash dataset items).
pub const WORD_LENGTH: usize = 128;

/// Size of a serialized proof element in bytes (two packed digests).
pub const BRANCH_ELEMENT_LENGTH: usize = 32;

/// A 128-byte DAG element, treated as four 32-byte little-endian lanes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Word(pub [u8; WORD_LENGTH]);

/// A 16-byte node digest (the upper half of a 32-byte hash output).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash(pub [u8; HASH_LENGTH]);

/// A 32-byte proof element: two node digests packed into one EVM word.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BranchElement(pub [u8; BRANCH_ELEMENT_LENGTH]);

impl Word {
    /// Expose the word as four 32-byte big-endian integers.
    ///
    /// Each 32-byte lane is byte-reversed, converting the DAG's
    /// little-endian layout into the form the EVM reads 256-bit words
    /// in. This is the same transform the leaf hash applies.
    pub fn to_u256_chunks(&self) -> [[u8; 32]; 4] {
        let mut chunks = [[0u8; 32]; 4];
        for (i, chunk) in chunks.iter_mut().enumerate() {
            for (j, byte) in chunk.iter_mut().enumerate() {
                *byte = self.0[i * 32 + (31 - j)];
            }
        }
        chunks
    }
}

impl Hash {
    /// All-zero digest.
    pub fn zero() -> Self {
        Self([0u8; HASH_LENGTH])
    }

    /// Hex encoding with a `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse a digest from hex, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        let arr: [u8; HASH_LENGTH] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }
}

impl BranchElement {
    /// Pack two digests into one element, `a` in the upper half.
    pub fn from_hashes(a: Hash, b: Hash) -> Self {
        let mut out = [0u8; BRANCH_ELEMENT_LENGTH];
        out[..HASH_LENGTH].copy_from_slice(&a.0);
        out[HASH_LENGTH..].copy_from_slice(&b.0);
        Self(out)
    }

    /// Hex encoding with a `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

/// Serialize an authentication path as proof elements, one digest per
/// element in the lower half (`zero_16 || hash_16`).
pub fn hashes_to_branch_elements(hashes: &[Hash]) -> Vec<BranchElement> {
    hashes
        .iter()
        .map(|h| BranchElement::from_hashes(Hash::zero(), *h))
        .collect()
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word(0x{})", hex::encode(self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for BranchElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BranchElement({})", self.to_hex())
    }
}

impl fmt::Display for BranchElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash::from_hex(&s).map_err(D::Error::custom)
    }
}

impl Serialize for BranchElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BranchElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let stripped = s.strip_prefix("0x").unwrap_or(&s);
        let bytes = hex::decode(stripped).map_err(D::Error::custom)?;
        let arr: [u8; BRANCH_ELEMENT_LENGTH] = bytes
            .try_into()
            .map_err(|_| D::Error::custom("branch element must be 32 bytes"))?;
        Ok(Self(arr))
    }
}
