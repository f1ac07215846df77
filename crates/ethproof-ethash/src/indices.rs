//! Hashimoto index derivation.
//!
//! Reproduces the dataset access pattern of Ethash's hashimoto loop
//! without computing the proof-of-work value itself: for a given seal
//! hash and nonce it yields, in order, the 64 dataset rows a verifier
//! evaluating that header will read. Each emitted row index is also
//! the Merkle leaf index, since one 128-byte word covers the row's two
//! dataset items `2·row` and `2·row + 1`.
//!
//! The mix is refreshed with real dataset contents, so derivation
//! needs a dataset item lookup; [`dag_indices`] wires it to a
//! materialized DAG file.

use sha3::{Digest, Keccak512};
use tracing::trace;

use crate::dag::DagFile;
use crate::error::EthashResult;
use crate::params::{HASH_BYTES, HASH_WORDS, LOOP_ACCESSES, MIX_BYTES, MIX_WORDS};

/// FNV prime used by Ethash's mixing function.
const FNV_PRIME: u32 = 0x0100_0193;

/// Ethash's fnv combine, with wrapping 32-bit multiply.
#[inline]
pub fn fnv(a: u32, b: u32) -> u32 {
    a.wrapping_mul(FNV_PRIME) ^ b
}

/// Componentwise fnv of `data` into `mix`.
#[inline]
pub fn fnv_hash(mix: &mut [u32; MIX_WORDS], data: &[u32; MIX_WORDS]) {
    for (m, d) in mix.iter_mut().zip(data) {
        *m = fnv(*m, *d);
    }
}

/// Derive the 64 dataset row indices hashimoto reads for a header.
///
/// `full_size` is the dataset size in bytes for the header's block
/// number, `seal_hash` the Keccak-256 of the header RLP with the PoW
/// fields blanked, and `lookup` resolves a dataset item index to its
/// 16 little-endian 32-bit words. Rows are emitted in access order and
/// may repeat.
pub fn verification_indices<E, L>(
    full_size: u64,
    seal_hash: &[u8; 32],
    nonce: u64,
    mut lookup: L,
) -> Result<Vec<u32>, E>
where
    L: FnMut(u32) -> Result<[u32; HASH_WORDS], E>,
{
    let rows = (full_size / MIX_BYTES as u64) as u32;

    // Combine seal hash and nonce into the 64-byte seed.
    let mut preseed = [0u8; 40];
    preseed[..32].copy_from_slice(seal_hash);
    preseed[32..].copy_from_slice(&nonce.to_le_bytes());
    let seed: [u8; 64] = Keccak512::digest(preseed).into();
    let seed_head = u32::from_le_bytes(seed[..4].try_into().expect("4-byte chunk"));

    // Start the mix with the seed replicated as little-endian words.
    let mut mix = [0u32; MIX_WORDS];
    for (i, m) in mix.iter_mut().enumerate() {
        let at = (i % 16) * 4;
        *m = u32::from_le_bytes(seed[at..at + 4].try_into().expect("4-byte chunk"));
    }

    let mut indices = Vec::with_capacity(LOOP_ACCESSES);
    let mut temp = [0u32; MIX_WORDS];
    for i in 0..LOOP_ACCESSES as u32 {
        let parent = fnv(i ^ seed_head, mix[i as usize % MIX_WORDS]) % rows;
        indices.push(parent);
        for j in 0..(MIX_BYTES / HASH_BYTES) as u32 {
            let item = lookup(2 * parent + j)?;
            temp[j as usize * HASH_WORDS..][..HASH_WORDS].copy_from_slice(&item);
        }
        fnv_hash(&mut mix, &temp);
    }
    trace!(rows, ?indices, "derived hashimoto indices");
    Ok(indices)
}

/// [`verification_indices`] backed by a materialized DAG file.
pub fn dag_indices(
    dag: &mut DagFile,
    full_size: u64,
    seal_hash: &[u8; 32],
    nonce: u64,
) -> EthashResult<Vec<u32>> {
    verification_indices(full_size, seal_hash, nonce, |index| {
        dag.read_node_words(index as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn constant_lookup(index: u32) -> Result<[u32; HASH_WORDS], Infallible> {
        Ok([index; HASH_WORDS])
    }

    #[test]
    fn test_fnv_matches_definition() {
        assert_eq!(fnv(0, 0), 0);
        assert_eq!(fnv(1, 0), FNV_PRIME);
        assert_eq!(fnv(1, 1), FNV_PRIME ^ 1);
        assert_eq!(fnv(0, 0xDEAD_BEEF), 0xDEAD_BEEF);
        // Multiplication wraps.
        assert_eq!(fnv(u32::MAX, 0), u32::MAX.wrapping_mul(FNV_PRIME));
    }

    #[test]
    fn test_fnv_hash_componentwise() {
        let mut mix = [0u32; MIX_WORDS];
        let mut data = [0u32; MIX_WORDS];
        for i in 0..MIX_WORDS {
            mix[i] = i as u32;
            data[i] = (i * 2) as u32;
        }
        let expected: Vec<u32> = (0..MIX_WORDS)
            .map(|i| fnv(i as u32, (i * 2) as u32))
            .collect();
        fnv_hash(&mut mix, &data);
        assert_eq!(mix.to_vec(), expected);
    }

    #[test]
    fn test_yields_exactly_64_in_range_rows() {
        let full_size = 32_768 * MIX_BYTES as u64;
        let indices =
            verification_indices(full_size, &[0x11; 32], 0x1234_5678, constant_lookup).unwrap();
        assert_eq!(indices.len(), LOOP_ACCESSES);
        for &row in &indices {
            assert!(row < 32_768);
        }
    }

    #[test]
    fn test_pure_function_of_inputs() {
        let full_size = 4096 * MIX_BYTES as u64;
        let a = verification_indices(full_size, &[0x22; 32], 7, constant_lookup).unwrap();
        let b = verification_indices(full_size, &[0x22; 32], 7, constant_lookup).unwrap();
        assert_eq!(a, b);

        let other_nonce = verification_indices(full_size, &[0x22; 32], 8, constant_lookup).unwrap();
        assert_ne!(a, other_nonce);

        let other_hash = verification_indices(full_size, &[0x23; 32], 7, constant_lookup).unwrap();
        assert_ne!(a, other_hash);
    }

    #[test]
    fn test_indices_depend_on_dataset_contents() {
        let full_size = 4096 * MIX_BYTES as u64;
        let a = verification_indices(full_size, &[0x33; 32], 1, constant_lookup).unwrap();
        let b = verification_indices(full_size, &[0x33; 32], 1, |index| {
            Ok::<_, Infallible>([index ^ 0xFFFF_FFFF; HASH_WORDS])
        })
        .unwrap();
        // The first access is fixed by the seed alone; later ones mix
        // in fetched dataset items.
        assert_eq!(a[0], b[0]);
        assert_ne!(a[1..], b[1..]);
    }

    #[test]
    fn test_lookup_requests_item_pairs() {
        let full_size = 1024 * MIX_BYTES as u64;
        let mut requested = Vec::new();
        let indices = verification_indices(full_size, &[0x44; 32], 99, |index| {
            requested.push(index);
            Ok::<_, Infallible>([0u32; HASH_WORDS])
        })
        .unwrap();

        assert_eq!(requested.len(), 2 * LOOP_ACCESSES);
        for (k, &row) in indices.iter().enumerate() {
            assert_eq!(requested[2 * k], 2 * row);
            assert_eq!(requested[2 * k + 1], 2 * row + 1);
        }
    }

    #[test]
    fn test_lookup_errors_propagate() {
        let full_size = 1024 * MIX_BYTES as u64;
        let result = verification_indices(full_size, &[0x55; 32], 0, |_| Err("boom"));
        assert_eq!(result.unwrap_err(), "boom");
    }
}
