//! Property-based tests using proptest.
//!
//! These verify the universal invariants of the Merkle engine and the
//! index derivation over randomly generated inputs with shrinking
//! support.

use proptest::prelude::*;

use crate::generators::{fold_branch, test_word};
use ethproof_ethash::{params, verification_indices};
use ethproof_mtree::{DagHasher, Hash, MerkleTree, Word, HASH_LENGTH, WORD_LENGTH};

/// Arbitrary 128-byte words, built from a compact byte seed.
fn arb_word() -> impl Strategy<Value = Word> {
    prop::array::uniform32(any::<u8>()).prop_map(|seed| {
        let mut bytes = [0u8; WORD_LENGTH];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = seed[i % 32].wrapping_add((i / 32) as u8);
        }
        Word(bytes)
    })
}

/// Arbitrary hash variant.
fn arb_hasher() -> impl Strategy<Value = DagHasher> {
    prop_oneof![Just(DagHasher::Keccak256), Just(DagHasher::Sha256)]
}

/// Arbitrary 32-byte seal hashes.
fn arb_seal_hash() -> impl Strategy<Value = [u8; 32]> {
    prop::array::uniform32(any::<u8>())
}

proptest! {
    /// Every registered branch folds up to the root with its recorded
    /// side flags.
    #[test]
    fn branch_folds_to_root(
        hasher in arb_hasher(),
        leaf_count in 1u32..=48,
        index_seed in any::<u32>(),
    ) {
        let index = index_seed % leaf_count;
        let mut tree = MerkleTree::new(hasher);
        tree.register_index([index]).unwrap();
        for i in 0..leaf_count {
            tree.insert(test_word(i as u64), i).unwrap();
        }
        tree.finalize().unwrap();

        let root = tree.root().unwrap();
        let branches = tree.branches().unwrap();
        prop_assert_eq!(fold_branch(hasher, &branches[&index]), root);
    }

    /// Streaming an unbalanced tree equals explicitly padding it by
    /// repeating the last leaf up to the next power of two.
    #[test]
    fn padding_equals_leaf_repetition(
        hasher in arb_hasher(),
        leaf_count in 1u32..=40,
    ) {
        let mut streamed = MerkleTree::new(hasher);
        for i in 0..leaf_count {
            streamed.insert(test_word(i as u64), i).unwrap();
        }
        streamed.finalize().unwrap();

        let padded_len = leaf_count.next_power_of_two();
        let mut padded = MerkleTree::new(hasher);
        for i in 0..padded_len {
            let source = i.min(leaf_count - 1) as u64;
            padded.insert(test_word(source), i).unwrap();
        }
        padded.finalize().unwrap();

        prop_assert_eq!(streamed.root().unwrap(), padded.root().unwrap());
    }

    /// Two builds over the same leaves with the same registrations
    /// produce identical roots, proofs and export nodes.
    #[test]
    fn rebuild_is_deterministic(
        hasher in arb_hasher(),
        leaf_count in 2u32..=32,
        index_seed in any::<u32>(),
    ) {
        let build = || {
            let mut tree = MerkleTree::new(hasher);
            tree.register_stored_level(6, 2).unwrap();
            tree.register_index([index_seed % leaf_count]).unwrap();
            for i in 0..leaf_count {
                tree.insert(test_word(i as u64), i).unwrap();
            }
            tree.finalize().unwrap();
            (
                tree.root().unwrap(),
                tree.proofs_for_registered_indices().unwrap(),
                tree.export_nodes().to_vec(),
            )
        };
        prop_assert_eq!(build(), build());
    }

    /// Element hashes are 16 bytes of the upper half of the digest and
    /// depend on the word.
    #[test]
    fn element_hash_shape(hasher in arb_hasher(), word in arb_word()) {
        let digest = hasher.element_hash(&word);
        prop_assert_eq!(digest.0.len(), HASH_LENGTH);

        let mut flipped = word;
        flipped.0[0] ^= 0x01;
        prop_assert_ne!(hasher.element_hash(&flipped), digest);
    }

    /// Index derivation is a pure function of its inputs and always
    /// yields exactly 64 in-range rows.
    #[test]
    fn index_derivation_is_pure_and_in_range(
        seal_hash in arb_seal_hash(),
        nonce in any::<u64>(),
        rows in 512u64..=65_536,
    ) {
        let full_size = rows * params::MIX_BYTES as u64;
        let lookup = |i: u32| Ok::<_, ()>([i.wrapping_mul(31); params::HASH_WORDS]);

        let a = verification_indices(full_size, &seal_hash, nonce, lookup).unwrap();
        let b = verification_indices(full_size, &seal_hash, nonce, lookup).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.len(), params::LOOP_ACCESSES);
        for &row in &a {
            prop_assert!((row as u64) < rows);
        }
    }

    /// The persisted cache record survives a JSON round trip
    /// byte-for-byte in every semantic field.
    #[test]
    fn cache_record_roundtrips(
        epoch in 0u64..=600,
        root_seed in any::<u8>(),
    ) {
        use ethproof_prover::{EpochCache, CACHE_LEVEL};

        let proofs: Vec<Vec<Hash>> = (0..4u8)
            .map(|slot| {
                (0..CACHE_LEVEL)
                    .map(|level| Hash([slot.wrapping_add(level as u8); HASH_LENGTH]))
                    .collect()
            })
            .collect();
        let cache = EpochCache {
            epoch,
            proof_length: 23,
            cache_length: CACHE_LEVEL as u64,
            root_hash: Hash([root_seed; HASH_LENGTH]),
            proofs,
        };
        let json = serde_json::to_string(&cache).unwrap();
        let back: EpochCache = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, cache);
    }
}
