//! Test data generators for integration tests.
//!
//! Provides deterministic synthetic DAG words and files so the epoch
//! pipeline can be exercised without materializing a real multi-GiB
//! dataset.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use ethproof_mtree::{Branch, DagHasher, Hash, Word, WORD_LENGTH};

/// Deterministic 128-byte word for a leaf index, a cheap xorshift fill
/// so neighboring leaves differ in every byte.
pub fn test_word(index: u64) -> Word {
    let mut state = index.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    let mut bytes = [0u8; WORD_LENGTH];
    for chunk in bytes.chunks_mut(8) {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        chunk.copy_from_slice(&state.to_le_bytes());
    }
    Word(bytes)
}

/// Write a synthetic DAG file: an 8-byte magic prefix followed by
/// `words` 128-byte words generated by [`test_word`].
pub fn write_dag_file(path: &Path, words: u64) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(&[0xFE, 0xCA, 0xDD, 0xBA, 0xAD, 0xDE, 0xE1, 0xFE])?;
    for i in 0..words {
        out.write_all(&test_word(i).0)?;
    }
    out.flush()
}

/// Fold an authentication path up to the root, taking sibling sides
/// from the bits of the leaf index: bit `j` set means the element is
/// the right child at level `j`.
pub fn fold_path(hasher: DagHasher, index: u32, leaf: Hash, path: &[Hash]) -> Hash {
    let mut acc = leaf;
    for (level, sibling) in path.iter().enumerate() {
        acc = if (index >> level) & 1 == 1 {
            hasher.node_hash(*sibling, acc)
        } else {
            hasher.node_hash(acc, *sibling)
        };
    }
    acc
}

/// Fold a captured [`Branch`] using its recorded side flags.
pub fn fold_branch(hasher: DagHasher, branch: &Branch) -> Hash {
    let mut acc = branch.leaf_hash();
    for step in branch.steps() {
        acc = if step.element_on_the_left {
            hasher.node_hash(acc, step.sibling)
        } else {
            hasher.node_hash(step.sibling, acc)
        };
    }
    acc
}
