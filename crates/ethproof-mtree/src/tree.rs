//! Single-pass Merkle tree construction.
//!
//! The builder keeps an ordered buffer of pending subtrees. Every
//! insert appends a leaf-sized subtree and then greedily combines
//! equal-sized neighbors from the tail, so the buffer never holds more
//! than one subtree per tree level. Registered authentication paths
//! ride along on the subtree that currently covers their leaf; when two
//! subtrees combine, each carried path gains the other subtree's digest
//! as a sibling and the maps merge into the survivor.

use std::collections::{HashMap, HashSet};

use crate::branch::Branch;
use crate::error::{MtreeError, MtreeResult};
use crate::hasher::DagHasher;
use crate::types::{hashes_to_branch_elements, BranchElement, Hash, Word};

/// A pending subtree: its digest, the number of nodes it covers in the
/// `2·leaves − 1` convention, and the authentication paths it carries.
struct Subtree {
    digest: Hash,
    node_count: u64,
    branches: HashMap<u32, Branch>,
}

/// Streaming Merkle tree over 128-byte DAG words.
///
/// Leaves are inserted in strictly ascending contiguous index order,
/// then the tree is finalized exactly once. Queries are only valid
/// after finalization. Index and level registration must happen before
/// the first insert.
pub struct MerkleTree {
    hasher: DagHasher,
    pending: Vec<Subtree>,
    finalized: bool,
    registered: HashSet<u32>,
    ordered_indexes: Vec<u32>,
    stored_level: u32,
    export_node_count: u64,
    export_nodes: Vec<Hash>,
    leaf_count: u32,
}

impl MerkleTree {
    /// Create an empty tree using the given hash variant.
    pub fn new(hasher: DagHasher) -> Self {
        Self {
            hasher,
            pending: Vec::new(),
            finalized: false,
            registered: HashSet::new(),
            ordered_indexes: Vec::new(),
            stored_level: 0,
            export_node_count: 0,
            export_nodes: Vec::new(),
            leaf_count: 0,
        }
    }

    /// Create an empty Keccak-256 tree.
    pub fn keccak256() -> Self {
        Self::new(DagHasher::Keccak256)
    }

    /// Create an empty SHA-256 tree.
    pub fn sha256() -> Self {
        Self::new(DagHasher::Sha256)
    }

    /// Configure the exported upper level.
    ///
    /// `depth` is the full tree depth, `level` counts levels below the
    /// root: the `2^level` internal nodes covering `2^(depth − level)`
    /// leaves each are captured left to right in [`export_nodes`].
    /// `level` is also how many topmost siblings
    /// [`proofs_for_registered_indices`] drops from each path, since
    /// the persisted upper cache supplies them.
    ///
    /// [`export_nodes`]: MerkleTree::export_nodes
    /// [`proofs_for_registered_indices`]: MerkleTree::proofs_for_registered_indices
    pub fn register_stored_level(&mut self, depth: u32, level: u32) -> MtreeResult<()> {
        if self.leaf_count > 0 {
            return Err(MtreeError::RegisterAfterInsert);
        }
        if level > depth {
            return Err(MtreeError::InvalidStoredLevel { depth, level });
        }
        self.stored_level = level;
        self.export_node_count = (1u64 << (depth - level + 1)) - 1;
        Ok(())
    }

    /// Register leaf indices whose authentication paths must be
    /// materialized. Duplicates are kept in registration order so
    /// callers can zip proofs back to their accesses.
    pub fn register_index(&mut self, indexes: impl IntoIterator<Item = u32>) -> MtreeResult<()> {
        if self.leaf_count > 0 {
            return Err(MtreeError::RegisterAfterInsert);
        }
        for index in indexes {
            self.registered.insert(index);
            self.ordered_indexes.push(index);
        }
        Ok(())
    }

    /// Insert the next leaf. `index` must equal the number of prior
    /// insertions.
    pub fn insert(&mut self, word: Word, index: u32) -> MtreeResult<()> {
        if self.finalized {
            return Err(MtreeError::InsertAfterFinalize);
        }
        if index != self.leaf_count {
            return Err(MtreeError::OutOfOrderInsert {
                expected: self.leaf_count,
                got: index,
            });
        }
        let digest = self.hasher.element_hash(&word);
        let mut branches = HashMap::new();
        if self.registered.contains(&index) {
            branches.insert(index, Branch::new(word, digest));
        }
        self.leaf_count += 1;
        self.insert_subtree(Subtree {
            digest,
            node_count: 1,
            branches,
        });
        Ok(())
    }

    /// Append a subtree and combine equal-sized neighbors from the
    /// tail.
    fn insert_subtree(&mut self, subtree: Subtree) {
        let mut current = subtree;
        while let Some(left) = self.pending.last() {
            if left.node_count != current.node_count {
                break;
            }
            let mut left = self.pending.pop().expect("tail checked above");
            for branch in left.branches.values_mut() {
                branch.accept_right_sibling(current.digest);
            }
            for branch in current.branches.values_mut() {
                branch.accept_left_sibling(left.digest);
            }
            let combined = self.hasher.node_hash(left.digest, current.digest);
            left.branches.extend(std::mem::take(&mut current.branches));
            left.digest = combined;
            left.node_count = current.node_count * 2 + 1;
            if left.node_count == self.export_node_count {
                self.export_nodes.push(left.digest);
            }
            current = left;
        }
        self.pending.push(current);
    }

    /// Collapse the pending buffer to a single subtree by repeatedly
    /// duplicating the rightmost subtree's digest, mirroring Ethash's
    /// convention for unbalanced trees. Idempotent.
    pub fn finalize(&mut self) -> MtreeResult<()> {
        if self.finalized {
            return Ok(());
        }
        if self.pending.is_empty() {
            return Err(MtreeError::EmptyTree);
        }
        while self.pending.len() > 1 {
            let last = self.pending.last().expect("buffer is non-empty");
            // The duplicate carries no branches; it only pads the
            // right edge.
            let dummy = Subtree {
                digest: last.digest,
                node_count: last.node_count,
                branches: HashMap::new(),
            };
            self.insert_subtree(dummy);
        }
        self.finalized = true;
        Ok(())
    }

    fn finalized_root_subtree(&self) -> MtreeResult<&Subtree> {
        if !self.finalized {
            return Err(MtreeError::NotFinalized);
        }
        self.pending.first().ok_or(MtreeError::EmptyTree)
    }

    /// The tree root.
    pub fn root(&self) -> MtreeResult<Hash> {
        Ok(self.finalized_root_subtree()?.digest)
    }

    /// The captured authentication paths, keyed by registered index.
    pub fn branches(&self) -> MtreeResult<&HashMap<u32, Branch>> {
        Ok(&self.finalized_root_subtree()?.branches)
    }

    /// Upper-level nodes captured at the registered stored level, left
    /// to right.
    pub fn export_nodes(&self) -> &[Hash] {
        &self.export_nodes
    }

    /// Registered indices in registration order, duplicates preserved.
    pub fn indices(&self) -> &[u32] {
        &self.ordered_indexes
    }

    /// The registered stored level.
    pub fn stored_level(&self) -> u32 {
        self.stored_level
    }

    /// Number of leaves inserted so far.
    pub fn leaf_count(&self) -> u32 {
        self.leaf_count
    }

    /// Sibling paths for every registered index, in registration
    /// order. Each path starts at the leaf-level sibling and omits the
    /// topmost `stored_level` entries, which the persisted upper cache
    /// supplies.
    pub fn proofs_for_registered_indices(&self) -> MtreeResult<Vec<Vec<Hash>>> {
        let root = self.finalized_root_subtree()?;
        let mut result = Vec::with_capacity(self.ordered_indexes.len());
        for &index in &self.ordered_indexes {
            let branch = root
                .branches
                .get(&index)
                .ok_or(MtreeError::BranchMissing(index))?;
            let nodes = branch.to_node_array();
            let siblings = &nodes[1..];
            let keep = siblings
                .len()
                .checked_sub(self.stored_level as usize)
                .ok_or(MtreeError::BranchTooShort {
                    index,
                    len: siblings.len(),
                    stored_level: self.stored_level,
                })?;
            result.push(siblings[..keep].to_vec());
        }
        Ok(result)
    }

    /// All sibling paths flattened into serialized proof elements, in
    /// registration order.
    pub fn all_branches_array(&self) -> MtreeResult<Vec<BranchElement>> {
        let mut result = Vec::new();
        for proof in self.proofs_for_registered_indices()? {
            result.extend(hashes_to_branch_elements(&proof));
        }
        Ok(result)
    }

    /// The raw 128-byte words for every registered index, in
    /// registration order.
    pub fn all_dag_elements(&self) -> MtreeResult<Vec<Word>> {
        let root = self.finalized_root_subtree()?;
        self.ordered_indexes
            .iter()
            .map(|&index| {
                root.branches
                    .get(&index)
                    .map(|b| *b.raw_word())
                    .ok_or(MtreeError::BranchMissing(index))
            })
            .collect()
    }
}
