//! # ethproof-mtree
//!
//! Streaming Merkle tree over Ethash DAG words.
//!
//! This crate provides:
//! - Fixed-size wire types: 128-byte DAG [`Word`]s, 16-byte node
//!   [`Hash`]es and 32-byte [`BranchElement`]s
//! - The domain hashing scheme shared with the on-chain verifier
//!   ([`DagHasher`]): per-32-byte-lane endian reversal on leaves,
//!   zero-padded child digests on internal nodes, truncation of every
//!   digest to its upper 16 bytes
//! - A single-pass [`MerkleTree`] builder that folds leaves left to
//!   right, materializing authentication paths only for registered leaf
//!   indices and capturing one configurable upper level of aggregated
//!   nodes
//!
//! The tree is fed leaves in strictly ascending index order, finalized
//! exactly once (unbalanced trees are padded by duplicating the
//! rightmost subtree), and immutable afterwards. Peak memory is
//! `O(log N)` pending subtrees plus `O(K log N)` for `K` registered
//! branches.

mod branch;
mod error;
mod hasher;
mod tree;
mod types;

pub use branch::{Branch, BranchStep};
pub use error::{MtreeError, MtreeResult};
pub use hasher::DagHasher;
pub use tree::MerkleTree;
pub use types::{
    hashes_to_branch_elements, BranchElement, Hash, Word, BRANCH_ELEMENT_LENGTH, HASH_LENGTH,
    WORD_LENGTH,
};
