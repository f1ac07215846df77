//! Error types for Merkle tree construction and queries.

use thiserror::Error;

/// Merkle tree invariant violations.
///
/// All variants are programmer errors in the calling sequence; the tree
/// never recovers from them internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MtreeError {
    /// Leaf inserted with a non-contiguous index.
    #[error("out-of-order insert: expected leaf index {expected}, got {got}")]
    OutOfOrderInsert { expected: u32, got: u32 },

    /// Leaf inserted after the tree was finalized.
    #[error("insert after finalize")]
    InsertAfterFinalize,

    /// Registration attempted after leaves were already inserted.
    #[error("registration must happen before the first insert")]
    RegisterAfterInsert,

    /// Stored level registered deeper than the tree itself.
    #[error("stored level {level} exceeds tree depth {depth}")]
    InvalidStoredLevel { depth: u32, level: u32 },

    /// Tree queried before `finalize` was called.
    #[error("tree not finalized")]
    NotFinalized,

    /// `finalize` called on a tree with no leaves.
    #[error("cannot finalize an empty tree")]
    EmptyTree,

    /// A registered leaf index was never inserted.
    #[error("no branch captured for registered index {0}")]
    BranchMissing(u32),

    /// A captured branch is shorter than the configured stored level.
    #[error("branch for index {index} has {len} siblings, stored level is {stored_level}")]
    BranchTooShort {
        index: u32,
        len: usize,
        stored_level: u32,
    },
}

/// Result type for Merkle tree operations.
pub type MtreeResult<T> = Result<T, MtreeError>;
