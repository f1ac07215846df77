//! Tree geometry of one epoch.

use ethproof_ethash::{dataset_size, params};
use ethproof_mtree::WORD_LENGTH;

use crate::CACHE_LEVEL;

/// Derived sizes of an epoch's Merkle tree: full dataset size, number
/// of 128-byte leaves, and branch depth (the bit length of
/// `word_count − 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochGeometry {
    /// Dataset size in bytes.
    pub full_size: u64,
    /// Number of 128-byte Merkle leaves.
    pub word_count: u64,
    /// Branch depth of the padded tree.
    pub depth: u32,
}

impl EpochGeometry {
    /// Geometry for the epoch containing a block number.
    pub fn for_block(block_number: u64) -> Self {
        Self::from_full_size(dataset_size(block_number))
    }

    /// Geometry for an epoch number.
    pub fn for_epoch(epoch: u64) -> Self {
        Self::for_block(epoch * params::EPOCH_LENGTH)
    }

    /// Geometry from an explicit dataset size. Exposed so tests can
    /// exercise the builder and assembler against small synthetic
    /// DAGs.
    pub fn from_full_size(full_size: u64) -> Self {
        let word_count = full_size / WORD_LENGTH as u64;
        let depth = match word_count.saturating_sub(1) {
            0 => 1,
            n => 64 - n.leading_zeros(),
        };
        Self {
            full_size,
            word_count,
            depth,
        }
    }

    /// Levels rebuilt live at proof time, below the persisted upper
    /// cache. Only meaningful when `depth >= CACHE_LEVEL`.
    pub fn live_level(&self) -> u32 {
        self.depth - CACHE_LEVEL
    }
}
