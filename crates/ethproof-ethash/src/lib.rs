//! # ethproof-ethash
//!
//! Ethash support for DAG Merkle proofs.
//!
//! This crate provides:
//! - Epoch geometry: dataset sizes from the growth formula, epoch seed
//!   hashes and the canonical DAG file naming
//! - Read-only access to materialized DAG files (64-byte dataset items
//!   and 128-byte Merkle words behind the 8-byte magic prefix)
//! - Hashimoto index derivation: the exact sequence of 64 DAG rows a
//!   header evaluation touches, for a given seal hash and nonce
//!
//! Dataset *generation* is deliberately out of scope; the DAG is
//! expected to be materialized by an external Ethash implementation
//! (geth's `full-R23-*` files). Index derivation reads the dataset
//! items it needs straight from that file instead of regenerating them
//! from the light cache.

mod dag;
mod error;
mod indices;
mod seed;
mod size;

pub use dag::{DagFile, WordStream};
pub use error::{EthashError, EthashResult};
pub use indices::{dag_indices, fnv, fnv_hash, verification_indices};
pub use seed::{dag_file_name, seed_hash, DagDir};
pub use size::{dataset_size, epoch_of_block};

/// Ethash network parameters.
pub mod params {
    /// Blocks per epoch; every block of an epoch shares one DAG.
    pub const EPOCH_LENGTH: u64 = 30_000;

    /// Width of the hashimoto mix in bytes, and of one Merkle word.
    pub const MIX_BYTES: usize = 128;

    /// Size of one dataset item in bytes.
    pub const HASH_BYTES: usize = 64;

    /// 32-bit words per dataset item.
    pub const HASH_WORDS: usize = 16;

    /// 32-bit words in the hashimoto mix.
    pub const MIX_WORDS: usize = MIX_BYTES / 4;

    /// Dataset rows touched per header evaluation.
    pub const LOOP_ACCESSES: usize = 64;

    /// Dataset size at epoch 0, before the primality adjustment.
    pub const DATASET_BYTES_INIT: u64 = 1 << 30;

    /// Dataset growth per epoch, before the primality adjustment.
    pub const DATASET_BYTES_GROWTH: u64 = 1 << 23;

    /// Length of the magic prefix of a materialized DAG file.
    pub const DAG_MAGIC_LENGTH: u64 = 8;

    /// Ethash algorithm revision, part of the DAG file name.
    pub const ETHASH_REVISION: u32 = 23;
}
