//! # ethproof-prover
//!
//! Per-epoch Merkle commitments over the Ethash DAG and membership
//! proofs against them.
//!
//! For each epoch the builder streams the materialized DAG once,
//! commits to its 128-byte words with a SHA-256 domain tree, and
//! persists the root together with an upper cache: for each of the
//! `2^15` subtrees rooted 15 levels below the root, the sibling path
//! from that subtree up to the root. At proof time only the one
//! subtree covering a requested leaf is rebuilt from the DAG; its
//! fresh sibling path concatenated with the persisted upper path forms
//! the full authentication path an on-chain verifier checks.
//!
//! This crate provides:
//! - The persisted [`EpochCache`] record and its JSON [`CacheDir`]
//!   store
//! - The epoch commitment builder ([`calculate_dataset_merkle_root`])
//! - The proof assembler ([`calculate_proof`]) and the relayer-style
//!   per-header output ([`BlockProof`])
//! - A [`Prover`] orchestrator that memoizes loaded epoch caches

mod cache;
mod config;
mod error;
mod geometry;
mod proof;
mod prover;
mod relay;
mod root;

pub use cache::{CacheDir, EpochCache};
pub use config::ProverConfig;
pub use error::{ProverError, ProverResult};
pub use geometry::EpochGeometry;
pub use proof::{calculate_proof, proof_from_dag};
pub use prover::Prover;
pub use relay::{assemble_block_proof, block_proof_from_dag, BlockProof};
pub use root::{build_epoch_cache_from_dag, calculate_dataset_merkle_root, merkle_root_from_dag};

/// Number of upper tree levels covered by the persisted cache.
pub const CACHE_LEVEL: u32 = 15;
