//! Error types for commitment building and proof assembly.

use std::path::PathBuf;
use thiserror::Error;

use ethproof_ethash::EthashError;
use ethproof_mtree::MtreeError;

/// Prover errors.
#[derive(Error, Debug)]
pub enum ProverError {
    /// No persisted cache exists for the requested epoch. Recoverable
    /// by regenerating the cache, which is an explicit caller
    /// decision.
    #[error("no persisted cache for epoch {epoch} at {path}")]
    CacheNotFound { epoch: u64, path: PathBuf },

    /// Underlying file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted cache could not be encoded or parsed.
    #[error("cache serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persisted cache parsed but contradicts itself or the epoch
    /// geometry.
    #[error("inconsistent cache for epoch {epoch}: {reason}")]
    InconsistentCache { epoch: u64, reason: String },

    /// Merkle tree construction failed.
    #[error("Merkle tree error: {0}")]
    Mtree(#[from] MtreeError),

    /// DAG access or index derivation failed.
    #[error("Ethash error: {0}")]
    Ethash(#[from] EthashError),

    /// The epoch's tree is shallower than the cache level; the upper
    /// cache degenerates and such epochs are rejected.
    #[error("epoch {epoch} unsupported: tree depth {depth} is below the cache level")]
    Unsupported { epoch: u64, depth: u32 },
}

/// Result type for prover operations.
pub type ProverResult<T> = Result<T, ProverError>;
