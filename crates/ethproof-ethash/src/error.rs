//! Error types for DAG file access and index derivation.

use std::path::PathBuf;
use thiserror::Error;

/// Ethash support errors.
#[derive(Error, Debug)]
pub enum EthashError {
    /// Underlying file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The DAG file for an epoch is not materialized.
    #[error("DAG file missing: {path}")]
    DagMissing { path: PathBuf },

    /// The DAG file does not have the expected shape.
    #[error("malformed DAG file: {reason}")]
    MalformedDag { reason: String },

    /// A dataset item index points past the end of the DAG.
    #[error("dataset item {index} out of range, DAG holds {nodes} items")]
    NodeOutOfRange { index: u64, nodes: u64 },
}

/// Result type for Ethash support operations.
pub type EthashResult<T> = Result<T, EthashError>;
