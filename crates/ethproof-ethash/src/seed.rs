//! Epoch seed hashes and DAG file naming.

use sha3::{Digest, Keccak256};
use std::path::{Path, PathBuf};

use crate::params;

/// Seed hash of an epoch: Keccak-256 iterated `epoch` times over 32
/// zero bytes.
pub fn seed_hash(epoch: u64) -> [u8; 32] {
    let mut seed = [0u8; 32];
    for _ in 0..epoch {
        seed = Keccak256::digest(seed).into();
    }
    seed
}

/// Canonical file name of a materialized DAG, `full-R<rev>-<seed8>`.
pub fn dag_file_name(epoch: u64) -> String {
    let seed = seed_hash(epoch);
    format!(
        "full-R{}-{}",
        params::ETHASH_REVISION,
        hex::encode(&seed[..8])
    )
}

/// A directory holding materialized DAG files, one per epoch.
#[derive(Debug, Clone)]
pub struct DagDir {
    dir: PathBuf,
}

impl DagDir {
    /// Wrap an existing DAG directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory itself.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the DAG for an epoch lives at. The file may or may not be
    /// materialized; callers decide how to handle a miss.
    pub fn path_to_dag(&self, epoch: u64) -> PathBuf {
        self.dir.join(dag_file_name(epoch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_hash_epoch_zero_is_zero() {
        assert_eq!(seed_hash(0), [0u8; 32]);
    }

    #[test]
    fn test_seed_hash_epoch_one() {
        // Keccak-256 of 32 zero bytes.
        assert_eq!(
            hex::encode(seed_hash(1)),
            "290decd9548b62a8d60345a988386fc84ba6bc95484008f6362f93160ef3e563"
        );
    }

    #[test]
    fn test_seed_hash_is_iterated() {
        let two: [u8; 32] = Keccak256::digest(seed_hash(1)).into();
        assert_eq!(seed_hash(2), two);
    }

    #[test]
    fn test_dag_file_name_shape() {
        let name = dag_file_name(0);
        assert_eq!(name, "full-R23-0000000000000000");
        assert!(dag_file_name(1).starts_with("full-R23-290decd9"));
    }

    #[test]
    fn test_path_to_dag() {
        let dir = DagDir::new("/tmp/ethash");
        assert_eq!(
            dir.path_to_dag(0),
            PathBuf::from("/tmp/ethash/full-R23-0000000000000000")
        );
    }
}
