//! Persisted per-epoch cache: the committed root and the upper sibling
//! paths.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use ethproof_mtree::Hash;

use crate::error::{ProverError, ProverResult};
use crate::CACHE_LEVEL;

/// The semantic record persisted once per epoch.
///
/// `proofs[k]` is the sibling path of the `k`-th upper-cache subtree,
/// from depth `cache_length` up to (but excluding) the root:
/// `cache_length` digests. Concatenated after a freshly rebuilt lower
/// path of `proof_length − cache_length` digests it authenticates any
/// leaf under slot `k` against `root_hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochCache {
    /// Epoch number.
    pub epoch: u64,
    /// Branch depth of the full tree.
    pub proof_length: u64,
    /// Number of upper levels the persisted paths cover.
    pub cache_length: u64,
    /// The committed tree root.
    pub root_hash: Hash,
    /// Upper sibling paths, one per cache slot, left to right.
    pub proofs: Vec<Vec<Hash>>,
}

impl EpochCache {
    /// Check internal consistency of a (possibly just parsed) cache.
    pub fn validate(&self) -> ProverResult<()> {
        let inconsistent = |reason: String| ProverError::InconsistentCache {
            epoch: self.epoch,
            reason,
        };
        if self.cache_length != CACHE_LEVEL as u64 {
            return Err(inconsistent(format!(
                "cache_length {} != {}",
                self.cache_length, CACHE_LEVEL
            )));
        }
        if self.proof_length <= self.cache_length {
            return Err(inconsistent(format!(
                "proof_length {} not above cache_length {}",
                self.proof_length, self.cache_length
            )));
        }
        if self.proofs.is_empty() || self.proofs.len() as u64 > 1 << self.cache_length {
            return Err(inconsistent(format!(
                "{} proof entries, expected between 1 and {}",
                self.proofs.len(),
                1u64 << self.cache_length
            )));
        }
        for (k, proof) in self.proofs.iter().enumerate() {
            if proof.len() as u64 != self.cache_length {
                return Err(inconsistent(format!(
                    "proof {} has {} siblings, expected {}",
                    k,
                    proof.len(),
                    self.cache_length
                )));
            }
        }
        Ok(())
    }
}

/// A directory of per-epoch cache files, one JSON file per epoch.
/// Single-writer: concurrent writers to the same directory are not
/// supported.
#[derive(Debug, Clone)]
pub struct CacheDir {
    dir: PathBuf,
}

impl CacheDir {
    /// Wrap a cache directory. Created on first persist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory itself.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the cache for an epoch lives at.
    pub fn path_to_cache(&self, epoch: u64) -> PathBuf {
        self.dir.join(format!("{}.json", epoch))
    }

    /// Write a cache, replacing any previous file for its epoch.
    pub fn persist(&self, cache: &EpochCache) -> ProverResult<()> {
        cache.validate()?;
        fs::create_dir_all(&self.dir)?;
        let path = self.path_to_cache(cache.epoch);
        let content = serde_json::to_vec(cache)?;
        fs::write(&path, content)?;
        info!(epoch = cache.epoch, path = %path.display(), "persisted epoch cache");
        Ok(())
    }

    /// Load and validate the cache for an epoch.
    pub fn load(&self, epoch: u64) -> ProverResult<EpochCache> {
        let path = self.path_to_cache(epoch);
        let content = fs::read(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                ProverError::CacheNotFound {
                    epoch,
                    path: path.clone(),
                }
            } else {
                ProverError::Io(e)
            }
        })?;
        let cache: EpochCache = serde_json::from_slice(&content)?;
        if cache.epoch != epoch {
            return Err(ProverError::InconsistentCache {
                epoch,
                reason: format!("file claims epoch {}", cache.epoch),
            });
        }
        cache.validate()?;
        debug!(epoch, path = %path.display(), slots = cache.proofs.len(), "loaded epoch cache");
        Ok(cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethproof_mtree::HASH_LENGTH;

    fn sample_cache(epoch: u64) -> EpochCache {
        let proof: Vec<Hash> = (0..CACHE_LEVEL)
            .map(|i| Hash([i as u8; HASH_LENGTH]))
            .collect();
        EpochCache {
            epoch,
            proof_length: 23,
            cache_length: CACHE_LEVEL as u64,
            root_hash: Hash([0xAB; HASH_LENGTH]),
            proofs: vec![proof.clone(), proof],
        }
    }

    #[test]
    fn test_roundtrip_is_identical() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheDir::new(dir.path());
        let cache = sample_cache(7);
        store.persist(&cache).unwrap();
        let loaded = store.load(7).unwrap();
        assert_eq!(loaded, cache);
    }

    #[test]
    fn test_missing_cache_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheDir::new(dir.path());
        assert!(matches!(
            store.load(3),
            Err(ProverError::CacheNotFound { epoch: 3, .. })
        ));
    }

    #[test]
    fn test_epoch_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheDir::new(dir.path());
        let cache = sample_cache(7);
        store.persist(&cache).unwrap();
        // Rename the file so the claimed epoch disagrees.
        fs::rename(store.path_to_cache(7), store.path_to_cache(8)).unwrap();
        assert!(matches!(
            store.load(8),
            Err(ProverError::InconsistentCache { .. })
        ));
    }

    #[test]
    fn test_garbage_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheDir::new(dir.path());
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.path_to_cache(1), b"not json").unwrap();
        assert!(matches!(
            store.load(1),
            Err(ProverError::Serialization(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_shapes() {
        let mut wrong_level = sample_cache(0);
        wrong_level.cache_length = 10;
        assert!(wrong_level.validate().is_err());

        let mut shallow = sample_cache(0);
        shallow.proof_length = CACHE_LEVEL as u64;
        assert!(shallow.validate().is_err());

        let mut empty = sample_cache(0);
        empty.proofs.clear();
        assert!(empty.validate().is_err());

        let mut ragged = sample_cache(0);
        ragged.proofs[1].pop();
        assert!(ragged.validate().is_err());

        assert!(sample_cache(0).validate().is_ok());
    }

    #[test]
    fn test_persist_replaces_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheDir::new(dir.path());
        let mut cache = sample_cache(4);
        store.persist(&cache).unwrap();
        cache.root_hash = Hash([0xCD; HASH_LENGTH]);
        store.persist(&cache).unwrap();
        assert_eq!(store.load(4).unwrap().root_hash, cache.root_hash);
    }
}
