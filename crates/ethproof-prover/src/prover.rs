//! Prover orchestrator: memoized epoch caches over the store and the
//! per-header entry point.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use ethproof_ethash::DagDir;
use ethproof_mtree::Hash;

use crate::cache::{CacheDir, EpochCache};
use crate::config::ProverConfig;
use crate::error::{ProverError, ProverResult};
use crate::relay::{assemble_block_proof, BlockProof};
use crate::root::calculate_dataset_merkle_root;

/// Long-lived prover over one DAG directory and one cache directory.
///
/// Loaded epoch caches are memoized process-wide behind a lock; the
/// map is the only shared state and the underlying files are
/// single-writer, so independent provers must use disjoint cache
/// directories.
pub struct Prover {
    config: ProverConfig,
    dag_dir: DagDir,
    cache_dir: CacheDir,
    caches: RwLock<HashMap<u64, Arc<EpochCache>>>,
}

impl Prover {
    /// Create a prover over the configured directories.
    pub fn new(config: ProverConfig) -> Self {
        let dag_dir = DagDir::new(&config.dag_dir);
        let cache_dir = CacheDir::new(&config.cache_dir);
        Self {
            config,
            dag_dir,
            cache_dir,
            caches: RwLock::new(HashMap::new()),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &ProverConfig {
        &self.config
    }

    /// The DAG directory the prover reads from.
    pub fn dag_dir(&self) -> &DagDir {
        &self.dag_dir
    }

    /// The cache store the prover loads from and persists to.
    pub fn cache_dir(&self) -> &CacheDir {
        &self.cache_dir
    }

    /// The persisted cache for an epoch, loaded at most once.
    /// A missing cache surfaces as [`ProverError::CacheNotFound`];
    /// regeneration is explicit via [`ensure_epoch_cache`].
    ///
    /// [`ensure_epoch_cache`]: Prover::ensure_epoch_cache
    pub fn epoch_cache(&self, epoch: u64) -> ProverResult<Arc<EpochCache>> {
        if let Some(cache) = self.caches.read().get(&epoch) {
            return Ok(Arc::clone(cache));
        }
        let cache = Arc::new(self.cache_dir.load(epoch)?);
        self.caches
            .write()
            .entry(epoch)
            .or_insert_with(|| Arc::clone(&cache));
        Ok(cache)
    }

    /// The persisted cache for an epoch, building and persisting it
    /// from the DAG when absent. The build is a whole-DAG scan, which
    /// is why it only happens on this explicit path.
    pub fn ensure_epoch_cache(&self, epoch: u64) -> ProverResult<Arc<EpochCache>> {
        match self.epoch_cache(epoch) {
            Ok(cache) => Ok(cache),
            Err(ProverError::CacheNotFound { .. }) => {
                warn!(epoch, "epoch cache missing, regenerating from DAG");
                self.build_epoch(epoch, true)?;
                self.epoch_cache(epoch)
            }
            Err(e) => Err(e),
        }
    }

    /// Build the epoch commitment, optionally persisting the cache.
    /// Drops any memoized copy so the next load sees the new file.
    pub fn build_epoch(&self, epoch: u64, save_cache: bool) -> ProverResult<Hash> {
        let root = calculate_dataset_merkle_root(epoch, save_cache, &self.dag_dir, &self.cache_dir)?;
        self.caches.write().remove(&epoch);
        info!(epoch, root = %root, "epoch commitment built");
        Ok(root)
    }

    /// Assemble the full proof bundle for one header against its
    /// epoch's persisted cache.
    pub fn proof_for_header(
        &self,
        header_rlp: &[u8],
        block_number: u64,
        seal_hash: &[u8; 32],
        nonce: u64,
    ) -> ProverResult<BlockProof> {
        let epoch = block_number / ethproof_ethash::params::EPOCH_LENGTH;
        let cache = self.epoch_cache(epoch)?;
        assemble_block_proof(
            header_rlp,
            block_number,
            seal_hash,
            nonce,
            &cache,
            &self.dag_dir,
        )
    }

    /// Paths of the DAG and cache files for epoch `current − 2`, the
    /// ones a relayer typically deletes once `current` is being
    /// processed. Deletion is the caller's policy, not the prover's.
    pub fn stale_artifact_paths(&self, current_epoch: u64) -> Option<(PathBuf, PathBuf)> {
        let stale = current_epoch.checked_sub(2)?;
        Some((
            self.dag_dir.path_to_dag(stale),
            self.cache_dir.path_to_cache(stale),
        ))
    }
}
