//! Epoch commitment builder: one streaming pass over the DAG.

use tracing::{debug, info};

use ethproof_ethash::{DagDir, DagFile, EthashError};
use ethproof_mtree::{Hash, MerkleTree};

use crate::cache::{CacheDir, EpochCache};
use crate::error::{ProverError, ProverResult};
use crate::geometry::EpochGeometry;
use crate::CACHE_LEVEL;

/// Build the epoch commitment for `epoch` from its materialized DAG
/// and return the root. With `save_cache` the upper cache is captured
/// in the same pass and persisted to `cache_dir`, replacing any
/// previous file.
pub fn calculate_dataset_merkle_root(
    epoch: u64,
    save_cache: bool,
    dag_dir: &DagDir,
    cache_dir: &CacheDir,
) -> ProverResult<Hash> {
    let geometry = EpochGeometry::for_epoch(epoch);
    let path = dag_dir.path_to_dag(epoch);
    info!(
        epoch,
        path = %path.display(),
        words = geometry.word_count,
        depth = geometry.depth,
        save_cache,
        "building epoch commitment"
    );
    let mut dag = DagFile::open(&path)?;
    check_dag_covers_epoch(&dag, &geometry)?;

    if save_cache {
        let cache = build_epoch_cache_from_dag(&mut dag, &geometry, epoch)?;
        cache_dir.persist(&cache)?;
        Ok(cache.root_hash)
    } else {
        merkle_root_from_dag(&mut dag, &geometry)
    }
}

/// Root-only build, without branch capture.
pub fn merkle_root_from_dag(dag: &mut DagFile, geometry: &EpochGeometry) -> ProverResult<Hash> {
    let mut tree = MerkleTree::sha256();
    tree.register_stored_level(geometry.depth, 0)?;
    insert_words(dag, 0, geometry.word_count, &mut tree)?;
    tree.finalize()?;
    Ok(tree.root()?)
}

/// Build the full persisted record for an epoch: root plus one upper
/// sibling path per cache slot.
///
/// Registers the left-most leaf under each of the `2^15` upper
/// subtrees, streams every word, then keeps only the topmost
/// `CACHE_LEVEL` siblings of each captured path; the lower part is
/// rebuilt live at proof time. Takes an explicit geometry so tests can
/// run it against small synthetic DAGs.
pub fn build_epoch_cache_from_dag(
    dag: &mut DagFile,
    geometry: &EpochGeometry,
    epoch: u64,
) -> ProverResult<EpochCache> {
    if geometry.depth < CACHE_LEVEL {
        return Err(ProverError::Unsupported {
            epoch,
            depth: geometry.depth,
        });
    }
    let live_level = geometry.live_level();

    let mut tree = MerkleTree::sha256();
    tree.register_stored_level(geometry.depth, 0)?;

    // One registered index per cache slot that contains at least one
    // real leaf; the trailing slots of a short epoch are dropped.
    let mut indices = Vec::new();
    for k in 0..1u64 << CACHE_LEVEL {
        let leaf = k << live_level;
        if leaf >= geometry.word_count {
            break;
        }
        indices.push(leaf as u32);
    }
    debug!(epoch, slots = indices.len(), live_level, "registered cache slots");
    tree.register_index(indices)?;

    insert_words(dag, 0, geometry.word_count, &mut tree)?;
    tree.finalize()?;

    let root = tree.root()?;
    let mut proofs = Vec::new();
    for path in tree.proofs_for_registered_indices()? {
        proofs.push(path[live_level as usize..].to_vec());
    }

    Ok(EpochCache {
        epoch,
        proof_length: geometry.depth as u64,
        cache_length: CACHE_LEVEL as u64,
        root_hash: root,
        proofs,
    })
}

/// Stream `count` words starting at `start_word` into the tree, leaf
/// indices counted from zero.
pub(crate) fn insert_words(
    dag: &mut DagFile,
    start_word: u64,
    count: u64,
    tree: &mut MerkleTree,
) -> ProverResult<()> {
    let mut index = 0u32;
    for word in dag.words(start_word, count)? {
        tree.insert(word?, index)?;
        index += 1;
    }
    Ok(())
}

/// A DAG file shorter than the epoch's dataset would silently commit
/// to a truncated tree; refuse it up front.
pub(crate) fn check_dag_covers_epoch(
    dag: &DagFile,
    geometry: &EpochGeometry,
) -> ProverResult<()> {
    if dag.word_count() < geometry.word_count {
        return Err(ProverError::Ethash(EthashError::MalformedDag {
            reason: format!(
                "DAG holds {} words, epoch needs {}",
                dag.word_count(),
                geometry.word_count
            ),
        }));
    }
    Ok(())
}
