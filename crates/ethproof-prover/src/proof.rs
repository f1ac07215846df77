//! Proof assembly: fresh lower subtree plus persisted upper path.

use tracing::debug;

use ethproof_ethash::{epoch_of_block, DagDir, DagFile};
use ethproof_mtree::{Hash, MerkleTree, Word};

use crate::cache::EpochCache;
use crate::error::{ProverError, ProverResult};
use crate::geometry::EpochGeometry;
use crate::root::insert_words;
use crate::CACHE_LEVEL;

/// Produce the DAG element at leaf `index` and its full authentication
/// path against the epoch's committed root.
///
/// Only the subtree of `2^(depth − 15)` leaves covering `index` is
/// rebuilt from the DAG; the persisted cache supplies the remaining
/// 15 siblings up to the root. Sibling sides follow the bits of
/// `index`: bit `j` set means the element is the right child at level
/// `j`.
pub fn calculate_proof(
    block_number: u64,
    index: u32,
    cache: &EpochCache,
    dag_dir: &DagDir,
) -> ProverResult<(Word, Vec<Hash>)> {
    let geometry = EpochGeometry::for_block(block_number);
    let epoch = epoch_of_block(block_number);
    let mut dag = DagFile::open(dag_dir.path_to_dag(epoch))?;
    proof_from_dag(&mut dag, &geometry, index, cache)
}

/// [`calculate_proof`] against an already open DAG file with explicit
/// geometry.
pub fn proof_from_dag(
    dag: &mut DagFile,
    geometry: &EpochGeometry,
    index: u32,
    cache: &EpochCache,
) -> ProverResult<(Word, Vec<Hash>)> {
    if geometry.depth < CACHE_LEVEL {
        return Err(ProverError::Unsupported {
            epoch: cache.epoch,
            depth: geometry.depth,
        });
    }
    if cache.proof_length != geometry.depth as u64 {
        return Err(ProverError::InconsistentCache {
            epoch: cache.epoch,
            reason: format!(
                "proof_length {} but epoch tree depth is {}",
                cache.proof_length, geometry.depth
            ),
        });
    }
    let live_level = geometry.live_level();
    let subtree_start = (index >> live_level) << live_level;
    let cache_index = (index >> live_level) as usize;
    debug!(index, subtree_start, cache_index, "assembling proof");

    let mut tree = MerkleTree::sha256();
    tree.register_stored_level(live_level, 0)?;
    tree.register_index([index - subtree_start])?;

    // The last slot of a short epoch holds fewer real leaves; the
    // stream ends at the DAG and finalize pads, exactly like the
    // monolithic build did.
    insert_words(dag, subtree_start as u64, 1u64 << live_level, &mut tree)?;
    tree.finalize()?;

    let element = tree.all_dag_elements()?.remove(0);
    let mut proof = tree.proofs_for_registered_indices()?.remove(0);

    let upper = cache
        .proofs
        .get(cache_index)
        .ok_or_else(|| ProverError::InconsistentCache {
            epoch: cache.epoch,
            reason: format!(
                "no cache slot {} for leaf {}, only {} slots",
                cache_index,
                index,
                cache.proofs.len()
            ),
        })?;
    proof.extend(upper.iter().copied());
    Ok((element, proof))
}
