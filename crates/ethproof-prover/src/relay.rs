//! Per-header proof output for the on-chain verifier.

use serde::{Deserialize, Serialize};
use tracing::info;

use ethproof_ethash::{dag_indices, epoch_of_block, DagDir, DagFile};
use ethproof_mtree::{hashes_to_branch_elements, BranchElement, Hash};

use crate::cache::EpochCache;
use crate::error::ProverResult;
use crate::geometry::EpochGeometry;
use crate::proof::proof_from_dag;
use crate::root::check_dag_covers_epoch;

/// Everything a verifier needs for one header: the header RLP
/// (passed through opaquely), the committed root, and for each of the
/// 64 hashimoto accesses the raw DAG word as four big-endian 256-bit
/// integers plus its serialized authentication path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockProof {
    /// Hex-encoded header RLP, untouched.
    pub header_rlp: String,
    /// The epoch's committed root.
    pub merkle_root: Hash,
    /// Four hex-encoded 256-bit integers per accessed DAG word, in
    /// access order.
    pub elements: Vec<String>,
    /// Authentication paths, one 32-byte element per sibling, in
    /// access order.
    pub merkle_proofs: Vec<BranchElement>,
    /// Branch depth of the epoch tree.
    pub proof_length: u64,
}

/// Assemble the proof bundle for one header.
///
/// `seal_hash` and `nonce` come from the header (RLP decoding is the
/// caller's concern); the 64 accessed rows are derived first, then one
/// lower subtree is rebuilt per row.
pub fn assemble_block_proof(
    header_rlp: &[u8],
    block_number: u64,
    seal_hash: &[u8; 32],
    nonce: u64,
    cache: &EpochCache,
    dag_dir: &DagDir,
) -> ProverResult<BlockProof> {
    let epoch = epoch_of_block(block_number);
    let geometry = EpochGeometry::for_block(block_number);
    let mut dag = DagFile::open(dag_dir.path_to_dag(epoch))?;
    block_proof_from_dag(header_rlp, seal_hash, nonce, cache, &mut dag, &geometry)
}

/// [`assemble_block_proof`] against an already open DAG file with
/// explicit geometry.
pub fn block_proof_from_dag(
    header_rlp: &[u8],
    seal_hash: &[u8; 32],
    nonce: u64,
    cache: &EpochCache,
    dag: &mut DagFile,
    geometry: &EpochGeometry,
) -> ProverResult<BlockProof> {
    check_dag_covers_epoch(dag, geometry)?;

    let indices = dag_indices(dag, geometry.full_size, seal_hash, nonce)?;
    info!(accesses = indices.len(), "assembling block proof");

    let mut elements = Vec::with_capacity(indices.len() * 4);
    let mut merkle_proofs = Vec::with_capacity(indices.len() * cache.proof_length as usize);
    for index in indices {
        let (word, proof) = proof_from_dag(dag, geometry, index, cache)?;
        for chunk in word.to_u256_chunks() {
            elements.push(format!("0x{}", hex::encode(chunk)));
        }
        merkle_proofs.extend(hashes_to_branch_elements(&proof));
    }

    Ok(BlockProof {
        header_rlp: format!("0x{}", hex::encode(header_rlp)),
        merkle_root: cache.root_hash,
        elements,
        merkle_proofs,
        proof_length: cache.proof_length,
    })
}
