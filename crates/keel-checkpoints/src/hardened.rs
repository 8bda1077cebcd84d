//! Hardened checkpoint verification.
//!
//! Provides functions to verify that blocks at checkpoint heights match the
//! pinned hash, to estimate sync progress from the table, and to find the
//! newest checkpoint a (possibly partial) block index already contains.
//!
//! # Attack vectors
//!
//! - **Long-range rewrite:** Without checkpoints an attacker with sufficient
//!   hash power could rewrite arbitrarily deep history. A pinned hash makes
//!   every chain that disagrees at that height invalid for this node.
//!
//! - **Checkpoint spoofing:** The table is compiled into the binary. An
//!   attacker would need to distribute a modified binary to exploit this,
//!   which is outside our threat model.

use keel_core::block_index::{BlockIndex, NodeId};
use keel_core::error::CheckpointError;
use keel_core::types::Hash256;
use tracing::warn;

use crate::table::CheckpointTable;

/// Verify that a block at `height` has the checkpointed hash.
///
/// Succeeds unconditionally when `height` carries no checkpoint.
///
/// # Errors
///
/// Returns [`CheckpointError::Mismatch`] when the hash differs from the
/// checkpoint at `height`.
pub fn verify_hardened(
    table: &CheckpointTable,
    height: u64,
    hash: &Hash256,
) -> Result<(), CheckpointError> {
    match table.get(height) {
        Some(expected) if expected != hash => {
            warn!(height, %hash, %expected, "checkpoint: hash mismatch");
            Err(CheckpointError::Mismatch {
                height,
                expected: *expected,
                got: *hash,
            })
        }
        _ => Ok(()),
    }
}

/// Boolean form of [`verify_hardened`].
///
/// `false` is a mandatory rejection of the candidate block and of any chain
/// containing it.
pub fn check_hardened(table: &CheckpointTable, height: u64, hash: &Hash256) -> bool {
    verify_hardened(table, height, hash).is_ok()
}

/// Highest checkpointed height, or 0 for an empty table.
///
/// A coarse lower bound on the chain height, used as a sync-progress proxy.
pub fn total_blocks_estimate(table: &CheckpointTable) -> u64 {
    table.last().map_or(0, |e| e.height)
}

/// Newest checkpoint present in `index`.
///
/// Scans the table from the highest height down and returns the first
/// checkpoint hash the index knows. While the index is still being built
/// this may be well below the table's highest entry.
pub fn last_checkpoint<I>(table: &CheckpointTable, index: &I) -> Option<NodeId>
where
    I: BlockIndex + ?Sized,
{
    table.iter().rev().find_map(|e| index.lookup(&e.hash))
}
