//! Automatic sync checkpoint selection.
//!
//! Independently of the static table, a node refuses to rewrite history more
//! than [`CHECKPOINT_SPAN`] blocks behind its current tip. The boundary is
//! recomputed from the live tip on every call: starting at the tip, follow
//! parent links while a parent exists and `node.height + span > tip.height`.
//! The node where the walk stops is the sync checkpoint, and no block at or
//! below its height may be replaced.
//!
//! With a tip at 10050 and the default span the walk stops at 5050, so 5050
//! is refused and 5051 is the lowest height still open to reorganization.
//!
//! The index is caller data. The walk requires each parent to sit strictly
//! below its child; that also bounds it to `span` hops on corrupt (cyclic)
//! input.

use keel_core::block_index::{BlockIndex, NodeId};
use keel_core::constants::CHECKPOINT_SPAN;
use keel_core::error::{BlockIndexError, CheckpointError};
use keel_core::types::Hash256;
use tracing::{debug, warn};

/// Node selected as the current sync checkpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncCheckpoint {
    pub id: NodeId,
    pub height: u64,
    pub hash: Hash256,
}

/// Select the sync checkpoint for `tip` using [`CHECKPOINT_SPAN`].
///
/// # Errors
///
/// See [`auto_select_sync_checkpoint_with`].
pub fn auto_select_sync_checkpoint<I>(index: &I, tip: NodeId) -> Result<SyncCheckpoint, BlockIndexError>
where
    I: BlockIndex + ?Sized,
{
    auto_select_sync_checkpoint_with(index, tip, CHECKPOINT_SPAN)
}

/// Like [`auto_select_sync_checkpoint`] but with an explicit span.
///
/// # Errors
///
/// - [`BlockIndexError::UnknownNode`] if `tip` or a parent link is not in
///   the index.
/// - [`BlockIndexError::NonDescendingParent`] if a parent's height is not
///   strictly below its child's.
pub fn auto_select_sync_checkpoint_with<I>(
    index: &I,
    tip: NodeId,
    span: u64,
) -> Result<SyncCheckpoint, BlockIndexError>
where
    I: BlockIndex + ?Sized,
{
    let tip_node = index.node(tip).ok_or(BlockIndexError::UnknownNode(tip))?;
    let tip_height = tip_node.height;

    let mut id = tip;
    let mut node = tip_node;
    while let Some(parent_id) = node.parent {
        if node.height.saturating_add(span) <= tip_height {
            break;
        }
        let parent = index
            .node(parent_id)
            .ok_or(BlockIndexError::UnknownNode(parent_id))?;
        if parent.height >= node.height {
            return Err(BlockIndexError::NonDescendingParent {
                child: node.height,
                parent: parent.height,
            });
        }
        id = parent_id;
        node = parent;
    }

    debug!(tip_height, height = node.height, hash = %node.hash, "sync: selected checkpoint");
    Ok(SyncCheckpoint {
        id,
        height: node.height,
        hash: node.hash,
    })
}

/// Require `height` to lie above the sync checkpoint for `tip`, using
/// [`CHECKPOINT_SPAN`].
///
/// # Errors
///
/// See [`ensure_sync_with`].
pub fn ensure_sync<I>(index: &I, height: u64, tip: NodeId) -> Result<(), CheckpointError>
where
    I: BlockIndex + ?Sized,
{
    ensure_sync_with(index, height, tip, CHECKPOINT_SPAN)
}

/// Like [`ensure_sync`] but with an explicit span.
///
/// # Errors
///
/// - [`CheckpointError::BelowSyncCheckpoint`] if `height` is at or below the
///   selected checkpoint.
/// - [`CheckpointError::Index`] if the index is malformed.
pub fn ensure_sync_with<I>(
    index: &I,
    height: u64,
    tip: NodeId,
    span: u64,
) -> Result<(), CheckpointError>
where
    I: BlockIndex + ?Sized,
{
    let sync = auto_select_sync_checkpoint_with(index, tip, span)?;
    if height <= sync.height {
        debug!(height, sync_height = sync.height, "sync: height at or below checkpoint");
        return Err(CheckpointError::BelowSyncCheckpoint {
            height,
            sync_height: sync.height,
        });
    }
    Ok(())
}

/// Whether a block at `height` may still be accepted or replaced, given the
/// chain ending at `tip`.
///
/// Returns `false` for heights at or below the sync checkpoint. A malformed
/// index also yields `false`.
pub fn check_sync<I>(index: &I, height: u64, tip: NodeId) -> bool
where
    I: BlockIndex + ?Sized,
{
    check_sync_with(index, height, tip, CHECKPOINT_SPAN)
}

/// Like [`check_sync`] but with an explicit span.
pub fn check_sync_with<I>(index: &I, height: u64, tip: NodeId, span: u64) -> bool
where
    I: BlockIndex + ?Sized,
{
    match ensure_sync_with(index, height, tip, span) {
        Ok(()) => true,
        Err(CheckpointError::Index(e)) => {
            warn!(%tip, error = %e, "sync: malformed block index, refusing height {height}");
            false
        }
        Err(_) => false,
    }
}
