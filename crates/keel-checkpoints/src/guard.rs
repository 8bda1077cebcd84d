//! Network-bound checkpoint guard.
//!
//! [`Checkpoints`] bundles the table for one network with the sync span so
//! that chain-selection code holds a single value instead of consulting
//! process-wide state. Several guards (e.g. mainnet and a test table) can
//! coexist in one process.

use keel_core::block_index::{BlockIndex, NodeId};
use keel_core::constants::{NetworkType, CHECKPOINT_SPAN};
use keel_core::error::{BlockIndexError, CheckpointError};
use keel_core::types::Hash256;

use crate::hardened;
use crate::sync::{self, SyncCheckpoint};
use crate::table::CheckpointTable;

/// Checkpoint enforcement for one network.
#[derive(Clone, Copy, Debug)]
pub struct Checkpoints<'a> {
    network: NetworkType,
    table: &'a CheckpointTable,
    span: u64,
}

impl Checkpoints<'static> {
    /// Guard backed by the compiled-in table for `network`.
    ///
    /// # Errors
    ///
    /// Propagates asset validation errors from [`CheckpointTable::for_network`].
    pub fn for_network(network: NetworkType) -> Result<Self, CheckpointError> {
        Ok(Self::with_table(network, CheckpointTable::for_network(network)?))
    }
}

impl<'a> Checkpoints<'a> {
    /// Guard backed by an explicit table.
    pub fn with_table(network: NetworkType, table: &'a CheckpointTable) -> Self {
        Self {
            network,
            table,
            span: CHECKPOINT_SPAN,
        }
    }

    /// Override the sync checkpoint span.
    pub fn with_span(mut self, span: u64) -> Self {
        self.span = span;
        self
    }

    pub fn network(&self) -> NetworkType {
        self.network
    }

    pub fn table(&self) -> &'a CheckpointTable {
        self.table
    }

    pub fn span(&self) -> u64 {
        self.span
    }

    /// See [`hardened::check_hardened`].
    pub fn check_hardened(&self, height: u64, hash: &Hash256) -> bool {
        hardened::check_hardened(self.table, height, hash)
    }

    /// See [`hardened::total_blocks_estimate`].
    pub fn total_blocks_estimate(&self) -> u64 {
        hardened::total_blocks_estimate(self.table)
    }

    /// See [`hardened::last_checkpoint`].
    pub fn last_checkpoint<I>(&self, index: &I) -> Option<NodeId>
    where
        I: BlockIndex + ?Sized,
    {
        hardened::last_checkpoint(self.table, index)
    }

    /// See [`sync::auto_select_sync_checkpoint_with`].
    pub fn sync_checkpoint<I>(&self, index: &I, tip: NodeId) -> Result<SyncCheckpoint, BlockIndexError>
    where
        I: BlockIndex + ?Sized,
    {
        sync::auto_select_sync_checkpoint_with(index, tip, self.span)
    }

    /// See [`sync::check_sync_with`].
    pub fn check_sync<I>(&self, index: &I, height: u64, tip: NodeId) -> bool
    where
        I: BlockIndex + ?Sized,
    {
        sync::check_sync_with(index, height, tip, self.span)
    }

    /// Gate for block acceptance and reorganization.
    ///
    /// A block at `height` with `hash` may join the chain ending at `tip`
    /// only if it matches any hardened checkpoint at that height and lies
    /// above the current sync checkpoint.
    ///
    /// # Errors
    ///
    /// - [`CheckpointError::Mismatch`] for a hardened checkpoint conflict.
    /// - [`CheckpointError::BelowSyncCheckpoint`] for a height that is no
    ///   longer open to change.
    /// - [`CheckpointError::Index`] for a malformed index.
    pub fn accept_block<I>(
        &self,
        index: &I,
        height: u64,
        hash: &Hash256,
        tip: NodeId,
    ) -> Result<(), CheckpointError>
    where
        I: BlockIndex + ?Sized,
    {
        hardened::verify_hardened(self.table, height, hash)?;
        sync::ensure_sync_with(index, height, tip, self.span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CheckpointEntry;
    use keel_core::block_index::MemoryBlockIndex;

    fn h(seed: u8) -> Hash256 {
        Hash256([seed; 32])
    }

    /// Chain `h(0), h(1), ..., h(len - 1)`.
    fn chain(len: u8) -> (MemoryBlockIndex, NodeId) {
        let mut index = MemoryBlockIndex::new();
        let mut tip = None;
        for seed in 0..len {
            tip = Some(index.insert(h(seed), tip).unwrap());
        }
        (index, tip.unwrap())
    }

    #[test]
    fn mainnet_guard_uses_compiled_table() {
        let guard = Checkpoints::for_network(NetworkType::Mainnet).unwrap();
        assert_eq!(guard.network(), NetworkType::Mainnet);
        assert_eq!(guard.span(), CHECKPOINT_SPAN);
        assert_eq!(guard.total_blocks_estimate(), 92);
        let genesis = *guard.table().get(0).unwrap();
        assert!(guard.check_hardened(0, &genesis));
        assert!(!guard.check_hardened(0, &h(0x42)));
    }

    #[test]
    fn testnet_guard_is_unconstrained() {
        let guard = Checkpoints::for_network(NetworkType::Testnet).unwrap();
        assert_eq!(guard.total_blocks_estimate(), 0);
        assert!(guard.check_hardened(0, &h(0x42)));
        let (index, _) = chain(3);
        assert_eq!(guard.last_checkpoint(&index), None);
    }

    #[test]
    fn guards_coexist() {
        let table = CheckpointTable::from_entries(vec![CheckpointEntry { height: 2, hash: h(2) }])
            .unwrap();
        let custom = Checkpoints::with_table(NetworkType::Regtest, &table).with_span(3);
        let mainnet = Checkpoints::for_network(NetworkType::Mainnet).unwrap();

        assert_eq!(custom.total_blocks_estimate(), 2);
        assert_eq!(mainnet.total_blocks_estimate(), 92);

        let (index, tip) = chain(10);
        assert_eq!(custom.last_checkpoint(&index), Some(NodeId(2)));
        assert_eq!(custom.sync_checkpoint(&index, tip).unwrap().height, 6);
        assert!(!custom.check_sync(&index, 6, tip));
        assert!(custom.check_sync(&index, 7, tip));
        assert!(mainnet.check_sync(&index, 1, tip));
    }

    #[test]
    fn accept_block_applies_both_checks() {
        let table = CheckpointTable::from_entries(vec![CheckpointEntry { height: 8, hash: h(8) }])
            .unwrap();
        let guard = Checkpoints::with_table(NetworkType::Regtest, &table).with_span(4);
        let (index, tip) = chain(10);

        assert!(guard.accept_block(&index, 8, &h(8), tip).is_ok());
        assert!(guard.accept_block(&index, 9, &h(0xEE), tip).is_ok());
        assert_eq!(
            guard.accept_block(&index, 8, &h(0xEE), tip),
            Err(CheckpointError::Mismatch {
                height: 8,
                expected: h(8),
                got: h(0xEE),
            })
        );
        assert_eq!(
            guard.accept_block(&index, 5, &h(0xEE), tip),
            Err(CheckpointError::BelowSyncCheckpoint {
                height: 5,
                sync_height: 5,
            })
        );
    }

    #[test]
    fn accept_block_rejects_unknown_tip() {
        let guard = Checkpoints::for_network(NetworkType::Regtest).unwrap();
        let (index, _) = chain(2);
        assert_eq!(
            guard.accept_block(&index, 5, &h(5), NodeId(40)),
            Err(CheckpointError::Index(BlockIndexError::UnknownNode(NodeId(40))))
        );
    }
}
