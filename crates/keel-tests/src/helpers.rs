//! Shared test helpers for integration tests.

use keel_core::block_index::{BlockIndex, MemoryBlockIndex, NodeId};
use keel_core::types::Hash256;
use sha2::{Digest, Sha256};
use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber once per test binary.
///
/// Honours `RUST_LOG`; defaults to `warn`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Deterministic block hash for `height` on branch `branch`.
///
/// SHA-256 over the branch tag and height, so distinct branches never
/// collide.
pub fn block_hash(branch: u8, height: u64) -> Hash256 {
    let mut hasher = Sha256::new();
    hasher.update([branch]);
    hasher.update(height.to_le_bytes());
    Hash256(hasher.finalize().into())
}

/// Block index under construction, tracking ids by branch.
pub struct ChainBuilder {
    pub index: MemoryBlockIndex,
}

impl ChainBuilder {
    /// Index holding only a genesis block (branch 0).
    pub fn with_genesis() -> (Self, NodeId) {
        let mut index = MemoryBlockIndex::new();
        let genesis = index.insert(block_hash(0, 0), None).unwrap();
        (Self { index }, genesis)
    }

    /// Linear chain of `len` blocks on branch 0; returns the tip.
    pub fn linear(len: u64) -> (Self, NodeId) {
        assert!(len > 0, "a chain needs at least a genesis block");
        let (mut builder, genesis) = Self::with_genesis();
        let tip = builder.extend(genesis, 0, len - 1);
        (builder, tip)
    }

    /// Append `count` blocks on `branch` on top of `from`; returns the new tip.
    pub fn extend(&mut self, from: NodeId, branch: u8, count: u64) -> NodeId {
        let mut tip = from;
        for _ in 0..count {
            let height = self.height(tip) + 1;
            tip = self.index.insert(block_hash(branch, height), Some(tip)).unwrap();
        }
        tip
    }

    /// Id of the branch-0 block at `height`, if indexed.
    pub fn main_at(&self, height: u64) -> Option<NodeId> {
        self.index.lookup(&block_hash(0, height))
    }

    pub fn height(&self, id: NodeId) -> u64 {
        self.index.node(id).unwrap().height
    }
}
