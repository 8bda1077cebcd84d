//! Block index read interface and in-memory arena implementation.
//!
//! Provides the [`BlockIndex`] trait through which checkpoint logic reads a
//! caller-owned block index, and the [`MemoryBlockIndex`] arena which is
//! suitable for testing. Nodes are addressed by [`NodeId`] and store their
//! own height, so walks over parent links never chase raw pointers.
//!
//! The index is owned and mutated by the caller. Readers see whatever state
//! it is in for the duration of a call; callers serialise mutation (e.g.
//! under a single chain-state lock) around every read.

use std::collections::HashMap;
use std::fmt;

use crate::error::BlockIndexError;
use crate::types::Hash256;

/// Position of a node within a block index arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Arena slot as a `usize`.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single entry of the block index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockIndexNode {
    /// Hash of the block this node describes.
    pub hash: Hash256,
    /// Height of the block. Zero for genesis.
    pub height: u64,
    /// Parent node, `None` for genesis.
    pub parent: Option<NodeId>,
}

/// Read-only view of a block index.
///
/// Implementations may be partial (e.g. while headers are still being
/// downloaded). Every non-genesis node is expected to point at a parent with
/// a strictly smaller height; readers that walk parent links check this
/// rather than trust it.
pub trait BlockIndex {
    /// Node stored at `id`, or `None` if the slot is unknown.
    fn node(&self, id: NodeId) -> Option<&BlockIndexNode>;

    /// Node id for a block hash, or `None` if the block is not indexed.
    fn lookup(&self, hash: &Hash256) -> Option<NodeId>;

    /// Convenience: resolve a hash straight to its node.
    ///
    /// Default implementation chains [`lookup`](Self::lookup) and
    /// [`node`](Self::node).
    fn lookup_node(&self, hash: &Hash256) -> Option<&BlockIndexNode> {
        self.lookup(hash).and_then(|id| self.node(id))
    }
}

/// Append-only, in-memory block index arena.
///
/// Heights are derived from the parent on insertion, so every index built
/// through [`MemoryBlockIndex::insert`] is well formed.
#[derive(Clone, Debug, Default)]
pub struct MemoryBlockIndex {
    nodes: Vec<BlockIndexNode>,
    by_hash: HashMap<Hash256, NodeId>,
}

impl MemoryBlockIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block whose parent is `parent` (or a root when `None`).
    ///
    /// # Errors
    ///
    /// - [`BlockIndexError::DuplicateHash`] if `hash` is already indexed.
    /// - [`BlockIndexError::UnknownNode`] if `parent` is not in this index.
    /// - [`BlockIndexError::Full`] if the arena has exhausted `NodeId` space.
    pub fn insert(
        &mut self,
        hash: Hash256,
        parent: Option<NodeId>,
    ) -> Result<NodeId, BlockIndexError> {
        if self.by_hash.contains_key(&hash) {
            return Err(BlockIndexError::DuplicateHash(hash));
        }
        let height = match parent {
            Some(p) => {
                let parent_node = self.node(p).ok_or(BlockIndexError::UnknownNode(p))?;
                parent_node.height + 1
            }
            None => 0,
        };
        let id = NodeId(u32::try_from(self.nodes.len()).map_err(|_| BlockIndexError::Full)?);
        self.nodes.push(BlockIndexNode {
            hash,
            height,
            parent,
        });
        self.by_hash.insert(hash, id);
        Ok(id)
    }

    /// Number of indexed blocks.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the index holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl BlockIndex for MemoryBlockIndex {
    fn node(&self, id: NodeId) -> Option<&BlockIndexNode> {
        self.nodes.get(id.index())
    }

    fn lookup(&self, hash: &Hash256) -> Option<NodeId> {
        self.by_hash.get(hash).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(seed: u8) -> Hash256 {
        Hash256([seed; 32])
    }

    #[test]
    fn insert_derives_heights() {
        let mut index = MemoryBlockIndex::new();
        let genesis = index.insert(h(0), None).unwrap();
        let one = index.insert(h(1), Some(genesis)).unwrap();
        let two = index.insert(h(2), Some(one)).unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.node(genesis).unwrap().height, 0);
        assert_eq!(index.node(two).unwrap().height, 2);
        assert_eq!(index.node(two).unwrap().parent, Some(one));
        assert_eq!(index.node(genesis).unwrap().parent, None);
    }

    #[test]
    fn lookup_by_hash() {
        let mut index = MemoryBlockIndex::new();
        let genesis = index.insert(h(0), None).unwrap();
        assert_eq!(index.lookup(&h(0)), Some(genesis));
        assert_eq!(index.lookup(&h(9)), None);
        assert_eq!(index.lookup_node(&h(0)).unwrap().hash, h(0));
        assert!(index.lookup_node(&h(9)).is_none());
    }

    #[test]
    fn siblings_share_height() {
        let mut index = MemoryBlockIndex::new();
        let genesis = index.insert(h(0), None).unwrap();
        let a = index.insert(h(1), Some(genesis)).unwrap();
        let b = index.insert(h(2), Some(genesis)).unwrap();
        assert_ne!(a, b);
        assert_eq!(index.node(a).unwrap().height, index.node(b).unwrap().height);
    }

    #[test]
    fn duplicate_hash_rejected() {
        let mut index = MemoryBlockIndex::new();
        let genesis = index.insert(h(0), None).unwrap();
        let err = index.insert(h(0), Some(genesis)).unwrap_err();
        assert_eq!(err, BlockIndexError::DuplicateHash(h(0)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn unknown_parent_rejected() {
        let mut index = MemoryBlockIndex::new();
        let err = index.insert(h(1), Some(NodeId(7))).unwrap_err();
        assert_eq!(err, BlockIndexError::UnknownNode(NodeId(7)));
        assert!(index.is_empty());
    }

    #[test]
    fn unknown_slot_is_none() {
        let index = MemoryBlockIndex::new();
        assert!(index.node(NodeId(0)).is_none());
        assert_eq!(NodeId(3).to_string(), "#3");
    }
}
