//! Error types for the Keel crates.
use thiserror::Error;

use crate::block_index::NodeId;
use crate::types::Hash256;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseHashError {
    #[error("invalid hex: {0}")] InvalidHex(String),
    #[error("invalid length: expected 32 bytes, got {0}")] InvalidLength(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockIndexError {
    #[error("unknown block index node: {0}")] UnknownNode(NodeId),
    #[error("duplicate block hash: {0}")] DuplicateHash(Hash256),
    #[error("parent height {parent} not below child height {child}")] NonDescendingParent { child: u64, parent: u64 },
    #[error("block index full")] Full,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckpointError {
    #[error("checkpoint mismatch at height {height}: expected {expected}, got {got}")]
    Mismatch { height: u64, expected: Hash256, got: Hash256 },
    #[error("height {height} at or below sync checkpoint {sync_height}")]
    BelowSyncCheckpoint { height: u64, sync_height: u64 },
    #[error("invalid checkpoint asset: {0}")] InvalidAsset(String),
    #[error("unsupported checkpoint asset version: {0}")] UnsupportedVersion(u32),
    #[error("asset network mismatch: expected {expected}, got {got}")] NetworkMismatch { expected: String, got: String },
    #[error("invalid hash at height {height}: {source}")] InvalidHash { height: u64, source: ParseHashError },
    #[error("checkpoint heights not strictly increasing at {0}")] NonIncreasingHeight(u64),
    #[error("checkpoint at height {0} was revised")] RevisedCheckpoint(u64),
    #[error("checkpoint at height {0} was dropped")] DroppedCheckpoint(u64),
    #[error(transparent)] Index(#[from] BlockIndexError),
}
