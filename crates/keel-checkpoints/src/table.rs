//! Compiled-in checkpoint tables.
//!
//! Each network ships a versioned JSON asset embedded in the binary. The
//! asset is parsed and validated the first time a table is requested and
//! shared for the rest of the process; there is no API to mutate a loaded
//! table.
//!
//! # Release rule
//!
//! A hash bound to a height is a permanent commitment. New releases may only
//! append entries above the current highest checkpoint;
//! [`CheckpointTable::ensure_extends`] checks a candidate table against the
//! previous release.

use std::sync::OnceLock;

use keel_core::constants::{NetworkType, CHECKPOINT_ASSET_VERSION};
use keel_core::error::CheckpointError;
use keel_core::types::Hash256;
use serde::Deserialize;
use tracing::debug;

const MAINNET_ASSET: &str = include_str!("../assets/mainnet.json");
const TESTNET_ASSET: &str = include_str!("../assets/testnet.json");

static MAINNET: OnceLock<Result<CheckpointTable, CheckpointError>> = OnceLock::new();
static TESTNET: OnceLock<Result<CheckpointTable, CheckpointError>> = OnceLock::new();

/// A trusted `(height, hash)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CheckpointEntry {
    pub height: u64,
    pub hash: Hash256,
}

#[derive(Deserialize)]
struct CheckpointAsset {
    version: u32,
    network: String,
    checkpoints: Vec<AssetEntry>,
}

#[derive(Deserialize)]
struct AssetEntry {
    height: u64,
    hash: String,
}

/// Read-only mapping from height to checkpoint hash for one network.
///
/// Entries are kept sorted by strictly increasing height. Point lookups are
/// a binary search; [`iter`](Self::iter) walks in ascending order and can be
/// reversed for a newest-first scan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckpointTable {
    entries: Vec<CheckpointEntry>,
}

impl CheckpointTable {
    /// The compiled-in table for `network`.
    ///
    /// Testnet and regtest share the test table. Parsing happens once per
    /// process; later calls return the cached result.
    ///
    /// # Errors
    ///
    /// Returns the validation error of the embedded asset, if any.
    pub fn for_network(network: NetworkType) -> Result<&'static Self, CheckpointError> {
        let (cell, asset, asset_network) = if network.uses_test_checkpoints() {
            (&TESTNET, TESTNET_ASSET, NetworkType::Testnet)
        } else {
            (&MAINNET, MAINNET_ASSET, NetworkType::Mainnet)
        };
        cell.get_or_init(|| Self::from_asset_json(asset, asset_network))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// A table with no checkpoints.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from entries already sorted by height.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::NonIncreasingHeight`] at the first entry
    /// whose height does not exceed its predecessor's.
    pub fn from_entries(entries: Vec<CheckpointEntry>) -> Result<Self, CheckpointError> {
        for pair in entries.windows(2) {
            if pair[1].height <= pair[0].height {
                return Err(CheckpointError::NonIncreasingHeight(pair[1].height));
            }
        }
        Ok(Self { entries })
    }

    /// Parse and validate a checkpoint asset for `network`.
    ///
    /// # Errors
    ///
    /// - [`CheckpointError::InvalidAsset`] for malformed JSON.
    /// - [`CheckpointError::UnsupportedVersion`] for an unknown format version.
    /// - [`CheckpointError::NetworkMismatch`] if the asset names another network.
    /// - [`CheckpointError::InvalidHash`] for a hash that is not 64 hex digits.
    /// - [`CheckpointError::NonIncreasingHeight`] for out-of-order entries.
    pub fn from_asset_json(json: &str, network: NetworkType) -> Result<Self, CheckpointError> {
        let asset: CheckpointAsset =
            serde_json::from_str(json).map_err(|e| CheckpointError::InvalidAsset(e.to_string()))?;
        if asset.version != CHECKPOINT_ASSET_VERSION {
            return Err(CheckpointError::UnsupportedVersion(asset.version));
        }
        if asset.network != network.name() {
            return Err(CheckpointError::NetworkMismatch {
                expected: network.name().to_string(),
                got: asset.network,
            });
        }
        let entries = asset
            .checkpoints
            .into_iter()
            .map(|e| {
                Hash256::from_hex(&e.hash)
                    .map(|hash| CheckpointEntry {
                        height: e.height,
                        hash,
                    })
                    .map_err(|source| CheckpointError::InvalidHash {
                        height: e.height,
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let table = Self::from_entries(entries)?;
        debug!(%network, entries = table.len(), "checkpoints: loaded table");
        Ok(table)
    }

    /// Hash pinned at `height`, or `None` if the height is unconstrained.
    pub fn get(&self, height: u64) -> Option<&Hash256> {
        self.entries
            .binary_search_by_key(&height, |e| e.height)
            .ok()
            .map(|i| &self.entries[i].hash)
    }

    /// Whether `height` carries a checkpoint.
    pub fn contains(&self, height: u64) -> bool {
        self.get(height).is_some()
    }

    /// Number of checkpoints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no checkpoints.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lowest checkpoint.
    pub fn first(&self) -> Option<&CheckpointEntry> {
        self.entries.first()
    }

    /// Highest checkpoint.
    pub fn last(&self) -> Option<&CheckpointEntry> {
        self.entries.last()
    }

    /// Entries in ascending height order. Call `.rev()` for newest first.
    pub fn iter(&self) -> std::slice::Iter<'_, CheckpointEntry> {
        self.entries.iter()
    }

    /// Check that this table only appends to `previous`.
    ///
    /// # Errors
    ///
    /// - [`CheckpointError::DroppedCheckpoint`] if a previous entry is missing.
    /// - [`CheckpointError::RevisedCheckpoint`] if a previous entry's hash changed.
    pub fn ensure_extends(&self, previous: &CheckpointTable) -> Result<(), CheckpointError> {
        for old in previous.iter() {
            match self.get(old.height) {
                None => return Err(CheckpointError::DroppedCheckpoint(old.height)),
                Some(hash) if *hash != old.hash => {
                    return Err(CheckpointError::RevisedCheckpoint(old.height));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a CheckpointTable {
    type Item = &'a CheckpointEntry;
    type IntoIter = std::slice::Iter<'a, CheckpointEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
