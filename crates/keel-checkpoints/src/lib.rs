//! # keel-checkpoints — Checkpoint-based finality guard.
//!
//! Bounds how deep a chain reorganization can reach:
//! - [`table::CheckpointTable`] — compiled-in `(height, hash)` pins per network
//! - [`hardened`] — pinned-hash verification, progress estimate, newest
//!   materialized checkpoint
//! - [`sync`] — tip-relative sync checkpoint and the height check built on it
//! - [`guard::Checkpoints`] — the above bound to one network
//!
//! All operations are synchronous and read caller-owned data (block index,
//! chain tip). Callers hold their chain-state lock for the duration of each
//! call.

pub mod guard;
pub mod hardened;
pub mod sync;
pub mod table;

pub use guard::Checkpoints;
pub use hardened::{check_hardened, last_checkpoint, total_blocks_estimate, verify_hardened};
pub use sync::{auto_select_sync_checkpoint, check_sync, ensure_sync, SyncCheckpoint};
pub use table::{CheckpointEntry, CheckpointTable};
