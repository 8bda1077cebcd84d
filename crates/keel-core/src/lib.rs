//! # keel-core
//! Foundation types and traits shared by the Keel crates.

pub mod block_index;
pub mod constants;
pub mod error;
pub mod types;
