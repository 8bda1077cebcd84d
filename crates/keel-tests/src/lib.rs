//! Integration test suite for Keel checkpoints.
//!
//! Exercises the checkpoint guard against block indexes shaped like real
//! chains: long linear histories, competing forks, and partially
//! downloaded indexes.

pub mod helpers;
