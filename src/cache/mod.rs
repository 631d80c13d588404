//! Cache module for persisting dataset snapshots to disk
//!
//! This module provides a flat-file store holding the most recent snapshot
//! per geography level. Writes are atomic so a reader in the same process
//! never observes a truncated file, and malformed files are treated as
//! absent so a corrupt cache self-heals on the next successful fetch.

mod store;

pub use store::CacheStore;
