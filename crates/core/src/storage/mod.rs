//! Storage layer: per-collection embedding records and disk persistence.
//!
//! Records live in memory behind copy-on-write snapshot pointers, one per
//! collection. Durability is a full JSON snapshot per collection, written
//! atomically (temp file + fsync + rename) on every mutation.

/// Embedding store, per-collection state and point-in-time scans.
pub mod collection;
/// Disk persistence: snapshot save/load with atomic writes.
pub mod persistence;

pub use collection::{CollectionScan, EmbeddingStore, ScanIter};
pub use persistence::{load_snapshot, save_snapshot, snapshot_path, Records};
