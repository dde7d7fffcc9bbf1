//! Backup Service: self-describing snapshots of the whole contest store.
//!
//! A snapshot carries the full event log plus the contests projected from
//! it, a schema version and a SHA-256 checksum of the log. Restoring replays
//! the log into an empty repository.

pub mod service;
pub mod snapshot;
pub mod store;

pub use service::SnapshotBackupService;
pub use snapshot::ContestSnapshot;
pub use store::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
