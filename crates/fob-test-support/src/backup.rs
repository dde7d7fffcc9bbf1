//! Test backups — `ContestBackup` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use fob_core::backup::ContestBackup;
use fob_core::error::DomainError;
use uuid::Uuid;

/// A backup that always succeeds and remembers every snapshot id it handed
/// out.
#[derive(Debug, Default)]
pub struct RecordingBackup {
    snapshots: Mutex<Vec<Uuid>>,
}

impl RecordingBackup {
    /// Creates a backup with no recorded snapshots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of backups taken.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn count(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    /// Snapshot ids in the order they were taken.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn snapshot_ids(&self) -> Vec<Uuid> {
        self.snapshots.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContestBackup for RecordingBackup {
    async fn backup(&self) -> Result<Uuid, DomainError> {
        let snapshot_id = Uuid::now_v7();
        self.snapshots.lock().unwrap().push(snapshot_id);
        Ok(snapshot_id)
    }
}

/// A backup whose storage is always unavailable.
#[derive(Debug)]
pub struct FailingBackup;

#[async_trait]
impl ContestBackup for FailingBackup {
    async fn backup(&self) -> Result<Uuid, DomainError> {
        Err(DomainError::Infrastructure("disk full".into()))
    }
}
