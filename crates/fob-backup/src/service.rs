//! Snapshot-based implementation of the backup port, plus restore.

use std::fmt;
use std::slice;
use std::sync::Arc;

use async_trait::async_trait;
use fob_core::backup::ContestBackup;
use fob_core::clock::Clock;
use fob_core::error::DomainError;
use fob_core::repository::EventRepository;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::snapshot::ContestSnapshot;
use crate::store::SnapshotStore;

/// Exports the whole event log to a [`SnapshotStore`].
#[derive(Clone)]
pub struct SnapshotBackupService {
    repo: Arc<dyn EventRepository>,
    store: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for SnapshotBackupService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotBackupService").finish_non_exhaustive()
    }
}

impl SnapshotBackupService {
    /// Creates the service.
    #[must_use]
    pub fn new(
        repo: Arc<dyn EventRepository>,
        store: Arc<dyn SnapshotStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { repo, store, clock }
    }

    /// Takes a snapshot without writing it.
    ///
    /// # Errors
    ///
    /// Returns the repository's error, or `DomainError::Infrastructure` if the
    /// log cannot be replayed.
    pub async fn capture(&self) -> Result<ContestSnapshot, DomainError> {
        let events = self.repo.load_all_events().await?;
        ContestSnapshot::capture(Uuid::now_v7(), self.clock.now(), events)
    }

    /// Replays snapshot `snapshot_id` into `target`, which must be empty.
    /// Events are appended one at a time in their original global order so
    /// the restored log is identical. Returns the number of events restored.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown snapshot,
    /// `DomainError::Validation` for a corrupt snapshot or a non-empty
    /// target, or the target repository's error.
    #[instrument(skip(self, target))]
    pub async fn restore(
        &self,
        snapshot_id: Uuid,
        target: &dyn EventRepository,
    ) -> Result<usize, DomainError> {
        let snapshot = self.store.read(snapshot_id).await?;
        if !target.load_all_events().await?.is_empty() {
            return Err(DomainError::Validation(
                "restore target already holds contest data".to_owned(),
            ));
        }
        for event in &snapshot.events {
            target
                .append_events(
                    event.aggregate_id,
                    event.sequence_number - 1,
                    slice::from_ref(event),
                )
                .await?;
        }
        info!(
            %snapshot_id,
            events = snapshot.events.len(),
            contests = snapshot.contests.len(),
            "snapshot restored"
        );
        Ok(snapshot.events.len())
    }
}

#[async_trait]
impl ContestBackup for SnapshotBackupService {
    #[instrument(skip(self))]
    async fn backup(&self) -> Result<Uuid, DomainError> {
        let snapshot = self.capture().await?;
        let location = self.store.write(&snapshot).await?;
        info!(
            snapshot_id = %snapshot.snapshot_id,
            %location,
            contests = snapshot.contests.len(),
            "backup written"
        );
        Ok(snapshot.snapshot_id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use fob_contest::application::lifecycle::ContestService;
    use fob_contest::application::store::ContestStore;
    use fob_contest::settings::ContestSettings;
    use fob_test_support::{FailingEventRepository, FixedClock, InMemoryEventRepository};

    use super::*;
    use crate::store::MemorySnapshotStore;

    struct Harness {
        repo: Arc<InMemoryEventRepository>,
        snapshots: Arc<MemorySnapshotStore>,
        backup: Arc<SnapshotBackupService>,
        service: ContestService,
    }

    fn harness() -> Harness {
        let repo = Arc::new(InMemoryEventRepository::new());
        let snapshots = Arc::new(MemorySnapshotStore::new());
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        ));
        let backup = Arc::new(SnapshotBackupService::new(
            repo.clone(),
            snapshots.clone(),
            clock.clone(),
        ));
        let service = ContestService::new(
            ContestStore::new(repo.clone()),
            clock,
            backup.clone(),
            ContestSettings::default(),
        );
        Harness {
            repo,
            snapshots,
            backup,
            service,
        }
    }

    async fn play_two_rounds(service: &ContestService) {
        service.new_contest(None, Some(vec!["1B ISK".to_owned()])).await.unwrap();
        service.open_contest().await.unwrap();
        service.enter("alice".to_owned(), "Tama".to_owned()).await.unwrap();
        service.enter("bob".to_owned(), "Kedama".to_owned()).await.unwrap();
        service.end_contest("Tama".to_owned()).await.unwrap();
        service.new_contest(None, None).await.unwrap();
        service.open_contest().await.unwrap();
        service.enter("carol".to_owned(), "Oto".to_owned()).await.unwrap();
    }

    #[tokio::test]
    async fn test_backup_then_restore_reproduces_store() {
        // Arrange
        let h = harness();
        play_two_rounds(&h.service).await;
        let snapshot_id = h.backup.backup().await.unwrap();
        let target = Arc::new(InMemoryEventRepository::new());

        // Act
        let restored = h.backup.restore(snapshot_id, target.as_ref()).await.unwrap();

        // Assert
        assert_eq!(restored, h.repo.events().len());
        assert_eq!(target.events(), h.repo.events());
        let original = ContestStore::new(h.repo.clone()).all().await.unwrap();
        let copy = ContestStore::new(target.clone()).all().await.unwrap();
        assert_eq!(copy.len(), 2);
        for (a, b) in original.iter().zip(&copy) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.status(), b.status());
            assert_eq!(a.entries(), b.entries());
            assert_eq!(a.winners(), b.winners());
        }
    }

    #[tokio::test]
    async fn test_ending_a_contest_writes_a_snapshot() {
        let h = harness();

        play_two_rounds(&h.service).await;

        let ids = h.snapshots.list().await.unwrap();
        assert_eq!(ids.len(), 1);
        let snapshot = h.snapshots.read(ids[0]).await.unwrap();
        assert_eq!(snapshot.contests.len(), 1);
        assert_eq!(snapshot.contests[0].result.as_deref(), Some("Tama"));
    }

    #[tokio::test]
    async fn test_restore_into_non_empty_repository_is_rejected() {
        let h = harness();
        play_two_rounds(&h.service).await;
        let snapshot_id = h.backup.backup().await.unwrap();

        let result = h.backup.restore(snapshot_id, h.repo.as_ref()).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_restore_unknown_snapshot_is_not_found() {
        let h = harness();

        let result = h
            .backup
            .restore(Uuid::now_v7(), &InMemoryEventRepository::new())
            .await;

        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unreadable_store_is_an_infrastructure_failure() {
        let backup = SnapshotBackupService::new(
            Arc::new(FailingEventRepository),
            Arc::new(MemorySnapshotStore::new()),
            Arc::new(FixedClock(Utc::now())),
        );

        let result = backup.backup().await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}
