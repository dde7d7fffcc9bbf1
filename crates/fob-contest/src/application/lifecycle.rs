//! Contest Lifecycle Manager.
//!
//! [`ContestService`] is the single entry point for the outside world. All
//! writes go through one async mutex so entry submissions, manual
//! transitions and the deadline timer are applied one at a time against
//! freshly loaded state. Backups run after the lock is released and never
//! undo a committed transition.

use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use fob_core::backup::ContestBackup;
use fob_core::clock::Clock;
use fob_core::error::DomainError;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::application::command_handlers::{
    ContestCommandResult, handle_clear_deadline, handle_close_contest, handle_create_contest,
    handle_deadline_elapsed, handle_end_contest, handle_open_contest, handle_set_deadline,
    handle_set_locations, handle_set_prizes, handle_submit_entry,
};
use crate::application::query_handlers::{
    self, ContestStatusView, ContestSummary, ContestView, PrizesView, RulesView,
};
use crate::application::scheduler::DeadlineScheduler;
use crate::application::store::ContestStore;
use crate::domain::aggregates::{Contest, ContestStatus};
use crate::domain::commands::{
    ClearDeadline, CloseContest, CreateContest, EndContest, OpenContest, SetDeadline,
    SetLocations, SetPrizes, SubmitEntry,
};
use crate::domain::entries::{Entry, ParticipantId};
use crate::settings::ContestSettings;

/// What happened to the backup a transition triggered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BackupOutcome {
    /// The snapshot was written.
    Saved {
        /// Identifier of the written snapshot.
        snapshot_id: Uuid,
    },
    /// The snapshot could not be written; the transition still stands.
    Failed {
        /// Why the backup failed.
        reason: String,
    },
}

/// Result of a transition that triggers a backup (`Closed`, `Ended`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleReport {
    /// Contest state after the transition.
    pub contest: ContestView,
    /// Backup outcome.
    pub backup: BackupOutcome,
}

struct Inner {
    store: ContestStore,
    clock: Arc<dyn Clock>,
    backup: Arc<dyn ContestBackup>,
    settings: ContestSettings,
    scheduler: DeadlineScheduler,
    write_lock: Mutex<()>,
}

/// Orchestrates the contest lifecycle over the store, validator, scheduler
/// and backup service.
#[derive(Clone)]
pub struct ContestService {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ContestService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContestService")
            .field("settings", &self.inner.settings)
            .field("pending_deadline", &self.inner.scheduler.pending())
            .finish_non_exhaustive()
    }
}

impl ContestService {
    /// Creates the service.
    #[must_use]
    pub fn new(
        store: ContestStore,
        clock: Arc<dyn Clock>,
        backup: Arc<dyn ContestBackup>,
        settings: ContestSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                clock,
                backup,
                settings,
                scheduler: DeadlineScheduler::new(),
                write_lock: Mutex::new(()),
            }),
        }
    }

    /// The settings this service was built with.
    #[must_use]
    pub fn settings(&self) -> &ContestSettings {
        &self.inner.settings
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &ContestStore {
        &self.inner.store
    }

    /// `newcontest`: creates a `Draft` contest.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` while another contest is
    /// unfinished, `DomainError::Validation` for bad input, or a store error.
    #[instrument(skip(self))]
    pub async fn new_contest(
        &self,
        locations: Option<Vec<String>>,
        prizes: Option<Vec<String>>,
    ) -> Result<ContestView, DomainError> {
        let command = CreateContest {
            correlation_id: Uuid::new_v4(),
            locations,
            prizes,
        };
        let _guard = self.inner.write_lock.lock().await;
        let result = handle_create_contest(
            &command,
            &self.inner.settings,
            self.inner.clock.as_ref(),
            &self.inner.store,
        )
        .await?;
        info!(
            contest_id = %result.contest.id,
            number = result.contest.number(),
            "contest created"
        );
        Ok(ContestView::from(&result.contest))
    }

    /// Replaces the active draft contest's allowed locations.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` with no active contest,
    /// `DomainError::InvalidTransition` outside `Draft`, or
    /// `DomainError::Validation` for an empty list.
    #[instrument(skip(self, locations), fields(count = locations.len()))]
    pub async fn set_locations(&self, locations: Vec<String>) -> Result<ContestView, DomainError> {
        let _guard = self.inner.write_lock.lock().await;
        let contest = self.inner.store.require_active().await?;
        let command = SetLocations {
            correlation_id: Uuid::new_v4(),
            contest_id: contest.id,
            locations,
        };
        let result =
            handle_set_locations(&command, self.inner.clock.as_ref(), &self.inner.store).await?;
        info!(
            contest_id = %result.contest.id,
            locations = result.contest.allowed_locations().len(),
            "allowed locations updated"
        );
        Ok(ContestView::from(&result.contest))
    }

    /// `opencontest`: `Draft -> Open` or `Closed -> Open`. A future deadline
    /// kept across a re-open is re-armed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` with no active contest, or
    /// `DomainError::InvalidTransition` if already open.
    #[instrument(skip(self))]
    pub async fn open_contest(&self) -> Result<ContestView, DomainError> {
        let _guard = self.inner.write_lock.lock().await;
        let contest = self.inner.store.require_active().await?;
        let command = OpenContest {
            correlation_id: Uuid::new_v4(),
            contest_id: contest.id,
        };
        let result =
            handle_open_contest(&command, self.inner.clock.as_ref(), &self.inner.store).await?;
        if let Some(deadline) = result.contest.deadline() {
            self.arm(result.contest.id, deadline);
        }
        info!(contest_id = %result.contest.id, "contest opened");
        Ok(ContestView::from(&result.contest))
    }

    /// `closecontest`: manual `Open -> Closed`, then backup.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` with no active contest, or
    /// `DomainError::InvalidTransition` unless `Open`.
    #[instrument(skip(self))]
    pub async fn close_contest(&self) -> Result<LifecycleReport, DomainError> {
        let result = {
            let _guard = self.inner.write_lock.lock().await;
            let contest = self.inner.store.require_active().await?;
            let command = CloseContest {
                correlation_id: Uuid::new_v4(),
                contest_id: contest.id,
            };
            let result =
                handle_close_contest(&command, self.inner.clock.as_ref(), &self.inner.store)
                    .await?;
            self.inner.scheduler.cancel();
            result
        };
        info!(contest_id = %result.contest.id, "contest closed manually");
        Ok(self.report(&result).await)
    }

    /// `setdeadline`: converts and stores the deadline, then arms the timer,
    /// replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` with no active contest,
    /// `DomainError::InvalidTransition` unless `Open`, or
    /// `DomainError::Validation` for a bad or past time.
    #[instrument(skip(self))]
    pub async fn set_deadline(
        &self,
        local_time: String,
        source_zone: Option<String>,
    ) -> Result<ContestView, DomainError> {
        let _guard = self.inner.write_lock.lock().await;
        let contest = self.inner.store.require_active().await?;
        let command = SetDeadline {
            correlation_id: Uuid::new_v4(),
            contest_id: contest.id,
            local_time,
            source_zone,
        };
        let result = handle_set_deadline(
            &command,
            &self.inner.settings,
            self.inner.clock.as_ref(),
            &self.inner.store,
        )
        .await?;
        if let Some(deadline) = result.contest.deadline() {
            self.arm(result.contest.id, deadline);
            info!(contest_id = %result.contest.id, %deadline, "deadline set");
        }
        Ok(ContestView::from(&result.contest))
    }

    /// `cleardeadline`: removes the deadline and cancels the timer.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` with no active contest, or
    /// `DomainError::InvalidTransition` in `Draft`.
    #[instrument(skip(self))]
    pub async fn clear_deadline(&self) -> Result<ContestView, DomainError> {
        let _guard = self.inner.write_lock.lock().await;
        let contest = self.inner.store.require_active().await?;
        let command = ClearDeadline {
            correlation_id: Uuid::new_v4(),
            contest_id: contest.id,
        };
        let result =
            handle_clear_deadline(&command, self.inner.clock.as_ref(), &self.inner.store).await?;
        self.inner.scheduler.cancel();
        info!(contest_id = %result.contest.id, "deadline cleared");
        Ok(ContestView::from(&result.contest))
    }

    /// `enter`: records or replaces a participant's guess.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` with no active contest,
    /// `DomainError::EntryRejected` with the reason, or
    /// `DomainError::Validation` for a blank participant.
    #[instrument(skip(self))]
    pub async fn enter(&self, participant_id: String, guess: String) -> Result<Entry, DomainError> {
        let _guard = self.inner.write_lock.lock().await;
        let contest = self.inner.store.require_active().await?;
        let command = SubmitEntry {
            correlation_id: Uuid::new_v4(),
            contest_id: contest.id,
            participant_id,
            guess,
        };
        let result = handle_submit_entry(
            &command,
            &self.inner.settings,
            self.inner.clock.as_ref(),
            &self.inner.store,
        )
        .await;
        match result {
            Ok(result) => {
                let participant = ParticipantId::new(command.participant_id.as_str())?;
                let entry = result.contest.entry(&participant).cloned().ok_or_else(|| {
                    DomainError::Infrastructure("accepted entry missing after commit".to_owned())
                })?;
                info!(
                    contest_id = %result.contest.id,
                    participant = %entry.participant_id,
                    guess = %entry.guess,
                    "entry accepted"
                );
                Ok(entry)
            }
            Err(DomainError::EntryRejected(reason)) => {
                warn!(
                    contest_id = %contest.id,
                    participant = %command.participant_id,
                    guess = %command.guess,
                    %reason,
                    "entry rejected"
                );
                Err(DomainError::EntryRejected(reason))
            }
            Err(e) => Err(e),
        }
    }

    /// `setprizes`: replaces the prize list of the active contest.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` with no active contest, or
    /// `DomainError::Validation` for an out-of-range list.
    #[instrument(skip(self))]
    pub async fn set_prizes(&self, prizes: Vec<String>) -> Result<ContestView, DomainError> {
        let _guard = self.inner.write_lock.lock().await;
        let contest = self.inner.store.require_active().await?;
        let command = SetPrizes {
            correlation_id: Uuid::new_v4(),
            contest_id: contest.id,
            prizes,
        };
        let result =
            handle_set_prizes(&command, self.inner.clock.as_ref(), &self.inner.store).await?;
        info!(
            contest_id = %result.contest.id,
            prizes = result.contest.prizes().len(),
            "prizes set"
        );
        Ok(ContestView::from(&result.contest))
    }

    /// `endcontest`: declares the result, computes winners, then backs up.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` with no active contest,
    /// `DomainError::InvalidTransition` from `Draft`, or
    /// `DomainError::Validation` for an unknown result or missing prizes.
    #[instrument(skip(self))]
    pub async fn end_contest(&self, result: String) -> Result<LifecycleReport, DomainError> {
        let outcome = {
            let _guard = self.inner.write_lock.lock().await;
            let contest = self.inner.store.require_active().await?;
            let command = EndContest {
                correlation_id: Uuid::new_v4(),
                contest_id: contest.id,
                result,
            };
            let outcome =
                handle_end_contest(&command, self.inner.clock.as_ref(), &self.inner.store)
                    .await?;
            self.inner.scheduler.cancel();
            outcome
        };
        info!(
            contest_id = %outcome.contest.id,
            result = outcome.contest.result().unwrap_or_default(),
            winners = outcome.contest.winners().len(),
            "contest ended"
        );
        Ok(self.report(&outcome).await)
    }

    /// `backupdb`: writes a snapshot on demand.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the snapshot fails.
    #[instrument(skip(self))]
    pub async fn backup_now(&self) -> Result<Uuid, DomainError> {
        let snapshot_id = self.inner.backup.backup().await?;
        info!(%snapshot_id, "backup written on demand");
        Ok(snapshot_id)
    }

    /// Startup recovery: an `Open` contest whose deadline already passed is
    /// closed now (and backed up); a future deadline is re-armed.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    #[instrument(skip(self))]
    pub async fn resume(&self) -> Result<Option<LifecycleReport>, DomainError> {
        let contest = {
            let _guard = self.inner.write_lock.lock().await;
            self.inner.store.active().await?
        };
        let Some((contest_id, deadline)) = contest
            .filter(|contest| contest.status() == ContestStatus::Open)
            .and_then(|contest| contest.deadline().map(|deadline| (contest.id, deadline)))
        else {
            debug!("no open contest with a deadline to resume");
            return Ok(None);
        };
        if deadline <= self.inner.clock.now() {
            warn!(%contest_id, %deadline, "deadline passed while offline, closing now");
            return self.close_elapsed(contest_id, deadline).await;
        }
        self.arm(contest_id, deadline);
        info!(%contest_id, %deadline, "deadline timer re-armed");
        Ok(None)
    }

    /// The contest and deadline the timer is currently armed for.
    #[must_use]
    pub fn pending_deadline(&self) -> Option<(Uuid, DateTime<Utc>)> {
        self.inner.scheduler.pending()
    }

    /// `allowedsystems`: allowed locations matching `query`.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn allowed_locations(&self, query: &str) -> Result<Vec<String>, DomainError> {
        query_handlers::allowed_locations(&self.inner.store, &self.inner.settings, query).await
    }

    /// `myguess`: the participant's entry in the current contest.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if there is no contest or no entry.
    pub async fn my_entry(&self, participant_id: &str) -> Result<Entry, DomainError> {
        let participant = ParticipantId::new(participant_id)?;
        query_handlers::get_entry(&self.inner.store, &participant).await
    }

    /// `conteststatus`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no contest exists.
    pub async fn status(&self) -> Result<ContestStatusView, DomainError> {
        query_handlers::get_contest_status(&self.inner.store, self.inner.clock.now()).await
    }

    /// `listentries`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no contest exists.
    pub async fn list_entries(&self) -> Result<Vec<Entry>, DomainError> {
        query_handlers::list_entries(&self.inner.store).await
    }

    /// `prizes`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no contest exists.
    pub async fn prizes(&self) -> Result<PrizesView, DomainError> {
        query_handlers::get_prizes(&self.inner.store).await
    }

    /// `contesthistory`.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn history(&self) -> Result<Vec<ContestSummary>, DomainError> {
        query_handlers::contest_history(&self.inner.store).await
    }

    /// `pastwinners`.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn past_winners(&self) -> Result<Vec<ContestSummary>, DomainError> {
        query_handlers::past_winners(&self.inner.store).await
    }

    /// `rules`.
    #[must_use]
    pub fn rules(&self) -> RulesView {
        query_handlers::contest_rules(&self.inner.settings)
    }

    /// `utcnow`.
    #[must_use]
    pub fn utc_now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }

    fn arm(&self, contest_id: Uuid, deadline: DateTime<Utc>) {
        let service: Weak<Inner> = Arc::downgrade(&self.inner);
        self.inner
            .scheduler
            .schedule(contest_id, deadline, self.inner.clock.now(), move || async move {
                let Some(inner) = service.upgrade() else {
                    return;
                };
                let service = ContestService { inner };
                service.inner.scheduler.disarm(contest_id, deadline);
                if let Err(e) = service.close_elapsed(contest_id, deadline).await {
                    error!(%contest_id, error = %e, "failed to close contest at deadline");
                }
            });
    }

    async fn close_elapsed(
        &self,
        contest_id: Uuid,
        deadline: DateTime<Utc>,
    ) -> Result<Option<LifecycleReport>, DomainError> {
        let outcome = {
            let _guard = self.inner.write_lock.lock().await;
            handle_deadline_elapsed(
                contest_id,
                deadline,
                Uuid::new_v4(),
                self.inner.clock.as_ref(),
                &self.inner.store,
            )
            .await?
        };
        let Some(outcome) = outcome else {
            debug!(%contest_id, "deadline elapsed after contest left open, nothing to do");
            return Ok(None);
        };
        info!(%contest_id, %deadline, "contest closed at deadline");
        Ok(Some(self.report(&outcome).await))
    }

    async fn report(&self, result: &ContestCommandResult) -> LifecycleReport {
        LifecycleReport {
            contest: ContestView::from(&result.contest),
            backup: self.run_backup(&result.contest).await,
        }
    }

    async fn run_backup(&self, contest: &Contest) -> BackupOutcome {
        match self.inner.backup.backup().await {
            Ok(snapshot_id) => {
                info!(
                    contest_id = %contest.id,
                    %snapshot_id,
                    status = %contest.status(),
                    "backup written"
                );
                BackupOutcome::Saved { snapshot_id }
            }
            Err(e) => {
                warn!(
                    contest_id = %contest.id,
                    error = %e,
                    "backup failed; contest state is unaffected"
                );
                BackupOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone};
    use fob_core::error::EntryRejection;
    use fob_test_support::{FailingBackup, InMemoryEventRepository, ManualClock, RecordingBackup};

    use super::*;
    use crate::domain::events::CloseReason;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    struct Harness {
        service: ContestService,
        clock: Arc<ManualClock>,
        backup: Arc<RecordingBackup>,
        repo: Arc<InMemoryEventRepository>,
    }

    fn harness() -> Harness {
        let repo = Arc::new(InMemoryEventRepository::new());
        let clock = Arc::new(ManualClock::new(start()));
        let backup = Arc::new(RecordingBackup::new());
        let service = ContestService::new(
            ContestStore::new(repo.clone()),
            clock.clone(),
            backup.clone(),
            ContestSettings::default(),
        );
        Harness {
            service,
            clock,
            backup,
            repo,
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    async fn open_with_prizes(service: &ContestService) {
        service
            .new_contest(None, Some(strings(&["Gold", "Silver"])))
            .await
            .unwrap();
        service.open_contest().await.unwrap();
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_full_round_ranks_winners_and_backs_up_at_end() {
        // Arrange
        let h = harness();
        open_with_prizes(&h.service).await;
        for (participant, guess) in [("p1", "Tama"), ("p2", "Oto"), ("p3", "tama")] {
            h.clock.advance(Duration::minutes(1));
            h.service
                .enter(participant.to_owned(), guess.to_owned())
                .await
                .unwrap();
        }

        // Act
        let report = h.service.end_contest("Tama".to_owned()).await.unwrap();

        // Assert
        assert_eq!(report.contest.status, ContestStatus::Ended);
        let winners: Vec<&str> = report.contest.winners.iter().map(ParticipantId::as_str).collect();
        assert_eq!(winners, vec!["p1", "p3"]);
        assert_eq!(report.contest.awards[1].prize.as_deref(), Some("Silver"));
        assert!(matches!(report.backup, BackupOutcome::Saved { .. }));
        assert_eq!(h.backup.count(), 1);
        assert_eq!(h.service.history().await.unwrap().len(), 1);
        assert_eq!(h.service.past_winners().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_backup_failure_does_not_roll_back_transition() {
        // Arrange
        let repo = Arc::new(InMemoryEventRepository::new());
        let service = ContestService::new(
            ContestStore::new(repo),
            Arc::new(ManualClock::new(start())),
            Arc::new(FailingBackup),
            ContestSettings::default(),
        );
        open_with_prizes(&service).await;

        // Act
        let report = service.end_contest("Tama".to_owned()).await.unwrap();

        // Assert
        match report.backup {
            BackupOutcome::Failed { reason } => assert!(reason.contains("disk full")),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(service.status().await.unwrap().status, ContestStatus::Ended);
        assert!(service.backup_now().await.is_err());
    }

    #[tokio::test]
    async fn test_failed_store_write_leaves_state_unchanged() {
        // Arrange
        let h = harness();
        open_with_prizes(&h.service).await;
        h.repo.fail_appends(true);

        // Act
        let entry = h.service.enter("p1".to_owned(), "Tama".to_owned()).await;
        let end = h.service.end_contest("Tama".to_owned()).await;
        h.repo.fail_appends(false);

        // Assert
        assert!(matches!(entry, Err(DomainError::Infrastructure(_))));
        assert!(matches!(end, Err(DomainError::Infrastructure(_))));
        let status = h.service.status().await.unwrap();
        assert_eq!(status.status, ContestStatus::Open);
        assert_eq!(status.entry_count, 0);
        assert_eq!(h.backup.count(), 0);
    }

    #[tokio::test]
    async fn test_new_contest_rejected_while_draft_exists() {
        let h = harness();
        h.service.new_contest(None, None).await.unwrap();

        let result = h.service.new_contest(None, None).await;

        assert!(matches!(result, Err(DomainError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_enter_without_contest_is_not_found() {
        let h = harness();

        let result = h.service.enter("p1".to_owned(), "Tama".to_owned()).await;

        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_manual_close_backs_up_and_rejects_entries() {
        let h = harness();
        open_with_prizes(&h.service).await;

        let report = h.service.close_contest().await.unwrap();
        let entry = h.service.enter("p1".to_owned(), "Tama".to_owned()).await;

        assert_eq!(report.contest.close_reason, Some(CloseReason::Manual));
        assert_eq!(h.backup.count(), 1);
        assert!(matches!(
            entry,
            Err(DomainError::EntryRejected(EntryRejection::NotOpen))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_timer_closes_contest_and_backs_up() {
        // Arrange
        let h = harness();
        open_with_prizes(&h.service).await;
        h.service
            .set_deadline("2026-01-15 18:00".to_owned(), Some("UTC".to_owned()))
            .await
            .unwrap();

        // Act
        tokio::time::sleep(std::time::Duration::from_secs(8 * 3600 + 1)).await;
        settle().await;

        // Assert
        let status = h.service.status().await.unwrap();
        assert_eq!(status.status, ContestStatus::Closed);
        assert_eq!(status.close_reason, Some(CloseReason::DeadlineElapsed));
        assert_eq!(h.backup.count(), 1);
        assert_eq!(h.service.pending_deadline(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleared_deadline_never_closes_contest() {
        let h = harness();
        open_with_prizes(&h.service).await;
        h.service
            .set_deadline("11:00".to_owned(), Some("UTC".to_owned()))
            .await
            .unwrap();

        h.service.clear_deadline().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(2 * 3600)).await;
        settle().await;

        assert_eq!(h.service.status().await.unwrap().status, ContestStatus::Open);
        assert_eq!(h.service.pending_deadline(), None);
        assert_eq!(h.backup.count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resetting_deadline_replaces_pending_timer() {
        // Arrange
        let h = harness();
        open_with_prizes(&h.service).await;
        h.service
            .set_deadline("12:00".to_owned(), Some("UTC".to_owned()))
            .await
            .unwrap();
        h.service
            .set_deadline("14:00".to_owned(), Some("UTC".to_owned()))
            .await
            .unwrap();

        // Act
        tokio::time::sleep(std::time::Duration::from_secs(3 * 3600)).await;
        settle().await;
        let midway = h.service.status().await.unwrap().status;
        tokio::time::sleep(std::time::Duration::from_secs(3600 + 1)).await;
        settle().await;

        // Assert
        assert_eq!(midway, ContestStatus::Open);
        assert_eq!(h.service.status().await.unwrap().status, ContestStatus::Closed);
        assert_eq!(h.backup.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reopen_after_deadline_accepts_entries_again() {
        // Arrange
        let h = harness();
        open_with_prizes(&h.service).await;
        h.service
            .set_deadline("11:00".to_owned(), Some("UTC".to_owned()))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(3600 + 1)).await;
        settle().await;
        h.clock.advance(Duration::hours(2));

        // Act
        let reopened = h.service.open_contest().await.unwrap();
        let entry = h.service.enter("p1".to_owned(), "Tama".to_owned()).await;

        // Assert
        assert_eq!(reopened.status, ContestStatus::Open);
        assert_eq!(reopened.deadline, None);
        assert!(entry.is_ok());
    }

    #[tokio::test]
    async fn test_resume_closes_contest_whose_deadline_passed_offline() {
        // Arrange
        let h = harness();
        open_with_prizes(&h.service).await;
        h.service
            .set_deadline("12:00".to_owned(), Some("UTC".to_owned()))
            .await
            .unwrap();
        let Harness { service, clock, repo, .. } = h;
        drop(service);
        clock.set(Utc.with_ymd_and_hms(2026, 1, 15, 13, 0, 0).unwrap());
        let backup = Arc::new(RecordingBackup::new());
        let restarted = ContestService::new(
            ContestStore::new(repo),
            clock,
            backup.clone(),
            ContestSettings::default(),
        );

        // Act
        let report = restarted.resume().await.unwrap().unwrap();

        // Assert
        assert_eq!(report.contest.status, ContestStatus::Closed);
        assert_eq!(report.contest.close_reason, Some(CloseReason::DeadlineElapsed));
        assert_eq!(backup.count(), 1);
    }

    #[tokio::test]
    async fn test_resume_rearms_future_deadline() {
        let h = harness();
        open_with_prizes(&h.service).await;
        let view = h
            .service
            .set_deadline("12:00".to_owned(), Some("UTC".to_owned()))
            .await
            .unwrap();
        let restarted = ContestService::new(
            ContestStore::new(h.repo.clone()),
            h.clock.clone(),
            h.backup.clone(),
            ContestSettings::default(),
        );

        let report = restarted.resume().await.unwrap();

        assert!(report.is_none());
        assert_eq!(
            restarted.pending_deadline(),
            Some((view.contest_id, view.deadline.unwrap()))
        );
    }

    #[tokio::test]
    async fn test_concurrent_entries_from_distinct_participants_all_land() {
        // Arrange
        let h = harness();
        open_with_prizes(&h.service).await;
        let systems = h.service.allowed_locations("").await.unwrap();

        // Act
        let tasks: Vec<_> = (0..20)
            .map(|i| {
                let service = h.service.clone();
                let guess = systems[i % systems.len()].clone();
                tokio::spawn(async move { service.enter(format!("pilot-{i}"), guess).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        // Assert
        assert_eq!(h.service.list_entries().await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_read_operations_use_current_contest() {
        let h = harness();
        open_with_prizes(&h.service).await;
        h.service
            .enter("p1".to_owned(), "Tama".to_owned())
            .await
            .unwrap();

        let mine = h.service.my_entry("p1").await.unwrap();
        let prizes = h.service.prizes().await.unwrap();

        assert_eq!(mine.guess, "Tama");
        assert_eq!(prizes.prizes, strings(&["Gold", "Silver"]));
        assert_eq!(h.service.utc_now(), start());
        assert_eq!(h.service.rules().default_zone, "CST");
    }
}
