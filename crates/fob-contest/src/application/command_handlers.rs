//! Command handlers for the contest context.
//!
//! Each handler loads the contest, executes the command against it and
//! persists the resulting events in a single append.

use chrono::{DateTime, Utc};
use fob_core::clock::Clock;
use fob_core::error::DomainError;
use fob_core::repository::StoredEvent;
use uuid::Uuid;

use crate::application::store::ContestStore;
use crate::domain::aggregates::{Contest, ContestStatus};
use crate::domain::commands::{
    ClearDeadline, CloseContest, CreateContest, EndContest, OpenContest, SetDeadline,
    SetLocations, SetPrizes, SubmitEntry,
};
use crate::domain::entries::ParticipantId;
use crate::domain::events::CloseReason;
use crate::domain::locations::LocationRegistry;
use crate::domain::prizes::PrizeList;
use crate::settings::ContestSettings;

/// The contest after a command, plus the events it produced.
#[derive(Debug)]
pub struct ContestCommandResult {
    /// Contest state after the command was applied.
    pub contest: Contest,
    /// Events persisted by the command; empty for a no-op.
    pub stored_events: Vec<StoredEvent>,
}

async fn commit(
    mut contest: Contest,
    store: &ContestStore,
) -> Result<ContestCommandResult, DomainError> {
    let stored_events = store.save(&mut contest).await?;
    Ok(ContestCommandResult {
        contest,
        stored_events,
    })
}

/// Handles `CreateContest`: refuses while another contest is unfinished,
/// then creates round `max + 1` in `Draft`.
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` if a contest is still active,
/// `DomainError::Validation` for bad locations or prizes, or a store error.
pub async fn handle_create_contest(
    command: &CreateContest,
    settings: &ContestSettings,
    clock: &dyn Clock,
    store: &ContestStore,
) -> Result<ContestCommandResult, DomainError> {
    let contests = store.all().await?;
    if let Some(active) = contests.iter().find(|contest| contest.is_active()) {
        return Err(DomainError::InvalidTransition {
            action: "create a new contest",
            status: format!("contest #{} is {}", active.number(), active.status()),
        });
    }

    let allowed_locations = match &command.locations {
        Some(names) => LocationRegistry::new(names)?,
        None => settings.registry()?,
    };
    let prizes = match &command.prizes {
        Some(prizes) => PrizeList::new(prizes.clone())?,
        None => PrizeList::default(),
    };
    let number = contests.iter().map(Contest::number).max().unwrap_or(0) + 1;

    let contest = Contest::create(
        Uuid::now_v7(),
        number,
        allowed_locations,
        prizes,
        command.correlation_id,
        clock,
    );
    commit(contest, store).await
}

/// Handles `SetLocations`.
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` outside `Draft`,
/// `DomainError::Validation` for an empty list, or a store error.
pub async fn handle_set_locations(
    command: &SetLocations,
    clock: &dyn Clock,
    store: &ContestStore,
) -> Result<ContestCommandResult, DomainError> {
    let mut contest = store.load(command.contest_id).await?;
    let registry = LocationRegistry::new(&command.locations)?;
    contest.update_locations(registry, command.correlation_id, clock)?;
    commit(contest, store).await
}

/// Handles `OpenContest`.
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` from `Open` or `Ended`, or a
/// store error.
pub async fn handle_open_contest(
    command: &OpenContest,
    clock: &dyn Clock,
    store: &ContestStore,
) -> Result<ContestCommandResult, DomainError> {
    let mut contest = store.load(command.contest_id).await?;
    contest.open(command.correlation_id, clock)?;
    commit(contest, store).await
}

/// Handles `CloseContest` (manual close).
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` unless `Open`, or a store error.
pub async fn handle_close_contest(
    command: &CloseContest,
    clock: &dyn Clock,
    store: &ContestStore,
) -> Result<ContestCommandResult, DomainError> {
    let mut contest = store.load(command.contest_id).await?;
    contest.close(CloseReason::Manual, command.correlation_id, clock)?;
    commit(contest, store).await
}

/// Handles a deadline timer firing. Closes the contest only if it is still
/// `Open` with exactly the deadline the timer was armed for; otherwise
/// returns `None` and changes nothing.
///
/// # Errors
///
/// Returns a store error.
pub async fn handle_deadline_elapsed(
    contest_id: Uuid,
    deadline: DateTime<Utc>,
    correlation_id: Uuid,
    clock: &dyn Clock,
    store: &ContestStore,
) -> Result<Option<ContestCommandResult>, DomainError> {
    let mut contest = store.load(contest_id).await?;
    if contest.status() != ContestStatus::Open || contest.deadline() != Some(deadline) {
        return Ok(None);
    }
    contest.close(CloseReason::DeadlineElapsed, correlation_id, clock)?;
    commit(contest, store).await.map(Some)
}

/// Handles `SetDeadline`, falling back to the configured zone.
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` unless `Open`,
/// `DomainError::Validation` for a bad or past time, or a store error.
pub async fn handle_set_deadline(
    command: &SetDeadline,
    settings: &ContestSettings,
    clock: &dyn Clock,
    store: &ContestStore,
) -> Result<ContestCommandResult, DomainError> {
    let mut contest = store.load(command.contest_id).await?;
    let zone = command
        .source_zone
        .as_deref()
        .filter(|zone| !zone.trim().is_empty())
        .unwrap_or(settings.default_zone.as_str());
    contest.set_deadline(&command.local_time, zone, command.correlation_id, clock)?;
    commit(contest, store).await
}

/// Handles `ClearDeadline`. Clearing an unset deadline succeeds without
/// producing events.
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` in `Draft` or `Ended`, or a
/// store error.
pub async fn handle_clear_deadline(
    command: &ClearDeadline,
    clock: &dyn Clock,
    store: &ContestStore,
) -> Result<ContestCommandResult, DomainError> {
    let mut contest = store.load(command.contest_id).await?;
    contest.clear_deadline(command.correlation_id, clock)?;
    commit(contest, store).await
}

/// Handles `SubmitEntry`.
///
/// # Errors
///
/// Returns `DomainError::EntryRejected` with the reason,
/// `DomainError::Validation` for a blank participant, or a store error.
pub async fn handle_submit_entry(
    command: &SubmitEntry,
    settings: &ContestSettings,
    clock: &dyn Clock,
    store: &ContestStore,
) -> Result<ContestCommandResult, DomainError> {
    let participant = ParticipantId::new(command.participant_id.as_str())?;
    let mut contest = store.load(command.contest_id).await?;
    contest.submit_entry(
        &participant,
        &command.guess,
        &settings.validator(),
        command.correlation_id,
        clock,
    )?;
    commit(contest, store).await
}

/// Handles `SetPrizes`.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an out-of-range list,
/// `DomainError::InvalidTransition` once `Ended`, or a store error.
pub async fn handle_set_prizes(
    command: &SetPrizes,
    clock: &dyn Clock,
    store: &ContestStore,
) -> Result<ContestCommandResult, DomainError> {
    let prizes = PrizeList::new(command.prizes.clone())?;
    let mut contest = store.load(command.contest_id).await?;
    contest.set_prizes(prizes, command.correlation_id, clock)?;
    commit(contest, store).await
}

/// Handles `EndContest`.
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` from `Draft` or `Ended`,
/// `DomainError::Validation` for an unknown result or missing prizes, or a
/// store error.
pub async fn handle_end_contest(
    command: &EndContest,
    clock: &dyn Clock,
    store: &ContestStore,
) -> Result<ContestCommandResult, DomainError> {
    let mut contest = store.load(command.contest_id).await?;
    contest.end(&command.result, command.correlation_id, clock)?;
    commit(contest, store).await
}
