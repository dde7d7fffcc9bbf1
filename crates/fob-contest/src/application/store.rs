//! Contest Store: contests reconstituted from the event repository.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use fob_core::aggregate::AggregateRoot;
use fob_core::error::DomainError;
use fob_core::event::{DomainEvent, EventMetadata};
use fob_core::repository::{EventRepository, StoredEvent};
use uuid::Uuid;

use crate::domain::aggregates::{Contest, ContestStatus};
use crate::domain::events::{ContestEvent, ContestEventKind};

pub(crate) fn to_stored_event(event: &ContestEvent) -> StoredEvent {
    let meta = event.metadata();
    StoredEvent {
        event_id: meta.event_id,
        aggregate_id: meta.aggregate_id,
        event_type: event.event_type().to_owned(),
        payload: event.to_payload(),
        sequence_number: meta.sequence_number,
        correlation_id: meta.correlation_id,
        causation_id: meta.causation_id,
        occurred_at: meta.occurred_at,
    }
}

/// Reconstitutes a `Contest` from its stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub fn reconstitute<'a, I>(contest_id: Uuid, existing_events: I) -> Result<Contest, DomainError>
where
    I: IntoIterator<Item = &'a StoredEvent>,
{
    let mut contest = Contest::new(contest_id);
    for stored in existing_events {
        let kind: ContestEventKind =
            serde_json::from_value(stored.payload.clone()).map_err(|e| {
                DomainError::Infrastructure(format!("event deserialization failed: {e}"))
            })?;
        let event = ContestEvent {
            metadata: EventMetadata {
                event_id: stored.event_id,
                event_type: stored.event_type.clone(),
                aggregate_id: stored.aggregate_id,
                sequence_number: stored.sequence_number,
                correlation_id: stored.correlation_id,
                causation_id: stored.causation_id,
                occurred_at: stored.occurred_at,
            },
            kind,
        };
        contest.apply(&event);
    }
    Ok(contest)
}

/// Rebuilds every contest found in `events`, ordered by round number.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if any event fails to deserialize.
pub fn project_contests(events: &[StoredEvent]) -> Result<Vec<Contest>, DomainError> {
    let mut streams: HashMap<Uuid, Vec<&StoredEvent>> = HashMap::new();
    for event in events {
        streams.entry(event.aggregate_id).or_default().push(event);
    }
    let mut contests = streams
        .into_iter()
        .map(|(contest_id, mut stream)| {
            stream.sort_by_key(|event| event.sequence_number);
            reconstitute(contest_id, stream)
        })
        .collect::<Result<Vec<_>, _>>()?;
    contests.sort_by(|a, b| a.number().cmp(&b.number()).then_with(|| a.id.cmp(&b.id)));
    Ok(contests)
}

/// Durable record of contests, entries and history.
#[derive(Clone)]
pub struct ContestStore {
    repo: Arc<dyn EventRepository>,
}

impl fmt::Debug for ContestStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContestStore").finish_non_exhaustive()
    }
}

impl ContestStore {
    /// Wraps an event repository.
    #[must_use]
    pub fn new(repo: Arc<dyn EventRepository>) -> Self {
        Self { repo }
    }

    /// The underlying event repository.
    #[must_use]
    pub fn repository(&self) -> &Arc<dyn EventRepository> {
        &self.repo
    }

    /// Loads one contest.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the contest has no events, or the
    /// repository's error.
    pub async fn load(&self, contest_id: Uuid) -> Result<Contest, DomainError> {
        let events = self.repo.load_events(contest_id).await?;
        if events.is_empty() {
            return Err(DomainError::NotFound(format!("contest {contest_id}")));
        }
        reconstitute(contest_id, &events)
    }

    /// Every contest, oldest round first.
    ///
    /// # Errors
    ///
    /// Returns the repository's error.
    pub async fn all(&self) -> Result<Vec<Contest>, DomainError> {
        let events = self.repo.load_all_events().await?;
        project_contests(&events)
    }

    /// The contest that has not ended yet, if any.
    ///
    /// # Errors
    ///
    /// Returns the repository's error.
    pub async fn active(&self) -> Result<Option<Contest>, DomainError> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .rev()
            .find(Contest::is_active))
    }

    /// Like [`Self::active`], but a missing contest is an error.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` when every contest has ended.
    pub async fn require_active(&self) -> Result<Contest, DomainError> {
        self.active()
            .await?
            .ok_or_else(|| DomainError::NotFound("no active contest".to_owned()))
    }

    /// The most recent contest regardless of phase.
    ///
    /// # Errors
    ///
    /// Returns the repository's error.
    pub async fn latest(&self) -> Result<Option<Contest>, DomainError> {
        Ok(self.all().await?.pop())
    }

    /// Ended contests, newest first.
    ///
    /// # Errors
    ///
    /// Returns the repository's error.
    pub async fn history(&self) -> Result<Vec<Contest>, DomainError> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .rev()
            .filter(|contest| contest.status() == ContestStatus::Ended)
            .collect())
    }

    /// Appends the contest's uncommitted events in one batch and marks them
    /// committed. Nothing is applied if the append fails.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ConcurrencyConflict` or
    /// `DomainError::Infrastructure` from the repository.
    pub async fn save(&self, contest: &mut Contest) -> Result<Vec<StoredEvent>, DomainError> {
        let stored_events: Vec<StoredEvent> = contest
            .uncommitted_events()
            .iter()
            .map(to_stored_event)
            .collect();
        if stored_events.is_empty() {
            return Ok(stored_events);
        }
        self.repo
            .append_events(contest.id, contest.version(), &stored_events)
            .await?;
        contest.mark_committed();
        Ok(stored_events)
    }
}
