//! The contest aggregate and its state machine.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use fob_core::aggregate::AggregateRoot;
use fob_core::clock::Clock;
use fob_core::error::DomainError;
use fob_core::event::EventMetadata;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::deadline::resolve_deadline;
use super::entries::{Entry, ParticipantId};
use super::events::{
    CloseReason, ContestClosed, ContestCreated, ContestEnded, ContestEvent, ContestEventKind,
    ContestOpened, DeadlineCleared, DeadlineSet, EntrySubmitted, LocationsUpdated, PrizesSet,
};
use super::locations::LocationRegistry;
use super::prizes::{PrizeAward, PrizeList};
use super::validation::EntryValidator;
use super::winners::select_winners;

/// Contest phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContestStatus {
    /// Created, not yet accepting entries.
    #[default]
    Draft,
    /// Accepting entries.
    Open,
    /// Entries frozen, outcome not yet declared.
    Closed,
    /// Outcome declared; terminal.
    Ended,
}

impl ContestStatus {
    /// Lower-case name used in messages and views.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for ContestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The aggregate root for one contest round.
#[derive(Debug, Clone)]
pub struct Contest {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (committed event count).
    pub(crate) version: i64,
    number: u32,
    status: ContestStatus,
    allowed_locations: LocationRegistry,
    deadline: Option<DateTime<Utc>>,
    prizes: PrizeList,
    entries: BTreeMap<ParticipantId, Entry>,
    result: Option<String>,
    winners: Vec<ParticipantId>,
    awards: Vec<PrizeAward>,
    close_reason: Option<CloseReason>,
    created_at: Option<DateTime<Utc>>,
    opened_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<ContestEvent>,
}

impl Contest {
    /// Creates an empty aggregate for reconstitution from history.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            number: 0,
            status: ContestStatus::Draft,
            allowed_locations: LocationRegistry::default(),
            deadline: None,
            prizes: PrizeList::default(),
            entries: BTreeMap::new(),
            result: None,
            winners: Vec::new(),
            awards: Vec::new(),
            close_reason: None,
            created_at: None,
            opened_at: None,
            closed_at: None,
            ended_at: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Starts a new contest in `Draft`, producing a `ContestCreated` event.
    #[must_use]
    pub fn create(
        id: Uuid,
        number: u32,
        allowed_locations: LocationRegistry,
        prizes: PrizeList,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Self {
        let mut contest = Self::new(id);
        contest.record(
            ContestEventKind::ContestCreated(ContestCreated {
                contest_id: id,
                number,
                allowed_locations,
                prizes,
            }),
            correlation_id,
            clock,
        );
        contest
    }

    /// Replaces the allowed locations. Only valid in `Draft`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` outside `Draft`.
    pub fn update_locations(
        &mut self,
        allowed_locations: LocationRegistry,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.guard("set locations", &[ContestStatus::Draft])?;
        self.record(
            ContestEventKind::LocationsUpdated(LocationsUpdated {
                contest_id: self.id,
                allowed_locations,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// `Draft -> Open` or `Closed -> Open`.
    ///
    /// Re-opening with a deadline that has already passed clears it first,
    /// otherwise entries would be rejected immediately.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` from `Open` or `Ended`.
    pub fn open(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        self.guard("open", &[ContestStatus::Draft, ContestStatus::Closed])?;
        if self.deadline.is_some_and(|deadline| deadline <= clock.now()) {
            self.record(
                ContestEventKind::DeadlineCleared(DeadlineCleared {
                    contest_id: self.id,
                }),
                correlation_id,
                clock,
            );
        }
        self.record(
            ContestEventKind::ContestOpened(ContestOpened {
                contest_id: self.id,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// `Open -> Closed`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless `Open`.
    pub fn close(
        &mut self,
        reason: CloseReason,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.guard("close", &[ContestStatus::Open])?;
        self.record(
            ContestEventKind::ContestClosed(ContestClosed {
                contest_id: self.id,
                reason,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Converts `local_time` in `source_zone` to UTC and sets it as the
    /// deadline. Only valid while `Open`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless `Open`, or
    /// `DomainError::Validation` for a bad or past time.
    pub fn set_deadline(
        &mut self,
        local_time: &str,
        source_zone: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<DateTime<Utc>, DomainError> {
        self.guard("set a deadline", &[ContestStatus::Open])?;
        let deadline = resolve_deadline(local_time, source_zone, clock.now())?;
        self.record(
            ContestEventKind::DeadlineSet(DeadlineSet {
                contest_id: self.id,
                deadline,
                local_time: local_time.trim().to_owned(),
                source_zone: source_zone.trim().to_owned(),
            }),
            correlation_id,
            clock,
        );
        Ok(deadline)
    }

    /// Removes the deadline. Valid in `Open` and `Closed`; returns `false`
    /// (and records nothing) when no deadline was set.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` in `Draft` or `Ended`.
    pub fn clear_deadline(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<bool, DomainError> {
        self.guard(
            "clear the deadline",
            &[ContestStatus::Open, ContestStatus::Closed],
        )?;
        if self.deadline.is_none() {
            return Ok(false);
        }
        self.record(
            ContestEventKind::DeadlineCleared(DeadlineCleared {
                contest_id: self.id,
            }),
            correlation_id,
            clock,
        );
        Ok(true)
    }

    /// Records or replaces `participant`'s guess after validation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EntryRejected` with the validator's reason.
    pub fn submit_entry(
        &mut self,
        participant: &ParticipantId,
        guess: &str,
        validator: &EntryValidator,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Entry, DomainError> {
        let now = clock.now();
        let location = validator.validate(self, participant, guess, now)?;
        let entry = Entry {
            participant_id: participant.clone(),
            guess: location,
            submitted_at: now,
        };
        self.record(
            ContestEventKind::EntrySubmitted(EntrySubmitted {
                contest_id: self.id,
                participant_id: entry.participant_id.clone(),
                guess: entry.guess.clone(),
                submitted_at: now,
            }),
            correlation_id,
            clock,
        );
        Ok(entry)
    }

    /// Replaces the prize list. Valid any time before `Ended`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` once `Ended`.
    pub fn set_prizes(
        &mut self,
        prizes: PrizeList,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.guard(
            "set prizes",
            &[ContestStatus::Draft, ContestStatus::Open, ContestStatus::Closed],
        )?;
        self.record(
            ContestEventKind::PrizesSet(PrizesSet {
                contest_id: self.id,
                prizes,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Declares the outcome: `Open -> Ended` or `Closed -> Ended`. Computes
    /// the ranked winners and their prize awards.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` from `Draft` or `Ended`, or
    /// `DomainError::Validation` if `result` is not an allowed location or no
    /// prizes are set.
    pub fn end(
        &mut self,
        result: &str,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.guard("end", &[ContestStatus::Open, ContestStatus::Closed])?;
        let result = self.allowed_locations.resolve(result).ok_or_else(|| {
            DomainError::Validation(format!("{} is not an allowed location", result.trim()))
        })?;
        if self.prizes.is_empty() {
            return Err(DomainError::Validation(
                "prizes must be set before the contest can end".to_owned(),
            ));
        }
        let winners = select_winners(self.entries.values(), &result);
        let awards = self.prizes.assign(&winners);
        self.record(
            ContestEventKind::ContestEnded(ContestEnded {
                contest_id: self.id,
                result,
                winners,
                awards,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Marks uncommitted events as persisted.
    #[allow(clippy::cast_possible_wrap)]
    pub fn mark_committed(&mut self) {
        self.version += self.uncommitted_events.len() as i64;
        self.uncommitted_events.clear();
    }

    /// Human-facing round number.
    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Current phase.
    #[must_use]
    pub fn status(&self) -> ContestStatus {
        self.status
    }

    /// Returns `true` unless the contest has ended.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status != ContestStatus::Ended
    }

    /// Locations participants may guess.
    #[must_use]
    pub fn allowed_locations(&self) -> &LocationRegistry {
        &self.allowed_locations
    }

    /// Entry deadline in UTC, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Ordered prize list.
    #[must_use]
    pub fn prizes(&self) -> &PrizeList {
        &self.prizes
    }

    /// Entries keyed by participant.
    #[must_use]
    pub fn entries(&self) -> &BTreeMap<ParticipantId, Entry> {
        &self.entries
    }

    /// `participant`'s current entry, if any.
    #[must_use]
    pub fn entry(&self, participant: &ParticipantId) -> Option<&Entry> {
        self.entries.get(participant)
    }

    /// Declared outcome, once ended.
    #[must_use]
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// Ranked winners, once ended.
    #[must_use]
    pub fn winners(&self) -> &[ParticipantId] {
        &self.winners
    }

    /// Prize awards by rank, once ended.
    #[must_use]
    pub fn awards(&self) -> &[PrizeAward] {
        &self.awards
    }

    /// Why the contest last closed.
    #[must_use]
    pub fn close_reason(&self) -> Option<CloseReason> {
        self.close_reason
    }

    /// When the contest was created.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// When the contest last opened.
    #[must_use]
    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        self.opened_at
    }

    /// When the contest last closed.
    #[must_use]
    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    /// When the contest ended.
    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Returns the next sequence number for a new event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    fn guard(&self, action: &'static str, allowed: &[ContestStatus]) -> Result<(), DomainError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                action,
                status: self.status.to_string(),
            })
        }
    }

    fn record(&mut self, kind: ContestEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = ContestEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                aggregate_id: self.id,
                sequence_number: self.next_sequence_number(),
                correlation_id,
                causation_id: correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };
        self.mutate(&event);
        self.uncommitted_events.push(event);
    }

    fn mutate(&mut self, event: &ContestEvent) {
        let at = event.metadata.occurred_at;
        match &event.kind {
            ContestEventKind::ContestCreated(payload) => {
                self.number = payload.number;
                self.status = ContestStatus::Draft;
                self.allowed_locations = payload.allowed_locations.clone();
                self.prizes = payload.prizes.clone();
                self.created_at = Some(at);
            }
            ContestEventKind::LocationsUpdated(payload) => {
                self.allowed_locations = payload.allowed_locations.clone();
            }
            ContestEventKind::ContestOpened(_) => {
                self.status = ContestStatus::Open;
                self.opened_at = Some(at);
                self.close_reason = None;
            }
            ContestEventKind::DeadlineSet(payload) => {
                self.deadline = Some(payload.deadline);
            }
            ContestEventKind::DeadlineCleared(_) => {
                self.deadline = None;
            }
            ContestEventKind::ContestClosed(payload) => {
                self.status = ContestStatus::Closed;
                self.close_reason = Some(payload.reason);
                self.closed_at = Some(at);
            }
            ContestEventKind::EntrySubmitted(payload) => {
                self.entries.insert(
                    payload.participant_id.clone(),
                    Entry {
                        participant_id: payload.participant_id.clone(),
                        guess: payload.guess.clone(),
                        submitted_at: payload.submitted_at,
                    },
                );
            }
            ContestEventKind::PrizesSet(payload) => {
                self.prizes = payload.prizes.clone();
            }
            ContestEventKind::ContestEnded(payload) => {
                self.status = ContestStatus::Ended;
                self.result = Some(payload.result.clone());
                self.winners.clone_from(&payload.winners);
                self.awards.clone_from(&payload.awards);
                self.deadline = None;
                self.ended_at = Some(at);
            }
        }
    }
}

impl AggregateRoot for Contest {
    type Event = ContestEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        self.mutate(event);
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use fob_core::error::EntryRejection;
    use fob_core::event::DomainEvent;
    use fob_test_support::FixedClock;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn prizes(items: &[&str]) -> PrizeList {
        PrizeList::new(items.iter().map(|s| (*s).to_owned()).collect()).unwrap()
    }

    fn participant(id: &str) -> ParticipantId {
        ParticipantId::new(id).unwrap()
    }

    fn draft() -> Contest {
        Contest::create(
            Uuid::now_v7(),
            1,
            LocationRegistry::new(["Tama", "Oto", "Vey"]).unwrap(),
            PrizeList::default(),
            Uuid::new_v4(),
            &FixedClock(now()),
        )
    }

    fn opened() -> Contest {
        let mut contest = draft();
        contest.open(Uuid::new_v4(), &FixedClock(now())).unwrap();
        contest
    }

    fn assert_invalid_transition(result: Result<(), DomainError>, expected_status: &str) {
        match result {
            Err(DomainError::InvalidTransition { status, .. }) => {
                assert_eq!(status, expected_status);
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
    }

    #[test]
    fn test_create_produces_contest_created_event() {
        // Arrange
        let contest_id = Uuid::now_v7();
        let correlation_id = Uuid::new_v4();
        let clock = FixedClock(now());

        // Act
        let contest = Contest::create(
            contest_id,
            7,
            LocationRegistry::fob_systems(),
            prizes(&["Gold"]),
            correlation_id,
            &clock,
        );

        // Assert
        let events = contest.uncommitted_events();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.event_type(), "contest.contest_created");
        let meta = event.metadata();
        assert_eq!(meta.aggregate_id, contest_id);
        assert_eq!(meta.sequence_number, 1);
        assert_eq!(meta.correlation_id, correlation_id);
        assert_eq!(meta.causation_id, correlation_id);
        assert_eq!(meta.occurred_at, now());
        assert_eq!(contest.status(), ContestStatus::Draft);
        assert_eq!(contest.number(), 7);
        assert_eq!(contest.created_at(), Some(now()));
    }

    #[test]
    fn test_happy_path_walks_every_phase() {
        // Arrange
        let clock = FixedClock(now());
        let mut contest = draft();

        // Act
        contest.open(Uuid::new_v4(), &clock).unwrap();
        contest
            .close(CloseReason::Manual, Uuid::new_v4(), &clock)
            .unwrap();
        contest.open(Uuid::new_v4(), &clock).unwrap();
        contest
            .set_prizes(prizes(&["Gold"]), Uuid::new_v4(), &clock)
            .unwrap();
        contest.end("Tama", Uuid::new_v4(), &clock).unwrap();

        // Assert
        assert_eq!(contest.status(), ContestStatus::Ended);
        let sequence: Vec<i64> = contest
            .uncommitted_events()
            .iter()
            .map(|event| event.metadata().sequence_number)
            .collect();
        assert_eq!(sequence, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        let clock = FixedClock(now());

        let mut contest = draft();
        assert_invalid_transition(
            contest.close(CloseReason::Manual, Uuid::new_v4(), &clock),
            "draft",
        );
        assert_invalid_transition(contest.end("Tama", Uuid::new_v4(), &clock), "draft");

        let mut contest = opened();
        assert_invalid_transition(contest.open(Uuid::new_v4(), &clock), "open");

        contest
            .set_prizes(prizes(&["Gold"]), Uuid::new_v4(), &clock)
            .unwrap();
        contest.end("Tama", Uuid::new_v4(), &clock).unwrap();
        assert_invalid_transition(contest.open(Uuid::new_v4(), &clock), "ended");
        assert_invalid_transition(
            contest.close(CloseReason::Manual, Uuid::new_v4(), &clock),
            "ended",
        );
        assert_invalid_transition(
            contest.set_prizes(prizes(&["Silver"]), Uuid::new_v4(), &clock),
            "ended",
        );
        assert_invalid_transition(contest.end("Tama", Uuid::new_v4(), &clock), "ended");
    }

    #[test]
    fn test_rejected_transition_records_nothing() {
        let clock = FixedClock(now());
        let mut contest = draft();

        let _ = contest.close(CloseReason::Manual, Uuid::new_v4(), &clock);

        assert_eq!(contest.uncommitted_events().len(), 1);
        assert_eq!(contest.status(), ContestStatus::Draft);
    }

    #[test]
    fn test_update_locations_only_in_draft() {
        let clock = FixedClock(now());
        let mut contest = draft();

        contest
            .update_locations(LocationRegistry::new(["Iges"]).unwrap(), Uuid::new_v4(), &clock)
            .unwrap();
        assert!(contest.allowed_locations().contains("iges"));

        contest.open(Uuid::new_v4(), &clock).unwrap();
        assert_invalid_transition(
            contest.update_locations(
                LocationRegistry::new(["Oto"]).unwrap(),
                Uuid::new_v4(),
                &clock,
            ),
            "open",
        );
    }

    #[test]
    fn test_set_deadline_requires_open_contest() {
        let clock = FixedClock(now());
        let mut contest = draft();

        let result = contest.set_deadline("2026-01-15 18:00", "CST", Uuid::new_v4(), &clock);

        assert!(matches!(result, Err(DomainError::InvalidTransition { .. })));
    }

    #[test]
    fn test_set_deadline_stores_utc_instant() {
        let clock = FixedClock(now());
        let mut contest = opened();

        let deadline = contest
            .set_deadline("18:00", "CST", Uuid::new_v4(), &clock)
            .unwrap();

        assert_eq!(deadline, Utc.with_ymd_and_hms(2026, 1, 16, 0, 0, 0).unwrap());
        assert_eq!(contest.deadline(), Some(deadline));
    }

    #[test]
    fn test_set_deadline_in_past_leaves_state_untouched() {
        let clock = FixedClock(now());
        let mut contest = opened();
        let before = contest.uncommitted_events().len();

        let result = contest.set_deadline("2026-01-15 03:00", "CST", Uuid::new_v4(), &clock);

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(contest.deadline(), None);
        assert_eq!(contest.uncommitted_events().len(), before);
    }

    #[test]
    fn test_clear_deadline_without_deadline_records_nothing() {
        let clock = FixedClock(now());
        let mut contest = opened();
        let before = contest.uncommitted_events().len();

        let cleared = contest.clear_deadline(Uuid::new_v4(), &clock).unwrap();

        assert!(!cleared);
        assert_eq!(contest.uncommitted_events().len(), before);
    }

    #[test]
    fn test_clear_deadline_allowed_when_closed() {
        let clock = FixedClock(now());
        let mut contest = opened();
        contest
            .set_deadline("18:00", "CST", Uuid::new_v4(), &clock)
            .unwrap();
        contest
            .close(CloseReason::Manual, Uuid::new_v4(), &clock)
            .unwrap();

        let cleared = contest.clear_deadline(Uuid::new_v4(), &clock).unwrap();

        assert!(cleared);
        assert_eq!(contest.deadline(), None);
    }

    #[test]
    fn test_reopen_after_deadline_clears_expired_deadline() {
        // Arrange
        let mut contest = opened();
        contest
            .set_deadline("18:00", "CST", Uuid::new_v4(), &FixedClock(now()))
            .unwrap();
        let later = FixedClock(now() + Duration::days(1));
        contest
            .close(CloseReason::DeadlineElapsed, Uuid::new_v4(), &later)
            .unwrap();

        // Act
        contest.open(Uuid::new_v4(), &later).unwrap();

        // Assert
        assert_eq!(contest.status(), ContestStatus::Open);
        assert_eq!(contest.deadline(), None);
        let types: Vec<&str> = contest
            .uncommitted_events()
            .iter()
            .rev()
            .take(2)
            .map(DomainEvent::event_type)
            .collect();
        assert_eq!(types, vec!["contest.contest_opened", "contest.deadline_cleared"]);
    }

    #[test]
    fn test_reopen_keeps_future_deadline() {
        let clock = FixedClock(now());
        let mut contest = opened();
        let deadline = contest
            .set_deadline("18:00", "CST", Uuid::new_v4(), &clock)
            .unwrap();
        contest
            .close(CloseReason::Manual, Uuid::new_v4(), &clock)
            .unwrap();

        contest.open(Uuid::new_v4(), &clock).unwrap();

        assert_eq!(contest.deadline(), Some(deadline));
    }

    #[test]
    fn test_reentering_replaces_prior_entry() {
        // Arrange
        let validator = EntryValidator::default();
        let mut contest = opened();
        let p1 = participant("p1");

        // Act
        contest
            .submit_entry(&p1, "Tama", &validator, Uuid::new_v4(), &FixedClock(now()))
            .unwrap();
        let later = now() + Duration::minutes(5);
        contest
            .submit_entry(&p1, "oto", &validator, Uuid::new_v4(), &FixedClock(later))
            .unwrap();

        // Assert
        assert_eq!(contest.entries().len(), 1);
        let entry = contest.entry(&p1).unwrap();
        assert_eq!(entry.guess, "Oto");
        assert_eq!(entry.submitted_at, later);
    }

    #[test]
    fn test_submit_entry_surfaces_rejection_reason() {
        let mut contest = draft();

        let result = contest.submit_entry(
            &participant("p1"),
            "Tama",
            &EntryValidator::default(),
            Uuid::new_v4(),
            &FixedClock(now()),
        );

        assert!(matches!(
            result,
            Err(DomainError::EntryRejected(EntryRejection::NotOpen))
        ));
        assert!(contest.entries().is_empty());
    }

    #[test]
    fn test_end_ranks_winners_and_assigns_prizes() {
        // Arrange
        let validator = EntryValidator::default();
        let mut contest = opened();
        let guesses = [
            ("p1", "Tama", 1),
            ("p2", "Tama", 2),
            ("p3", "Tama", 3),
            ("p4", "Oto", 0),
        ];
        for (id, guess, minutes) in guesses {
            let clock = FixedClock(now() + Duration::minutes(minutes));
            contest
                .submit_entry(&participant(id), guess, &validator, Uuid::new_v4(), &clock)
                .unwrap();
        }
        let clock = FixedClock(now() + Duration::hours(1));
        contest
            .set_prizes(prizes(&["Gold", "Silver"]), Uuid::new_v4(), &clock)
            .unwrap();

        // Act
        contest.end("tama", Uuid::new_v4(), &clock).unwrap();

        // Assert
        assert_eq!(contest.result(), Some("Tama"));
        assert_eq!(
            contest.winners(),
            [participant("p1"), participant("p2"), participant("p3")]
        );
        let awards = contest.awards();
        assert_eq!(awards[0].prize.as_deref(), Some("Gold"));
        assert_eq!(awards[1].prize.as_deref(), Some("Silver"));
        assert_eq!(awards[2].prize, None);
    }

    #[test]
    fn test_end_with_no_matching_entries_has_no_winners() {
        let clock = FixedClock(now());
        let mut contest = opened();
        contest
            .submit_entry(
                &participant("p1"),
                "Oto",
                &EntryValidator::default(),
                Uuid::new_v4(),
                &clock,
            )
            .unwrap();
        contest
            .set_prizes(prizes(&["Gold"]), Uuid::new_v4(), &clock)
            .unwrap();

        contest.end("Vey", Uuid::new_v4(), &clock).unwrap();

        assert_eq!(contest.status(), ContestStatus::Ended);
        assert!(contest.winners().is_empty());
        assert!(contest.awards().is_empty());
    }

    #[test]
    fn test_end_rejects_unknown_result() {
        let clock = FixedClock(now());
        let mut contest = opened();
        contest
            .set_prizes(prizes(&["Gold"]), Uuid::new_v4(), &clock)
            .unwrap();

        let result = contest.end("Jita", Uuid::new_v4(), &clock);

        match result {
            Err(DomainError::Validation(msg)) => assert_eq!(msg, "Jita is not an allowed location"),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert_eq!(contest.status(), ContestStatus::Open);
    }

    #[test]
    fn test_end_requires_prizes() {
        let mut contest = opened();

        let result = contest.end("Tama", Uuid::new_v4(), &FixedClock(now()));

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_apply_replays_history_into_same_state() {
        // Arrange
        let clock = FixedClock(now());
        let mut original = opened();
        original
            .submit_entry(
                &participant("p1"),
                "Tama",
                &EntryValidator::default(),
                Uuid::new_v4(),
                &clock,
            )
            .unwrap();
        original
            .set_deadline("18:00", "CST", Uuid::new_v4(), &clock)
            .unwrap();

        // Act
        let mut replayed = Contest::new(original.id);
        for event in original.uncommitted_events() {
            replayed.apply(event);
        }

        // Assert
        assert_eq!(replayed.version(), 4);
        assert_eq!(replayed.status(), original.status());
        assert_eq!(replayed.deadline(), original.deadline());
        assert_eq!(replayed.entries(), original.entries());
        assert_eq!(replayed.opened_at(), Some(now()));
    }

    #[test]
    fn test_mark_committed_advances_version() {
        let mut contest = opened();

        contest.mark_committed();

        assert_eq!(contest.version(), 2);
        assert!(contest.uncommitted_events().is_empty());
    }
}
