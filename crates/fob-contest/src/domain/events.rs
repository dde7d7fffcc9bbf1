//! Domain events for the contest context.

use chrono::{DateTime, Utc};
use fob_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entries::ParticipantId;
use super::locations::LocationRegistry;
use super::prizes::{PrizeAward, PrizeList};

/// Event type name for [`ContestCreated`].
pub const CONTEST_CREATED: &str = "contest.contest_created";
/// Event type name for [`LocationsUpdated`].
pub const LOCATIONS_UPDATED: &str = "contest.locations_updated";
/// Event type name for [`ContestOpened`].
pub const CONTEST_OPENED: &str = "contest.contest_opened";
/// Event type name for [`DeadlineSet`].
pub const DEADLINE_SET: &str = "contest.deadline_set";
/// Event type name for [`DeadlineCleared`].
pub const DEADLINE_CLEARED: &str = "contest.deadline_cleared";
/// Event type name for [`ContestClosed`].
pub const CONTEST_CLOSED: &str = "contest.contest_closed";
/// Event type name for [`EntrySubmitted`].
pub const ENTRY_SUBMITTED: &str = "contest.entry_submitted";
/// Event type name for [`PrizesSet`].
pub const PRIZES_SET: &str = "contest.prizes_set";
/// Event type name for [`ContestEnded`].
pub const CONTEST_ENDED: &str = "contest.contest_ended";

/// Emitted when an admin creates a new contest in `Draft`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestCreated {
    /// The contest identifier.
    pub contest_id: Uuid,
    /// Human-facing round number.
    pub number: u32,
    /// Locations participants may guess.
    pub allowed_locations: LocationRegistry,
    /// Initial prize list; may be empty.
    pub prizes: PrizeList,
}

/// Emitted when the allowed locations are replaced while in `Draft`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationsUpdated {
    /// The contest identifier.
    pub contest_id: Uuid,
    /// The new location set.
    pub allowed_locations: LocationRegistry,
}

/// Emitted when a contest starts (or resumes) accepting entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestOpened {
    /// The contest identifier.
    pub contest_id: Uuid,
}

/// Emitted when an entry deadline is set or replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadlineSet {
    /// The contest identifier.
    pub contest_id: Uuid,
    /// The deadline in UTC.
    pub deadline: DateTime<Utc>,
    /// The wall-clock input the admin gave.
    pub local_time: String,
    /// The zone the input was interpreted in.
    pub source_zone: String,
}

/// Emitted when the deadline is removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadlineCleared {
    /// The contest identifier.
    pub contest_id: Uuid,
}

/// Why a contest stopped accepting entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// An admin closed the contest.
    Manual,
    /// The deadline timer fired.
    DeadlineElapsed,
}

/// Emitted on the `Open -> Closed` transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestClosed {
    /// The contest identifier.
    pub contest_id: Uuid,
    /// What triggered the close.
    pub reason: CloseReason,
}

/// Emitted when a participant submits or replaces a guess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySubmitted {
    /// The contest identifier.
    pub contest_id: Uuid,
    /// Who guessed.
    pub participant_id: ParticipantId,
    /// Canonical location name.
    pub guess: String,
    /// Submission instant.
    pub submitted_at: DateTime<Utc>,
}

/// Emitted when the prize list is replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizesSet {
    /// The contest identifier.
    pub contest_id: Uuid,
    /// The new prize list.
    pub prizes: PrizeList,
}

/// Emitted when the outcome is declared and the contest becomes terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestEnded {
    /// The contest identifier.
    pub contest_id: Uuid,
    /// The location where the FOB actually spawned.
    pub result: String,
    /// Ranked winners; empty when nobody guessed right.
    pub winners: Vec<ParticipantId>,
    /// Prize assignment by rank.
    pub awards: Vec<PrizeAward>,
}

/// Event payload variants for the contest context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContestEventKind {
    /// A contest was created.
    ContestCreated(ContestCreated),
    /// Allowed locations were replaced.
    LocationsUpdated(LocationsUpdated),
    /// The contest opened for entries.
    ContestOpened(ContestOpened),
    /// A deadline was set.
    DeadlineSet(DeadlineSet),
    /// The deadline was cleared.
    DeadlineCleared(DeadlineCleared),
    /// The contest closed.
    ContestClosed(ContestClosed),
    /// A participant entered.
    EntrySubmitted(EntrySubmitted),
    /// The prize list changed.
    PrizesSet(PrizesSet),
    /// The contest ended.
    ContestEnded(ContestEnded),
}

impl ContestEventKind {
    /// Returns the stored event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ContestCreated(_) => CONTEST_CREATED,
            Self::LocationsUpdated(_) => LOCATIONS_UPDATED,
            Self::ContestOpened(_) => CONTEST_OPENED,
            Self::DeadlineSet(_) => DEADLINE_SET,
            Self::DeadlineCleared(_) => DEADLINE_CLEARED,
            Self::ContestClosed(_) => CONTEST_CLOSED,
            Self::EntrySubmitted(_) => ENTRY_SUBMITTED,
            Self::PrizesSet(_) => PRIZES_SET,
            Self::ContestEnded(_) => CONTEST_ENDED,
        }
    }
}

/// Domain event envelope for the contest context.
#[derive(Debug, Clone)]
pub struct ContestEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: ContestEventKind,
}

impl DomainEvent for ContestEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("ContestEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
