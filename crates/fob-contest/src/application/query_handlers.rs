//! Query handlers for the contest context.
//!
//! These reconstitute contests from the store and return read-only view
//! DTOs. "Current" always means the contest with the highest round number.

use chrono::{DateTime, Utc};
use fob_core::aggregate::AggregateRoot;
use fob_core::error::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::store::ContestStore;
use crate::domain::aggregates::{Contest, ContestStatus};
use crate::domain::entries::{Entry, ParticipantId};
use crate::domain::events::CloseReason;
use crate::domain::prizes::{MAX_PRIZES, PrizeAward};
use crate::settings::ContestSettings;

/// Full read-only view of a contest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestView {
    /// The contest identifier.
    pub contest_id: Uuid,
    /// Human-facing round number.
    pub number: u32,
    /// Current phase.
    pub status: ContestStatus,
    /// Allowed guess targets.
    pub allowed_locations: Vec<String>,
    /// Entry deadline in UTC.
    pub deadline: Option<DateTime<Utc>>,
    /// Prizes in rank order.
    pub prizes: Vec<String>,
    /// Entries, earliest submission first.
    pub entries: Vec<Entry>,
    /// Declared outcome.
    pub result: Option<String>,
    /// Ranked winners.
    pub winners: Vec<ParticipantId>,
    /// Prize assignment by rank.
    pub awards: Vec<PrizeAward>,
    /// Why the contest last closed.
    pub close_reason: Option<CloseReason>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last open time.
    pub opened_at: Option<DateTime<Utc>>,
    /// Last close time.
    pub closed_at: Option<DateTime<Utc>>,
    /// End time.
    pub ended_at: Option<DateTime<Utc>>,
    /// Committed event count.
    pub version: i64,
}

impl From<&Contest> for ContestView {
    fn from(contest: &Contest) -> Self {
        Self {
            contest_id: contest.id,
            number: contest.number(),
            status: contest.status(),
            allowed_locations: contest.allowed_locations().to_vec(),
            deadline: contest.deadline(),
            prizes: contest.prizes().as_slice().to_vec(),
            entries: entries_by_submission(contest),
            result: contest.result().map(str::to_owned),
            winners: contest.winners().to_vec(),
            awards: contest.awards().to_vec(),
            close_reason: contest.close_reason(),
            created_at: contest.created_at(),
            opened_at: contest.opened_at(),
            closed_at: contest.closed_at(),
            ended_at: contest.ended_at(),
            version: contest.version(),
        }
    }
}

/// Time left until a deadline, truncated to whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    /// Whole days.
    pub days: i64,
    /// Remaining hours.
    pub hours: i64,
    /// Remaining minutes.
    pub minutes: i64,
}

impl Countdown {
    /// Countdown from `now` to `deadline`; zero once the deadline passed.
    #[must_use]
    pub fn between(now: DateTime<Utc>, deadline: DateTime<Utc>) -> Self {
        let total = (deadline - now).num_minutes().max(0);
        Self {
            days: total / (24 * 60),
            hours: (total / 60) % 24,
            minutes: total % 60,
        }
    }
}

/// Admin status summary for the current contest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestStatusView {
    /// The contest identifier.
    pub contest_id: Uuid,
    /// Human-facing round number.
    pub number: u32,
    /// Current phase.
    pub status: ContestStatus,
    /// Last open time.
    pub opened_at: Option<DateTime<Utc>>,
    /// Entry deadline in UTC.
    pub deadline: Option<DateTime<Utc>>,
    /// Time left before the deadline.
    pub time_remaining: Option<Countdown>,
    /// Number of participants with an entry.
    pub entry_count: usize,
    /// Prizes in rank order.
    pub prizes: Vec<String>,
    /// Declared outcome.
    pub result: Option<String>,
    /// Prize assignment by rank.
    pub awards: Vec<PrizeAward>,
    /// Why the contest last closed.
    pub close_reason: Option<CloseReason>,
}

/// Prize list of the current contest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizesView {
    /// Round number.
    pub number: u32,
    /// Prizes in rank order.
    pub prizes: Vec<String>,
    /// Prize assignment, once ended.
    pub awards: Vec<PrizeAward>,
}

/// One finished round in the history listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestSummary {
    /// The contest identifier.
    pub contest_id: Uuid,
    /// Round number.
    pub number: u32,
    /// Declared outcome.
    pub result: Option<String>,
    /// Ranked winners.
    pub winners: Vec<ParticipantId>,
    /// Prize assignment by rank.
    pub awards: Vec<PrizeAward>,
    /// Number of entries.
    pub entry_count: usize,
    /// End time.
    pub ended_at: Option<DateTime<Utc>>,
}

impl From<&Contest> for ContestSummary {
    fn from(contest: &Contest) -> Self {
        Self {
            contest_id: contest.id,
            number: contest.number(),
            result: contest.result().map(str::to_owned),
            winners: contest.winners().to_vec(),
            awards: contest.awards().to_vec(),
            entry_count: contest.entries().len(),
            ended_at: contest.ended_at(),
        }
    }
}

/// Contest rules as configured for this deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesView {
    /// Zone assumed for deadlines given without one.
    pub default_zone: String,
    /// Whether a location may be held by only one participant.
    pub exclusive_guesses: bool,
    /// Maximum number of prizes.
    pub max_prizes: usize,
    /// Human-readable rules.
    pub rules: Vec<String>,
}

fn entries_by_submission(contest: &Contest) -> Vec<Entry> {
    let mut entries: Vec<Entry> = contest.entries().values().cloned().collect();
    entries.sort_by(|a, b| {
        a.submitted_at
            .cmp(&b.submitted_at)
            .then_with(|| a.participant_id.cmp(&b.participant_id))
    });
    entries
}

/// Loads the current contest.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no contest has been created.
pub async fn current_contest(store: &ContestStore) -> Result<Contest, DomainError> {
    store
        .latest()
        .await?
        .ok_or_else(|| DomainError::NotFound("no contest has been created".to_owned()))
}

/// Status of the current contest as seen at `now`.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no contest exists, or a store error.
pub async fn get_contest_status(
    store: &ContestStore,
    now: DateTime<Utc>,
) -> Result<ContestStatusView, DomainError> {
    let contest = current_contest(store).await?;
    Ok(ContestStatusView {
        contest_id: contest.id,
        number: contest.number(),
        status: contest.status(),
        opened_at: contest.opened_at(),
        deadline: contest.deadline(),
        time_remaining: contest
            .deadline()
            .map(|deadline| Countdown::between(now, deadline)),
        entry_count: contest.entries().len(),
        prizes: contest.prizes().as_slice().to_vec(),
        result: contest.result().map(str::to_owned),
        awards: contest.awards().to_vec(),
        close_reason: contest.close_reason(),
    })
}

/// Entries of the current contest, earliest first.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no contest exists, or a store error.
pub async fn list_entries(store: &ContestStore) -> Result<Vec<Entry>, DomainError> {
    let contest = current_contest(store).await?;
    Ok(entries_by_submission(&contest))
}

/// `participant`'s entry in the current contest.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if there is no contest or no entry, or a
/// store error.
pub async fn get_entry(
    store: &ContestStore,
    participant: &ParticipantId,
) -> Result<Entry, DomainError> {
    let contest = current_contest(store).await?;
    contest.entry(participant).cloned().ok_or_else(|| {
        DomainError::NotFound(format!(
            "no entry for {participant} in contest #{}",
            contest.number()
        ))
    })
}

/// Prizes of the current contest.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no contest exists, or a store error.
pub async fn get_prizes(store: &ContestStore) -> Result<PrizesView, DomainError> {
    let contest = current_contest(store).await?;
    Ok(PrizesView {
        number: contest.number(),
        prizes: contest.prizes().as_slice().to_vec(),
        awards: contest.awards().to_vec(),
    })
}

/// Ended contests, newest first.
///
/// # Errors
///
/// Returns a store error.
pub async fn contest_history(store: &ContestStore) -> Result<Vec<ContestSummary>, DomainError> {
    Ok(store.history().await?.iter().map(ContestSummary::from).collect())
}

/// Ended contests that had at least one winner, newest first.
///
/// # Errors
///
/// Returns a store error.
pub async fn past_winners(store: &ContestStore) -> Result<Vec<ContestSummary>, DomainError> {
    Ok(store
        .history()
        .await?
        .iter()
        .filter(|contest| !contest.winners().is_empty())
        .map(ContestSummary::from)
        .collect())
}

/// Allowed locations matching `query`, from the active contest or, when
/// none is active, the configured registry.
///
/// # Errors
///
/// Returns a store error, or `DomainError::Validation` for an empty
/// configured registry.
pub async fn allowed_locations(
    store: &ContestStore,
    settings: &ContestSettings,
    query: &str,
) -> Result<Vec<String>, DomainError> {
    let registry = match store.active().await? {
        Some(contest) => contest.allowed_locations().clone(),
        None => settings.registry()?,
    };
    Ok(registry.suggest(query))
}

/// Contest rules for these settings.
#[must_use]
pub fn contest_rules(settings: &ContestSettings) -> RulesView {
    let mut rules = vec![
        "Guess which system the next Guristas FOB will spawn in.".to_owned(),
        "One guess per participant; entering again replaces your previous guess.".to_owned(),
        "Guesses must name an allowed system.".to_owned(),
        "Guesses are accepted only while the contest is open and before the deadline.".to_owned(),
        "Winners are ranked by who guessed the correct system first.".to_owned(),
    ];
    if settings.exclusive_guesses {
        rules.push("Each system may be claimed by only one participant.".to_owned());
    }
    rules.push(format!(
        "Deadlines are announced in {} and enforced in UTC.",
        settings.default_zone
    ));
    RulesView {
        default_zone: settings.default_zone.clone(),
        exclusive_guesses: settings.exclusive_guesses,
        max_prizes: MAX_PRIZES,
        rules,
    }
}
