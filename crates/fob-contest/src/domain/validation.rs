//! Entry validator.

use chrono::{DateTime, Utc};
use fob_core::error::EntryRejection;

use super::aggregates::{Contest, ContestStatus};
use super::entries::ParticipantId;

/// Decides whether a guess may be accepted for a contest.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryValidator {
    exclusive_guesses: bool,
}

impl EntryValidator {
    /// Creates a validator. With `exclusive_guesses` a location can be held
    /// by only one participant at a time.
    #[must_use]
    pub fn new(exclusive_guesses: bool) -> Self {
        Self { exclusive_guesses }
    }

    /// Returns `true` if a location may be held by only one participant.
    #[must_use]
    pub fn exclusive_guesses(&self) -> bool {
        self.exclusive_guesses
    }

    /// Validates `guess` for `participant` at `now` and returns the
    /// canonical location name.
    ///
    /// Checks run in order: phase, deadline, location membership, then
    /// exclusivity. The first failure wins.
    ///
    /// # Errors
    ///
    /// Returns the matching [`EntryRejection`].
    pub fn validate(
        &self,
        contest: &Contest,
        participant: &ParticipantId,
        guess: &str,
        now: DateTime<Utc>,
    ) -> Result<String, EntryRejection> {
        if contest.status() != ContestStatus::Open {
            return Err(EntryRejection::NotOpen);
        }
        if contest.deadline().is_some_and(|deadline| now >= deadline) {
            return Err(EntryRejection::DeadlinePassed);
        }
        let location = contest
            .allowed_locations()
            .resolve(guess)
            .ok_or_else(|| EntryRejection::UnknownLocation(guess.trim().to_owned()))?;
        if self.exclusive_guesses
            && contest
                .entries()
                .values()
                .any(|entry| entry.guess == location && &entry.participant_id != participant)
        {
            return Err(EntryRejection::LocationTaken(location));
        }
        Ok(location)
    }
}
