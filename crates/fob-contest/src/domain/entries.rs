//! Participants and their entries.

use std::fmt;

use chrono::{DateTime, Utc};
use fob_core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Opaque participant identity supplied by the gateway (e.g. a Discord user
/// snowflake rendered as a string).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Creates a participant id from a non-blank string.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `id` is blank.
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into().trim().to_owned();
        if id.is_empty() {
            return Err(DomainError::Validation(
                "participant id must not be empty".to_owned(),
            ));
        }
        Ok(Self(id))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A participant's single active guess for a contest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Who submitted the guess.
    pub participant_id: ParticipantId,
    /// Canonical location name.
    pub guess: String,
    /// When the guess was last submitted.
    pub submitted_at: DateTime<Utc>,
}
