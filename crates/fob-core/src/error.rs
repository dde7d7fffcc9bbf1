//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No active contest, or the requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A lifecycle guard was violated.
    #[error("invalid transition: cannot {action} while contest is {status}")]
    InvalidTransition {
        /// The attempted operation.
        action: &'static str,
        /// The contest status at the time of the attempt.
        status: String,
    },

    /// Bad input: unknown location, out-of-range prize list, past deadline,
    /// malformed time or time zone.
    #[error("validation error: {0}")]
    Validation(String),

    /// A submitted entry was refused.
    #[error("entry rejected: {0}")]
    EntryRejected(EntryRejection),

    /// Optimistic concurrency conflict.
    #[error(
        "concurrency conflict on aggregate {aggregate_id}: \
         expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        /// The aggregate that had the conflict.
        aggregate_id: Uuid,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// A persistence or backup I/O failure.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

/// Reason an entry was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryRejection {
    /// The contest is not in the `Open` phase.
    #[error("the contest is not open for entries")]
    NotOpen,

    /// The entry deadline has been reached.
    #[error("the entry deadline has passed")]
    DeadlinePassed,

    /// The guess is not one of the contest's allowed locations.
    #[error("{0} is not an allowed location")]
    UnknownLocation(String),

    /// The location is already held by another participant.
    #[error("{0} has already been picked by another participant")]
    LocationTaken(String),
}

impl From<EntryRejection> for DomainError {
    fn from(reason: EntryRejection) -> Self {
        Self::EntryRejected(reason)
    }
}
