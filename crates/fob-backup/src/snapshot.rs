//! Snapshot format.

use chrono::{DateTime, Utc};
use fob_contest::application::query_handlers::ContestView;
use fob_contest::application::store::project_contests;
use fob_core::error::DomainError;
use fob_core::repository::StoredEvent;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Value of the `format` field in every snapshot.
pub const SNAPSHOT_FORMAT: &str = "fob-contest-snapshot";

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// A complete export of the contest store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestSnapshot {
    /// Always [`SNAPSHOT_FORMAT`].
    pub format: String,
    /// Schema version of this document.
    pub schema_version: u32,
    /// Snapshot identifier.
    pub snapshot_id: Uuid,
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
    /// Hex SHA-256 of the serialized event log.
    pub checksum: String,
    /// Contests projected from `events`, oldest round first.
    pub contests: Vec<ContestView>,
    /// Every stored event in append order.
    pub events: Vec<StoredEvent>,
}

/// Snapshots written before versioning: just the event log.
#[derive(Debug, Deserialize)]
struct LegacySnapshot {
    snapshot_id: Uuid,
    taken_at: DateTime<Utc>,
    events: Vec<StoredEvent>,
}

fn checksum(events: &[StoredEvent]) -> String {
    let bytes = serde_json::to_vec(events).expect("event serialization is infallible");
    format!("{:x}", Sha256::digest(&bytes))
}

fn project_views(events: &[StoredEvent]) -> Result<Vec<ContestView>, DomainError> {
    Ok(project_contests(events)?
        .iter()
        .map(ContestView::from)
        .collect())
}

fn corrupt(reason: impl std::fmt::Display) -> DomainError {
    DomainError::Validation(format!("invalid snapshot: {reason}"))
}

impl ContestSnapshot {
    /// Builds a snapshot of `events`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if an event cannot be replayed.
    pub fn capture(
        snapshot_id: Uuid,
        taken_at: DateTime<Utc>,
        events: Vec<StoredEvent>,
    ) -> Result<Self, DomainError> {
        let contests = project_views(&events)?;
        Ok(Self {
            format: SNAPSHOT_FORMAT.to_owned(),
            schema_version: SCHEMA_VERSION,
            snapshot_id,
            taken_at,
            checksum: checksum(&events),
            contests,
            events,
        })
    }

    /// Checks the checksum and that `contests` matches the event log.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` describing the first mismatch.
    pub fn verify(&self) -> Result<(), DomainError> {
        if self.format != SNAPSHOT_FORMAT {
            return Err(corrupt(format_args!("unexpected format {:?}", self.format)));
        }
        if checksum(&self.events) != self.checksum {
            return Err(corrupt("checksum mismatch"));
        }
        if project_views(&self.events)? != self.contests {
            return Err(corrupt("contest records do not match the event log"));
        }
        Ok(())
    }

    /// Serializes to pretty-printed JSON.
    #[must_use]
    pub fn to_json(&self) -> Vec<u8> {
        serde_json::to_vec_pretty(self).expect("snapshot serialization is infallible")
    }

    /// Parses a snapshot of any known schema version, migrating older ones
    /// to the current layout, and verifies it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for malformed JSON, an unknown
    /// format, a schema version newer than [`SCHEMA_VERSION`], or a snapshot
    /// that fails [`Self::verify`].
    pub fn from_json(bytes: &[u8]) -> Result<Self, DomainError> {
        let document: serde_json::Value = serde_json::from_slice(bytes).map_err(corrupt)?;
        let version = match document.get("schema_version") {
            None => 0,
            Some(value) => value
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| corrupt("schema_version is not a number"))?,
        };

        let snapshot = match version {
            0 => {
                let legacy: LegacySnapshot = serde_json::from_value(document).map_err(corrupt)?;
                Self::capture(legacy.snapshot_id, legacy.taken_at, legacy.events)?
            }
            SCHEMA_VERSION => serde_json::from_value(document).map_err(corrupt)?,
            newer => {
                return Err(corrupt(format_args!(
                    "schema version {newer} is newer than supported version {SCHEMA_VERSION}"
                )));
            }
        };
        snapshot.verify()?;
        Ok(snapshot)
    }
}
