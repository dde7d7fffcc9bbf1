//! Backup port.
//!
//! The lifecycle service triggers backups through this trait so the
//! contest context does not depend on the snapshot format or its storage.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;

/// Produces a complete snapshot of the contest store in durable storage.
#[async_trait]
pub trait ContestBackup: Send + Sync {
    /// Writes a snapshot and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store cannot be read or
    /// the snapshot cannot be written.
    async fn backup(&self) -> Result<Uuid, DomainError>;
}
