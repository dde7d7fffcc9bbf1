//! Test repositories — `EventRepository` implementations for tests.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use fob_core::error::DomainError;
use fob_core::repository::{EventRepository, StoredEvent};
use uuid::Uuid;

/// An in-memory event store with the same optimistic concurrency rules as
/// the Postgres repository. Appends can be switched to fail so tests can
/// check that a failed write leaves state untouched.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    events: RwLock<Vec<StoredEvent>>,
    fail_appends: AtomicBool,
}

impl InMemoryEventRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent append fail with an infrastructure error (or
    /// succeed again with `false`).
    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Every stored event in append order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn events(&self) -> Vec<StoredEvent> {
        self.events.read().unwrap().clone()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        let mut events: Vec<StoredEvent> = self
            .events
            .read()
            .unwrap()
            .iter()
            .filter(|event| event.aggregate_id == aggregate_id)
            .cloned()
            .collect();
        events.sort_by_key(|event| event.sequence_number);
        Ok(events)
    }

    async fn load_all_events(&self) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(self.events.read().unwrap().clone())
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        let mut stored = self.events.write().unwrap();
        let actual = stored
            .iter()
            .filter(|event| event.aggregate_id == aggregate_id)
            .map(|event| event.sequence_number)
            .max()
            .unwrap_or(0);
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(DomainError::Infrastructure("connection reset".into()));
        }
        stored.extend_from_slice(events);
        Ok(())
    }
}

/// An event repository that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingEventRepository;

#[async_trait]
impl EventRepository for FailingEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn load_all_events(&self) -> Result<Vec<StoredEvent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn append_events(
        &self,
        _aggregate_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
