//! Deadline scheduler: one cancellable timer for the active contest.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug)]
struct PendingClose {
    contest_id: Uuid,
    deadline: DateTime<Utc>,
    handle: JoinHandle<()>,
}

/// Holds at most one pending deadline timer. Arming a new timer replaces
/// the previous one.
#[derive(Debug, Default)]
pub struct DeadlineScheduler {
    pending: Mutex<Option<PendingClose>>,
}

impl DeadlineScheduler {
    /// Creates an idle scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a timer that runs `on_elapsed` once `deadline` is reached,
    /// measured from `now`. A deadline already in the past fires
    /// immediately. Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(
        &self,
        contest_id: Uuid,
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
        on_elapsed: F,
    ) where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let delay = (deadline - now).to_std().unwrap_or_default();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_elapsed().await;
        });
        let previous = self
            .lock()
            .replace(PendingClose {
                contest_id,
                deadline,
                handle,
            });
        if let Some(previous) = previous {
            debug!(contest_id = %previous.contest_id, "replacing pending deadline timer");
            previous.handle.abort();
        }
        debug!(%contest_id, %deadline, delay_secs = delay.as_secs(), "deadline timer armed");
    }

    /// Cancels the pending timer, if any. Returns `true` if one was pending.
    pub fn cancel(&self) -> bool {
        match self.lock().take() {
            Some(pending) => {
                pending.handle.abort();
                debug!(contest_id = %pending.contest_id, "deadline timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Forgets the pending timer without aborting it, but only if it is the
    /// one armed for `contest_id` at `deadline`. The timer task calls this
    /// on itself before closing the contest so a concurrent cancel cannot
    /// abort it half-way.
    pub fn disarm(&self, contest_id: Uuid, deadline: DateTime<Utc>) -> bool {
        let mut pending = self.lock();
        let matches = pending
            .as_ref()
            .is_some_and(|p| p.contest_id == contest_id && p.deadline == deadline);
        if matches {
            pending.take();
        }
        matches
    }

    /// The contest and deadline of the pending timer.
    #[must_use]
    pub fn pending(&self) -> Option<(Uuid, DateTime<Utc>)> {
        self.lock()
            .as_ref()
            .map(|pending| (pending.contest_id, pending.deadline))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<PendingClose>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for DeadlineScheduler {
    fn drop(&mut self) {
        let pending = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(pending) = pending {
            pending.handle.abort();
        }
    }
}
