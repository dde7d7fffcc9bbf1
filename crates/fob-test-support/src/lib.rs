//! Shared test doubles for the FOB contest engine.

mod backup;
mod clock;
mod repository;

pub use backup::{FailingBackup, RecordingBackup};
pub use clock::{FixedClock, ManualClock};
pub use repository::{FailingEventRepository, InMemoryEventRepository};
