//! Commands for the contest context.

use fob_core::command::Command;
use uuid::Uuid;

/// Command to create a new contest in `Draft`.
#[derive(Debug, Clone)]
pub struct CreateContest {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Allowed locations; `None` uses the configured registry.
    pub locations: Option<Vec<String>>,
    /// Initial prize list; `None` leaves prizes unset.
    pub prizes: Option<Vec<String>>,
}

impl Command for CreateContest {
    fn command_type(&self) -> &'static str {
        "contest.create_contest"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to replace a draft contest's allowed locations.
#[derive(Debug, Clone)]
pub struct SetLocations {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The contest identifier.
    pub contest_id: Uuid,
    /// The new location names.
    pub locations: Vec<String>,
}

impl Command for SetLocations {
    fn command_type(&self) -> &'static str {
        "contest.set_locations"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to open (or re-open) a contest for entries.
#[derive(Debug, Clone)]
pub struct OpenContest {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The contest identifier.
    pub contest_id: Uuid,
}

impl Command for OpenContest {
    fn command_type(&self) -> &'static str {
        "contest.open_contest"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to stop accepting entries.
#[derive(Debug, Clone)]
pub struct CloseContest {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The contest identifier.
    pub contest_id: Uuid,
}

impl Command for CloseContest {
    fn command_type(&self) -> &'static str {
        "contest.close_contest"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to set the entry deadline from a local wall-clock time.
#[derive(Debug, Clone)]
pub struct SetDeadline {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The contest identifier.
    pub contest_id: Uuid,
    /// `YYYY-MM-DD HH:MM` or `HH:MM`.
    pub local_time: String,
    /// Zone name or alias; `None` uses the configured default.
    pub source_zone: Option<String>,
}

impl Command for SetDeadline {
    fn command_type(&self) -> &'static str {
        "contest.set_deadline"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to remove the entry deadline.
#[derive(Debug, Clone)]
pub struct ClearDeadline {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The contest identifier.
    pub contest_id: Uuid,
}

impl Command for ClearDeadline {
    fn command_type(&self) -> &'static str {
        "contest.clear_deadline"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to submit or replace a participant's guess.
#[derive(Debug, Clone)]
pub struct SubmitEntry {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The contest identifier.
    pub contest_id: Uuid,
    /// Who is guessing.
    pub participant_id: String,
    /// The guessed location, as typed.
    pub guess: String,
}

impl Command for SubmitEntry {
    fn command_type(&self) -> &'static str {
        "contest.submit_entry"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to replace the prize list.
#[derive(Debug, Clone)]
pub struct SetPrizes {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The contest identifier.
    pub contest_id: Uuid,
    /// Prizes in rank order.
    pub prizes: Vec<String>,
}

impl Command for SetPrizes {
    fn command_type(&self) -> &'static str {
        "contest.set_prizes"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to declare the outcome and end the contest.
#[derive(Debug, Clone)]
pub struct EndContest {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The contest identifier.
    pub contest_id: Uuid,
    /// The location where the FOB spawned.
    pub result: String,
}

impl Command for EndContest {
    fn command_type(&self) -> &'static str {
        "contest.end_contest"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
