//! Contest settings loaded once at startup.

use fob_core::error::DomainError;
use serde::Deserialize;

use crate::domain::deadline::parse_source_zone;
use crate::domain::locations::{DEFAULT_FOB_SYSTEMS, LocationRegistry};
use crate::domain::validation::EntryValidator;

/// Deployment options that shape contest behavior.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContestSettings {
    /// Registry used when a new contest names no locations.
    pub allowed_locations: Vec<String>,
    /// Zone assumed when a deadline is given without one.
    pub default_zone: String,
    /// Whether a location may be held by only one participant.
    pub exclusive_guesses: bool,
}

impl Default for ContestSettings {
    fn default() -> Self {
        Self {
            allowed_locations: DEFAULT_FOB_SYSTEMS.iter().map(|s| (*s).to_owned()).collect(),
            default_zone: "CST".to_owned(),
            exclusive_guesses: false,
        }
    }
}

impl ContestSettings {
    /// Checks the settings can be used: the zone resolves and the location
    /// list is non-empty.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` describing the first problem.
    pub fn validate(&self) -> Result<(), DomainError> {
        parse_source_zone(&self.default_zone)?;
        self.registry().map(|_| ())
    }

    /// Builds the default location registry.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if no locations are configured.
    pub fn registry(&self) -> Result<LocationRegistry, DomainError> {
        LocationRegistry::new(&self.allowed_locations)
    }

    /// Builds the entry validator for these settings.
    #[must_use]
    pub fn validator(&self) -> EntryValidator {
        EntryValidator::new(self.exclusive_guesses)
    }
}
