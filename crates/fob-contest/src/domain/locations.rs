//! Location registry: the set of systems a contest accepts guesses for.

use std::collections::BTreeSet;

use fob_core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Maximum number of suggestions returned by [`LocationRegistry::suggest`].
pub const MAX_SUGGESTIONS: usize = 25;

/// Caldari/Gallente militia systems a Guristas FOB can spawn in.
pub const DEFAULT_FOB_SYSTEMS: &[&str] = &[
    "Aivonen",
    "Akidagi",
    "Aldranette",
    "Alparena",
    "Asakai",
    "Athounon",
    "Aubenall",
    "Brarel",
    "Deven",
    "Eha",
    "Enaluri",
    "Esesier",
    "Evaulon",
    "Frarie",
    "Harroule",
    "Hevrice",
    "Heydieles",
    "Hykanima",
    "Iges",
    "Immuri",
    "Ikoskio",
    "Intaki",
    "Iralaja",
    "Jovainnon",
    "Kedama",
    "Kehjari",
    "Kinakka",
    "Luminaire",
    "Mantenault",
    "Martoh",
    "Melmaniel",
    "Mercomesier",
    "Murethand",
    "Mushikegi",
    "Nikkishina",
    "Nisuwa",
    "Notoras",
    "Ocix",
    "Odamia",
    "Oicx",
    "Oinasiken",
    "Okagaiken",
    "Old Man Star",
    "Olletta",
    "Ostingele",
    "Oto",
    "Prism",
    "Pynekastoh",
    "Raihbaka",
    "Renarelle",
    "Reschard",
    "Sarenemi",
    "Sujarento",
    "Tama",
    "Tannolen",
    "Vaaralen",
    "Vey",
    "Vlillirier",
];

/// Normalizes a system name so comparisons ignore case and spacing.
///
/// Leading/trailing whitespace is dropped, internal runs of whitespace
/// collapse to one space, and every word is title-cased.
#[must_use]
pub fn normalize_location_name(name: &str) -> String {
    name.split_whitespace()
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Normalized, de-duplicated set of allowed guess targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationRegistry {
    names: BTreeSet<String>,
}

impl LocationRegistry {
    /// Builds a registry from raw names.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if no non-blank name is given.
    pub fn new<I, S>(names: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: BTreeSet<String> = names
            .into_iter()
            .map(|name| normalize_location_name(name.as_ref()))
            .filter(|name| !name.is_empty())
            .collect();
        if names.is_empty() {
            return Err(DomainError::Validation(
                "at least one allowed location is required".to_owned(),
            ));
        }
        Ok(Self { names })
    }

    /// The built-in FOB system registry.
    #[must_use]
    pub fn fob_systems() -> Self {
        Self {
            names: DEFAULT_FOB_SYSTEMS
                .iter()
                .map(|name| normalize_location_name(name))
                .collect(),
        }
    }

    /// Returns the canonical name for `name` if it is an allowed location.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<String> {
        let normalized = normalize_location_name(name);
        self.names.contains(&normalized).then_some(normalized)
    }

    /// Returns `true` if `name` normalizes to an allowed location.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Number of allowed locations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if the registry has no locations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Allowed locations in sorted order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }

    /// Sorted locations containing `query` (case-insensitive), capped at
    /// [`MAX_SUGGESTIONS`]. A blank query returns the whole registry.
    #[must_use]
    pub fn suggest(&self, query: &str) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.to_vec();
        }
        self.names
            .iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .take(MAX_SUGGESTIONS)
            .cloned()
            .collect()
    }
}
