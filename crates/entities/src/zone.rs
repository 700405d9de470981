//! Zone entity definitions.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A geographic locality made of three parts.
///
/// The display form is `part1(part2)/part3`. Lookups use `part1` and
/// `part3`; `part2` is shown to users but not used for identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    /// Unique identifier.
    pub id: Uuid,
    /// City name.
    pub part1: String,
    /// Local-language city name.
    pub part2: String,
    /// Province name.
    pub part3: String,
}

impl Zone {
    /// Creates a new zone.
    pub fn new(
        part1: impl Into<String>,
        part2: impl Into<String>,
        part3: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            part1: part1.into(),
            part2: part2.into(),
            part3: part3.into(),
        }
    }

    /// Returns true if this zone is the one identified by `part1` and `part3`.
    pub fn matches(&self, part1: &str, part3: &str) -> bool {
        self.part1 == part1 && self.part3 == part3
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})/{}", self.part1, self.part2, self.part3)
    }
}

impl PartialEq for Zone {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Zone {}

impl Hash for Zone {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_display() {
        let zone = Zone::new("Seoul", "서울특별시", "none");
        assert_eq!(zone.to_string(), "Seoul(서울특별시)/none");
    }

    #[test]
    fn test_zone_matches_on_part1_and_part3() {
        let zone = Zone::new("A", "B", "C");

        assert!(zone.matches("A", "C"));
        assert!(!zone.matches("A", "B"));
        assert!(!zone.matches("B", "C"));
    }
}
