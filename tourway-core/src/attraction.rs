//! Attractions and the read-only table that holds them.

use std::collections::HashMap;

use geo::Coord;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point of interest identified by a unique code.
///
/// Coordinates are true geodetic values with `x = longitude` and
/// `y = latitude`; the loader corrects them before construction.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use tourway_core::Attraction;
///
/// let attraction = Attraction::new(
///     "XAGC",
///     "Ancient City Wall",
///     Coord { x: 108.94, y: 34.26 },
///     "Ming-era fortification circling the old town.",
/// );
/// assert_eq!(attraction.code, "XAGC");
/// assert!(attraction.price.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Attraction {
    /// Unique code, the primary key for edge references.
    pub code: String,
    /// Display name.
    pub name: String,
    /// True geodetic position.
    pub location: Coord<f64>,
    /// Free-form description.
    pub description: String,
    /// Ticket price text, when known.
    pub price: Option<String>,
    /// Official link, when known.
    pub link: Option<String>,
}

impl Attraction {
    /// Construct an attraction without price or link details.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        location: Coord<f64>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            location,
            description: description.into(),
            price: None,
            link: None,
        }
    }
}

/// Read-only table of loaded attractions, keyed by code.
///
/// Built once by the loader and shared by reference across route
/// computations; it is never mutated during serving.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AttractionTable {
    attractions: HashMap<String, Attraction>,
}

impl AttractionTable {
    /// Build a table from loaded attractions.
    ///
    /// Later duplicates of a code replace earlier ones, matching the
    /// upstream data's last-write-wins convention.
    #[must_use]
    pub fn new(attractions: impl IntoIterator<Item = Attraction>) -> Self {
        Self {
            attractions: attractions
                .into_iter()
                .map(|attraction| (attraction.code.clone(), attraction))
                .collect(),
        }
    }

    /// Look up an attraction by its unique code.
    #[must_use]
    pub fn by_code(&self, code: &str) -> Option<&Attraction> {
        self.attractions.get(code)
    }

    /// Find the first attraction whose name contains `fragment`.
    ///
    /// Matches the original lookup surface: a substring search, not an
    /// exact key. Iteration order is unspecified, so ambiguous fragments
    /// return an arbitrary match.
    #[must_use]
    pub fn by_name(&self, fragment: &str) -> Option<&Attraction> {
        self.attractions
            .values()
            .find(|attraction| attraction.name.contains(fragment))
    }

    /// Number of loaded attractions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attractions.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attractions.is_empty()
    }

    /// Iterate over all loaded attractions in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Attraction> {
        self.attractions.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AttractionTable {
        AttractionTable::new(vec![
            Attraction::new(
                "BELL",
                "Bell Tower",
                Coord { x: 108.95, y: 34.26 },
                "Landmark at the city centre.",
            ),
            Attraction::new(
                "WILD",
                "Wild Goose Pagoda",
                Coord { x: 108.96, y: 34.22 },
                "Tang-dynasty pagoda.",
            ),
        ])
    }

    #[test]
    fn looks_up_by_code() {
        let table = sample();
        assert_eq!(table.by_code("BELL").map(|a| a.name.as_str()), Some("Bell Tower"));
        assert!(table.by_code("MISSING").is_none());
    }

    #[test]
    fn finds_by_name_fragment() {
        let table = sample();
        assert_eq!(table.by_name("Goose").map(|a| a.code.as_str()), Some("WILD"));
        assert!(table.by_name("Palace").is_none());
    }

    #[test]
    fn later_duplicates_replace_earlier() {
        let table = AttractionTable::new(vec![
            Attraction::new("BELL", "Old", Coord { x: 0.0, y: 0.0 }, ""),
            Attraction::new("BELL", "New", Coord { x: 0.0, y: 0.0 }, ""),
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.by_code("BELL").map(|a| a.name.as_str()), Some("New"));
    }
}
