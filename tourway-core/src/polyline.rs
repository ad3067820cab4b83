//! Detailed hop shapes and the trace store that serves them.
//!
//! Traces are keyed by the literal origin/destination coordinate strings of
//! an edge — a namespace separate from attraction codes. The match is an
//! exact string comparison: a formatting mismatch between an edge's
//! endpoint strings and the trace data silently yields an empty shape.
//! This fragility is inherited from the upstream data and deliberately not
//! auto-corrected; normalising one side could pair traces with the wrong
//! hop.

use std::collections::HashMap;

use geo::Coord;

use crate::geodesy::gcj02_to_wgs84;

/// Read-only access to raw (obfuscated) hop traces.
pub trait PolylineStore {
    /// The ordered obfuscated points for the hop keyed by the literal
    /// endpoint pair, or `None` when no trace matches.
    fn trace(&self, origin: &str, destination: &str) -> Option<&[Coord<f64>]>;
}

/// In-memory trace store built once by the loader.
///
/// The tuple key makes the exact-match namespace explicit; it is not
/// serialisable to JSON and is never persisted in this shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryPolylineStore {
    traces: HashMap<(String, String), Vec<Coord<f64>>>,
}

impl MemoryPolylineStore {
    /// Build a store from `(origin, destination, points)` records. Later
    /// duplicates of a key pair replace earlier ones.
    #[must_use]
    pub fn new(records: impl IntoIterator<Item = (String, String, Vec<Coord<f64>>)>) -> Self {
        Self {
            traces: records
                .into_iter()
                .map(|(origin, destination, points)| ((origin, destination), points))
                .collect(),
        }
    }

    /// Number of stored traces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    /// Whether the store holds no traces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Iterate over `(origin, destination, points)` in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &[Coord<f64>])> {
        self.traces
            .iter()
            .map(|((origin, destination), points)| {
                (origin.as_str(), destination.as_str(), points.as_slice())
            })
    }
}

impl PolylineStore for MemoryPolylineStore {
    fn trace(&self, origin: &str, destination: &str) -> Option<&[Coord<f64>]> {
        self.traces
            .get(&(origin.to_owned(), destination.to_owned()))
            .map(Vec::as_slice)
    }
}

/// Resolve a hop's shape and correct every point to true coordinates.
///
/// Raw trace points never leave the core untransformed; callers receive
/// geodetic coordinates ready for rendering. An unmatched key pair yields
/// an empty sequence.
#[must_use]
pub fn transformed_trace<S>(store: &S, origin: &str, destination: &str) -> Vec<Coord<f64>>
where
    S: PolylineStore + ?Sized,
{
    store
        .trace(origin, destination)
        .unwrap_or_default()
        .iter()
        .copied()
        .map(gcj02_to_wgs84)
        .collect()
}

/// Parse a literal `"lon,lat"` endpoint string into a coordinate.
///
/// Endpoint strings come from loader-validated edges, but the parse stays
/// fallible so a stray malformed value degrades to a missing point rather
/// than a panic.
#[must_use]
pub fn parse_endpoint(value: &str) -> Option<Coord<f64>> {
    let (lon, lat) = value.split_once(',')?;
    Some(Coord {
        x: lon.trim().parse().ok()?,
        y: lat.trim().parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::out_of_territory;

    fn store() -> MemoryPolylineStore {
        MemoryPolylineStore::new(vec![(
            "108.963798,34.217977".to_owned(),
            "108.964162,34.218285".to_owned(),
            vec![
                Coord { x: 108.963_798, y: 34.217_977 },
                Coord { x: 108.963_802, y: 34.217_435 },
            ],
        )])
    }

    #[test]
    fn returns_transformed_points_for_matching_pair() {
        let store = store();
        let points = transformed_trace(&store, "108.963798,34.217977", "108.964162,34.218285");
        assert_eq!(points.len(), 2);
        // In-territory points must not come back unchanged.
        assert!(!out_of_territory(108.963_798, 34.217_977));
        assert_ne!(points[0], Coord { x: 108.963_798, y: 34.217_977 });
    }

    #[test]
    fn formatting_mismatch_silently_misses() {
        let store = store();
        // Same coordinates, different formatting: no match by design.
        let points = transformed_trace(&store, "108.9637980,34.2179770", "108.964162,34.218285");
        assert!(points.is_empty());
    }

    #[test]
    fn parses_endpoint_strings() {
        assert_eq!(
            parse_endpoint("108.963798,34.217977"),
            Some(Coord { x: 108.963_798, y: 34.217_977 })
        );
        assert_eq!(parse_endpoint("not-a-point"), None);
        assert_eq!(parse_endpoint("1.0;2.0"), None);
    }
}
