//! Serde record schema for the JSON Lines data files.
//!
//! These records replace the upstream loose line formats (regex fields and
//! dynamically evaluated payloads) with a schema-validated shape. The
//! conversions into core types carry the remaining semantic checks —
//! positive metrics, known endpoints — so a record that deserialises can
//! still be rejected with a reason.

use geo::Coord;
use serde::Deserialize;
use tourway_core::{Attraction, AttractionTable, BusDetails, Edge};

use crate::load::RecordError;

/// One attraction per line of `attractions.jsonl`.
///
/// Coordinates arrive in the obfuscated system; the loader corrects them
/// before the attraction reaches the core.
#[derive(Debug, Clone, Deserialize)]
pub struct AttractionRecord {
    /// Unique attraction code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Obfuscated longitude.
    pub lon: f64,
    /// Obfuscated latitude.
    pub lat: f64,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Ticket price text.
    #[serde(default)]
    pub price: Option<String>,
    /// Official link.
    #[serde(default)]
    pub link: Option<String>,
}

impl AttractionRecord {
    /// Validate and convert into a core [`Attraction`] with corrected
    /// coordinates.
    pub fn into_attraction(self) -> Result<Attraction, RecordError> {
        if self.code.is_empty() {
            return Err(RecordError::EmptyCode);
        }
        if !(-180.0..=180.0).contains(&self.lon) || !(-90.0..=90.0).contains(&self.lat) {
            return Err(RecordError::CoordinateOutOfRange {
                lon: self.lon,
                lat: self.lat,
            });
        }
        let location = tourway_core::geodesy::gcj02_to_wgs84(Coord {
            x: self.lon,
            y: self.lat,
        });
        Ok(Attraction {
            code: self.code,
            name: self.name,
            location,
            description: self.description,
            price: self.price,
            link: self.link,
        })
    }
}

/// Bus metadata embedded in bus edge records.
#[derive(Debug, Clone, Deserialize)]
pub struct BusRecord {
    /// Estimated taxi fare over the same hop.
    pub taxi_cost: f64,
    /// Bus fare.
    pub bus_cost: f64,
    /// Walking distance around the bus legs, metres.
    pub walking_distance: u32,
    /// Name of the bus line or line sequence.
    pub bus_name: String,
    /// Number of transfers.
    pub transfers: u32,
}

impl From<BusRecord> for BusDetails {
    fn from(record: BusRecord) -> Self {
        Self {
            taxi_cost: record.taxi_cost,
            bus_cost: record.bus_cost,
            walking_distance: record.walking_distance,
            bus_name: record.bus_name,
            transfers: record.transfers,
        }
    }
}

/// One directed travel segment per line of a mode's edge file.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeRecord {
    /// Code of the attraction the segment leaves from.
    pub from: String,
    /// Code of the attraction the segment arrives at.
    pub to: String,
    /// Travel distance in metres; must be positive.
    pub distance: i64,
    /// Travel duration in seconds; must be positive.
    pub duration: i64,
    /// Literal obfuscated endpoint string, `"lon,lat"`.
    pub origin: String,
    /// Literal obfuscated endpoint string, `"lon,lat"`.
    pub destination: String,
    /// Bus metadata, required for bus edge files only.
    #[serde(default)]
    pub bus: Option<BusRecord>,
}

impl EdgeRecord {
    /// Validate and convert into a core [`Edge`].
    ///
    /// The endpoint strings are preserved byte for byte — they key the
    /// polyline trace store — but must at least parse as coordinates.
    pub fn into_edge(self, attractions: &AttractionTable) -> Result<Edge, RecordError> {
        if self.distance <= 0 || self.duration <= 0 {
            return Err(RecordError::NonPositiveMetric {
                distance: self.distance,
                duration: self.duration,
            });
        }
        for code in [&self.from, &self.to] {
            if attractions.by_code(code).is_none() {
                return Err(RecordError::UnknownEndpoint { code: code.clone() });
            }
        }
        for endpoint in [&self.origin, &self.destination] {
            if tourway_core::polyline::parse_endpoint(endpoint).is_none() {
                return Err(RecordError::MalformedEndpoint {
                    value: endpoint.clone(),
                });
            }
        }
        let (Ok(distance), Ok(duration)) =
            (u32::try_from(self.distance), u32::try_from(self.duration))
        else {
            return Err(RecordError::NonPositiveMetric {
                distance: self.distance,
                duration: self.duration,
            });
        };
        Ok(Edge {
            from: self.from,
            to: self.to,
            distance,
            duration,
            origin: self.origin,
            destination: self.destination,
            bus: self.bus.map(BusDetails::from),
        })
    }
}

/// One raw hop trace per line of `polylines.jsonl`.
#[derive(Debug, Clone, Deserialize)]
pub struct PolylineRecord {
    /// Literal obfuscated endpoint string of the hop start.
    pub origin: String,
    /// Literal obfuscated endpoint string of the hop end.
    pub destination: String,
    /// Ordered obfuscated `[lon, lat]` points.
    pub points: Vec<[f64; 2]>,
}

impl PolylineRecord {
    /// Convert into the trace-store record shape. Points stay obfuscated;
    /// the core transforms them on the way out.
    #[must_use]
    pub fn into_trace(self) -> (String, String, Vec<Coord<f64>>) {
        let points = self
            .points
            .into_iter()
            .map(|[lon, lat]| Coord { x: lon, y: lat })
            .collect();
        (self.origin, self.destination, points)
    }
}
