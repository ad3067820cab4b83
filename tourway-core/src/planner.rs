//! Route queries, results, and the planner that answers them.

use std::str::FromStr;

use geo::Coord;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::attraction::AttractionTable;
use crate::edge::{BusStrategy, Edge, EdgeIndex, Mode, TransportNetwork};
use crate::error::PlanError;
use crate::geodesy::gcj02_to_wgs84;
use crate::optimizer::best_visit_order;
use crate::polyline::{parse_endpoint, transformed_trace, PolylineStore};
use crate::selector::fastest_mode;

/// Mode selection at query level.
///
/// Distinct from [`Mode`]: a query may ask for the quickest of all modes,
/// which resolves to a concrete mode per hop comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ModeChoice {
    /// On foot.
    Walk,
    /// Private car or taxi.
    Drive,
    /// Public bus.
    Bus,
    /// Whichever mode has the quickest direct edge.
    Fastest,
}

impl ModeChoice {
    /// Return the choice as its lowercase declaration string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Walk => "walk",
            Self::Drive => "drive",
            Self::Bus => "bus",
            Self::Fastest => "fastest",
        }
    }
}

impl std::fmt::Display for ModeChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModeChoice {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "walk" => Ok(Self::Walk),
            "drive" => Ok(Self::Drive),
            "bus" => Ok(Self::Bus),
            "fastest" => Ok(Self::Fastest),
            other => Err(PlanError::UnknownMode {
                value: other.to_owned(),
            }),
        }
    }
}

/// A route request: start, end, required intermediate stops, and mode.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteQuery {
    /// Code of the starting attraction.
    pub start: String,
    /// Code of the mandatory final attraction.
    pub end: String,
    /// Codes of required intermediate attractions, assumed free of
    /// duplicates.
    pub waypoints: Vec<String>,
    /// Transport mode to plan with.
    pub mode: ModeChoice,
    /// Bus strategy; defaults to [`BusStrategy::Quickest`] for bus queries.
    pub bus_strategy: Option<BusStrategy>,
}

impl RouteQuery {
    /// A direct query between two attractions with no waypoints.
    #[must_use]
    pub fn direct(start: impl Into<String>, end: impl Into<String>, mode: ModeChoice) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            waypoints: Vec::new(),
            mode,
            bus_strategy: None,
        }
    }
}

/// Rendering colour derived from the resolved mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RouteColor {
    /// Bus routes.
    Red,
    /// Walking routes.
    Green,
    /// Driving routes.
    Blue,
}

impl From<Mode> for RouteColor {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Bus => Self::Red,
            Mode::Walk => Self::Green,
            Mode::Drive => Self::Blue,
        }
    }
}

/// Cost and transfer summary of a single direct bus edge.
///
/// Attached only when a literal start→end bus edge exists; never
/// aggregated across legs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BusLegSummary {
    /// Estimated taxi fare over the same hop, currency units.
    pub taxi_cost: f64,
    /// Bus fare, currency units.
    pub bus_cost: f64,
    /// Walking distance around the bus legs, metres.
    pub walking_distance: u32,
    /// Name of the bus line or line sequence.
    pub bus_name: String,
    /// Number of transfers.
    pub transfers: u32,
}

impl From<&crate::edge::BusDetails> for BusLegSummary {
    fn from(details: &crate::edge::BusDetails) -> Self {
        Self {
            taxi_cost: details.taxi_cost,
            bus_cost: details.bus_cost,
            walking_distance: details.walking_distance,
            bus_name: details.bus_name.clone(),
            transfers: details.transfers,
        }
    }
}

/// A computed route ready for rendering.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteResult {
    /// Visited attraction codes in order, start excluded, end included.
    pub stops: Vec<String>,
    /// Total travel distance, metres.
    pub total_distance: u64,
    /// Total travel duration, seconds.
    pub total_duration: u64,
    /// Concatenated per-hop shape in true geodetic coordinates.
    pub path: Vec<Coord<f64>>,
    /// Rendering colour for the resolved mode.
    pub color: RouteColor,
    /// Direct start→end bus edge summary, when that edge exists.
    pub bus_summary: Option<BusLegSummary>,
}

/// Planner configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Ceiling on required stops per query; the permutation search is
    /// O(k!) and must stay bounded.
    pub max_stops: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self { max_stops: 8 }
    }
}

/// Computes routes over loaded, read-only data.
///
/// The planner borrows its collaborators and holds no mutable state, so
/// one instance may serve arbitrarily many concurrent queries.
pub struct RoutePlanner<'a, S: PolylineStore + ?Sized> {
    attractions: &'a AttractionTable,
    network: &'a TransportNetwork,
    polylines: &'a S,
    config: PlannerConfig,
}

impl<'a, S: PolylineStore + ?Sized> RoutePlanner<'a, S> {
    /// Construct a planner with default configuration.
    pub fn new(
        attractions: &'a AttractionTable,
        network: &'a TransportNetwork,
        polylines: &'a S,
    ) -> Self {
        Self::with_config(attractions, network, polylines, PlannerConfig::default())
    }

    /// Construct a planner with explicit configuration.
    pub fn with_config(
        attractions: &'a AttractionTable,
        network: &'a TransportNetwork,
        polylines: &'a S,
        config: PlannerConfig,
    ) -> Self {
        Self {
            attractions,
            network,
            polylines,
            config,
        }
    }

    /// Answer a route query.
    ///
    /// # Errors
    ///
    /// - [`PlanError::AttractionNotFound`] for an unknown code.
    /// - [`PlanError::TooManyStops`] above the configured ceiling.
    /// - [`PlanError::InvalidQuery`] for a fastest-mode query with
    ///   waypoints.
    /// - [`PlanError::RouteNotFound`] when no feasible ordering exists or
    ///   no mode serves a fastest-mode query.
    pub fn plan(&self, query: &RouteQuery) -> Result<RouteResult, PlanError> {
        self.check_codes(query)?;
        if query.waypoints.len() > self.config.max_stops {
            return Err(PlanError::TooManyStops {
                requested: query.waypoints.len(),
                limit: self.config.max_stops,
            });
        }
        let (mode, index) = self.resolve_mode(query)?;

        let stops = best_visit_order(
            index,
            &query.start,
            &query.waypoints,
            &query.end,
            self.config.max_stops,
        )?;

        let mut total_distance = 0_u64;
        let mut total_duration = 0_u64;
        let mut path = Vec::new();
        let mut current = query.start.as_str();
        for stop in &stops {
            // The optimizer only returns feasible orders, so the edge is
            // present; the fallback guards against index swaps mid-flight.
            let edge = index.lookup(current, stop).ok_or(PlanError::RouteNotFound)?;
            total_distance += u64::from(edge.distance);
            total_duration += u64::from(edge.duration);
            self.push_hop_shape(&mut path, edge);
            current = stop;
        }

        let bus_summary = (mode == Mode::Bus)
            .then(|| index.lookup(&query.start, &query.end))
            .flatten()
            .and_then(|edge| edge.bus.as_ref())
            .map(BusLegSummary::from);

        Ok(RouteResult {
            stops,
            total_distance,
            total_duration,
            path,
            color: RouteColor::from(mode),
            bus_summary,
        })
    }

    fn check_codes(&self, query: &RouteQuery) -> Result<(), PlanError> {
        let codes = [&query.start, &query.end]
            .into_iter()
            .chain(query.waypoints.iter());
        for code in codes {
            if self.attractions.by_code(code).is_none() {
                return Err(PlanError::AttractionNotFound { code: code.clone() });
            }
        }
        Ok(())
    }

    /// Resolve the query to a concrete mode and its edge index.
    fn resolve_mode(&self, query: &RouteQuery) -> Result<(Mode, &'a EdgeIndex), PlanError> {
        let mode = match query.mode {
            ModeChoice::Walk => Mode::Walk,
            ModeChoice::Drive => Mode::Drive,
            ModeChoice::Bus => Mode::Bus,
            ModeChoice::Fastest => {
                if !query.waypoints.is_empty() {
                    return Err(PlanError::InvalidQuery {
                        reason: "fastest-mode selection is only defined for direct queries"
                            .to_owned(),
                    });
                }
                fastest_mode(self.network, &query.start, &query.end)
                    .ok_or(PlanError::RouteNotFound)?
            }
        };
        let index = match mode {
            Mode::Walk => self.network.walk(),
            Mode::Drive => self.network.drive(),
            Mode::Bus => {
                // A fastest-mode query resolved to bus via the quickest
                // edge set, so keep comparing like with like.
                let strategy = match query.mode {
                    ModeChoice::Fastest => BusStrategy::Quickest,
                    _ => query.bus_strategy.unwrap_or(BusStrategy::Quickest),
                };
                self.network
                    .bus(strategy)
                    .ok_or(PlanError::RouteNotFound)?
            }
        };
        Ok((mode, index))
    }

    /// Append one hop's shape: transformed origin, transformed trace
    /// points, transformed destination.
    fn push_hop_shape(&self, path: &mut Vec<Coord<f64>>, edge: &Edge) {
        if let Some(origin) = parse_endpoint(&edge.origin) {
            path.push(gcj02_to_wgs84(origin));
        }
        path.extend(transformed_trace(
            self.polylines,
            &edge.origin,
            &edge.destination,
        ));
        if let Some(destination) = parse_endpoint(&edge.destination) {
            path.push(gcj02_to_wgs84(destination));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attraction::Attraction;
    use crate::edge::{BusDetails, Edge, EdgeIndex};
    use crate::polyline::MemoryPolylineStore;
    use rstest::rstest;
    use std::collections::HashMap;

    fn attractions() -> AttractionTable {
        let at = |code: &str, name: &str| {
            Attraction::new(code, name, Coord { x: 108.95, y: 34.26 }, "")
        };
        AttractionTable::new(vec![at("A", "Bell Tower"), at("B", "Drum Tower"), at("C", "City Wall")])
    }

    fn hop(from: &str, to: &str, distance: u32, duration: u32) -> Edge {
        Edge {
            from: from.to_owned(),
            to: to.to_owned(),
            distance,
            duration,
            origin: "108.953941,34.265507".to_owned(),
            destination: "108.964162,34.218285".to_owned(),
            bus: None,
        }
    }

    fn walk_network() -> TransportNetwork {
        TransportNetwork::new(
            EdgeIndex::new(vec![
                hop("A", "B", 100, 60),
                hop("B", "C", 200, 120),
                hop("A", "C", 400, 300),
            ]),
            EdgeIndex::default(),
            HashMap::new(),
        )
    }

    #[test]
    fn plans_the_concrete_scenario() {
        let attractions = attractions();
        let network = walk_network();
        let store = MemoryPolylineStore::default();
        let planner = RoutePlanner::new(&attractions, &network, &store);

        let mut query = RouteQuery::direct("A", "C", ModeChoice::Walk);
        query.waypoints = vec!["B".to_owned()];
        let result = planner.plan(&query).unwrap();

        assert_eq!(result.stops, vec!["B".to_owned(), "C".to_owned()]);
        assert_eq!(result.total_distance, 300);
        assert_eq!(result.total_duration, 180);
        assert_eq!(result.color, RouteColor::Green);
        assert!(result.bus_summary.is_none());
        // Two hops, origin + destination each, no trace points loaded.
        assert_eq!(result.path.len(), 4);
    }

    #[test]
    fn degenerate_round_trip_is_zero_hop() {
        let attractions = attractions();
        let network = walk_network();
        let store = MemoryPolylineStore::default();
        let planner = RoutePlanner::new(&attractions, &network, &store);

        let result = planner.plan(&RouteQuery::direct("A", "A", ModeChoice::Walk)).unwrap();
        assert!(result.stops.is_empty());
        assert_eq!(result.total_distance, 0);
        assert_eq!(result.total_duration, 0);
        assert!(result.path.is_empty());
    }

    #[test]
    fn unknown_code_is_lookup_failure() {
        let attractions = attractions();
        let network = walk_network();
        let store = MemoryPolylineStore::default();
        let planner = RoutePlanner::new(&attractions, &network, &store);

        let err = planner
            .plan(&RouteQuery::direct("A", "ZZZZ", ModeChoice::Walk))
            .unwrap_err();
        assert_eq!(err, PlanError::AttractionNotFound { code: "ZZZZ".to_owned() });
    }

    #[test]
    fn stop_ceiling_is_enforced_before_search() {
        let attractions = attractions();
        let network = walk_network();
        let store = MemoryPolylineStore::default();
        let planner = RoutePlanner::with_config(
            &attractions,
            &network,
            &store,
            PlannerConfig { max_stops: 0 },
        );

        let mut query = RouteQuery::direct("A", "C", ModeChoice::Walk);
        query.waypoints = vec!["B".to_owned()];
        let err = planner.plan(&query).unwrap_err();
        assert_eq!(err, PlanError::TooManyStops { requested: 1, limit: 0 });
    }

    #[test]
    fn fastest_with_waypoints_is_invalid() {
        let attractions = attractions();
        let network = walk_network();
        let store = MemoryPolylineStore::default();
        let planner = RoutePlanner::new(&attractions, &network, &store);

        let mut query = RouteQuery::direct("A", "C", ModeChoice::Fastest);
        query.waypoints = vec!["B".to_owned()];
        assert!(matches!(
            planner.plan(&query).unwrap_err(),
            PlanError::InvalidQuery { .. }
        ));
    }

    #[test]
    fn fastest_resolves_to_quickest_direct_mode() {
        let attractions = attractions();
        let network = TransportNetwork::new(
            EdgeIndex::new(vec![hop("A", "C", 400, 900)]),
            EdgeIndex::new(vec![hop("A", "C", 400, 300)]),
            HashMap::new(),
        );
        let store = MemoryPolylineStore::default();
        let planner = RoutePlanner::new(&attractions, &network, &store);

        let result = planner.plan(&RouteQuery::direct("A", "C", ModeChoice::Fastest)).unwrap();
        assert_eq!(result.color, RouteColor::Blue);
        assert_eq!(result.total_duration, 300);
    }

    #[test]
    fn fastest_without_any_direct_edge_is_route_not_found() {
        let attractions = attractions();
        let network = TransportNetwork::default();
        let store = MemoryPolylineStore::default();
        let planner = RoutePlanner::new(&attractions, &network, &store);

        let err = planner
            .plan(&RouteQuery::direct("A", "C", ModeChoice::Fastest))
            .unwrap_err();
        assert_eq!(err, PlanError::RouteNotFound);
    }

    #[test]
    fn bus_queries_attach_the_direct_edge_summary() {
        let attractions = attractions();
        let mut direct = hop("A", "C", 4000, 900);
        direct.bus = Some(BusDetails {
            taxi_cost: 18.0,
            bus_cost: 2.0,
            walking_distance: 350,
            bus_name: "Route 610".to_owned(),
            transfers: 1,
        });
        let bus = HashMap::from([(
            BusStrategy::Quickest,
            EdgeIndex::new(vec![direct, hop("A", "B", 1500, 400), hop("B", "C", 1800, 420)]),
        )]);
        let network = TransportNetwork::new(EdgeIndex::default(), EdgeIndex::default(), bus);
        let store = MemoryPolylineStore::default();
        let planner = RoutePlanner::new(&attractions, &network, &store);

        let mut query = RouteQuery::direct("A", "C", ModeChoice::Bus);
        query.waypoints = vec!["B".to_owned()];
        let result = planner.plan(&query).unwrap();

        // The summary describes the single direct edge, not the legs.
        let summary = result.bus_summary.expect("direct bus edge exists");
        assert_eq!(summary.bus_name, "Route 610");
        assert_eq!(summary.transfers, 1);
        assert_eq!(result.stops, vec!["B".to_owned(), "C".to_owned()]);
        assert_eq!(result.total_distance, 3300);
        assert_eq!(result.color, RouteColor::Red);
    }

    #[test]
    fn bus_without_direct_edge_has_no_summary() {
        let attractions = attractions();
        let bus = HashMap::from([(
            BusStrategy::Quickest,
            EdgeIndex::new(vec![hop("A", "B", 1500, 400), hop("B", "C", 1800, 420)]),
        )]);
        let network = TransportNetwork::new(EdgeIndex::default(), EdgeIndex::default(), bus);
        let store = MemoryPolylineStore::default();
        let planner = RoutePlanner::new(&attractions, &network, &store);

        let mut query = RouteQuery::direct("A", "C", ModeChoice::Bus);
        query.waypoints = vec!["B".to_owned()];
        let result = planner.plan(&query).unwrap();
        assert!(result.bus_summary.is_none());
    }

    #[test]
    fn unreachable_stops_surface_route_not_found() {
        let attractions = attractions();
        let network = TransportNetwork::new(
            EdgeIndex::new(vec![hop("A", "B", 100, 60)]),
            EdgeIndex::default(),
            HashMap::new(),
        );
        let store = MemoryPolylineStore::default();
        let planner = RoutePlanner::new(&attractions, &network, &store);

        let err = planner
            .plan(&RouteQuery::direct("A", "C", ModeChoice::Walk))
            .unwrap_err();
        assert_eq!(err, PlanError::RouteNotFound);
    }

    #[rstest]
    #[case(ModeChoice::Walk, RouteColor::Green)]
    #[case(ModeChoice::Drive, RouteColor::Blue)]
    fn colour_follows_mode(#[case] mode: ModeChoice, #[case] expected: RouteColor) {
        let attractions = attractions();
        let index = EdgeIndex::new(vec![hop("A", "C", 400, 300)]);
        let network = TransportNetwork::new(index.clone(), index, HashMap::new());
        let store = MemoryPolylineStore::default();
        let planner = RoutePlanner::new(&attractions, &network, &store);

        let result = planner.plan(&RouteQuery::direct("A", "C", mode)).unwrap();
        assert_eq!(result.color, expected);
    }
}
