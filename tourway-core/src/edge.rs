//! Directed travel segments and the per-mode indexes that hold them.

use std::collections::HashMap;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// A transport mode with its own precomputed edge set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Mode {
    /// On foot.
    Walk,
    /// Private car or taxi.
    Drive,
    /// Public bus, further split by [`BusStrategy`].
    Bus,
}

impl Mode {
    /// Return the mode as its lowercase declaration string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Walk => "walk",
            Self::Drive => "drive",
            Self::Bus => "bus",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "walk" => Ok(Self::Walk),
            "drive" => Ok(Self::Drive),
            "bus" => Ok(Self::Bus),
            other => Err(PlanError::UnknownMode {
                value: other.to_owned(),
            }),
        }
    }
}

/// A bus-routing preference selecting which edge set is searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BusStrategy {
    /// Cheapest fares.
    Economic,
    /// Fewest transfers between lines.
    FewestTransfers,
    /// Least walking between stops.
    FewestWalks,
    /// Shortest overall duration.
    Quickest,
}

impl BusStrategy {
    /// All strategies, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Economic,
        Self::FewestTransfers,
        Self::FewestWalks,
        Self::Quickest,
    ];

    /// Return the strategy as its lowercase declaration string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Economic => "economic",
            Self::FewestTransfers => "fewest_transfers",
            Self::FewestWalks => "fewest_walks",
            Self::Quickest => "quickest",
        }
    }
}

impl std::fmt::Display for BusStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BusStrategy {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "economic" => Ok(Self::Economic),
            "fewest_transfers" => Ok(Self::FewestTransfers),
            "fewest_walks" => Ok(Self::FewestWalks),
            "quickest" => Ok(Self::Quickest),
            other => Err(PlanError::UnknownStrategy {
                value: other.to_owned(),
            }),
        }
    }
}

/// Bus-specific metadata carried by bus edges.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BusDetails {
    /// Estimated taxi fare over the same hop, currency units.
    pub taxi_cost: f64,
    /// Bus fare, currency units.
    pub bus_cost: f64,
    /// Walking distance to, between, and from stops, metres.
    pub walking_distance: u32,
    /// Name of the bus line or line sequence.
    pub bus_name: String,
    /// Number of transfers.
    pub transfers: u32,
}

/// A directed precomputed travel segment between two attractions.
///
/// Edges are mode-specific and not guaranteed symmetric: the absence of the
/// reverse edge is valid data and means "no route" for that direction.
///
/// `origin` and `destination` are the literal coordinate strings of the
/// segment's physical endpoints as they appear in the source data. They key
/// the polyline trace store — a namespace separate from attraction codes —
/// so their formatting must be preserved byte for byte.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edge {
    /// Code of the attraction the segment leaves from.
    pub from: String,
    /// Code of the attraction the segment arrives at.
    pub to: String,
    /// Travel distance in metres, always positive.
    pub distance: u32,
    /// Travel duration in seconds, always positive.
    pub duration: u32,
    /// Literal obfuscated endpoint string, `"lon,lat"`.
    pub origin: String,
    /// Literal obfuscated endpoint string, `"lon,lat"`.
    pub destination: String,
    /// Bus metadata, present on bus edges only.
    pub bus: Option<BusDetails>,
}

/// Read-only mapping from directed attraction pairs to edges for one mode.
///
/// Built once at load time and never mutated during serving. A missing
/// entry means the hop is unreachable; the index never infers or
/// interpolates.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeIndex {
    edges: HashMap<String, HashMap<String, Edge>>,
}

impl EdgeIndex {
    /// Build an index from loaded edges. Later duplicates of a directed
    /// pair replace earlier ones.
    #[must_use]
    pub fn new(edges: impl IntoIterator<Item = Edge>) -> Self {
        let mut map: HashMap<String, HashMap<String, Edge>> = HashMap::new();
        for edge in edges {
            map.entry(edge.from.clone())
                .or_default()
                .insert(edge.to.clone(), edge);
        }
        Self { edges: map }
    }

    /// Look up the directed edge from `from` to `to`.
    #[must_use]
    pub fn lookup(&self, from: &str, to: &str) -> Option<&Edge> {
        self.edges.get(from)?.get(to)
    }

    /// Number of edges in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.values().map(HashMap::len).sum()
    }

    /// Whether the index holds no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Iterate over all edges in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values().flat_map(HashMap::values)
    }
}

/// The per-mode edge collections a deployment serves from.
///
/// One index for walking, one for driving, and one per bus strategy.
/// Read-only after construction and shareable across concurrent route
/// computations without locking.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransportNetwork {
    walk: EdgeIndex,
    drive: EdgeIndex,
    bus: HashMap<BusStrategy, EdgeIndex>,
}

impl TransportNetwork {
    /// Assemble a network from per-mode indexes.
    #[must_use]
    pub fn new(walk: EdgeIndex, drive: EdgeIndex, bus: HashMap<BusStrategy, EdgeIndex>) -> Self {
        Self { walk, drive, bus }
    }

    /// The walking edge index.
    #[must_use]
    pub fn walk(&self) -> &EdgeIndex {
        &self.walk
    }

    /// The driving edge index.
    #[must_use]
    pub fn drive(&self) -> &EdgeIndex {
        &self.drive
    }

    /// The bus edge index for `strategy`, empty when that strategy has no
    /// loaded edges.
    #[must_use]
    pub fn bus(&self, strategy: BusStrategy) -> Option<&EdgeIndex> {
        self.bus.get(&strategy)
    }
}
