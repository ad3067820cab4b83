//! Core domain types and algorithms for the Tourway route planner.
//!
//! The crate is pure and synchronous: no I/O, no global state. Loaders build
//! the immutable [`AttractionTable`], [`TransportNetwork`], and polyline
//! store once; route computations borrow them and may run concurrently
//! without locking.
//!
//! Coordinates are `geo::Coord<f64>` with `x = longitude` and
//! `y = latitude` throughout.

#![forbid(unsafe_code)]

pub mod attraction;
pub mod edge;
pub mod error;
pub mod geodesy;
pub mod optimizer;
pub mod planner;
pub mod polyline;
pub mod selector;

pub use attraction::{Attraction, AttractionTable};
pub use edge::{BusDetails, BusStrategy, Edge, EdgeIndex, Mode, TransportNetwork};
pub use error::PlanError;
pub use geodesy::CoordOrder;
pub use planner::{
    BusLegSummary, ModeChoice, PlannerConfig, RouteColor, RoutePlanner, RouteQuery, RouteResult,
};
pub use polyline::{MemoryPolylineStore, PolylineStore};
