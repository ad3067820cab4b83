//! Facade crate for the Tourway route planner.
//!
//! This crate re-exports the core domain types so applications can depend on
//! a single crate name; loaders and persistence live in `tourway-data`.

#![forbid(unsafe_code)]

pub use tourway_core::{
    Attraction, AttractionTable, BusDetails, BusLegSummary, BusStrategy, CoordOrder, Edge,
    EdgeIndex, MemoryPolylineStore, Mode, ModeChoice, PlanError, PlannerConfig, PolylineStore,
    RouteColor, RoutePlanner, RouteQuery, RouteResult, TransportNetwork,
};
