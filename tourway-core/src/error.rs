//! Error types surfaced by route planning.

use thiserror::Error;

/// Errors returned by the planning surface.
///
/// Three families, mirroring how the boundary reports them:
///
/// - lookup failures ([`PlanError::AttractionNotFound`]) become not-found
///   results rather than faults;
/// - [`PlanError::RouteNotFound`] means every candidate ordering required a
///   missing edge; the edge data is static, so the request is not retried;
/// - the remaining variants are configuration errors that fail the request
///   before any search runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// The query referenced an attraction code that is not loaded.
    #[error("attraction {code} is not loaded")]
    AttractionNotFound {
        /// The unknown attraction code.
        code: String,
    },
    /// No feasible ordering exists for the requested stops and mode.
    #[error("no feasible route for the requested stops and mode")]
    RouteNotFound,
    /// The query combined options that cannot be satisfied together.
    #[error("invalid query: {reason}")]
    InvalidQuery {
        /// Human-readable description of the conflict.
        reason: String,
    },
    /// An unrecognised transport mode declaration.
    #[error("unknown transport mode {value:?}")]
    UnknownMode {
        /// The offending declaration.
        value: String,
    },
    /// An unrecognised bus strategy declaration.
    #[error("unknown bus strategy {value:?}")]
    UnknownStrategy {
        /// The offending declaration.
        value: String,
    },
    /// An unrecognised coordinate-order declaration.
    #[error("unknown coordinate order {value:?}")]
    UnknownCoordOrder {
        /// The offending declaration.
        value: String,
    },
    /// More required stops than the configured permutation-search ceiling.
    #[error("route queries support at most {limit} required stops, got {requested}")]
    TooManyStops {
        /// Number of required stops in the query.
        requested: usize,
        /// Configured ceiling.
        limit: usize,
    },
}
