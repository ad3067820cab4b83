//! Loaders and persistence for Tourway data sets.
//!
//! The core plans over read-only tables; this crate builds them, either
//! from JSON Lines data directories ([`load`]) or from a prepared SQLite
//! database ([`sqlite`]). Malformed records are skipped individually with
//! a logged warning — a single bad line never aborts a load.

#![forbid(unsafe_code)]

pub mod load;
pub mod records;
pub mod sqlite;

pub use load::{LoadError, LoadReport, LoadedData, RecordError, load_directory};
pub use records::{AttractionRecord, BusRecord, EdgeRecord, PolylineRecord};
pub use sqlite::{SqliteStore, StoreError};
