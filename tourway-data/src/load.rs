//! JSON Lines loaders for attractions, edges, and polyline traces.
//!
//! Loads are forgiving per record and strict per file: a malformed or
//! semantically invalid line is skipped with a logged warning and counted,
//! while I/O failures abort the load. One bad line never loses the rest of
//! the file.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::warn;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tourway_core::{
    AttractionTable, BusStrategy, Edge, EdgeIndex, MemoryPolylineStore, Mode, TransportNetwork,
};

use crate::records::{AttractionRecord, EdgeRecord, PolylineRecord};

/// Reasons a structurally valid record is still rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    /// The attraction code was empty.
    #[error("attraction code must not be empty")]
    EmptyCode,
    /// A coordinate fell outside the valid longitude/latitude ranges.
    #[error("coordinate ({lon}, {lat}) is outside valid ranges")]
    CoordinateOutOfRange {
        /// Offending longitude.
        lon: f64,
        /// Offending latitude.
        lat: f64,
    },
    /// Edge distance or duration was not a positive value in range.
    #[error("edge metrics must be positive (distance {distance}, duration {duration})")]
    NonPositiveMetric {
        /// Distance as it appeared in the record.
        distance: i64,
        /// Duration as it appeared in the record.
        duration: i64,
    },
    /// An edge referenced an attraction that is not loaded.
    #[error("edge references unknown attraction {code}")]
    UnknownEndpoint {
        /// The unknown code.
        code: String,
    },
    /// An edge endpoint string did not parse as `"lon,lat"`.
    #[error("endpoint {value:?} is not a \"lon,lat\" coordinate string")]
    MalformedEndpoint {
        /// The malformed endpoint string.
        value: String,
    },
}

/// Errors aborting a load.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A data file could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        /// Location of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Reading a line from a data file failed.
    #[error("failed to read from {path}: {source}")]
    Read {
        /// Location of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Counts of accepted and skipped records for one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Records accepted into the table or index.
    pub loaded: usize,
    /// Records skipped with a warning.
    pub skipped: usize,
}

impl LoadReport {
    fn accept(&mut self) {
        self.loaded += 1;
    }

    fn skip(&mut self) {
        self.skipped += 1;
    }

    fn merge(&mut self, other: Self) {
        self.loaded += other.loaded;
        self.skipped += other.skipped;
    }
}

/// Deserialise each non-empty line of `reader`, handing parsed records to
/// `accept`, which may still reject them with a reason. `label` names the
/// input in warnings.
fn for_each_record<R, T>(
    reader: R,
    label: &str,
    mut accept: impl FnMut(T) -> Result<(), RecordError>,
) -> Result<LoadReport, std::io::Error>
where
    R: BufRead,
    T: DeserializeOwned,
{
    let mut report = LoadReport::default();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(trimmed) {
            Ok(record) => match accept(record) {
                Ok(()) => report.accept(),
                Err(reason) => {
                    warn!("{label}:{}: skipping record: {reason}", number + 1);
                    report.skip();
                }
            },
            Err(err) => {
                warn!("{label}:{}: skipping malformed line: {err}", number + 1);
                report.skip();
            }
        }
    }
    Ok(report)
}

/// Load the attraction table from a JSON Lines reader.
pub fn load_attractions<R: BufRead>(
    reader: R,
    label: &str,
) -> Result<(AttractionTable, LoadReport), std::io::Error> {
    let mut attractions = Vec::new();
    let report = for_each_record(reader, label, |record: AttractionRecord| {
        attractions.push(record.into_attraction()?);
        Ok(())
    })?;
    Ok((AttractionTable::new(attractions), report))
}

/// Load one mode's edge index from a JSON Lines reader.
///
/// Edges referencing attractions missing from `attractions` are skipped,
/// which upholds the invariant that every indexed edge joins two loaded
/// attractions.
pub fn load_edges<R: BufRead>(
    reader: R,
    label: &str,
    attractions: &AttractionTable,
) -> Result<(EdgeIndex, LoadReport), std::io::Error> {
    let mut edges: Vec<Edge> = Vec::new();
    let report = for_each_record(reader, label, |record: EdgeRecord| {
        edges.push(record.into_edge(attractions)?);
        Ok(())
    })?;
    Ok((EdgeIndex::new(edges), report))
}

/// Load the polyline trace store from a JSON Lines reader.
pub fn load_polylines<R: BufRead>(
    reader: R,
    label: &str,
) -> Result<(MemoryPolylineStore, LoadReport), std::io::Error> {
    let mut traces = Vec::new();
    let report = for_each_record(reader, label, |record: PolylineRecord| {
        traces.push(record.into_trace());
        Ok(())
    })?;
    Ok((MemoryPolylineStore::new(traces), report))
}

/// Everything a deployment loads at startup.
#[derive(Debug, Clone, Default)]
pub struct LoadedData {
    /// Read-only attraction table.
    pub attractions: AttractionTable,
    /// Per-mode edge indexes.
    pub network: TransportNetwork,
    /// Raw hop traces.
    pub polylines: MemoryPolylineStore,
    /// Aggregate accept/skip counts across all files.
    pub report: LoadReport,
}

/// Expected file name for an edge set.
fn edge_file_name(mode: Mode, strategy: Option<BusStrategy>) -> String {
    match strategy {
        Some(strategy) => format!("{mode}_{strategy}.jsonl"),
        None => format!("{mode}.jsonl"),
    }
}

/// Load a complete data directory.
///
/// Expects `attractions.jsonl`, `walk.jsonl`, `drive.jsonl`, one
/// `bus_<strategy>.jsonl` per strategy, and `polylines.jsonl`. A missing
/// edge or polyline file is warned about and treated as empty; a missing
/// attraction file aborts, since nothing can be planned without it.
pub fn load_directory(dir: &Path) -> Result<LoadedData, LoadError> {
    let attractions_path = dir.join("attractions.jsonl");
    let reader = open(&attractions_path)?;
    let (attractions, mut report) = load_attractions(reader, &attractions_path.display().to_string())
        .map_err(|source| LoadError::Read {
            path: attractions_path.clone(),
            source,
        })?;

    let mut load_index = |mode: Mode,
                          strategy: Option<BusStrategy>|
     -> Result<EdgeIndex, LoadError> {
        let path = dir.join(edge_file_name(mode, strategy));
        if !path.exists() {
            warn!("{}: edge file missing, treating as empty", path.display());
            return Ok(EdgeIndex::default());
        }
        let reader = open(&path)?;
        let (index, file_report) =
            load_edges(reader, &path.display().to_string(), &attractions).map_err(|source| {
                LoadError::Read {
                    path: path.clone(),
                    source,
                }
            })?;
        report.merge(file_report);
        Ok(index)
    };

    let walk = load_index(Mode::Walk, None)?;
    let drive = load_index(Mode::Drive, None)?;
    let mut bus = HashMap::new();
    for strategy in BusStrategy::ALL {
        bus.insert(strategy, load_index(Mode::Bus, Some(strategy))?);
    }

    let polylines_path = dir.join("polylines.jsonl");
    let polylines = if polylines_path.exists() {
        let reader = open(&polylines_path)?;
        let (store, file_report) = load_polylines(reader, &polylines_path.display().to_string())
            .map_err(|source| LoadError::Read {
                path: polylines_path.clone(),
                source,
            })?;
        report.merge(file_report);
        store
    } else {
        warn!("{}: polyline file missing, traces will be empty", polylines_path.display());
        MemoryPolylineStore::default()
    };

    Ok(LoadedData {
        attractions,
        network: TransportNetwork::new(walk, drive, bus),
        polylines,
        report,
    })
}

fn open(path: &Path) -> Result<BufReader<File>, LoadError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })
}
