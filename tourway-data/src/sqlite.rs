//! SQLite persistence for prepared data sets.
//!
//! A deployment can load JSON Lines once, persist the result, and serve
//! subsequent starts from the database. The schema keeps the upstream
//! CHECK constraints so a hand-edited database cannot smuggle in the
//! invalid metrics the loaders reject.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use geo::Coord;
use log::warn;
use rusqlite::{params, Connection};
use thiserror::Error;
use tourway_core::{
    Attraction, AttractionTable, BusDetails, BusStrategy, Edge, EdgeIndex, MemoryPolylineStore,
    Mode, TransportNetwork,
};

use crate::load::LoadedData;

/// Errors raised by the SQLite store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Opening the database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    Open {
        /// Location of the database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Generic SQLite error while reading or writing rows.
    #[error("database error: {source}")]
    Database {
        /// Source error raised by the SQLite driver.
        #[from]
        source: rusqlite::Error,
    },
}

/// SQLite-backed storage for attractions, edges, and polyline traces.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (creating if needed) a database at `path` and ensure the
    /// schema exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory().map_err(StoreError::from)?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS attractions (
                code TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                lng REAL NOT NULL CHECK(lng BETWEEN -180 AND 180),
                lat REAL NOT NULL CHECK(lat BETWEEN -90 AND 90),
                description TEXT NOT NULL,
                price TEXT,
                link TEXT
            );
            CREATE TABLE IF NOT EXISTS edges (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                from_code TEXT NOT NULL REFERENCES attractions(code),
                to_code TEXT NOT NULL REFERENCES attractions(code),
                mode TEXT NOT NULL CHECK(mode IN ('walk', 'drive', 'bus')),
                strategy TEXT,
                distance INTEGER NOT NULL CHECK(distance > 0),
                duration INTEGER NOT NULL CHECK(duration > 0),
                origin TEXT NOT NULL,
                destination TEXT NOT NULL,
                taxi_cost REAL,
                bus_cost REAL,
                walking_distance INTEGER,
                bus_name TEXT,
                transfers INTEGER CHECK(transfers >= 0)
            );
            CREATE INDEX IF NOT EXISTS idx_edges_main
                ON edges(mode, strategy, from_code, to_code);
            CREATE TABLE IF NOT EXISTS polylines (
                origin TEXT NOT NULL,
                destination TEXT NOT NULL,
                seq INTEGER NOT NULL CHECK(seq >= 0),
                lng REAL NOT NULL,
                lat REAL NOT NULL,
                PRIMARY KEY (origin, destination, seq)
            );",
        )?;
        Ok(Self { conn })
    }

    /// Persist a loaded data set, replacing any previous contents, inside
    /// one transaction.
    pub fn persist(&mut self, data: &LoadedData) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute_batch("DELETE FROM polylines; DELETE FROM edges; DELETE FROM attractions;")?;

        for attraction in data.attractions.iter() {
            tx.execute(
                "INSERT INTO attractions (code, name, lng, lat, description, price, link)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    attraction.code,
                    attraction.name,
                    attraction.location.x,
                    attraction.location.y,
                    attraction.description,
                    attraction.price,
                    attraction.link,
                ],
            )?;
        }

        let mut insert_index =
            |index: &EdgeIndex, mode: Mode, strategy: Option<BusStrategy>| -> rusqlite::Result<()> {
                for edge in index.iter() {
                    let bus = edge.bus.as_ref();
                    tx.execute(
                        "INSERT INTO edges (from_code, to_code, mode, strategy, distance,
                            duration, origin, destination, taxi_cost, bus_cost,
                            walking_distance, bus_name, transfers)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                        params![
                            edge.from,
                            edge.to,
                            mode.as_str(),
                            strategy.map(|s| s.as_str()),
                            edge.distance,
                            edge.duration,
                            edge.origin,
                            edge.destination,
                            bus.map(|b| b.taxi_cost),
                            bus.map(|b| b.bus_cost),
                            bus.map(|b| b.walking_distance),
                            bus.map(|b| b.bus_name.clone()),
                            bus.map(|b| b.transfers),
                        ],
                    )?;
                }
                Ok(())
            };

        insert_index(data.network.walk(), Mode::Walk, None)?;
        insert_index(data.network.drive(), Mode::Drive, None)?;
        for strategy in BusStrategy::ALL {
            if let Some(index) = data.network.bus(strategy) {
                insert_index(index, Mode::Bus, Some(strategy))?;
            }
        }

        for (origin, destination, points) in data.polylines.iter() {
            for (seq, point) in points.iter().enumerate() {
                tx.execute(
                    "INSERT INTO polylines (origin, destination, seq, lng, lat)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![origin, destination, seq as i64, point.x, point.y],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Load the full data set back into in-memory tables.
    ///
    /// Rows with an unrecognised mode or strategy are skipped with a
    /// warning, matching the file loaders' posture.
    pub fn load(&self) -> Result<LoadedData, StoreError> {
        let attractions = self.load_attractions()?;
        let network = self.load_network()?;
        let polylines = self.load_polylines()?;
        Ok(LoadedData {
            attractions,
            network,
            polylines,
            report: Default::default(),
        })
    }

    fn load_attractions(&self) -> Result<AttractionTable, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT code, name, lng, lat, description, price, link FROM attractions",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Attraction {
                code: row.get(0)?,
                name: row.get(1)?,
                location: Coord {
                    x: row.get(2)?,
                    y: row.get(3)?,
                },
                description: row.get(4)?,
                price: row.get(5)?,
                link: row.get(6)?,
            })
        })?;
        let mut attractions = Vec::new();
        for row in rows {
            attractions.push(row?);
        }
        Ok(AttractionTable::new(attractions))
    }

    fn load_network(&self) -> Result<TransportNetwork, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT from_code, to_code, mode, strategy, distance, duration, origin,
                    destination, taxi_cost, bus_cost, walking_distance, bus_name, transfers
             FROM edges",
        )?;
        let rows = stmt.query_map([], |row| {
            let bus = match row.get::<_, Option<String>>(11)? {
                Some(bus_name) => Some(BusDetails {
                    taxi_cost: row.get::<_, Option<f64>>(8)?.unwrap_or(0.0),
                    bus_cost: row.get::<_, Option<f64>>(9)?.unwrap_or(0.0),
                    walking_distance: row.get::<_, Option<u32>>(10)?.unwrap_or(0),
                    bus_name,
                    transfers: row.get::<_, Option<u32>>(12)?.unwrap_or(0),
                }),
                None => None,
            };
            Ok((
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                Edge {
                    from: row.get(0)?,
                    to: row.get(1)?,
                    distance: row.get(4)?,
                    duration: row.get(5)?,
                    origin: row.get(6)?,
                    destination: row.get(7)?,
                    bus,
                },
            ))
        })?;

        let mut walk = Vec::new();
        let mut drive = Vec::new();
        let mut bus: HashMap<BusStrategy, Vec<Edge>> = HashMap::new();
        for row in rows {
            let (mode, strategy, edge) = row?;
            match mode.parse::<Mode>() {
                Ok(Mode::Walk) => walk.push(edge),
                Ok(Mode::Drive) => drive.push(edge),
                Ok(Mode::Bus) => {
                    let strategy = strategy.as_deref().unwrap_or("").parse::<BusStrategy>();
                    match strategy {
                        Ok(strategy) => bus.entry(strategy).or_default().push(edge),
                        Err(err) => warn!("skipping bus edge with bad strategy: {err}"),
                    }
                }
                Err(err) => warn!("skipping edge with bad mode: {err}"),
            }
        }
        let bus = bus
            .into_iter()
            .map(|(strategy, edges)| (strategy, EdgeIndex::new(edges)))
            .collect();
        Ok(TransportNetwork::new(
            EdgeIndex::new(walk),
            EdgeIndex::new(drive),
            bus,
        ))
    }

    fn load_polylines(&self) -> Result<MemoryPolylineStore, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT origin, destination, lng, lat FROM polylines
             ORDER BY origin, destination, seq",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                Coord {
                    x: row.get::<_, f64>(2)?,
                    y: row.get::<_, f64>(3)?,
                },
            ))
        })?;

        let mut traces: HashMap<(String, String), Vec<Coord<f64>>> = HashMap::new();
        for row in rows {
            let (origin, destination, point) = row?;
            traces.entry((origin, destination)).or_default().push(point);
        }
        Ok(MemoryPolylineStore::new(
            traces
                .into_iter()
                .map(|((origin, destination), points)| (origin, destination, points)),
        ))
    }
}
