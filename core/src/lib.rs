#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Outbreak simulation.
//!
//! This crate defines the message surface that connects hosts, the
//! authoritative world, and pure systems. Hosts and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! read immutable views such as [`PopulationView`], and respond exclusively
//! with new command batches.

mod cell;
mod config;
mod error;
mod weapon;

use std::time::Duration;

pub use cell::{Casualties, Cell, CorpseCompartment};
pub use config::{
    CensusTuning, Lattice, PlagueTuning, PopulationTuning, SeedingTuning, SimulationConfig,
    StreamerTuning, WeaponTuning, MAX_HISTORY_LEN,
};
pub use error::{ConfigError, SimulationError};
pub use weapon::{Barrier, CureArea, LethalArea, WeaponKind};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the grid with one seeded from the provided noise field.
    InitializeFromNoise {
        /// Noise sampled once per cell.
        field: NoiseField,
    },
    /// Advances the simulation clock by one host tick.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Turns healthy population of a cell into infected population.
    InfectCell {
        /// Cell to infect.
        cell: CellIndex,
        /// Healthy population to infect.
        amount: f64,
    },
    /// Adds healthy population to a single cell.
    InjectPopulation {
        /// Cell receiving the population.
        cell: CellCoord,
        /// Healthy population to add before capacity clamping.
        amount: f64,
    },
    /// Adds healthy population to every cell inside a circle.
    PaintPopulation {
        /// Center of the painted circle.
        center: CellCoord,
        /// Radius of the painted circle in cells.
        radius: u32,
        /// Healthy population added to each affected cell.
        intensity: f64,
    },
    /// Fires a weapon centered on the provided cell.
    UseWeapon {
        /// Weapon and its parameters.
        weapon: WeaponKind,
        /// Cell the weapon is aimed at.
        center: CellCoord,
    },
    /// Launches a streamer carrying population from one cell to another.
    SpawnStreamer {
        /// Cell the population departs from.
        source: CellCoord,
        /// Cell the streamer travels to.
        destination: CellCoord,
        /// Healthy population requested for transport.
        healthy: f64,
        /// Infected population requested for transport.
        infected: f64,
    },
    /// Reports that the host finished presenting a streamer's terminal cue.
    ReleaseStreamer {
        /// Streamer whose cue completed.
        streamer: StreamerId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a fresh grid was seeded from noise.
    WorldInitialized {
        /// Grid width in cells.
        width: u32,
        /// Grid height in cells.
        height: u32,
        /// Population created by the seeding.
        population: f64,
        /// Number of static population centers recorded.
        population_centers: usize,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a spread pass ran during the tick.
    SpreadPassCompleted {
        /// Number of passes completed since initialization, this one included.
        pass: u64,
        /// Aggregate statistics captured at the start of the pass.
        census: PopulationStats,
        /// Infected population that died during the pass.
        killed: f64,
    },
    /// Lists cells whose population changed and need to be presented again.
    CellsChanged {
        /// Changed cells in ascending index order.
        cells: Vec<CellIndex>,
    },
    /// Confirms that a cell was infected on request.
    CellInfected {
        /// Infected cell.
        cell: CellIndex,
        /// Population actually infected.
        amount: f64,
    },
    /// Confirms that healthy population was added to the grid.
    PopulationInjected {
        /// Center of the affected area.
        center: CellCoord,
        /// Number of cells visited.
        cells: u32,
        /// Population actually added after clamping.
        added: f64,
    },
    /// Confirms that a streamer departed.
    StreamerSpawned {
        /// Identifier assigned to the streamer.
        streamer: StreamerId,
        /// Cell the population departed from.
        source: CellCoord,
        /// Cell the streamer travels to.
        destination: CellCoord,
        /// Healthy population on board.
        healthy: f64,
        /// Infected population on board.
        infected: f64,
    },
    /// Confirms that a streamer reached its destination and unloaded.
    StreamerArrived {
        /// Identifier of the streamer.
        streamer: StreamerId,
        /// Cell that received the population.
        destination: CellCoord,
        /// Healthy population delivered.
        delivered_healthy: f64,
        /// Infected population delivered.
        delivered_infected: f64,
        /// Population that did not fit under the destination's capacity.
        clamped: f64,
        /// Whether the delivery brought infection to a cell with healthy population.
        seeded_infection: bool,
    },
    /// Confirms that a weapon destroyed a streamer in flight.
    StreamerDestroyed {
        /// Identifier of the streamer.
        streamer: StreamerId,
        /// Cell receiving the wreckage.
        cell: CellCoord,
        /// Population on board that died and was laid in cells.
        casualties: f64,
        /// Population on board that found no room in or around the wreck.
        clamped: f64,
    },
    /// Confirms that a barrier halted a streamer and unloaded it in place.
    StreamerHalted {
        /// Identifier of the streamer.
        streamer: StreamerId,
        /// Cell that received the population.
        cell: CellCoord,
        /// Population on board that found no room in or around the stop.
        clamped: f64,
    },
    /// Confirms that a streamer awaiting its cue was released.
    StreamerReleased {
        /// Identifier of the streamer.
        streamer: StreamerId,
    },
    /// Summarizes the outcome of a weapon.
    WeaponUsed {
        /// Weapon that was fired.
        weapon: WeaponKind,
        /// Cell the weapon was aimed at.
        center: CellCoord,
        /// Number of in-bounds cells inside the affected circle.
        affected_cells: u32,
        /// Population killed, including streamer passengers.
        casualties: f64,
        /// Number of streamers destroyed or halted.
        streamers_hit: u32,
    },
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Row-major index of a cell inside the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellIndex(u32);

impl CellIndex {
    /// Creates a new cell index with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Continuous position measured in cells, where integer values sit on cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellPoint {
    column: f32,
    row: f32,
}

impl CellPoint {
    /// Creates a new point from fractional column and row coordinates.
    #[must_use]
    pub const fn new(column: f32, row: f32) -> Self {
        Self { column, row }
    }

    /// Fractional column coordinate.
    #[must_use]
    pub const fn column(&self) -> f32 {
        self.column
    }

    /// Fractional row coordinate.
    #[must_use]
    pub const fn row(&self) -> f32 {
        self.row
    }
}

/// Unique identifier assigned to a streamer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamerId(u32);

impl StreamerId {
    /// Creates a new streamer identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Lifecycle stage of a streamer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamerState {
    /// Moving toward its destination with population on board.
    Traveling,
    /// Unloaded; waiting for the host to finish its terminal cue.
    Arrived,
    /// Safe to discard.
    Removed,
}

/// Immutable representation of a single streamer used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamerSnapshot {
    /// Unique identifier assigned to the streamer.
    pub id: StreamerId,
    /// Cell the streamer departed from.
    pub source: CellCoord,
    /// Cell the streamer travels to.
    pub destination: CellCoord,
    /// Current position.
    pub position: CellPoint,
    /// Unit direction of travel fixed at departure.
    pub direction: CellPoint,
    /// Healthy population on board.
    pub carried_healthy: f64,
    /// Infected population on board.
    pub carried_infected: f64,
    /// Lifecycle stage.
    pub state: StreamerState,
}

impl StreamerSnapshot {
    /// Reports whether the streamer may be discarded.
    #[must_use]
    pub fn is_discardable(&self) -> bool {
        self.state == StreamerState::Removed
    }
}

/// Read-only snapshot describing all streamers known to the world.
#[derive(Clone, Debug, Default)]
pub struct StreamerView {
    snapshots: Vec<StreamerSnapshot>,
}

impl StreamerView {
    /// Creates a new streamer view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<StreamerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &StreamerSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no streamers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<StreamerSnapshot> {
        self.snapshots
    }
}

/// Read-only view into the dense population grid.
#[derive(Clone, Copy, Debug)]
pub struct PopulationView<'a> {
    cells: &'a [Cell],
    columns: u32,
    rows: u32,
}

impl<'a> PopulationView<'a> {
    /// Captures a new population view backed by the provided cell slice.
    #[must_use]
    pub fn new(cells: &'a [Cell], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Returns the cell at the provided coordinate, if it lies on the grid.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<&'a Cell> {
        self.index_of(coord).and_then(|index| self.cell_at(index))
    }

    /// Returns the cell stored at the provided index, if any.
    #[must_use]
    pub fn cell_at(&self, index: CellIndex) -> Option<&'a Cell> {
        let index = usize::try_from(index.get()).ok()?;
        self.cells.get(index)
    }

    /// Converts a coordinate into a row-major index.
    #[must_use]
    pub fn index_of(&self, coord: CellCoord) -> Option<CellIndex> {
        if coord.column() < self.columns && coord.row() < self.rows {
            let value = coord
                .row()
                .checked_mul(self.columns)?
                .checked_add(coord.column())?;
            Some(CellIndex::new(value))
        } else {
            None
        }
    }

    /// Converts a row-major index back into a coordinate.
    #[must_use]
    pub fn coord_of(&self, index: CellIndex) -> Option<CellCoord> {
        if self.columns == 0 || usize::try_from(index.get()).ok()? >= self.cells.len() {
            return None;
        }
        Some(CellCoord::new(
            index.get() % self.columns,
            index.get() / self.columns,
        ))
    }

    /// Iterates over every cell together with its index in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellIndex, &'a Cell)> + 'a {
        self.cells
            .iter()
            .enumerate()
            .map(|(index, cell)| (CellIndex::new(index as u32), cell))
    }

    /// Number of cells in the grid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the grid holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Provides the dimensions of the underlying grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }
}

/// Noise sampled once per cell, consumed when the world is seeded.
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseField {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl NoiseField {
    /// Wraps row-major samples, checking that exactly one exists per cell.
    pub fn new(width: u32, height: u32, values: Vec<f32>) -> Result<Self, SimulationError> {
        let expected = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(usize::MAX);
        if values.len() != expected {
            return Err(SimulationError::NoiseDimensionMismatch {
                width,
                height,
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// Width of the field in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the field in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Row-major samples.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

/// Aggregate population across the grid and the streamers in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PopulationStats {
    /// Healthy population living in cells.
    pub cell_healthy: f64,
    /// Infected population living in cells.
    pub cell_infected: f64,
    /// Non-contagious dead held by cells.
    pub cell_healthy_dead: f64,
    /// Contagious corpses held by cells.
    pub cell_infected_dead: f64,
    /// Healthy population on board streamers.
    pub in_flight_healthy: f64,
    /// Infected population on board streamers.
    pub in_flight_infected: f64,
    /// Population killed by weapons since initialization.
    pub casualties: f64,
}

impl PopulationStats {
    /// Healthy population, in cells or in flight.
    #[must_use]
    pub fn healthy(&self) -> f64 {
        self.cell_healthy + self.in_flight_healthy
    }

    /// Infected population, in cells or in flight.
    #[must_use]
    pub fn infected(&self) -> f64 {
        self.cell_infected + self.in_flight_infected
    }

    /// Dead population not attributed to weapons.
    #[must_use]
    pub fn plague_dead(&self) -> f64 {
        (self.cell_healthy_dead + self.cell_infected_dead - self.casualties).max(0.0)
    }

    /// Total population across cells and streamers, living and dead.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.cell_healthy
            + self.cell_infected
            + self.cell_healthy_dead
            + self.cell_infected_dead
            + self.in_flight_healthy
            + self.in_flight_infected
    }
}
