#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Host-facing facade that owns the world and drives its systems.
//!
//! Every host call is translated into a [`Command`], applied to the world,
//! and the resulting events are pumped through the seeding, scheduling and
//! census systems until none of them asks for anything further.

use std::time::Duration;

use log::warn;
use outbreak_core::{
    Cell, CellCoord, CellIndex, Command, Event, NoiseField, PopulationStats, SimulationConfig,
    SimulationError, StreamerId, StreamerView, WeaponKind,
};
use outbreak_system_census::Census;
use outbreak_system_seeding::{self as seeding, Seeding};
use outbreak_system_streamer_scheduling::{
    self as scheduling, SchedulingView, StreamerScheduling,
};
use outbreak_world::{self as world, query, World};

/// Simulation aggregate owning the world and every system that reacts to it.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    seeding: Seeding,
    scheduling: StreamerScheduling,
    census: Census,
}

impl Simulation {
    /// Builds a simulation seeded from `field` and places the initial infections.
    pub fn new(config: SimulationConfig, field: NoiseField) -> Result<Self, SimulationError> {
        config.validate()?;
        let seeding = Seeding::new(seeding::Config::from_simulation(&config));
        let scheduling = StreamerScheduling::new(scheduling::Config::from_simulation(&config));
        let census = Census::new(config.census.history_len);
        let world = World::new(config)?;

        let mut simulation = Self {
            world,
            seeding,
            scheduling,
            census,
        };
        let _ = simulation.execute(Command::InitializeFromNoise { field })?;
        Ok(simulation)
    }

    /// Advances the simulation by one host tick and returns every event it produced.
    pub fn tick(&mut self, dt: Duration) -> Result<Vec<Event>, SimulationError> {
        self.execute(Command::Tick { dt })
    }

    /// Fires a weapon at the provided cell.
    pub fn use_weapon(
        &mut self,
        weapon: WeaponKind,
        center: CellCoord,
    ) -> Result<Vec<Event>, SimulationError> {
        self.execute(Command::UseWeapon { weapon, center })
    }

    /// Paints healthy population over a circle around `center`.
    pub fn paint_population(
        &mut self,
        center: CellCoord,
        radius: u32,
        intensity: f64,
    ) -> Result<Vec<Event>, SimulationError> {
        self.execute(Command::PaintPopulation {
            center,
            radius,
            intensity,
        })
    }

    /// Adds healthy population to a single cell.
    pub fn inject_population(
        &mut self,
        cell: CellCoord,
        amount: f64,
    ) -> Result<Vec<Event>, SimulationError> {
        self.execute(Command::InjectPopulation { cell, amount })
    }

    /// Infects healthy population of the cell stored at `cell`.
    pub fn infect_cell(
        &mut self,
        cell: CellIndex,
        amount: f64,
    ) -> Result<Vec<Event>, SimulationError> {
        self.execute(Command::InfectCell { cell, amount })
    }

    /// Reports that the host finished presenting a streamer's terminal cue.
    pub fn release_streamer(&mut self, streamer: StreamerId) -> Result<Vec<Event>, SimulationError> {
        self.execute(Command::ReleaseStreamer { streamer })
    }

    /// Borrows the cell at the provided coordinate.
    pub fn cell_at(&self, coord: CellCoord) -> Result<&Cell, SimulationError> {
        query::cell_at(&self.world, coord)
    }

    /// Aggregates population across cells and streamers in flight.
    #[must_use]
    pub fn stats(&self) -> PopulationStats {
        query::population_stats(&self.world)
    }

    /// Captures the streamers currently known to the world.
    #[must_use]
    pub fn streamers(&self) -> StreamerView {
        query::streamer_view(&self.world)
    }

    /// Statistics history recorded after each spread pass.
    #[must_use]
    pub fn census(&self) -> &Census {
        &self.census
    }

    /// Drains the cells that changed since the previous call.
    #[must_use]
    pub fn take_dirty_cells(&mut self) -> Vec<CellIndex> {
        self.census.take_dirty_cells()
    }

    /// Provides read-only access to the underlying world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Configuration the simulation runs with.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        query::config(&self.world)
    }

    fn execute(&mut self, command: Command) -> Result<Vec<Event>, SimulationError> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events)?;

        let mut log = Vec::new();
        while !events.is_empty() {
            let commands = self.dispatch(&events);
            log.append(&mut events);

            for command in commands {
                if let Err(error) = world::apply(&mut self.world, command, &mut events) {
                    warn!("system command rejected: {error}");
                }
            }
        }
        Ok(log)
    }

    fn dispatch(&mut self, events: &[Event]) -> Vec<Command> {
        let mut commands = Vec::new();
        let world = &self.world;

        self.census.handle(events);
        self.seeding.handle(
            events,
            |lattice| query::healthy_population_centers(world, lattice),
            &mut commands,
        );
        self.scheduling.handle(
            events,
            SchedulingView {
                population: query::population_view(world),
                active_streamers: query::active_streamer_count(world),
                fallback_centers: query::population_centers(world),
            },
            |lattice| query::healthy_population_centers(world, lattice),
            &mut commands,
        );
        commands
    }
}
