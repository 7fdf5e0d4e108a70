#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the Outbreak simulation.

mod centers;
mod effects;
mod grid;
mod spread;
mod streamers;

use std::collections::BTreeSet;

use glam::Vec2;
use log::{debug, info, trace};
use outbreak_core::{
    Barrier, Casualties, Cell, CellCoord, CellIndex, Command, CureArea, Event, LethalArea,
    NoiseField, SimulationConfig, SimulationError, StreamerId, WeaponKind,
};

pub use centers::find_healthy_population_centers;
pub use effects::raster_filled_circle;
pub use grid::{Grid, Neighbors};

use streamers::{coord_to_vec, Cargo, StreamerRoster};

/// Represents the authoritative simulation world.
///
/// The world owns the grid, the streamers in flight and the counters that pace
/// spread passes. It is mutated exclusively through [`apply`].
#[derive(Debug)]
pub struct World {
    config: SimulationConfig,
    grid: Grid,
    population_centers: Vec<CellIndex>,
    streamers: StreamerRoster,
    tick_counter: u32,
    pass_index: u64,
    casualties: f64,
}

impl World {
    /// Creates an empty world governed by the provided configuration.
    ///
    /// The grid stays empty until a [`Command::InitializeFromNoise`] is applied.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self {
            config,
            grid: Grid::default(),
            population_centers: Vec::new(),
            streamers: StreamerRoster::default(),
            tick_counter: 0,
            pass_index: 0,
            casualties: 0.0,
        })
    }

    fn capacity(&self) -> f64 {
        self.config.population.max_cell_population
    }

    fn initialize(&mut self, field: &NoiseField, out_events: &mut Vec<Event>) {
        let population = &self.config.population;
        let (grid, centers) = Grid::initialize_from_noise(
            field,
            population.seed_threshold,
            population.seed_population,
            population.center_threshold,
            population.max_cell_population,
        );
        self.grid = grid;
        self.population_centers = centers;
        self.streamers.clear();
        self.tick_counter = 0;
        self.pass_index = 0;
        self.casualties = 0.0;

        let seeded: f64 = self.grid.cells().iter().map(|cell| cell.total_population()).sum();
        info!(
            "world initialized: {}x{} cells, population {:.0}, {} centers",
            field.width(),
            field.height(),
            seeded,
            self.population_centers.len()
        );
        out_events.push(Event::WorldInitialized {
            width: field.width(),
            height: field.height(),
            population: seeded,
            population_centers: self.population_centers.len(),
        });
    }

    fn tick(&mut self, dt: std::time::Duration, out_events: &mut Vec<Event>) {
        out_events.push(Event::TimeAdvanced { dt });
        let mut changed = BTreeSet::new();

        let tuning = &self.config.streamers;
        let arrivals = self.streamers.advance(
            tuning.speed * dt.as_secs_f32(),
            tuning.arrive_threshold,
            tuning.hold_for_cue,
        );
        for cargo in arrivals {
            self.deliver(cargo, &mut changed, out_events);
        }

        self.tick_counter = self.tick_counter.saturating_add(1);
        let threshold = self.config.plague.step_threshold;
        if self.tick_counter > threshold {
            self.tick_counter -= threshold;
            self.run_spread_pass(&mut changed, out_events);
        }

        let culled = self.streamers.cull();
        if culled > 0 {
            trace!("culled {culled} streamers");
        }
        push_changed(changed, out_events);
    }

    fn run_spread_pass(&mut self, changed: &mut BTreeSet<CellIndex>, out_events: &mut Vec<Event>) {
        let census = query::population_stats(self);
        let outcome = spread::run_pass(&mut self.grid, &self.config.plague);
        self.pass_index += 1;
        debug!(
            "spread pass {}: {} cells changed, {:.3} killed",
            self.pass_index,
            outcome.changed.len(),
            outcome.killed
        );
        changed.extend(outcome.changed);
        out_events.push(Event::SpreadPassCompleted {
            pass: self.pass_index,
            census,
            killed: outcome.killed,
        });
    }

    fn deliver(
        &mut self,
        cargo: Cargo,
        changed: &mut BTreeSet<CellIndex>,
        out_events: &mut Vec<Event>,
    ) {
        let capacity = self.capacity();
        let Ok(index) = self.grid.index(cargo.destination) else {
            return;
        };
        let Ok(cell) = self.grid.cell_mut(index) else {
            return;
        };
        let seeded_infection = cargo.infected > 0.0 && cell.can_infect();
        let delivered_infected = cell.add_infected(cargo.infected, capacity);
        let delivered_healthy = cell.add_healthy(cargo.healthy, capacity);
        let clamped =
            (cargo.healthy + cargo.infected - delivered_healthy - delivered_infected).max(0.0);
        let _ = changed.insert(index);

        debug!(
            "streamer {} arrived at ({}, {}): {:.1} healthy, {:.1} infected",
            cargo.streamer.get(),
            cargo.destination.column(),
            cargo.destination.row(),
            delivered_healthy,
            delivered_infected
        );
        out_events.push(Event::StreamerArrived {
            streamer: cargo.streamer,
            destination: cargo.destination,
            delivered_healthy,
            delivered_infected,
            clamped,
            seeded_infection,
        });
    }

    fn infect_cell(
        &mut self,
        index: CellIndex,
        amount: f64,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SimulationError> {
        let moved = self.grid.cell_mut(index)?.infect(amount);
        trace!("infected {moved:.3} in cell {}", index.get());
        out_events.push(Event::CellInfected {
            cell: index,
            amount: moved,
        });
        if moved > 0.0 {
            out_events.push(Event::CellsChanged { cells: vec![index] });
        }
        Ok(())
    }

    fn inject(
        &mut self,
        coord: CellCoord,
        amount: f64,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SimulationError> {
        let capacity = self.capacity();
        let index = self.grid.index(coord)?;
        let added = self.grid.cell_mut(index)?.add_healthy(amount, capacity);
        out_events.push(Event::PopulationInjected {
            center: coord,
            cells: 1,
            added,
        });
        if added > 0.0 {
            out_events.push(Event::CellsChanged { cells: vec![index] });
        }
        Ok(())
    }

    fn paint(
        &mut self,
        center: CellCoord,
        radius: u32,
        intensity: f64,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SimulationError> {
        let capacity = self.capacity();
        let mut added = 0.0;
        let mut changed = BTreeSet::new();
        let cells = self.grid.apply_area_effect(center, radius, |index, cell| {
            let amount = cell.add_healthy(intensity, capacity);
            if amount > 0.0 {
                added += amount;
                let _ = changed.insert(index);
            }
        })?;
        out_events.push(Event::PopulationInjected {
            center,
            cells,
            added,
        });
        push_changed(changed, out_events);
        Ok(())
    }

    fn use_weapon(
        &mut self,
        weapon: WeaponKind,
        center: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SimulationError> {
        let _ = self.grid.index(center)?;
        let mut changed = BTreeSet::new();
        let (affected_cells, casualties, streamers_hit) = match weapon {
            WeaponKind::Gun(area) | WeaponKind::Bomb(area) | WeaponKind::Disinfectant(area) => {
                self.strike(&area, center, &mut changed, out_events)?
            }
            WeaponKind::CureBomb(area) => self.cure(&area, center, &mut changed)?,
            WeaponKind::Wall(barrier) => self.halt(&barrier, center, &mut changed, out_events),
        };
        self.casualties += casualties;

        debug!(
            "{} at ({}, {}): {} cells, {:.1} casualties, {} streamers hit",
            weapon.name(),
            center.column(),
            center.row(),
            affected_cells,
            casualties,
            streamers_hit
        );
        push_changed(changed, out_events);
        out_events.push(Event::WeaponUsed {
            weapon,
            center,
            affected_cells,
            casualties,
            streamers_hit,
        });
        Ok(())
    }

    fn strike(
        &mut self,
        area: &LethalArea,
        center: CellCoord,
        changed: &mut BTreeSet<CellIndex>,
        out_events: &mut Vec<Event>,
    ) -> Result<(u32, f64, u32), SimulationError> {
        let mut casualties = Casualties::default();
        let affected = self.grid.apply_area_effect(center, area.radius, |index, cell| {
            let struck = cell.strike(area);
            if struck.total() > 0.0 {
                casualties.infected += struck.infected;
                casualties.healthy += struck.healthy;
                let _ = changed.insert(index);
            }
        })?;

        let hold = self.config.streamers.hold_for_cue;
        let wrecks = self
            .streamers
            .intercept(coord_to_vec(center), area.radius as f32, hold);
        let hit = wrecks.len() as u32;
        let mut killed = casualties.total();
        for cargo in wrecks {
            let passengers = cargo.healthy + cargo.infected;
            let Some((cell, clamped)) =
                self.settle(cargo.position, passengers, changed, Cell::add_dead)
            else {
                continue;
            };
            let died = passengers - clamped;
            killed += died;
            out_events.push(Event::StreamerDestroyed {
                streamer: cargo.streamer,
                cell,
                casualties: died,
                clamped,
            });
        }
        Ok((affected, killed, hit))
    }

    fn cure(
        &mut self,
        area: &CureArea,
        center: CellCoord,
        changed: &mut BTreeSet<CellIndex>,
    ) -> Result<(u32, f64, u32), SimulationError> {
        let affected = self.grid.apply_area_effect(center, area.radius, |index, cell| {
            if cell.cure(area.rate, area.constant) > 0.0 {
                let _ = changed.insert(index);
            }
        })?;
        Ok((affected, 0.0, 0))
    }

    fn halt(
        &mut self,
        barrier: &Barrier,
        center: CellCoord,
        changed: &mut BTreeSet<CellIndex>,
        out_events: &mut Vec<Event>,
    ) -> (u32, f64, u32) {
        let hold = self.config.streamers.hold_for_cue;
        let halted = self
            .streamers
            .intercept(coord_to_vec(center), barrier.radius as f32, hold);
        let hit = halted.len() as u32;
        for cargo in halted {
            let Some((cell, infected_left)) =
                self.settle(cargo.position, cargo.infected, changed, Cell::add_infected)
            else {
                continue;
            };
            let healthy_left = self
                .settle(cargo.position, cargo.healthy, changed, Cell::add_healthy)
                .map_or(cargo.healthy, |(_, left)| left);
            out_events.push(Event::StreamerHalted {
                streamer: cargo.streamer,
                cell,
                clamped: infected_left + healthy_left,
            });
        }
        (0, 0.0, hit)
    }

    /// Lays `amount` into the cell nearest `position`, spilling into its
    /// neighbours once that cell is full.
    ///
    /// Returns the nearest cell and the amount no cell had room for.
    fn settle<F>(
        &mut self,
        position: Vec2,
        amount: f64,
        changed: &mut BTreeSet<CellIndex>,
        mut place: F,
    ) -> Option<(CellCoord, f64)>
    where
        F: FnMut(&mut Cell, f64, f64) -> f64,
    {
        let coord = self.grid.nearest_coord(position.x, position.y)?;
        let index = self.grid.index(coord).ok()?;
        let capacity = self.capacity();
        let mut left = amount;
        for target in std::iter::once(index).chain(self.grid.neighbors(coord)) {
            if !(left > 0.0) {
                break;
            }
            if let Ok(cell) = self.grid.cell_mut(target) {
                let placed = place(cell, left, capacity);
                if placed > 0.0 {
                    left -= placed;
                    let _ = changed.insert(target);
                }
            }
        }
        Some((coord, left.max(0.0)))
    }

    fn spawn_streamer(
        &mut self,
        source: CellCoord,
        destination: CellCoord,
        healthy: f64,
        infected: f64,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SimulationError> {
        let source_index = self.grid.index(source)?;
        let _ = self.grid.index(destination)?;

        let tuning = &self.config.streamers;
        let max_people = tuning.max_people;
        if self.streamers.active_count() >= tuning.max_concurrent {
            debug!("streamer cap of {} reached, spawn ignored", tuning.max_concurrent);
            return Ok(());
        }

        let cell = self.grid.cell_mut(source_index)?;
        let carried_healthy = cell.withdraw_healthy(healthy.min(max_people));
        let carried_infected = cell.withdraw_infected(infected.min(max_people - carried_healthy));
        if carried_healthy + carried_infected <= 0.0 {
            trace!(
                "no population to carry from ({}, {})",
                source.column(),
                source.row()
            );
            return Ok(());
        }

        let streamer = self
            .streamers
            .launch(source, destination, carried_healthy, carried_infected);
        debug!(
            "streamer {} departed ({}, {}) -> ({}, {}) with {:.1} healthy, {:.1} infected",
            streamer.get(),
            source.column(),
            source.row(),
            destination.column(),
            destination.row(),
            carried_healthy,
            carried_infected
        );
        out_events.push(Event::StreamerSpawned {
            streamer,
            source,
            destination,
            healthy: carried_healthy,
            infected: carried_infected,
        });
        out_events.push(Event::CellsChanged {
            cells: vec![source_index],
        });
        Ok(())
    }

    fn release_streamer(
        &mut self,
        streamer: StreamerId,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SimulationError> {
        self.streamers.release(streamer)?;
        out_events.push(Event::StreamerReleased { streamer });
        Ok(())
    }
}

fn push_changed(changed: BTreeSet<CellIndex>, out_events: &mut Vec<Event>) {
    if !changed.is_empty() {
        out_events.push(Event::CellsChanged {
            cells: changed.into_iter().collect(),
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// A rejected command leaves the world untouched and appends no events.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), SimulationError> {
    match command {
        Command::InitializeFromNoise { field } => {
            world.initialize(&field, out_events);
            Ok(())
        }
        Command::Tick { dt } => {
            world.tick(dt, out_events);
            Ok(())
        }
        Command::InfectCell { cell, amount } => world.infect_cell(cell, amount, out_events),
        Command::InjectPopulation { cell, amount } => world.inject(cell, amount, out_events),
        Command::PaintPopulation {
            center,
            radius,
            intensity,
        } => world.paint(center, radius, intensity, out_events),
        Command::UseWeapon { weapon, center } => world.use_weapon(weapon, center, out_events),
        Command::SpawnStreamer {
            source,
            destination,
            healthy,
            infected,
        } => world.spawn_streamer(source, destination, healthy, infected, out_events),
        Command::ReleaseStreamer { streamer } => world.release_streamer(streamer, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use outbreak_core::{
        Cell, CellCoord, CellIndex, Lattice, PopulationStats, PopulationView, SimulationConfig,
        SimulationError, StreamerView,
    };

    use super::{find_healthy_population_centers, Grid, World};

    /// Provides read-only access to the configuration the world runs with.
    #[must_use]
    pub fn config(world: &World) -> &SimulationConfig {
        &world.config
    }

    /// Provides read-only access to the grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Exposes a read-only view of the dense population grid.
    #[must_use]
    pub fn population_view(world: &World) -> PopulationView<'_> {
        world.grid.view()
    }

    /// Borrows the cell at the provided coordinate.
    pub fn cell_at(world: &World, coord: CellCoord) -> Result<&Cell, SimulationError> {
        world.grid.cell_at(coord)
    }

    /// Aggregates population across cells and streamers in flight.
    #[must_use]
    pub fn population_stats(world: &World) -> PopulationStats {
        let mut stats = world
            .grid
            .cells()
            .iter()
            .fold(PopulationStats::default(), |mut stats, cell| {
                stats.cell_healthy += cell.healthy_alive();
                stats.cell_infected += cell.infected_alive();
                stats.cell_healthy_dead += cell.healthy_dead();
                stats.cell_infected_dead += cell.infected_dead();
                stats
            });
        let (healthy, infected) = world.streamers.in_flight();
        stats.in_flight_healthy = healthy;
        stats.in_flight_infected = infected;
        stats.casualties = world.casualties;
        stats
    }

    /// Captures a read-only view of the streamers known to the world.
    #[must_use]
    pub fn streamer_view(world: &World) -> StreamerView {
        StreamerView::from_snapshots(world.streamers.snapshots())
    }

    /// Number of streamers that have not been removed yet.
    #[must_use]
    pub fn active_streamer_count(world: &World) -> usize {
        world.streamers.active_count()
    }

    /// Population centers recorded when the world was seeded.
    #[must_use]
    pub fn population_centers(world: &World) -> &[CellIndex] {
        &world.population_centers
    }

    /// Recomputes the healthy population centers over the provided lattice.
    #[must_use]
    pub fn healthy_population_centers(world: &World, lattice: Lattice) -> Vec<CellIndex> {
        find_healthy_population_centers(world.grid.view(), lattice.columns, lattice.rows)
    }

    /// Population killed by weapons since initialization.
    #[must_use]
    pub fn casualties(world: &World) -> f64 {
        world.casualties
    }

    /// Number of spread passes completed since initialization.
    #[must_use]
    pub fn pass_index(world: &World) -> u64 {
        world.pass_index
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use outbreak_core::StreamerState;

    fn flat_world(columns: u32, rows: u32, config: SimulationConfig) -> World {
        let mut world = World::new(config).expect("valid config");
        let field =
            NoiseField::new(columns, rows, vec![1.0; (columns * rows) as usize]).expect("field");
        let mut events = Vec::new();
        apply(&mut world, Command::InitializeFromNoise { field }, &mut events).expect("init");
        world
    }

    fn cell(world: &World, column: u32, row: u32) -> Cell {
        *query::cell_at(world, CellCoord::new(column, row)).expect("cell")
    }

    #[test]
    fn initialization_reports_seeded_population() {
        let mut config = SimulationConfig::default();
        config.population.seed_population = 100.0;
        let mut world = World::new(config).expect("config");
        let field = NoiseField::new(2, 2, vec![1.0, 1.0, 0.0, 0.0]).expect("field");
        let mut events = Vec::new();

        apply(&mut world, Command::InitializeFromNoise { field }, &mut events).expect("init");

        assert_eq!(
            events,
            vec![Event::WorldInitialized {
                width: 2,
                height: 2,
                population: 200.0,
                population_centers: 2,
            }]
        );
        assert_eq!(
            query::population_centers(&world),
            &[CellIndex::new(0), CellIndex::new(1)]
        );
    }

    #[test]
    fn invalid_config_is_refused() {
        let mut config = SimulationConfig::default();
        config.plague.step_threshold = 0;
        assert!(matches!(
            World::new(config),
            Err(SimulationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn spread_pass_runs_once_counter_exceeds_threshold() {
        let mut config = SimulationConfig::default();
        config.plague.step_threshold = 2;
        let mut world = flat_world(2, 2, config);
        let mut passes = 0;

        for _ in 0..9 {
            let mut events = Vec::new();
            apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_millis(16),
                },
                &mut events,
            )
            .expect("tick");
            assert_eq!(
                events.first(),
                Some(&Event::TimeAdvanced {
                    dt: Duration::from_millis(16)
                })
            );
            passes += events
                .iter()
                .filter(|event| matches!(event, Event::SpreadPassCompleted { .. }))
                .count();
        }

        assert_eq!(passes, 4);
        assert_eq!(query::pass_index(&world), 4);
    }

    #[test]
    fn rejected_command_emits_nothing() {
        let mut world = flat_world(3, 3, SimulationConfig::default());
        let before = query::grid(&world).clone();
        let mut events = Vec::new();

        let result = apply(
            &mut world,
            Command::UseWeapon {
                weapon: SimulationConfig::default().weapons.bomb(),
                center: CellCoord::new(9, 9),
            },
            &mut events,
        );

        assert!(matches!(result, Err(SimulationError::OutOfBounds { .. })));
        assert!(events.is_empty());
        assert_eq!(query::grid(&world), &before);
    }

    #[test]
    fn spawn_caps_cargo_at_packet_size() {
        let mut config = SimulationConfig::default();
        config.streamers.max_people = 300.0;
        let mut world = flat_world(4, 1, config);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SpawnStreamer {
                source: CellCoord::new(0, 0),
                destination: CellCoord::new(3, 0),
                healthy: 5_000.0,
                infected: 5_000.0,
            },
            &mut events,
        )
        .expect("spawn");

        let view = query::streamer_view(&world);
        let streamer = view.iter().next().expect("streamer");
        assert!((streamer.carried_healthy - 300.0).abs() < f64::EPSILON);
        assert_eq!(streamer.carried_infected, 0.0);
        assert!((cell(&world, 0, 0).healthy_alive() - 9_700.0).abs() < 1e-9);
    }

    #[test]
    fn spawn_respects_concurrency_cap() {
        let mut config = SimulationConfig::default();
        config.streamers.max_concurrent = 1;
        let mut world = flat_world(4, 1, config);

        for _ in 0..3 {
            let mut events = Vec::new();
            apply(
                &mut world,
                Command::SpawnStreamer {
                    source: CellCoord::new(0, 0),
                    destination: CellCoord::new(3, 0),
                    healthy: 10.0,
                    infected: 0.0,
                },
                &mut events,
            )
            .expect("spawn");
        }

        assert_eq!(query::active_streamer_count(&world), 1);
    }

    #[test]
    fn wall_unloads_streamers_alive() {
        let mut config = SimulationConfig::default();
        config.population.seed_population = 100.0;
        let mut world = flat_world(20, 1, config);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnStreamer {
                source: CellCoord::new(0, 0),
                destination: CellCoord::new(19, 0),
                healthy: 50.0,
                infected: 0.0,
            },
            &mut events,
        )
        .expect("spawn");
        let total_before = query::population_stats(&world).total();

        events.clear();
        apply(
            &mut world,
            Command::UseWeapon {
                weapon: WeaponKind::Wall(Barrier { radius: 2 }),
                center: CellCoord::new(1, 0),
            },
            &mut events,
        )
        .expect("wall");

        assert!(events
            .iter()
            .any(|event| matches!(event, Event::StreamerHalted { .. })));
        assert!((cell(&world, 0, 0).healthy_alive() - 100.0).abs() < 1e-9);
        assert_eq!(query::active_streamer_count(&world), 0);
        let stats = query::population_stats(&world);
        assert!((stats.total() - total_before).abs() < 1e-9);
        assert_eq!(stats.casualties, 0.0);
    }

    fn full_row_with_streamer() -> World {
        let mut config = SimulationConfig::default();
        config.population.max_cell_population = 1_000.0;
        config.population.seed_population = 1_000.0;
        let mut world = flat_world(20, 1, config);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnStreamer {
                source: CellCoord::new(0, 0),
                destination: CellCoord::new(19, 0),
                healthy: 500.0,
                infected: 0.0,
            },
            &mut events,
        )
        .expect("spawn");
        let _ = world
            .grid
            .cell_at_mut(CellCoord::new(0, 0))
            .expect("source")
            .add_healthy(500.0, 1_000.0);
        world
    }

    fn harmless_gun() -> WeaponKind {
        WeaponKind::Gun(LethalArea {
            radius: 10,
            infected_kill_rate: 0.0,
            infected_kill_constant: 0.0,
            healthy_kill_rate: 0.0,
            healthy_kill_constant: 0.0,
        })
    }

    fn fire(world: &mut World, weapon: WeaponKind) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::UseWeapon {
                weapon,
                center: CellCoord::new(0, 0),
            },
            &mut events,
        )
        .expect("weapon");
        events
    }

    #[test]
    fn wreck_over_full_cells_counts_only_placed_dead() {
        let mut world = full_row_with_streamer();
        let total_before = query::population_stats(&world).total();

        let events = fire(&mut world, harmless_gun());

        assert!(events.contains(&Event::StreamerDestroyed {
            streamer: StreamerId::new(0),
            cell: CellCoord::new(0, 0),
            casualties: 0.0,
            clamped: 500.0,
        }));
        let stats = query::population_stats(&world);
        assert_eq!(stats.casualties, 0.0);
        assert!((stats.total() + 500.0 - total_before).abs() < 1e-9);
    }

    #[test]
    fn wreck_spills_into_neighbours_with_room() {
        let mut world = full_row_with_streamer();
        let _ = world
            .grid
            .cell_at_mut(CellCoord::new(1, 0))
            .expect("neighbour")
            .withdraw_healthy(300.0);
        let total_before = query::population_stats(&world).total();

        let events = fire(&mut world, harmless_gun());

        assert!(events.contains(&Event::StreamerDestroyed {
            streamer: StreamerId::new(0),
            cell: CellCoord::new(0, 0),
            casualties: 300.0,
            clamped: 200.0,
        }));
        assert_eq!(cell(&world, 1, 0).healthy_dead(), 300.0);
        let stats = query::population_stats(&world);
        assert_eq!(stats.casualties, 300.0);
        assert!((stats.total() + 200.0 - total_before).abs() < 1e-9);
    }

    #[test]
    fn halted_streamer_reports_what_did_not_fit() {
        let mut world = full_row_with_streamer();
        let total_before = query::population_stats(&world).total();

        let events = fire(&mut world, WeaponKind::Wall(Barrier { radius: 2 }));

        assert!(events.contains(&Event::StreamerHalted {
            streamer: StreamerId::new(0),
            cell: CellCoord::new(0, 0),
            clamped: 500.0,
        }));
        let stats = query::population_stats(&world);
        assert!((stats.total() + 500.0 - total_before).abs() < 1e-9);
    }

    #[test]
    fn held_cue_keeps_streamer_until_released() {
        let mut config = SimulationConfig::default();
        config.streamers.hold_for_cue = true;
        config.population.seed_population = 100.0;
        let mut world = flat_world(3, 1, config);
        let _ = world
            .grid
            .cell_at_mut(CellCoord::new(0, 0))
            .expect("source")
            .infect(10.0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnStreamer {
                source: CellCoord::new(0, 0),
                destination: CellCoord::new(2, 0),
                healthy: 0.0,
                infected: 10.0,
            },
            &mut events,
        )
        .expect("spawn");

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        )
        .expect("tick");

        let view = query::streamer_view(&world);
        let streamer = view.iter().next().expect("held streamer");
        assert_eq!(streamer.state, StreamerState::Arrived);
        let id = streamer.id;

        events.clear();
        apply(&mut world, Command::ReleaseStreamer { streamer: id }, &mut events)
            .expect("release");
        assert_eq!(events, vec![Event::StreamerReleased { streamer: id }]);

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        )
        .expect("tick");
        assert_eq!(query::active_streamer_count(&world), 0);
        assert!(query::streamer_view(&world).is_empty());

        let again = apply(&mut world, Command::ReleaseStreamer { streamer: id }, &mut events);
        assert_eq!(
            again,
            Err(SimulationError::StreamerNotAwaitingRelease { streamer: id })
        );
    }
}
