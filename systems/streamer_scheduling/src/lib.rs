#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Probabilistic streamer scheduling driven by spread passes.
//!
//! After every spread pass the system scans the grid for heavily infected
//! cells and, subject to a global cooldown, a random draw and a cap on
//! concurrently active streamers, asks the world to launch a streamer from
//! such a cell toward a healthy population center.

use std::time::Duration;

use log::{debug, trace};
use outbreak_core::{CellIndex, Command, Event, Lattice, PopulationView, SimulationConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the scheduling system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Seed of the random gates.
    pub rng_seed: u64,
    /// Time that must elapse after a spawn before the next one.
    pub min_respawn: Duration,
    /// Share of a cell's population that must be living infected for it to emit a streamer.
    pub infected_fraction: f64,
    /// Probability that an eligible cell emits a streamer during a pass.
    pub schedule_probability: f64,
    /// Upper bound on streamers that have not been removed.
    pub max_concurrent: usize,
    /// Largest packet a streamer carries.
    pub max_people: f64,
    /// Lattice searched for destinations.
    pub destination_lattice: Lattice,
}

impl Config {
    /// Derives the configuration from the simulation settings.
    ///
    /// The random stream is offset from the global seed so scheduling and
    /// seeding draw independent sequences.
    #[must_use]
    pub fn from_simulation(config: &SimulationConfig) -> Self {
        let tuning = &config.streamers;
        Self {
            rng_seed: config.seed.wrapping_add(1),
            min_respawn: Duration::try_from_secs_f32(tuning.min_respawn_secs.max(0.0))
                .unwrap_or(Duration::MAX),
            infected_fraction: tuning.infected_fraction,
            schedule_probability: tuning.schedule_probability,
            max_concurrent: tuning.max_concurrent,
            max_people: tuning.max_people,
            destination_lattice: tuning.destination_lattice,
        }
    }
}

/// Read-only inputs the scheduler needs from the world.
#[derive(Clone, Copy, Debug)]
pub struct SchedulingView<'a> {
    /// Cells after the latest spread pass.
    pub population: PopulationView<'a>,
    /// Streamers currently counted against the concurrency cap.
    pub active_streamers: usize,
    /// Static centers used when no healthy center is left.
    pub fallback_centers: &'a [CellIndex],
}

/// Pure system that decides when and where streamers are launched.
#[derive(Debug)]
pub struct StreamerScheduling {
    config: Config,
    rng: ChaCha8Rng,
    since_last_spawn: Duration,
}

impl StreamerScheduling {
    /// Creates a new scheduling system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            since_last_spawn: Duration::ZERO,
        }
    }

    /// Time accumulated since the last scheduled spawn.
    #[must_use]
    pub fn since_last_spawn(&self) -> Duration {
        self.since_last_spawn
    }

    /// Consumes world events and emits spawn commands after each spread pass.
    ///
    /// `find_centers` is called at most once per pass, lazily, when a cell has
    /// passed every gate and needs a destination.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        view: SchedulingView<'_>,
        mut find_centers: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(Lattice) -> Vec<CellIndex>,
    {
        let mut active = view.active_streamers;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    self.since_last_spawn = self.since_last_spawn.saturating_add(*dt);
                }
                Event::WorldInitialized { .. } => {
                    self.since_last_spawn = Duration::ZERO;
                }
                Event::SpreadPassCompleted { .. } => {
                    if let Some(command) = self.scan(view, active, &mut find_centers) {
                        active += 1;
                        out.push(command);
                    }
                }
                _ => {}
            }
        }
    }

    fn scan<F>(
        &mut self,
        view: SchedulingView<'_>,
        active: usize,
        find_centers: &mut F,
    ) -> Option<Command>
    where
        F: FnMut(Lattice) -> Vec<CellIndex>,
    {
        let mut centers: Option<Vec<CellIndex>> = None;

        for (index, cell) in view.population.iter() {
            let total = cell.total_population();
            let eligible = self.since_last_spawn > self.config.min_respawn
                && cell.infected_alive() > self.config.infected_fraction * total
                && self.rng.gen::<f64>() < self.config.schedule_probability
                && active < self.config.max_concurrent;
            if !eligible {
                continue;
            }

            let lattice = self.config.destination_lattice;
            let candidates = centers.get_or_insert_with(|| find_centers(lattice));
            let pool: &[CellIndex] = if candidates.is_empty() {
                view.fallback_centers
            } else {
                candidates.as_slice()
            };
            if pool.is_empty() {
                trace!("cell {} eligible but no destination exists", index.get());
                continue;
            }

            let destination = pool[self.rng.gen_range(0..pool.len())];
            let (Some(source), Some(destination)) = (
                view.population.coord_of(index),
                view.population.coord_of(destination),
            ) else {
                continue;
            };

            let healthy_share = if total > 0.0 {
                cell.healthy_alive() / total
            } else {
                0.0
            };
            let (healthy, infected) = if self.rng.gen::<f64>() < healthy_share {
                (cell.healthy_alive().min(self.config.max_people), 0.0)
            } else {
                (0.0, cell.infected_alive().min(self.config.max_people))
            };

            self.since_last_spawn = Duration::ZERO;
            debug!(
                "scheduling streamer ({}, {}) -> ({}, {})",
                source.column(),
                source.row(),
                destination.column(),
                destination.row()
            );
            return Some(Command::SpawnStreamer {
                source,
                destination,
                healthy,
                infected,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outbreak_core::{Cell, CellCoord, PopulationStats};

    fn always() -> Config {
        Config {
            rng_seed: 3,
            min_respawn: Duration::from_millis(500),
            infected_fraction: 0.3,
            schedule_probability: 1.0,
            max_concurrent: 25,
            max_people: 1_000.0,
            destination_lattice: Lattice::new(2, 2),
        }
    }

    fn pass() -> Event {
        Event::SpreadPassCompleted {
            pass: 1,
            census: PopulationStats::default(),
            killed: 0.0,
        }
    }

    fn advanced(millis: u64) -> Event {
        Event::TimeAdvanced {
            dt: Duration::from_millis(millis),
        }
    }

    fn grid() -> Vec<Cell> {
        let mut cells = vec![Cell::new(); 4];
        let _ = cells[0].add_healthy(2_000.0, 10_000.0);
        let _ = cells[0].infect(2_000.0);
        let _ = cells[3].add_healthy(500.0, 10_000.0);
        cells
    }

    fn view(cells: &[Cell], active: usize) -> SchedulingView<'_> {
        SchedulingView {
            population: PopulationView::new(cells, 2, 2),
            active_streamers: active,
            fallback_centers: &[],
        }
    }

    #[test]
    fn spawns_infected_packet_toward_center() {
        let cells = grid();
        let mut scheduling = StreamerScheduling::new(always());
        let mut out = Vec::new();

        scheduling.handle(
            &[advanced(600), pass()],
            view(&cells, 0),
            |_| vec![CellIndex::new(3)],
            &mut out,
        );

        assert_eq!(
            out,
            vec![Command::SpawnStreamer {
                source: CellCoord::new(0, 0),
                destination: CellCoord::new(1, 1),
                healthy: 0.0,
                infected: 1_000.0,
            }]
        );
        assert_eq!(scheduling.since_last_spawn(), Duration::ZERO);
    }

    #[test]
    fn cooldown_blocks_early_spawns() {
        let cells = grid();
        let mut scheduling = StreamerScheduling::new(always());
        let mut out = Vec::new();

        scheduling.handle(
            &[advanced(500), pass()],
            view(&cells, 0),
            |_| vec![CellIndex::new(3)],
            &mut out,
        );

        assert!(out.is_empty());
        assert_eq!(scheduling.since_last_spawn(), Duration::from_millis(500));
    }

    #[test]
    fn concurrency_cap_blocks_spawns() {
        let cells = grid();
        let mut scheduling = StreamerScheduling::new(always());
        let mut out = Vec::new();

        scheduling.handle(
            &[advanced(600), pass()],
            view(&cells, 25),
            |_| vec![CellIndex::new(3)],
            &mut out,
        );

        assert!(out.is_empty());
    }

    #[test]
    fn falls_back_to_static_centers() {
        let cells = grid();
        let fallback = [CellIndex::new(2)];
        let mut scheduling = StreamerScheduling::new(always());
        let mut out = Vec::new();

        scheduling.handle(
            &[advanced(600), pass()],
            SchedulingView {
                fallback_centers: &fallback,
                ..view(&cells, 0)
            },
            |_| Vec::new(),
            &mut out,
        );

        assert!(matches!(
            out.as_slice(),
            [Command::SpawnStreamer { destination, .. }] if *destination == CellCoord::new(0, 1)
        ));
    }

    #[test]
    fn no_destination_means_no_spawn() {
        let cells = grid();
        let mut scheduling = StreamerScheduling::new(always());
        let mut out = Vec::new();

        scheduling.handle(
            &[advanced(600), pass()],
            view(&cells, 0),
            |_| Vec::new(),
            &mut out,
        );

        assert!(out.is_empty());
        assert_eq!(scheduling.since_last_spawn(), Duration::from_millis(600));
    }

    #[test]
    fn oversized_respawn_time_saturates() {
        let mut simulation = SimulationConfig::default();
        simulation.streamers.min_respawn_secs = 1e30;
        let config = Config::from_simulation(&simulation);
        assert_eq!(config.min_respawn, Duration::MAX);
    }

    #[test]
    fn zero_probability_never_spawns() {
        let cells = grid();
        let mut scheduling = StreamerScheduling::new(Config {
            schedule_probability: 0.0,
            ..always()
        });
        let mut out = Vec::new();

        for _ in 0..50 {
            scheduling.handle(
                &[advanced(600), pass()],
                view(&cells, 0),
                |_| panic!("no destination should be requested"),
                &mut out,
            );
        }

        assert!(out.is_empty());
    }
}
