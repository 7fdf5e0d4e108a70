#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic seeding system that places the first infections of a fresh world.

use log::info;
use outbreak_core::{CellIndex, Command, Event, Lattice, SeedingTuning, SimulationConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the seeding system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
    infections: u32,
    amount: f64,
    lattice: Lattice,
}

impl Config {
    /// Creates a new configuration from explicit parameters.
    #[must_use]
    pub const fn new(rng_seed: u64, infections: u32, amount: f64, lattice: Lattice) -> Self {
        Self {
            rng_seed,
            infections,
            amount,
            lattice,
        }
    }

    /// Derives the configuration from the simulation settings.
    #[must_use]
    pub fn from_simulation(config: &SimulationConfig) -> Self {
        let SeedingTuning {
            initial_infections,
            initial_amount,
            lattice,
        } = config.seeding;
        Self::new(config.seed, initial_infections, initial_amount, lattice)
    }
}

/// Pure system that infects randomly chosen population centers after initialization.
#[derive(Debug)]
pub struct Seeding {
    config: Config,
    rng: ChaCha8Rng,
}

impl Seeding {
    /// Creates a new seeding system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes world events and emits infection commands for a freshly seeded world.
    ///
    /// `find_centers` is invoked once per [`Event::WorldInitialized`] with the
    /// seeding lattice and must return the healthy population centers of the
    /// current grid. Centers are drawn uniformly with replacement.
    pub fn handle<F>(&mut self, events: &[Event], mut find_centers: F, out: &mut Vec<Command>)
    where
        F: FnMut(Lattice) -> Vec<CellIndex>,
    {
        for event in events {
            if !matches!(event, Event::WorldInitialized { .. }) {
                continue;
            }

            let centers = find_centers(self.config.lattice);
            if centers.is_empty() {
                info!("no healthy population centers found, outbreak not seeded");
                continue;
            }

            for _ in 0..self.config.infections {
                let cell = centers[self.rng.gen_range(0..centers.len())];
                out.push(Command::InfectCell {
                    cell,
                    amount: self.config.amount,
                });
            }
            info!(
                "seeded {} infections across {} candidate centers",
                self.config.infections,
                centers.len()
            );
        }
    }
}
