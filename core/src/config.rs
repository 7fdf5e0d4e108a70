//! Static tuning surface handed to the simulation at construction.
//!
//! Every group deserializes with defaults so a TOML file only needs to name
//! the knobs it overrides. Defaults reproduce the reference game's balance.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Barrier, ConfigError, CorpseCompartment, CureArea, LethalArea, WeaponKind};

const DEFAULT_SEED: u64 = 0x5eed_0f91_a60e;

/// Largest number of statistics samples the census may retain.
pub const MAX_HISTORY_LEN: usize = 1 << 20;

/// Complete configuration of a simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for every random draw made by the pure systems.
    pub seed: u64,
    /// Cell capacity and world seeding from noise.
    pub population: PopulationTuning,
    /// Infection spread and mortality.
    pub plague: PlagueTuning,
    /// Long-range transport agents.
    pub streamers: StreamerTuning,
    /// Placement of the initial infections.
    pub seeding: SeedingTuning,
    /// Parameters of every weapon the host may fire.
    pub weapons: WeaponTuning,
    /// Statistics retained for the HUD.
    pub census: CensusTuning,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            population: PopulationTuning::default(),
            plague: PlagueTuning::default(),
            streamers: StreamerTuning::default(),
            seeding: SeedingTuning::default(),
            weapons: WeaponTuning::default(),
            census: CensusTuning::default(),
        }
    }
}

impl SimulationConfig {
    /// Checks every knob for values the simulation cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let population = &self.population;
        positive("population.max_cell_population", population.max_cell_population)?;
        non_negative("population.seed_population", population.seed_population)?;
        if !(population.seed_threshold < 1.0) {
            return Err(ConfigError::SeedThresholdTooHigh {
                value: population.seed_threshold,
            });
        }
        if !(population.center_threshold >= population.seed_threshold) {
            return Err(ConfigError::ThresholdOrder {
                seed: population.seed_threshold,
                center: population.center_threshold,
            });
        }

        let plague = &self.plague;
        non_negative("plague.infect_constant", plague.infect_constant)?;
        non_negative("plague.kill_rate", plague.kill_rate)?;
        non_negative("plague.kill_constant", plague.kill_constant)?;
        if plague.step_threshold == 0 {
            return Err(ConfigError::Zero {
                field: "plague.step_threshold",
            });
        }

        let streamers = &self.streamers;
        positive("streamers.speed", f64::from(streamers.speed))?;
        positive(
            "streamers.arrive_threshold",
            f64::from(streamers.arrive_threshold),
        )?;
        non_negative("streamers.max_people", streamers.max_people)?;
        non_negative(
            "streamers.min_respawn_secs",
            f64::from(streamers.min_respawn_secs),
        )?;
        if Duration::try_from_secs_f32(streamers.min_respawn_secs).is_err() {
            return Err(ConfigError::NotADuration {
                field: "streamers.min_respawn_secs",
                value: f64::from(streamers.min_respawn_secs),
            });
        }
        unit_interval(
            "streamers.schedule_probability",
            streamers.schedule_probability,
        )?;
        unit_interval("streamers.infected_fraction", streamers.infected_fraction)?;
        lattice("streamers.destination_lattice", streamers.destination_lattice)?;

        non_negative("seeding.initial_amount", self.seeding.initial_amount)?;
        lattice("seeding.lattice", self.seeding.lattice)?;

        let weapons = &self.weapons;
        lethal("weapons.gun", &weapons.gun)?;
        lethal("weapons.bomb", &weapons.bomb)?;
        lethal("weapons.disinfectant", &weapons.disinfectant)?;
        non_negative("weapons.cure_bomb.rate", weapons.cure_bomb.rate)?;
        non_negative("weapons.cure_bomb.constant", weapons.cure_bomb.constant)?;

        if self.census.history_len == 0 {
            return Err(ConfigError::Zero {
                field: "census.history_len",
            });
        }
        if self.census.history_len > MAX_HISTORY_LEN {
            return Err(ConfigError::TooLarge {
                field: "census.history_len",
                value: self.census.history_len,
                max: MAX_HISTORY_LEN,
            });
        }

        Ok(())
    }
}

/// Cell capacity and the mapping from noise to initial population.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationTuning {
    /// Upper bound on the total population of a single cell.
    pub max_cell_population: f64,
    /// Noise value above which a cell is inhabited.
    pub seed_threshold: f64,
    /// Noise value above which a cell is recorded as a static population center.
    pub center_threshold: f64,
    /// Population of a cell whose noise sample reaches the maximum.
    pub seed_population: f64,
}

impl Default for PopulationTuning {
    fn default() -> Self {
        Self {
            max_cell_population: 10_000.0,
            seed_threshold: 0.70,
            center_threshold: 0.80,
            seed_population: 10_000.0,
        }
    }
}

/// Spread and mortality constants applied by each pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlagueTuning {
    /// Scales infection pressure between neighboring cells.
    pub infect_constant: f64,
    /// Fraction of the infected population dying per pass.
    pub kill_rate: f64,
    /// Flat number of infected dying per pass.
    pub kill_constant: f64,
    /// Compartment receiving plague victims.
    pub corpse_compartment: CorpseCompartment,
    /// Host ticks between two spread passes.
    pub step_threshold: u32,
}

impl Default for PlagueTuning {
    fn default() -> Self {
        Self {
            infect_constant: 0.000_004,
            kill_rate: 0.0025,
            kill_constant: 0.005,
            corpse_compartment: CorpseCompartment::InfectedDead,
            step_threshold: 10,
        }
    }
}

/// Coarse lattice used to partition the grid when searching population centers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lattice {
    /// Number of sub-regions along the horizontal axis.
    pub columns: u32,
    /// Number of sub-regions along the vertical axis.
    pub rows: u32,
}

impl Lattice {
    /// Creates a lattice with the provided number of sub-regions per axis.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }
}

/// Movement, capacity and scheduling of streamers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamerTuning {
    /// Travel speed in cells per second.
    pub speed: f32,
    /// Distance to the destination below which a streamer has arrived.
    pub arrive_threshold: f32,
    /// Largest population packet a single streamer carries.
    pub max_people: f64,
    /// Minimum simulated time between two spawns, in seconds.
    pub min_respawn_secs: f32,
    /// Probability that an eligible cell launches a streamer during a pass.
    pub schedule_probability: f64,
    /// Upper bound on streamers that have not been removed.
    pub max_concurrent: usize,
    /// Infected share of a cell's population required before it may launch a streamer.
    pub infected_fraction: f64,
    /// Lattice searched for live destinations.
    pub destination_lattice: Lattice,
    /// Keep arrived or destroyed streamers until the host releases them.
    pub hold_for_cue: bool,
}

impl Default for StreamerTuning {
    fn default() -> Self {
        Self {
            speed: 24.0,
            arrive_threshold: 1.0,
            max_people: 1_000.0,
            min_respawn_secs: 0.5,
            schedule_probability: 0.000_25,
            max_concurrent: 25,
            infected_fraction: 0.3,
            destination_lattice: Lattice::new(50, 50),
            hold_for_cue: false,
        }
    }
}

/// Placement of the infections present when the world starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedingTuning {
    /// Number of population centers infected at start.
    pub initial_infections: u32,
    /// Healthy population turned infected at each chosen center.
    pub initial_amount: f64,
    /// Lattice searched for candidate centers.
    pub lattice: Lattice,
}

impl Default for SeedingTuning {
    fn default() -> Self {
        Self {
            initial_infections: 4,
            initial_amount: 1.0,
            lattice: Lattice::new(10, 10),
        }
    }
}

/// Parameters of every weapon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTuning {
    /// Precise strike.
    pub gun: LethalArea,
    /// Wide blast.
    pub bomb: LethalArea,
    /// Streamer barrier.
    pub wall: Barrier,
    /// Spray aimed at the infected.
    pub disinfectant: LethalArea,
    /// Area cure.
    pub cure_bomb: CureArea,
    /// Radius of the population paint brush.
    pub paint_radius: u32,
}

impl WeaponTuning {
    /// Gun configured with these parameters.
    #[must_use]
    pub const fn gun(&self) -> WeaponKind {
        WeaponKind::Gun(self.gun)
    }

    /// Bomb configured with these parameters.
    #[must_use]
    pub const fn bomb(&self) -> WeaponKind {
        WeaponKind::Bomb(self.bomb)
    }

    /// Wall configured with these parameters.
    #[must_use]
    pub const fn wall(&self) -> WeaponKind {
        WeaponKind::Wall(self.wall)
    }

    /// Disinfectant configured with these parameters.
    #[must_use]
    pub const fn disinfectant(&self) -> WeaponKind {
        WeaponKind::Disinfectant(self.disinfectant)
    }

    /// Cure bomb configured with these parameters.
    #[must_use]
    pub const fn cure_bomb(&self) -> WeaponKind {
        WeaponKind::CureBomb(self.cure_bomb)
    }
}

impl Default for WeaponTuning {
    fn default() -> Self {
        Self {
            gun: LethalArea {
                radius: 6,
                infected_kill_rate: 0.20,
                infected_kill_constant: 20.0,
                healthy_kill_rate: 0.04,
                healthy_kill_constant: 4.0,
            },
            bomb: LethalArea {
                radius: 30,
                infected_kill_rate: 0.90,
                infected_kill_constant: 50.0,
                healthy_kill_rate: 0.90,
                healthy_kill_constant: 50.0,
            },
            wall: Barrier { radius: 4 },
            disinfectant: LethalArea {
                radius: 30,
                infected_kill_rate: 0.50,
                infected_kill_constant: 10.0,
                healthy_kill_rate: 0.0,
                healthy_kill_constant: 0.0,
            },
            cure_bomb: CureArea {
                radius: 30,
                rate: 0.5,
                constant: 10.0,
            },
            paint_radius: 8,
        }
    }
}

/// Statistics retained for presentation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CensusTuning {
    /// Number of per-pass statistics snapshots kept in memory.
    pub history_len: usize,
}

impl Default for CensusTuning {
    fn default() -> Self {
        Self { history_len: 256 }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn unit_interval(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutsideUnitInterval { field, value })
    }
}

fn lattice(field: &'static str, lattice: Lattice) -> Result<(), ConfigError> {
    if lattice.columns == 0 || lattice.rows == 0 {
        Err(ConfigError::Zero { field })
    } else {
        Ok(())
    }
}

fn lethal(field: &'static str, area: &LethalArea) -> Result<(), ConfigError> {
    non_negative(field, area.infected_kill_rate)?;
    non_negative(field, area.infected_kill_constant)?;
    non_negative(field, area.healthy_kill_rate)?;
    non_negative(field, area.healthy_kill_constant)
}
