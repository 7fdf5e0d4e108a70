//! Per-cell population record and the local mutators that keep it bounded.

use serde::{Deserialize, Serialize};

use crate::LethalArea;

/// Compartment that receives population killed by the plague itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorpseCompartment {
    /// Plague victims stay contagious as infected corpses.
    #[default]
    InfectedDead,
    /// Plague victims are filed alongside every other death.
    HealthyDead,
}

/// Population removed from a cell by a lethal area effect.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Casualties {
    /// Infected population killed.
    pub infected: f64,
    /// Healthy population killed.
    pub healthy: f64,
}

impl Casualties {
    /// Combined casualties across both compartments.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.infected + self.healthy
    }
}

/// Population held by a single grid cell.
///
/// Counts are continuous. All mutators bound their transfers by what is
/// available and, when population grows, by the capacity supplied by the
/// caller, so every compartment stays non-negative and the total never exceeds
/// capacity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cell {
    healthy_alive: f64,
    infected_alive: f64,
    healthy_dead: f64,
    infected_dead: f64,
    just_infected: bool,
}

impl Cell {
    /// Creates an uninhabited cell.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            healthy_alive: 0.0,
            infected_alive: 0.0,
            healthy_dead: 0.0,
            infected_dead: 0.0,
            just_infected: false,
        }
    }

    /// Healthy, living population.
    #[must_use]
    pub const fn healthy_alive(&self) -> f64 {
        self.healthy_alive
    }

    /// Infected, living population.
    #[must_use]
    pub const fn infected_alive(&self) -> f64 {
        self.infected_alive
    }

    /// Dead population that is not contagious.
    #[must_use]
    pub const fn healthy_dead(&self) -> f64 {
        self.healthy_dead
    }

    /// Contagious corpses.
    #[must_use]
    pub const fn infected_dead(&self) -> f64 {
        self.infected_dead
    }

    /// Whether the cell received its first infection during the current spread pass.
    #[must_use]
    pub const fn just_infected(&self) -> bool {
        self.just_infected
    }

    /// Sum of all four compartments.
    #[must_use]
    pub fn total_population(&self) -> f64 {
        self.healthy_alive + self.infected_alive + self.healthy_dead + self.infected_dead
    }

    /// Fraction of `capacity` currently occupied.
    #[must_use]
    pub fn density(&self, capacity: f64) -> f64 {
        if capacity <= 0.0 {
            return 0.0;
        }
        self.total_population() / capacity
    }

    /// Reports whether any healthy population is left to infect.
    #[must_use]
    pub fn can_infect(&self) -> bool {
        self.healthy_alive > 0.0
    }

    /// Reports whether the cell holds living infected population.
    #[must_use]
    pub fn is_infected(&self) -> bool {
        self.infected_alive > 0.0
    }

    /// Adds healthy population, clamping the addition to the room left under `capacity`.
    ///
    /// Returns the amount actually added.
    pub fn add_healthy(&mut self, amount: f64, capacity: f64) -> f64 {
        let added = self.fit(amount, capacity);
        self.healthy_alive += added;
        added
    }

    /// Adds infected population that arrived from elsewhere and flags the cell.
    ///
    /// Non-positive amounts leave the cell untouched. Returns the amount actually added.
    pub fn add_infected(&mut self, amount: f64, capacity: f64) -> f64 {
        if !(amount > 0.0) {
            return 0.0;
        }
        let added = self.fit(amount, capacity);
        self.infected_alive += added;
        self.just_infected = true;
        added
    }

    /// Adds non-contagious dead population, clamped to the room left under `capacity`.
    pub fn add_dead(&mut self, amount: f64, capacity: f64) -> f64 {
        let added = self.fit(amount, capacity);
        self.healthy_dead += added;
        added
    }

    /// Moves up to `amount` healthy population into the infected compartment.
    ///
    /// A cell without healthy population is left untouched. Returns the amount moved.
    pub fn infect(&mut self, amount: f64) -> f64 {
        if !self.can_infect() {
            return 0.0;
        }
        let moved = clamp_request(amount, self.healthy_alive);
        self.healthy_alive -= moved;
        self.infected_alive += moved;
        if moved > 0.0 {
            self.just_infected = true;
        }
        moved
    }

    /// Exposes the healthy population to a neighboring source of infection.
    ///
    /// `source_mass` is the neighbor's living plus dead infected population. The
    /// cell is flagged as freshly infected only when it held no infected
    /// population of either kind before the transfer. Returns the amount infected.
    pub fn expose(&mut self, source_mass: f64, infect_constant: f64) -> f64 {
        self.just_infected = self.infected_alive == 0.0 && self.infected_dead == 0.0;
        let pressure = source_mass * self.healthy_alive * infect_constant;
        let amount = clamp_request(pressure, self.healthy_alive);
        self.healthy_alive -= amount;
        self.infected_alive += amount;
        amount
    }

    /// Kills part of the infected population and files the dead under `compartment`.
    ///
    /// Returns the amount killed so callers can flag the cell for observers.
    pub fn apply_mortality(
        &mut self,
        kill_rate: f64,
        kill_constant: f64,
        compartment: CorpseCompartment,
    ) -> f64 {
        if !self.is_infected() {
            return 0.0;
        }
        let killed = clamp_request(
            kill_constant + kill_rate * self.infected_alive,
            self.infected_alive,
        );
        self.infected_alive -= killed;
        match compartment {
            CorpseCompartment::InfectedDead => self.infected_dead += killed,
            CorpseCompartment::HealthyDead => self.healthy_dead += killed,
        }
        killed
    }

    /// Applies a lethal strike, moving victims of both kinds into the healthy dead.
    pub fn strike(&mut self, area: &LethalArea) -> Casualties {
        let infected = clamp_request(
            self.infected_alive * area.infected_kill_rate + area.infected_kill_constant,
            self.infected_alive,
        );
        self.infected_alive -= infected;
        self.healthy_dead += infected;

        let healthy = clamp_request(
            self.healthy_alive * area.healthy_kill_rate + area.healthy_kill_constant,
            self.healthy_alive,
        );
        self.healthy_alive -= healthy;
        self.healthy_dead += healthy;

        Casualties { infected, healthy }
    }

    /// Returns part of the living infected population to health.
    pub fn cure(&mut self, rate: f64, constant: f64) -> f64 {
        let cured = clamp_request(self.infected_alive * rate + constant, self.infected_alive);
        self.infected_alive -= cured;
        self.healthy_alive += cured;
        cured
    }

    /// Removes up to `amount` healthy population, returning what was removed.
    pub fn withdraw_healthy(&mut self, amount: f64) -> f64 {
        let taken = clamp_request(amount, self.healthy_alive);
        self.healthy_alive -= taken;
        taken
    }

    /// Removes up to `amount` infected population, returning what was removed.
    pub fn withdraw_infected(&mut self, amount: f64) -> f64 {
        let taken = clamp_request(amount, self.infected_alive);
        self.infected_alive -= taken;
        taken
    }

    /// Clears the per-pass infection marker.
    pub fn reset_just_infected(&mut self) {
        self.just_infected = false;
    }

    fn fit(&self, amount: f64, capacity: f64) -> f64 {
        let room = (capacity - self.total_population()).max(0.0);
        clamp_request(amount, room)
    }
}

/// Bounds a requested transfer to `[0, available]`, treating NaN as nothing.
fn clamp_request(requested: f64, available: f64) -> f64 {
    if !(requested > 0.0) || !(available > 0.0) {
        return 0.0;
    }
    requested.min(available)
}
