//! Area effects the player can unleash on the grid.

use serde::{Deserialize, Serialize};

/// Parameters of an effect that kills population inside a circle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LethalArea {
    /// Radius of the rasterized circle measured in cells.
    pub radius: u32,
    /// Fraction of the infected population killed per affected cell.
    pub infected_kill_rate: f64,
    /// Flat number of infected killed per affected cell.
    pub infected_kill_constant: f64,
    /// Fraction of the healthy population killed per affected cell.
    pub healthy_kill_rate: f64,
    /// Flat number of healthy killed per affected cell.
    pub healthy_kill_constant: f64,
}

/// Parameters of an effect that cures infected population inside a circle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CureArea {
    /// Radius of the rasterized circle measured in cells.
    pub radius: u32,
    /// Fraction of the infected population cured per affected cell.
    pub rate: f64,
    /// Flat number of infected cured per affected cell.
    pub constant: f64,
}

/// Parameters of a barrier that stops streamers in their tracks.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Barrier {
    /// Straight-line distance within which traveling streamers are halted.
    pub radius: u32,
}

/// Weapons available to the host, each carrying only the parameters it needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WeaponKind {
    /// Small, precise lethal strike.
    Gun(LethalArea),
    /// Wide lethal blast.
    Bomb(LethalArea),
    /// Halts traffic and unloads streamers where they stand.
    Wall(Barrier),
    /// Lethal spray that targets the infected.
    Disinfectant(LethalArea),
    /// Returns infected population to health.
    CureBomb(CureArea),
}

impl WeaponKind {
    /// Radius of the area the weapon affects, measured in cells.
    #[must_use]
    pub const fn radius(&self) -> u32 {
        match self {
            Self::Gun(area) | Self::Bomb(area) | Self::Disinfectant(area) => area.radius,
            Self::Wall(barrier) => barrier.radius,
            Self::CureBomb(area) => area.radius,
        }
    }

    /// Short lowercase name used in logs and reports.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Gun(_) => "gun",
            Self::Bomb(_) => "bomb",
            Self::Wall(_) => "wall",
            Self::Disinfectant(_) => "disinfectant",
            Self::CureBomb(_) => "cure_bomb",
        }
    }
}
