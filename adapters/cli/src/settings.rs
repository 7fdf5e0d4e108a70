//! TOML settings file layered under the command-line flags.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use outbreak_core::SimulationConfig;
use serde::Deserialize;

/// Contents of a settings file. Every table and key is optional.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct Settings {
    /// Parameters of the run itself.
    pub(crate) run: RunSettings,
    /// Tuning handed to the simulation.
    pub(crate) simulation: SimulationConfig,
}

/// Grid size and pacing of a headless run.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct RunSettings {
    /// Grid columns.
    pub(crate) width: u32,
    /// Grid rows.
    pub(crate) height: u32,
    /// Number of host ticks to run.
    pub(crate) ticks: u64,
    /// Simulated duration of a single tick, in milliseconds.
    pub(crate) frame_ms: u64,
    /// Print a report every this many spread passes.
    pub(crate) report_every: u64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            width: 320,
            height: 200,
            ticks: 2_000,
            frame_ms: 16,
            report_every: 50,
        }
    }
}

impl Settings {
    /// Reads and parses the settings file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid settings file {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        settings
            .simulation
            .validate()
            .context("simulation tuning rejected")?;
        Ok(settings)
    }
}
