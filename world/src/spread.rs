//! Periodic infection spread and plague mortality.

use std::collections::BTreeSet;

use outbreak_core::{CellCoord, CellIndex, PlagueTuning};

use crate::grid::Grid;

/// Outcome of a single spread pass.
#[derive(Debug, Default)]
pub(crate) struct PassOutcome {
    /// Infected population that died of the plague.
    pub(crate) killed: f64,
    /// Cells whose population changed during the pass.
    pub(crate) changed: BTreeSet<CellIndex>,
}

/// Runs one spread pass over the grid in place.
///
/// Every cell starts the pass unmarked. Cells are visited in row-major order;
/// an infected cell that was not itself infected earlier in this pass exposes
/// each neighbor that still has healthy population. Updates are visible to
/// cells visited later, so a cell infected during the pass is marked and does
/// not spread further until the next pass. Mortality then applies to every
/// infected cell.
pub(crate) fn run_pass(grid: &mut Grid, plague: &PlagueTuning) -> PassOutcome {
    let mut outcome = PassOutcome::default();
    let columns = grid.columns();

    for cell in grid.cells_mut() {
        cell.reset_just_infected();
    }

    for slot in 0..grid.len() {
        let Some(source) = grid.cells().get(slot).copied() else {
            continue;
        };
        if !source.is_infected() || source.just_infected() {
            continue;
        }

        let slot = slot as u32;
        let coord = CellCoord::new(slot % columns, slot / columns);
        let mass = source.infected_alive() + source.infected_dead();

        for neighbor in grid.neighbors(coord) {
            let Ok(cell) = grid.cell_mut(neighbor) else {
                continue;
            };
            if !cell.can_infect() {
                continue;
            }
            let _ = cell.expose(mass, plague.infect_constant);
            let _ = outcome.changed.insert(neighbor);
        }
    }

    for (slot, cell) in grid.cells_mut().iter_mut().enumerate() {
        let killed = cell.apply_mortality(
            plague.kill_rate,
            plague.kill_constant,
            plague.corpse_compartment,
        );
        if killed > 0.0 {
            outcome.killed += killed;
            let _ = outcome.changed.insert(CellIndex::new(slot as u32));
        }
    }

    outcome
}
