//! Coarse-lattice search for healthy population centers.

use outbreak_core::{CellIndex, PopulationView};

/// Finds the most populous infection-free cell in each region of a coarse lattice.
///
/// The grid is partitioned into `columns` by `rows` regions whose bounds are
/// `floor(i * width / columns)`, visited row-major. Within a region the cell
/// with the largest healthy population among cells without living infected is
/// chosen; regions with no such cell contribute nothing. Ties keep the first
/// cell in row-major order.
#[must_use]
pub fn find_healthy_population_centers(
    view: PopulationView<'_>,
    columns: u32,
    rows: u32,
) -> Vec<CellIndex> {
    let (width, height) = view.dimensions();
    if columns == 0 || rows == 0 || view.is_empty() {
        return Vec::new();
    }

    let mut centers = Vec::new();
    for region_row in 0..rows {
        let (top, bottom) = (
            split(height, rows, region_row),
            split(height, rows, region_row + 1),
        );
        for region_column in 0..columns {
            let (left, right) = (
                split(width, columns, region_column),
                split(width, columns, region_column + 1),
            );
            if let Some(best) = best_in_region(view, width, (left, right), (top, bottom)) {
                centers.push(best);
            }
        }
    }
    centers
}

fn best_in_region(
    view: PopulationView<'_>,
    width: u32,
    (left, right): (u32, u32),
    (top, bottom): (u32, u32),
) -> Option<CellIndex> {
    let mut best: Option<(CellIndex, f64)> = None;
    for row in top..bottom {
        for column in left..right {
            let index = CellIndex::new(row * width + column);
            let Some(cell) = view.cell_at(index) else {
                continue;
            };
            if cell.infected_alive() > 0.0 || !(cell.healthy_alive() > 0.0) {
                continue;
            }
            let beats = best.map_or(true, |(_, healthy)| cell.healthy_alive() > healthy);
            if beats {
                best = Some((index, cell.healthy_alive()));
            }
        }
    }
    best.map(|(index, _)| index)
}

fn split(extent: u32, parts: u32, part: u32) -> u32 {
    let bound = u64::from(part) * u64::from(extent) / u64::from(parts);
    bound as u32
}
