//! Rasterized circular area effects.

use outbreak_core::{Cell, CellCoord, CellIndex, SimulationError};

use crate::grid::Grid;

/// Visits every cell of a filled circle exactly once, row by row.
///
/// Horizontal half-widths come from the midpoint circle algorithm, so a
/// radius of zero covers only the center. Coordinates may fall off the grid;
/// callers decide what to do with them.
pub fn raster_filled_circle<F>(center_column: i64, center_row: i64, radius: u32, mut visit: F)
where
    F: FnMut(i64, i64),
{
    let half_widths = midpoint_half_widths(radius);
    let radius = i64::from(radius);
    for dy in -radius..=radius {
        let half = half_widths[dy.unsigned_abs() as usize];
        for dx in -half..=half {
            visit(center_column + dx, center_row + dy);
        }
    }
}

fn midpoint_half_widths(radius: u32) -> Vec<i64> {
    let radius = i64::from(radius);
    let mut half_widths = vec![0; radius as usize + 1];
    let (mut x, mut y, mut error) = (radius, 0_i64, 1 - radius);
    while x >= y {
        half_widths[y as usize] = half_widths[y as usize].max(x);
        half_widths[x as usize] = half_widths[x as usize].max(y);
        y += 1;
        if error < 0 {
            error += 2 * y + 1;
        } else {
            x -= 1;
            error += 2 * (y - x) + 1;
        }
    }
    half_widths
}

impl Grid {
    /// Applies `per_cell` to every in-bounds cell of a filled circle.
    ///
    /// Fails without touching any cell when the center lies off the grid.
    /// Radii wider than the grid are rasterized at the grid's extent, which
    /// covers the same cells. Returns the number of cells visited.
    pub fn apply_area_effect<F>(
        &mut self,
        center: CellCoord,
        radius: u32,
        mut per_cell: F,
    ) -> Result<u32, SimulationError>
    where
        F: FnMut(CellIndex, &mut Cell),
    {
        let _ = self.index(center)?;
        let reach = self.columns().saturating_add(self.rows());
        let mut visited = 0_u32;
        raster_filled_circle(
            i64::from(center.column()),
            i64::from(center.row()),
            radius.min(reach),
            |column, row| {
                let Some(index) = self.index_signed(column, row) else {
                    return;
                };
                if let Ok(cell) = self.cell_mut(index) {
                    per_cell(index, cell);
                    visited += 1;
                }
            },
        );
        Ok(visited)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn circle(radius: u32) -> Vec<(i64, i64)> {
        let mut cells = Vec::new();
        raster_filled_circle(0, 0, radius, |column, row| cells.push((column, row)));
        cells
    }

    #[test]
    fn radius_zero_covers_only_the_center() {
        assert_eq!(circle(0), vec![(0, 0)]);
    }

    #[test]
    fn every_cell_is_visited_once() {
        for radius in 0..12 {
            let cells = circle(radius);
            let unique: BTreeSet<_> = cells.iter().copied().collect();
            assert_eq!(unique.len(), cells.len(), "radius {radius}");
        }
    }

    #[test]
    fn circle_is_symmetric_and_bounded() {
        let cells: BTreeSet<_> = circle(6).into_iter().collect();
        for &(column, row) in &cells {
            assert!(cells.contains(&(-column, row)));
            assert!(cells.contains(&(column, -row)));
            assert!(cells.contains(&(row, column)));
            assert!(column * column + row * row <= 7 * 7);
        }
        assert!(cells.contains(&(6, 0)));
        assert!(cells.contains(&(0, -6)));
    }

    #[test]
    fn area_effect_clips_to_the_grid() {
        let mut grid = Grid::new(5, 5);
        let visited = grid
            .apply_area_effect(CellCoord::new(0, 0), 2, |_, cell| {
                let _ = cell.add_healthy(1.0, 10.0);
            })
            .expect("center on grid");

        let touched = grid
            .cells()
            .iter()
            .filter(|cell| cell.healthy_alive() > 0.0)
            .count();
        assert_eq!(visited as usize, touched);
        assert_eq!(touched, 8);
    }

    #[test]
    fn oversized_radius_covers_the_grid_once() {
        let mut grid = Grid::new(4, 4);
        let visited = grid
            .apply_area_effect(CellCoord::new(1, 2), u32::MAX, |_, cell| {
                let _ = cell.add_healthy(1.0, 10.0);
            })
            .expect("center on grid");

        assert_eq!(visited, 16);
        assert!(grid.cells().iter().all(|cell| cell.healthy_alive() == 1.0));
    }

    #[test]
    fn off_grid_center_is_rejected_without_changes() {
        let mut grid = Grid::new(3, 3);
        let result = grid.apply_area_effect(CellCoord::new(3, 1), 5, |_, cell| {
            let _ = cell.add_healthy(1.0, 10.0);
        });

        assert!(matches!(result, Err(SimulationError::OutOfBounds { .. })));
        assert_eq!(grid, Grid::new(3, 3));
    }
}
