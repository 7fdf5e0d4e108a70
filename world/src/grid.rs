//! Dense cell storage with bounds-checked addressing.

use outbreak_core::{Cell, CellCoord, CellIndex, NoiseField, PopulationView, SimulationError};

/// Row-major offsets of the eight cells surrounding a center cell.
const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Fixed-size field of cells; the sole owner of cell storage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates an uninhabited grid with the provided dimensions.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![Cell::new(); capacity],
        }
    }

    /// Seeds a grid from noise and collects the static population centers.
    ///
    /// Cells whose sample exceeds `seed_threshold` receive healthy population
    /// scaled linearly from zero at the threshold to `max_population` at a
    /// sample of one, clamped to `capacity`. Cells whose sample also exceeds
    /// `center_threshold` are returned as population centers in index order.
    /// This is the only place population is created from nothing besides
    /// explicit injection.
    #[must_use]
    pub fn initialize_from_noise(
        field: &NoiseField,
        seed_threshold: f64,
        max_population: f64,
        center_threshold: f64,
        capacity: f64,
    ) -> (Self, Vec<CellIndex>) {
        let mut grid = Self::new(field.width(), field.height());
        let mut centers = Vec::new();
        let span = 1.0 - seed_threshold;

        for (index, (cell, &sample)) in grid.cells.iter_mut().zip(field.values()).enumerate() {
            let sample = f64::from(sample);
            if !(sample > seed_threshold) {
                continue;
            }
            let share = ((sample - seed_threshold) / span).min(1.0);
            let _ = cell.add_healthy(share * max_population, capacity);
            if sample > center_threshold {
                centers.push(CellIndex::new(index as u32));
            }
        }

        (grid, centers)
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of cells in the grid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the grid holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reports whether the signed coordinate lies on the grid.
    #[must_use]
    pub fn in_bounds(&self, column: i64, row: i64) -> bool {
        column >= 0 && row >= 0 && column < i64::from(self.columns) && row < i64::from(self.rows)
    }

    /// Converts a coordinate into its row-major index.
    pub fn index(&self, coord: CellCoord) -> Result<CellIndex, SimulationError> {
        self.index_signed(i64::from(coord.column()), i64::from(coord.row()))
            .ok_or(SimulationError::OutOfBounds {
                column: i64::from(coord.column()),
                row: i64::from(coord.row()),
                width: self.columns,
                height: self.rows,
            })
    }

    /// Converts a row-major index back into its coordinate.
    pub fn coord(&self, index: CellIndex) -> Result<CellCoord, SimulationError> {
        self.view()
            .coord_of(index)
            .ok_or(SimulationError::IndexOutOfRange {
                index: index.get(),
                len: self.cells.len(),
            })
    }

    /// Borrows the cell at the provided coordinate.
    pub fn cell_at(&self, coord: CellCoord) -> Result<&Cell, SimulationError> {
        let index = self.index(coord)?;
        self.cell(index)
    }

    /// Mutably borrows the cell at the provided coordinate.
    pub fn cell_at_mut(&mut self, coord: CellCoord) -> Result<&mut Cell, SimulationError> {
        let index = self.index(coord)?;
        self.cell_mut(index)
    }

    /// Borrows the cell stored at the provided index.
    pub fn cell(&self, index: CellIndex) -> Result<&Cell, SimulationError> {
        let len = self.cells.len();
        usize::try_from(index.get())
            .ok()
            .and_then(|slot| self.cells.get(slot))
            .ok_or(SimulationError::IndexOutOfRange {
                index: index.get(),
                len,
            })
    }

    /// Mutably borrows the cell stored at the provided index.
    pub fn cell_mut(&mut self, index: CellIndex) -> Result<&mut Cell, SimulationError> {
        let len = self.cells.len();
        usize::try_from(index.get())
            .ok()
            .and_then(|slot| self.cells.get_mut(slot))
            .ok_or(SimulationError::IndexOutOfRange {
                index: index.get(),
                len,
            })
    }

    /// Indices of the in-bounds neighbors of a cell in row-major order.
    ///
    /// The iterator owns its data so callers may mutate the grid while walking it.
    #[must_use]
    pub fn neighbors(&self, coord: CellCoord) -> Neighbors {
        let mut slots = [None; 8];
        let mut len = 0;
        let column = i64::from(coord.column());
        let row = i64::from(coord.row());
        for (dx, dy) in NEIGHBOR_OFFSETS {
            if let Some(index) = self.index_signed(column + dx, row + dy) {
                slots[len] = Some(index);
                len += 1;
            }
        }
        Neighbors {
            slots,
            len,
            next: 0,
        }
    }

    /// Invokes `visit` for each in-bounds neighbor of a cell in row-major order.
    pub fn for_each_neighbor<F>(&self, coord: CellCoord, mut visit: F)
    where
        F: FnMut(CellIndex, &Cell),
    {
        for index in self.neighbors(coord) {
            if let Ok(cell) = self.cell(index) {
                visit(index, cell);
            }
        }
    }

    /// Captures a read-only view of the cells.
    #[must_use]
    pub fn view(&self) -> PopulationView<'_> {
        PopulationView::new(&self.cells, self.columns, self.rows)
    }

    /// Cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Index of a signed coordinate, if it lies on the grid.
    pub(crate) fn index_signed(&self, column: i64, row: i64) -> Option<CellIndex> {
        if !self.in_bounds(column, row) {
            return None;
        }
        let value = row * i64::from(self.columns) + column;
        u32::try_from(value).ok().map(CellIndex::new)
    }

    /// Cell coordinate closest to a fractional position, clamped onto the grid.
    pub(crate) fn nearest_coord(&self, column: f32, row: f32) -> Option<CellCoord> {
        if self.cells.is_empty() {
            return None;
        }
        let clamp = |value: f32, limit: u32| -> u32 {
            let rounded = value.round();
            if !(rounded > 0.0) {
                0
            } else {
                (rounded as u32).min(limit.saturating_sub(1))
            }
        };
        Some(CellCoord::new(
            clamp(column, self.columns),
            clamp(row, self.rows),
        ))
    }
}

/// Owned iterator over up to eight neighbor indices.
#[derive(Clone, Debug)]
pub struct Neighbors {
    slots: [Option<CellIndex>; 8],
    len: usize,
    next: usize,
}

impl Iterator for Neighbors {
    type Item = CellIndex;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.len {
            return None;
        }
        let item = self.slots.get(self.next).copied().flatten();
        self.next += 1;
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_access_outside_grid_is_rejected() {
        let grid = Grid::new(4, 3);
        assert!(grid.cell_at(CellCoord::new(3, 2)).is_ok());
        assert_eq!(
            grid.cell_at(CellCoord::new(4, 0)),
            Err(SimulationError::OutOfBounds {
                column: 4,
                row: 0,
                width: 4,
                height: 3,
            })
        );
        assert_eq!(
            grid.cell(CellIndex::new(12)),
            Err(SimulationError::IndexOutOfRange { index: 12, len: 12 })
        );
        assert!(!grid.in_bounds(-1, 0));
        assert!(grid.in_bounds(0, 0));
    }

    #[test]
    fn interior_neighbors_are_row_major() {
        let grid = Grid::new(3, 3);
        let neighbors: Vec<u32> = grid
            .neighbors(CellCoord::new(1, 1))
            .map(|index| index.get())
            .collect();
        assert_eq!(neighbors, vec![0, 1, 2, 3, 5, 6, 7, 8]);
    }

    #[test]
    fn corner_neighbors_skip_out_of_bounds_cells() {
        let grid = Grid::new(4, 4);
        let mut visited = Vec::new();
        grid.for_each_neighbor(CellCoord::new(0, 0), |index, _| visited.push(index.get()));
        assert_eq!(visited, vec![1, 4, 5]);

        let single = Grid::new(1, 1);
        assert_eq!(single.neighbors(CellCoord::new(0, 0)).count(), 0);
    }

    #[test]
    fn noise_seeds_population_and_centers() {
        let field = NoiseField::new(4, 1, vec![0.5, 0.75, 0.85, 1.0]).expect("field");
        let (grid, centers) = Grid::initialize_from_noise(&field, 0.7, 1_000.0, 0.8, 1_000.0);

        let populations: Vec<f64> = grid.cells().iter().map(Cell::healthy_alive).collect();
        assert_eq!(populations[0], 0.0);
        assert!((populations[1] - 1_000.0 * 0.05 / 0.3).abs() < 1e-3);
        assert!((populations[2] - 500.0).abs() < 1e-3);
        assert!((populations[3] - 1_000.0).abs() < 1e-3);
        assert_eq!(centers, vec![CellIndex::new(2), CellIndex::new(3)]);
    }

    #[test]
    fn noise_seeding_respects_capacity() {
        let field = NoiseField::new(1, 1, vec![1.0]).expect("field");
        let (grid, _) = Grid::initialize_from_noise(&field, 0.0, 5_000.0, 0.5, 1_000.0);
        assert!((grid.cells()[0].total_population() - 1_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn nearest_coord_rounds_and_clamps() {
        let grid = Grid::new(5, 5);
        assert_eq!(grid.nearest_coord(1.6, 2.4), Some(CellCoord::new(2, 2)));
        assert_eq!(grid.nearest_coord(-3.0, 9.0), Some(CellCoord::new(0, 4)));
        assert_eq!(Grid::default().nearest_coord(0.0, 0.0), None);
    }
}
