//! Grid storage, toroidal neighbor counting, and alive-cell enumeration.
//!
//! Cells are stored row-major in a flat buffer. Coordinate arithmetic
//! wraps modulo width/height, so a lookup one step past an edge lands on
//! the opposite edge. On degenerate dimensions (width or height of 1 or
//! 2) wrapped neighbor coordinates can coincide and a cell is counted
//! once per coinciding offset, exactly as plain modulo arithmetic would.

use conway_types::{Cell, CellState};

use crate::error::GridError;

/// A `height x width` toroidal matrix of cell states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Number of columns.
    width: usize,
    /// Number of rows.
    height: usize,
    /// Row-major cell buffer, length `width * height`.
    cells: Vec<CellState>,
}

/// Wrap a coordinate one step toward zero, to the far edge at zero.
const fn wrap_dec(coord: usize, len: usize) -> usize {
    if coord == 0 {
        len.saturating_sub(1)
    } else {
        coord.saturating_sub(1)
    }
}

/// Wrap a coordinate one step away from zero, to zero at the far edge.
const fn wrap_inc(coord: usize, len: usize) -> usize {
    let next = coord.saturating_add(1);
    if next >= len { 0 } else { next }
}

impl Grid {
    /// Create an all-dead grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] if either dimension is zero.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        let len = Self::checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![CellState::Dead; len],
        })
    }

    /// Create a grid from an existing row-major cell buffer.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] if either dimension is
    /// zero, or [`GridError::LengthMismatch`] if `cells.len()` is not
    /// `width * height`.
    pub fn from_cells(
        width: usize,
        height: usize,
        cells: Vec<CellState>,
    ) -> Result<Self, GridError> {
        let len = Self::checked_len(width, height)?;
        if cells.len() != len {
            return Err(GridError::LengthMismatch {
                expected: len,
                actual: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Validate dimensions and compute the buffer length.
    fn checked_len(width: usize, height: usize) -> Result<usize, GridError> {
        width
            .checked_mul(height)
            .filter(|len| *len > 0)
            .ok_or(GridError::InvalidDimensions { width, height })
    }

    /// Number of columns.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Flat index of `(x, y)`. Callers pass in-bounds coordinates; the
    /// public accessors treat an out-of-range result as a dead cell.
    fn index(&self, x: usize, y: usize) -> usize {
        y.saturating_mul(self.width).saturating_add(x)
    }

    /// The state of the cell at `(x, y)`. Out-of-bounds reads are dead.
    pub fn get(&self, x: usize, y: usize) -> CellState {
        if x >= self.width {
            return CellState::Dead;
        }
        self.cells
            .get(self.index(x, y))
            .copied()
            .unwrap_or(CellState::Dead)
    }

    /// Set the cell at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, state: CellState) {
        if x >= self.width {
            return;
        }
        let idx = self.index(x, y);
        if let Some(slot) = self.cells.get_mut(idx) {
            *slot = state;
        }
    }

    /// The full row-major cell buffer.
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    /// Mutable access to the full row-major cell buffer.
    pub fn cells_mut(&mut self) -> &mut [CellState] {
        &mut self.cells
    }

    /// Copy another grid's cells into this one. Both grids must have the
    /// same dimensions; a mismatched copy is ignored.
    pub fn copy_from(&mut self, other: &Self) {
        if self.width == other.width && self.height == other.height {
            self.cells.copy_from_slice(&other.cells);
        }
    }

    /// Count the live cells in the toroidal 8-neighborhood of `(x, y)`.
    ///
    /// Pure, no failure modes; the result is in `[0, 8]`.
    pub fn live_neighbors(&self, x: usize, y: usize) -> u8 {
        let rows = [wrap_dec(y, self.height), y, wrap_inc(y, self.height)];
        let cols = [wrap_dec(x, self.width), x, wrap_inc(x, self.width)];

        let mut count: u8 = 0;
        for (row_offset, &ny) in rows.iter().enumerate() {
            for (col_offset, &nx) in cols.iter().enumerate() {
                if row_offset == 1 && col_offset == 1 {
                    continue;
                }
                if self.get(nx, ny).is_alive() {
                    count = count.saturating_add(1);
                }
            }
        }
        count
    }

    /// Enumerate the live cells in row-major scan order.
    pub fn alive_cells(&self) -> Vec<Cell> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, state)| state.is_alive())
            .map(|(idx, _)| {
                // width >= 1 is guaranteed by construction.
                let y = idx.checked_div(self.width).unwrap_or(0);
                let x = idx.checked_rem(self.width).unwrap_or(0);
                Cell::new(x, y)
            })
            .collect()
    }

    /// Count the live cells.
    pub fn alive_count(&self) -> u64 {
        let count = self.cells.iter().filter(|state| state.is_alive()).count();
        u64::try_from(count).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Build a grid from string art: '#' is alive, anything else dead.
    fn grid_from_art(rows: &[&str]) -> Grid {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.len());
        let cells = rows
            .iter()
            .flat_map(|row| row.chars())
            .map(|ch| {
                if ch == '#' {
                    CellState::Alive
                } else {
                    CellState::Dead
                }
            })
            .collect();
        Grid::from_cells(width, height, cells).unwrap()
    }

    #[test]
    fn new_grid_is_all_dead() {
        let grid = Grid::new(4, 3).unwrap();
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.alive_count(), 0);
        assert!(grid.alive_cells().is_empty());
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(Grid::new(0, 5).is_err());
        assert!(Grid::new(5, 0).is_err());
        assert!(Grid::new(0, 0).is_err());
    }

    #[test]
    fn from_cells_rejects_length_mismatch() {
        let result = Grid::from_cells(2, 2, vec![CellState::Dead; 3]);
        assert!(matches!(
            result,
            Err(GridError::LengthMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn get_and_set_round_trip() {
        let mut grid = Grid::new(3, 3).unwrap();
        grid.set(1, 2, CellState::Alive);
        assert_eq!(grid.get(1, 2), CellState::Alive);
        assert_eq!(grid.get(2, 1), CellState::Dead);
    }

    #[test]
    fn out_of_bounds_reads_are_dead() {
        let mut grid = Grid::new(3, 3).unwrap();
        grid.set(2, 2, CellState::Alive);
        assert_eq!(grid.get(3, 0), CellState::Dead);
        assert_eq!(grid.get(0, 3), CellState::Dead);
    }

    #[test]
    fn neighbor_count_interior() {
        let grid = grid_from_art(&[
            "###",
            "#.#",
            "###",
        ]);
        assert_eq!(grid.live_neighbors(1, 1), 8);
    }

    #[test]
    fn toroidal_wraparound_counts_opposite_corner() {
        // A live cell at (0,0) must see a neighbor at (width-1, height-1).
        let mut grid = Grid::new(5, 5).unwrap();
        grid.set(0, 0, CellState::Alive);
        grid.set(4, 4, CellState::Alive);
        assert_eq!(grid.live_neighbors(0, 0), 1);
        assert_eq!(grid.live_neighbors(4, 4), 1);
    }

    #[test]
    fn wraparound_across_each_edge() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.set(0, 1, CellState::Alive);
        // (3,1) is horizontally adjacent through the wrapped edge.
        assert_eq!(grid.live_neighbors(3, 1), 1);

        let mut grid = Grid::new(4, 4).unwrap();
        grid.set(1, 0, CellState::Alive);
        // (1,3) is vertically adjacent through the wrapped edge.
        assert_eq!(grid.live_neighbors(1, 3), 1);
    }

    #[test]
    fn isolated_cell_has_no_neighbors() {
        let mut grid = Grid::new(5, 5).unwrap();
        grid.set(2, 2, CellState::Alive);
        assert_eq!(grid.live_neighbors(2, 2), 0);
    }

    #[test]
    fn alive_cells_are_row_major_ordered() {
        let grid = grid_from_art(&[
            ".#.",
            "#.#",
            "..#",
        ]);
        assert_eq!(
            grid.alive_cells(),
            vec![
                Cell::new(1, 0),
                Cell::new(0, 1),
                Cell::new(2, 1),
                Cell::new(2, 2),
            ]
        );
        assert_eq!(grid.alive_count(), 4);
    }

    #[test]
    fn copy_from_replaces_cells() {
        let source = grid_from_art(&["##", ".."]);
        let mut target = Grid::new(2, 2).unwrap();
        target.copy_from(&source);
        assert_eq!(target, source);
    }

    #[test]
    fn mismatched_copy_is_ignored() {
        let source = grid_from_art(&["##", "##"]);
        let mut target = Grid::new(3, 3).unwrap();
        target.copy_from(&source);
        assert_eq!(target.alive_count(), 0);
    }
}
