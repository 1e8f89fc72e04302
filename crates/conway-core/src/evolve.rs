//! Band partitioning, partition workers, and the turn evolver.
//!
//! One turn advances the whole grid synchronously: the height is split
//! into one contiguous row band per worker (plus a remainder band when
//! the worker count does not divide the height), every band is evolved
//! concurrently against the previous generation, and the scope join is
//! the barrier -- `TurnComplete` can only follow it.
//!
//! Bands are disjoint and cover the full height, so each row has exactly
//! one writer and no runtime locking is needed. Workers read the previous
//! grid anywhere (neighbor lookups cross band edges) but write only their
//! own band of the scratch buffer, which starts as a copy of the current
//! generation and carries unchanged cells forward.
//!
//! The evolver double-buffers: the scratch grid is preallocated once and
//! swapped with the live grid after every turn, so steady-state evolution
//! allocates nothing.

use std::ops::Range;

use conway_grid::{Grid, GridError};
use conway_types::{Cell, CellState, Event};

use crate::EventSender;

/// Errors that can occur constructing an evolver.
#[derive(Debug, thiserror::Error)]
pub enum EvolveError {
    /// The worker count is zero.
    #[error("worker count must be positive, got {workers}")]
    InvalidWorkerCount {
        /// The rejected worker count.
        workers: usize,
    },

    /// The grid dimensions are invalid.
    #[error("grid error: {source}")]
    Grid {
        /// The underlying grid error.
        #[from]
        source: GridError,
    },
}

/// Split `height` rows into `workers` equal bands plus an optional
/// remainder band.
///
/// The first `workers` bands each span `floor(height / workers)` rows
/// (possibly zero rows when `workers > height`); if the division leaves a
/// remainder, one extra band covers the leftover rows at the bottom. The
/// returned bands are ordered, disjoint, and cover `[0, height)` exactly.
pub fn partition_bands(height: usize, workers: usize) -> Vec<Range<usize>> {
    let band_rows = height.checked_div(workers).unwrap_or(0);
    let mut bands = Vec::with_capacity(workers.saturating_add(1));

    let mut start = 0_usize;
    for _ in 0..workers {
        let end = start.saturating_add(band_rows);
        bands.push(start..end);
        start = end;
    }
    if start < height {
        bands.push(start..height);
    }
    bands
}

/// The standard automaton rule for a single cell.
///
/// A live cell with fewer than 2 or more than 3 live neighbors dies; a
/// dead cell with exactly 3 live neighbors becomes alive; everything
/// else is unchanged.
pub const fn next_state(current: CellState, live_neighbors: u8) -> CellState {
    match current {
        CellState::Alive => {
            if live_neighbors < 2 || live_neighbors > 3 {
                CellState::Dead
            } else {
                CellState::Alive
            }
        }
        CellState::Dead => {
            if live_neighbors == 3 {
                CellState::Alive
            } else {
                CellState::Dead
            }
        }
    }
}

/// Evolve rows `[rows.start, rows.end)` of the previous grid into `out`,
/// the matching band of the next-generation buffer.
///
/// `out` arrives as a carried-forward copy of the band, so only flips are
/// written. Every flip is announced on the event channel tagged with the
/// turn being computed. Completes exactly once, including on zero-row
/// bands.
fn evolve_band(
    prev: &Grid,
    out: &mut [CellState],
    rows: Range<usize>,
    turn: u64,
    events: &EventSender,
) {
    let width = prev.width();
    let mut idx = 0;
    for y in rows {
        for x in 0..width {
            let current = prev.get(x, y);
            let next = next_state(current, prev.live_neighbors(x, y));
            if next != current {
                if let Some(slot) = out.get_mut(idx) {
                    *slot = next;
                }
                let _ = events.send(Event::CellFlipped {
                    turn,
                    cell: Cell::new(x, y),
                });
            }
            idx = idx.saturating_add(1);
        }
    }
}

/// The turn evolver: partitions the grid, dispatches partition workers,
/// and swaps in the merged next generation.
#[derive(Debug)]
pub struct Evolver {
    /// Number of equal bands to dispatch per turn.
    workers: usize,
    /// Preallocated next-generation buffer, swapped with the live grid
    /// after each turn.
    scratch: Grid,
}

impl Evolver {
    /// Create an evolver for a `width x height` grid.
    ///
    /// # Errors
    ///
    /// Returns [`EvolveError::InvalidWorkerCount`] for a zero worker
    /// count, or [`EvolveError::Grid`] for invalid dimensions. Both are
    /// construction-time faults; nothing is handled dynamically later.
    pub fn new(width: usize, height: usize, workers: usize) -> Result<Self, EvolveError> {
        if workers == 0 {
            return Err(EvolveError::InvalidWorkerCount { workers });
        }
        Ok(Self {
            workers,
            scratch: Grid::new(width, height)?,
        })
    }

    /// The configured worker count.
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Evolve `grid` by one turn in place.
    ///
    /// All dispatched workers run concurrently; this call returns only
    /// after every one of them (equal bands and remainder alike) has
    /// finished, so all `CellFlipped` events for `turn` precede the
    /// caller's `TurnComplete`. The result is independent of the worker
    /// count and of cross-band scheduling.
    pub fn step(&mut self, grid: &mut Grid, turn: u64, events: &EventSender) {
        self.scratch.copy_from(grid);

        let width = grid.width();
        let bands = partition_bands(grid.height(), self.workers);
        let prev: &Grid = grid;

        std::thread::scope(|scope| {
            let mut rest: &mut [CellState] = self.scratch.cells_mut();
            for band in bands {
                let cell_count = band.len().saturating_mul(width);
                let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(cell_count);
                rest = tail;

                let worker_events = events.clone();
                scope.spawn(move || evolve_band(prev, chunk, band, turn, &worker_events));
            }
        });

        std::mem::swap(grid, &mut self.scratch);
    }
}
