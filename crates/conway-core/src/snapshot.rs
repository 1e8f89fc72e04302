//! Grid load and snapshot emission through the I/O collaborators.
//!
//! A snapshot is a full serialization of the current grid to the sink,
//! cell-by-cell in row-major order, under a `{width}x{height}x{turn}`
//! label. The load counterpart reads the initial grid from the source
//! and announces every initially-live cell as a turn-0 `CellFlipped`, so
//! observers start from a known-blank canvas.

use conway_grid::{Grid, GridError};
use conway_types::{Cell, Event};

use crate::EventSender;
use crate::io::{GridSink, GridSource, IoError};

/// Errors that can occur loading or writing a grid.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// A collaborator read or write failed.
    #[error("grid I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: IoError,
    },

    /// The loaded cells did not form a valid grid.
    #[error("grid error: {source}")]
    Grid {
        /// The underlying grid error.
        #[from]
        source: GridError,
    },
}

/// Label for a snapshot image: `{width}x{height}x{turn}`.
pub fn image_label(width: usize, height: usize, turn: u64) -> String {
    format!("{width}x{height}x{turn}")
}

/// Label for an initial-grid source: `{width}x{height}`.
pub fn source_label(width: usize, height: usize) -> String {
    format!("{width}x{height}")
}

/// Read a `width x height` grid from the source, row-major.
///
/// Emits `CellFlipped { turn: 0 }` for every live cell encountered.
///
/// # Errors
///
/// Returns [`SnapshotError::Io`] if the source fails or runs out of
/// cells, or [`SnapshotError::Grid`] if the dimensions are invalid.
pub fn load_grid(
    source: &mut dyn GridSource,
    width: usize,
    height: usize,
    events: &EventSender,
) -> Result<Grid, SnapshotError> {
    let mut cells = Vec::with_capacity(width.saturating_mul(height));
    for y in 0..height {
        for x in 0..width {
            let state = source.next_cell()?;
            if state.is_alive() {
                let _ = events.send(Event::CellFlipped {
                    turn: 0,
                    cell: Cell::new(x, y),
                });
            }
            cells.push(state);
        }
    }
    Ok(Grid::from_cells(width, height, cells)?)
}

/// Write the grid to the sink as a snapshot for the given turn.
///
/// Emits `ImageOutputComplete` once every cell has been handed to the
/// sink. Write failures propagate without the completion event.
///
/// # Errors
///
/// Returns [`SnapshotError::Io`] if the sink rejects a write.
pub fn write_snapshot(
    sink: &mut dyn GridSink,
    grid: &Grid,
    turn: u64,
    events: &EventSender,
) -> Result<(), SnapshotError> {
    let label = image_label(grid.width(), grid.height(), turn);
    sink.begin_image(&label)?;
    for state in grid.cells() {
        sink.write_cell(*state)?;
    }
    let _ = events.send(Event::ImageOutputComplete { turn, label });
    Ok(())
}
