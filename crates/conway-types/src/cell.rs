//! Cell state and grid coordinates.
//!
//! A cell is either alive or dead. On the wire (the image-like encoding
//! used by the grid source and sink collaborators) the two states are the
//! intensity bytes 255 and 0; everywhere else they are this enum.

use serde::{Deserialize, Serialize};

/// Wire byte for a live cell.
const ALIVE_BYTE: u8 = 255;

/// Wire byte for a dead cell.
const DEAD_BYTE: u8 = 0;

/// The state of a single grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// The cell is dead (intensity 0).
    #[default]
    Dead,
    /// The cell is alive (intensity 255).
    Alive,
}

impl CellState {
    /// Decode a cell state from its wire byte. 255 is alive, anything
    /// else is dead.
    pub const fn from_byte(byte: u8) -> Self {
        if byte == ALIVE_BYTE {
            Self::Alive
        } else {
            Self::Dead
        }
    }

    /// Encode this cell state as its wire byte (255 or 0).
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Alive => ALIVE_BYTE,
            Self::Dead => DEAD_BYTE,
        }
    }

    /// Whether the cell is alive.
    pub const fn is_alive(self) -> bool {
        matches!(self, Self::Alive)
    }

    /// The opposite state.
    pub const fn flipped(self) -> Self {
        match self {
            Self::Alive => Self::Dead,
            Self::Dead => Self::Alive,
        }
    }
}

/// A grid coordinate.
///
/// `0 <= x < width` and `0 <= y < height`. The grid topology is toroidal,
/// but wrapping is the grid's concern -- a `Cell` is always a canonical
/// in-bounds coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Column index.
    pub x: usize,
    /// Row index.
    pub y: usize,
}

impl Cell {
    /// Create a coordinate from column and row indices.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
