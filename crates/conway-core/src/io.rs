//! Grid source and sink collaborator traits, with in-memory doubles.
//!
//! Persisting and loading the grid is an external concern. The core sees
//! two narrow contracts: a [`GridSource`] that hands out the initial grid
//! one cell at a time in row-major order, and a [`GridSink`] that accepts
//! snapshot cells the same way under a dimension/turn-derived label. The
//! sink also carries the shutdown idle handshake: [`GridSink::flush_idle`]
//! returns only once every outstanding write has been flushed.
//!
//! Collaborator failures are boundary faults -- the core propagates them
//! and never retries, since re-fetching a turn's grid is not generally
//! possible once downstream state has advanced.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use conway_types::CellState;

/// Errors crossing the I/O collaborator boundary.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// The source ran out of cells before the grid was fully read.
    #[error("grid source exhausted before the grid was fully read")]
    SourceExhausted,

    /// An underlying read or write failed.
    #[error("I/O failure: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The collaborator data or call sequence was malformed.
    #[error("malformed grid I/O: {reason}")]
    Malformed {
        /// Explanation of the fault.
        reason: String,
    },
}

/// Supplies the initial grid, one cell-state byte at a time, row-major.
pub trait GridSource: Send {
    /// Read the next cell state.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::SourceExhausted`] when no more cells are
    /// available, or [`IoError::Io`] on a read failure.
    fn next_cell(&mut self) -> Result<CellState, IoError>;
}

/// Accepts grid snapshots, one cell-state byte at a time, row-major.
pub trait GridSink: Send {
    /// Start a new image under the given label. Any image still open is
    /// finished first.
    fn begin_image(&mut self, label: &str) -> Result<(), IoError>;

    /// Append the next cell of the current image.
    fn write_cell(&mut self, state: CellState) -> Result<(), IoError>;

    /// Flush all outstanding writes and confirm the sink is idle.
    ///
    /// Returning `Ok` is the idle confirmation used during shutdown
    /// sequencing; no snapshot write may still be in flight afterwards.
    fn flush_idle(&mut self) -> Result<(), IoError>;
}

/// An in-memory [`GridSource`] backed by a byte queue.
#[derive(Debug, Clone)]
pub struct MemorySource {
    cells: VecDeque<u8>,
}

impl MemorySource {
    /// Create a source that yields the given wire bytes in order.
    pub fn new(bytes: impl IntoIterator<Item = u8>) -> Self {
        Self {
            cells: bytes.into_iter().collect(),
        }
    }
}

impl GridSource for MemorySource {
    fn next_cell(&mut self) -> Result<CellState, IoError> {
        self.cells
            .pop_front()
            .map(CellState::from_byte)
            .ok_or(IoError::SourceExhausted)
    }
}

/// A recorded image inside a [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedImage {
    /// The label the image was written under.
    pub label: String,
    /// The wire bytes, row-major.
    pub bytes: Vec<u8>,
}

/// Internal state shared between [`MemorySink`] clones.
#[derive(Debug, Default)]
struct MemorySinkState {
    images: Vec<RecordedImage>,
    flushed: bool,
}

/// An in-memory [`GridSink`] that records every image it receives.
///
/// Cheaply cloneable; all clones share the same recording, so a test can
/// keep one clone while the controller owns another.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    state: Arc<Mutex<MemorySinkState>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All images recorded so far, in write order.
    pub fn images(&self) -> Vec<RecordedImage> {
        self.lock().images.clone()
    }

    /// Whether [`GridSink::flush_idle`] has been called.
    pub fn was_flushed(&self) -> bool {
        self.lock().flushed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemorySinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GridSink for MemorySink {
    fn begin_image(&mut self, label: &str) -> Result<(), IoError> {
        self.lock().images.push(RecordedImage {
            label: label.to_owned(),
            bytes: Vec::new(),
        });
        Ok(())
    }

    fn write_cell(&mut self, state: CellState) -> Result<(), IoError> {
        let mut guard = self.lock();
        let image = guard.images.last_mut().ok_or_else(|| IoError::Malformed {
            reason: "write_cell before begin_image".to_owned(),
        })?;
        image.bytes.push(state.to_byte());
        Ok(())
    }

    fn flush_idle(&mut self) -> Result<(), IoError> {
        self.lock().flushed = true;
        Ok(())
    }
}
