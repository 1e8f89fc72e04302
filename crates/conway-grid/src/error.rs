//! Grid error types.

/// Errors that can occur constructing or populating a grid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Width or height is zero.
    #[error("invalid grid dimensions: {width}x{height} (both must be positive)")]
    InvalidDimensions {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// The supplied cell data does not match `width * height`.
    #[error("cell data length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Expected number of cells.
        expected: usize,
        /// Number of cells supplied.
        actual: usize,
    },
}
