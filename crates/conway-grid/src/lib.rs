//! Toroidal binary grid for the Conway engine.
//!
//! The grid is a rectangular matrix of cell states with wrap-around edges:
//! neighbor lookups at a boundary reference the opposite edge. This crate
//! owns grid storage, the toroidal neighbor counter, and the alive-cell
//! enumerator. Evolution and concurrency live upstream in `conway-core`.

pub mod error;
pub mod grid;

pub use error::GridError;
pub use grid::Grid;
