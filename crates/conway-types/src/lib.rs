//! Shared type definitions for the Conway engine.
//!
//! This crate is the single source of truth for the types that cross crate
//! boundaries: cell states and coordinates, the execution state machine,
//! decoded control commands, and the event records emitted to observers.
//!
//! # Modules
//!
//! - [`cell`] -- Cell state and grid coordinates
//! - [`control`] -- Execution states and control commands
//! - [`event`] -- Event records emitted to the observer channel

pub mod cell;
pub mod control;
pub mod event;

// Re-export all public types at crate root for convenience.
pub use cell::{Cell, CellState};
pub use control::{ControlCommand, ExecutionState};
pub use event::Event;
