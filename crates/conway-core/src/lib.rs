//! Turn evolution, concurrency orchestration, and the control state
//! machine for the Conway engine.
//!
//! This crate owns the per-turn evolution pipeline and everything that
//! coordinates it: partitioning the grid into row bands, dispatching
//! partition workers, the barrier that gates `TurnComplete`, the
//! non-blocking control-command drain, the pause/resume sub-state, the
//! supervised statistics ticker, and shutdown sequencing.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `conway-config.yaml` into
//!   strongly-typed structs, with construction-time validation.
//! - [`controller`] -- [`SimulationController`], the turn loop and
//!   control state machine.
//! - [`evolve`] -- [`Evolver`], band partitioning, and the per-band
//!   partition worker.
//! - [`io`] -- [`GridSource`]/[`GridSink`] collaborator traits and
//!   in-memory doubles.
//! - [`snapshot`] -- Grid load and snapshot emission through the I/O
//!   collaborators.
//! - [`stats`] -- The supervised statistics ticker.
//!
//! [`SimulationController`]: controller::SimulationController
//! [`Evolver`]: evolve::Evolver
//! [`GridSource`]: io::GridSource
//! [`GridSink`]: io::GridSink

pub mod config;
pub mod controller;
pub mod evolve;
pub mod io;
pub mod snapshot;
pub mod stats;

/// Producer handle for the observer event channel.
///
/// Cloned into every partition worker and the statistics ticker; the
/// controller owns the last clones and the channel closes when the
/// controller returns. Sends never block, and a send after the consumer
/// went away is silently discarded.
pub type EventSender = tokio::sync::mpsc::UnboundedSender<conway_types::Event>;
