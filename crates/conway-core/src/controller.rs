//! The simulation controller: turn loop, control state machine, and
//! shutdown sequencing.
//!
//! The controller owns the current grid and turn counter and is the only
//! mutator of both. Each turn it drives the evolver (the barrier inside
//! [`Evolver::step`] gates `TurnComplete`), refreshes the ticker's stats
//! snapshot, then drains at most one pending control command with a
//! non-blocking poll -- a command is observed within one turn of arrival,
//! never instantly. Pausing blocks the loop entirely on the next control
//! command; only `resume` leaves that sub-state.
//!
//! Shutdown sequencing is a hard contract for observers: final snapshot,
//! `FinalTurnComplete` with the full live-cell set, ticker stop, sink
//! flush/idle handshake, `StateChange(Quitting)`, then the event channel
//! closes and nothing is emitted afterwards.
//!
//! [`Evolver::step`]: crate::evolve::Evolver::step

use std::sync::Arc;
use std::time::Duration;

use conway_grid::Grid;
use conway_types::{ControlCommand, Event, ExecutionState};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::EventSender;
use crate::config::{ConfigError, SimulationConfig};
use crate::evolve::{EvolveError, Evolver};
use crate::io::{GridSink, GridSource, IoError};
use crate::snapshot::{self, SnapshotError};
use crate::stats::{SharedStats, StatsTicker};

/// Errors that can occur constructing or running the controller.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// The run configuration is invalid.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The evolver rejected the configuration.
    #[error("evolver error: {source}")]
    Evolve {
        /// The underlying evolver error.
        #[from]
        source: EvolveError,
    },

    /// Loading or snapshotting the grid failed.
    #[error("snapshot error: {source}")]
    Snapshot {
        /// The underlying snapshot error.
        #[from]
        source: SnapshotError,
    },

    /// The sink failed the shutdown idle handshake.
    #[error("sink flush error: {source}")]
    Flush {
        /// The underlying I/O error.
        source: IoError,
    },
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of turns that completed.
    pub turns_completed: u64,
    /// Live cells on the final grid.
    pub alive: u64,
}

/// The simulation controller.
///
/// Construct with [`SimulationController::new`] (which loads the initial
/// grid and validates the configuration -- all fatal errors surface here,
/// before any turn executes), then drive the whole run with
/// [`SimulationController::run`].
pub struct SimulationController {
    /// Total turns to evolve.
    turns: u64,
    /// The current generation. Replaced wholesale each turn by the
    /// evolver's buffer swap; never aliased across a turn boundary.
    grid: Grid,
    /// Completed-turn counter, `0 ..= turns`.
    turn: u64,
    /// Current execution state.
    state: ExecutionState,
    /// The turn evolver with its scratch buffer.
    evolver: Evolver,
    /// Observer event channel.
    events: EventSender,
    /// Decoded control commands from the input collaborator.
    control: mpsc::UnboundedReceiver<ControlCommand>,
    /// Snapshot destination.
    sink: Box<dyn GridSink>,
    /// Snapshot shared with the statistics ticker.
    stats: Arc<SharedStats>,
    /// The supervised statistics ticker.
    ticker: StatsTicker,
}

impl SimulationController {
    /// Build a controller: validate the configuration, load the initial
    /// grid from the source (emitting turn-0 `CellFlipped` events), and
    /// prepare the evolver and ticker.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Config`] or [`ControllerError::Evolve`]
    /// for invalid configuration, and [`ControllerError::Snapshot`] if
    /// the source cannot supply the grid. No partial run is attempted.
    pub fn new(
        config: &SimulationConfig,
        source: &mut dyn GridSource,
        sink: Box<dyn GridSink>,
        events: EventSender,
        control: mpsc::UnboundedReceiver<ControlCommand>,
    ) -> Result<Self, ControllerError> {
        config.validate()?;

        let width = config.grid.width;
        let height = config.grid.height;
        let evolver = Evolver::new(width, height, config.run.workers)?;
        let grid = snapshot::load_grid(source, width, height, &events)?;

        let stats = Arc::new(SharedStats::new());
        stats.record(0, grid.alive_count());

        let ticker = StatsTicker::new(
            Duration::from_millis(config.stats.interval_ms),
            Arc::clone(&stats),
            events.clone(),
        );

        Ok(Self {
            turns: config.run.turns,
            grid,
            turn: 0,
            state: ExecutionState::Executing,
            evolver,
            events,
            control,
            sink,
            stats,
            ticker,
        })
    }

    /// Run the simulation to completion.
    ///
    /// Consumes the controller; when this returns, the event channel is
    /// closed and no further events will be observed.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] if a collaborator fails. The ticker is
    /// stopped before any error propagates.
    pub async fn run(mut self) -> Result<RunSummary, ControllerError> {
        info!(
            width = self.grid.width(),
            height = self.grid.height(),
            turns = self.turns,
            workers = self.evolver.workers(),
            "simulation starting"
        );

        self.ticker.start();
        let loop_result = self.turn_loop().await;
        match loop_result {
            Ok(()) => self.shutdown().await,
            Err(error) => {
                self.ticker.stop().await;
                Err(error)
            }
        }
    }

    /// The per-turn procedure: evolve, advance the counter, announce
    /// completion, then service at most one control command.
    async fn turn_loop(&mut self) -> Result<(), ControllerError> {
        while self.state != ExecutionState::Quitting && self.turn < self.turns {
            let computing = self.turn.saturating_add(1);
            self.evolver.step(&mut self.grid, computing, &self.events);
            self.turn = computing;

            self.stats.record(self.turn, self.grid.alive_count());
            let _ = self.events.send(Event::TurnComplete { turn: self.turn });

            self.drain_one_command().await?;
        }
        Ok(())
    }

    /// Non-blocking poll of the control channel: apply at most one
    /// pending command, return immediately if none is pending.
    async fn drain_one_command(&mut self) -> Result<(), ControllerError> {
        match self.control.try_recv() {
            Ok(command) => self.apply_command(command).await,
            // No command pending, or the input collaborator went away;
            // either way the loop proceeds.
            Err(mpsc::error::TryRecvError::Empty | mpsc::error::TryRecvError::Disconnected) => {
                Ok(())
            }
        }
    }

    /// Apply one command in the `Executing` state. Transitions not in
    /// the table (here: a redundant resume) are no-ops.
    async fn apply_command(&mut self, command: ControlCommand) -> Result<(), ControllerError> {
        match command {
            ControlCommand::Save => {
                debug!(turn = self.turn, "snapshot requested");
                snapshot::write_snapshot(self.sink.as_mut(), &self.grid, self.turn, &self.events)?;
                Ok(())
            }
            ControlCommand::Quit => {
                info!(turn = self.turn, "quit requested");
                snapshot::write_snapshot(self.sink.as_mut(), &self.grid, self.turn, &self.events)?;
                self.state = ExecutionState::Quitting;
                Ok(())
            }
            ControlCommand::Pause => self.enter_pause().await,
            ControlCommand::Resume => Ok(()),
        }
    }

    /// Enter the paused sub-state: stop the ticker, then block on the
    /// control channel until a resume arrives. Every other command is
    /// ignored while paused.
    async fn enter_pause(&mut self) -> Result<(), ControllerError> {
        // The ticker must be fully stopped before the pause is announced;
        // a tick delivered after `StateChange(Paused)` would violate the
        // silence observers rely on.
        self.ticker.stop().await;
        self.state = ExecutionState::Paused;
        let _ = self.events.send(Event::StateChange {
            turn: self.turn,
            new_state: ExecutionState::Paused,
        });
        info!(turn = self.turn, "simulation paused");

        while let Some(command) = self.control.recv().await {
            if command == ControlCommand::Resume {
                self.state = ExecutionState::Executing;
                let _ = self.events.send(Event::StateChange {
                    turn: self.turn,
                    new_state: ExecutionState::Executing,
                });
                self.ticker.start();
                info!(turn = self.turn, "simulation resumed");
                return Ok(());
            }
            debug!(turn = self.turn, ?command, "ignored while paused");
        }

        // The input collaborator closed while we were paused; there is
        // no way to resume, so finish the run cleanly.
        info!(turn = self.turn, "control input closed while paused, quitting");
        self.state = ExecutionState::Quitting;
        Ok(())
    }

    /// Shutdown sequencing (see module docs). The ticker is stopped on
    /// every path out of here.
    async fn shutdown(mut self) -> Result<RunSummary, ControllerError> {
        let write_result =
            snapshot::write_snapshot(self.sink.as_mut(), &self.grid, self.turn, &self.events);

        if write_result.is_ok() {
            let alive = self.grid.alive_cells();
            let _ = self.events.send(Event::FinalTurnComplete {
                turn: self.turn,
                alive,
            });
        }

        self.ticker.stop().await;
        write_result?;

        self.sink
            .flush_idle()
            .map_err(|source| ControllerError::Flush { source })?;

        let _ = self.events.send(Event::StateChange {
            turn: self.turn,
            new_state: ExecutionState::Quitting,
        });

        let alive = self.grid.alive_count();
        info!(
            turns_completed = self.turn,
            alive, "simulation finished"
        );

        Ok(RunSummary {
            turns_completed: self.turn,
            alive,
        })
        // Dropping `self` drops the last event senders, closing the
        // observer channel exactly once.
    }
}
