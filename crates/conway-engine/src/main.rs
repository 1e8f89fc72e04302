//! Engine binary for the Conway simulation.
//!
//! This is the entry point that wires together the grid source, snapshot
//! sink, keyboard control, event logging, and the simulation controller.
//! It loads configuration, initializes all collaborators, and runs the
//! simulation until the configured turn count is reached or a quit
//! command arrives.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `conway-config.yaml`
//! 3. Open the initial grid source (stored image or seeded random)
//! 4. Create the PGM snapshot sink
//! 5. Spawn the event logger and stdin control reader
//! 6. Build the controller and run the simulation
//! 7. Log the result

mod control;
mod error;
mod events;
mod io;

use std::path::Path;

use conway_core::config::SimulationConfig;
use conway_core::controller::SimulationController;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Application entry point for the Conway engine.
///
/// Initializes all collaborators and runs the simulation loop.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself
/// fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("conway-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        width = config.grid.width,
        height = config.grid.height,
        turns = config.run.turns,
        workers = config.run.workers,
        stats_interval_ms = config.stats.interval_ms,
        "Configuration loaded"
    );

    // 3. Open the initial grid source.
    let mut source = io::open_source(&config).map_err(EngineError::from)?;

    // 4. Create the snapshot sink.
    let sink = io::PgmSink::new(
        Path::new(io::OUTPUT_DIR).to_path_buf(),
        config.grid.width,
        config.grid.height,
    );

    // 5. Spawn the observer and control collaborators.
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let logger = events::spawn_event_logger(events_rx);
    let (control_rx, _stdin_handle) = control::spawn_stdin_reader();
    info!("Event logger and control reader started");

    // 6. Build and run the controller.
    let controller = SimulationController::new(
        &config,
        source.as_mut(),
        Box::new(sink),
        events_tx,
        control_rx,
    )
    .map_err(EngineError::from)?;

    let summary = controller.run().await.map_err(EngineError::from)?;

    // 7. Log results. The controller closed the event channel, so the
    //    logger task has a definite end.
    let observed = logger.await.unwrap_or(0);
    info!(
        turns_completed = summary.turns_completed,
        alive = summary.alive,
        events_observed = observed,
        "conway-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration from `conway-config.yaml`.
///
/// Looks for the config file relative to the current working directory
/// and falls back to defaults when it is absent.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = Path::new("conway-config.yaml");
    if config_path.exists() {
        let config = SimulationConfig::from_file(config_path)?;
        Ok(config)
    } else {
        info!("Config file not found, using defaults");
        Ok(SimulationConfig::default())
    }
}
