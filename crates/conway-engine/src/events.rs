//! Observer task that logs the simulation event stream.
//!
//! The binary has no network observers; its observer is a logging task
//! that drains the event channel and maps each event onto a tracing
//! level. High-frequency events log at trace/debug so a default `info`
//! filter shows only lifecycle and snapshot activity.

use conway_types::Event;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

/// Spawn the event logging task.
///
/// The task runs until the event channel closes (the controller closes
/// it as its final shutdown step) and resolves to the number of events
/// observed.
pub fn spawn_event_logger(mut events: mpsc::UnboundedReceiver<Event>) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut observed: u64 = 0;
        while let Some(event) = events.recv().await {
            observed = observed.saturating_add(1);
            log_event(&event);
        }
        debug!(observed, "event stream closed");
        observed
    })
}

fn log_event(event: &Event) {
    match event {
        Event::CellFlipped { turn, cell } => {
            trace!(turn, cell = %cell, "cell flipped");
        }
        Event::TurnComplete { turn } => {
            debug!(turn, "turn complete");
        }
        Event::AliveCellsCount { turn, count } => {
            info!(turn, count, "alive cells");
        }
        Event::StateChange { turn, new_state } => {
            info!(turn, state = %new_state, "state change");
        }
        Event::ImageOutputComplete { turn, label } => {
            info!(turn, label = %label, "snapshot written");
        }
        Event::FinalTurnComplete { turn, alive } => {
            info!(turn, alive = alive.len(), "final turn complete");
        }
    }
}
