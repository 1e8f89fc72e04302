//! The supervised statistics ticker.
//!
//! A periodic background task that reports the live-cell count while the
//! simulation is executing. The ticker is an explicit resource with
//! `start`/`stop` operations scoped to the `Executing` state: it is
//! started at run begin and on resume, stopped on pause and at run end,
//! and at most one instance is ever live. [`StatsTicker::stop`] is
//! deterministic -- it signals the task and awaits its termination, so
//! once it returns no further `AliveCellsCount` can be emitted. A stale
//! tick firing after a pause is a defect this design rules out.
//!
//! The ticker never touches the grid. The controller refreshes a shared
//! atomic snapshot (last completed turn, live-cell count) at every turn
//! boundary, and the ticker reports that snapshot. Counts therefore carry
//! the turn "as of" observation time and interleave arbitrarily with
//! turn progress.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use conway_types::Event;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::EventSender;

/// Shared (turn, live-cell count) snapshot between the controller and
/// the ticker task.
///
/// The two fields are separate atomics; the pair is advisory and a read
/// racing a turn boundary may mix the fields, which the event contract
/// explicitly permits.
#[derive(Debug, Default)]
pub struct SharedStats {
    /// Last completed turn.
    turn: AtomicU64,
    /// Live-cell count as of that turn.
    alive: AtomicU64,
}

impl SharedStats {
    /// Create a zeroed snapshot.
    pub const fn new() -> Self {
        Self {
            turn: AtomicU64::new(0),
            alive: AtomicU64::new(0),
        }
    }

    /// Record the live-cell count for a completed turn.
    pub fn record(&self, turn: u64, alive: u64) {
        self.alive.store(alive, Ordering::Release);
        self.turn.store(turn, Ordering::Release);
    }

    /// Observe the latest (turn, live-cell count) pair.
    pub fn observe(&self) -> (u64, u64) {
        (
            self.turn.load(Ordering::Acquire),
            self.alive.load(Ordering::Acquire),
        )
    }
}

/// Handle to a live ticker task.
#[derive(Debug)]
struct RunningTicker {
    /// Signals the task to exit.
    shutdown: oneshot::Sender<()>,
    /// Joined on stop to confirm termination.
    handle: JoinHandle<()>,
}

/// The statistics ticker resource.
#[derive(Debug)]
pub struct StatsTicker {
    /// Time between reports.
    interval: Duration,
    /// Snapshot the ticker reports from.
    stats: Arc<SharedStats>,
    /// Observer channel.
    events: EventSender,
    /// The live task, if started.
    running: Option<RunningTicker>,
}

impl StatsTicker {
    /// Create a stopped ticker.
    pub const fn new(interval: Duration, stats: Arc<SharedStats>, events: EventSender) -> Self {
        Self {
            interval,
            stats,
            events,
            running: None,
        }
    }

    /// Whether a ticker task is currently live.
    pub const fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Start the ticker. A no-op if it is already running, so at most
    /// one task instance exists.
    pub fn start(&mut self) {
        if self.running.is_some() {
            return;
        }

        let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();
        let stats = Arc::clone(&self.stats);
        let events = self.events.clone();
        let period = self.interval;

        let handle = tokio::spawn(async move {
            // First report one full period after start, not immediately.
            let now = tokio::time::Instant::now();
            let first = now.checked_add(period).unwrap_or(now);
            let mut ticker = tokio::time::interval_at(first, period);
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        let (turn, count) = stats.observe();
                        let _ = events.send(Event::AliveCellsCount { turn, count });
                    }
                }
            }
        });

        self.running = Some(RunningTicker { shutdown, handle });
    }

    /// Stop the ticker and wait for the task to terminate. A no-op if it
    /// is not running.
    pub async fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.shutdown.send(());
            let _ = running.handle.await;
        }
    }
}
