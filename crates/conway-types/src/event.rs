//! Event records emitted to the observer channel.
//!
//! Events are immutable, write-only from the core's perspective, and
//! carry the turn number they were produced at. The event channel is
//! multi-producer (partition workers, statistics ticker, controller) and
//! single-consumer; the controller owns the producer side and closes it
//! exactly once after shutdown sequencing completes.

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::control::ExecutionState;

/// An event emitted by the simulation core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A cell changed state during the given turn (or during the initial
    /// grid load, tagged turn 0).
    CellFlipped {
        /// Turn the flip belongs to.
        turn: u64,
        /// The coordinate that flipped.
        cell: Cell,
    },

    /// Every partition worker for the given turn has completed and the
    /// new generation is in place.
    TurnComplete {
        /// The turn that just completed.
        turn: u64,
    },

    /// Periodic statistics report: number of live cells as of the last
    /// completed turn at observation time. Interleaves arbitrarily with
    /// turn progress and must not be used to infer turn completion.
    AliveCellsCount {
        /// Last completed turn when the count was observed.
        turn: u64,
        /// Number of live cells.
        count: u64,
    },

    /// The controller transitioned to a new execution state.
    StateChange {
        /// Turn at which the transition happened.
        turn: u64,
        /// The state entered.
        new_state: ExecutionState,
    },

    /// The run is over; carries the full ordered live-cell set.
    FinalTurnComplete {
        /// The final turn number.
        turn: u64,
        /// Live cells in row-major scan order.
        alive: Vec<Cell>,
    },

    /// A snapshot finished writing to the grid sink.
    ImageOutputComplete {
        /// Turn the snapshot was taken at.
        turn: u64,
        /// Label the sink stored the image under.
        label: String,
    },
}

impl Event {
    /// The turn number this event is tagged with.
    pub const fn turn(&self) -> u64 {
        match self {
            Self::CellFlipped { turn, .. }
            | Self::TurnComplete { turn }
            | Self::AliveCellsCount { turn, .. }
            | Self::StateChange { turn, .. }
            | Self::FinalTurnComplete { turn, .. }
            | Self::ImageOutputComplete { turn, .. } => *turn,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_reports_its_turn() {
        let events = vec![
            Event::CellFlipped {
                turn: 1,
                cell: Cell::new(0, 0),
            },
            Event::TurnComplete { turn: 2 },
            Event::AliveCellsCount { turn: 3, count: 9 },
            Event::StateChange {
                turn: 4,
                new_state: ExecutionState::Paused,
            },
            Event::FinalTurnComplete {
                turn: 5,
                alive: Vec::new(),
            },
            Event::ImageOutputComplete {
                turn: 6,
                label: String::from("8x8x6"),
            },
        ];
        let turns: Vec<u64> = events.iter().map(Event::turn).collect();
        assert_eq!(turns, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn events_round_trip_through_json() {
        let event = Event::StateChange {
            turn: 12,
            new_state: ExecutionState::Quitting,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
