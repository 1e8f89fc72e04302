//! End-to-end tests for the simulation controller.
//!
//! These drive a full controller run over in-memory collaborators and
//! assert the observable event protocol: per-turn ordering, the control
//! state machine, ticker lifecycle, and shutdown sequencing.

// Integration tests use unwrap extensively for clarity -- panicking on
// failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::items_after_statements,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::indexing_slicing
)]

use std::time::Duration;

use conway_core::controller::{RunSummary, SimulationController};
use conway_core::config::SimulationConfig;
use conway_core::io::{MemorySink, MemorySource};
use conway_types::{Cell, ControlCommand, Event, ExecutionState};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// 5x5 toroidal blinker, horizontal phase.
const BLINKER: &[&str] = &[
    ".....",
    ".....",
    ".###.",
    ".....",
    ".....",
];

fn art_bytes(rows: &[&str]) -> Vec<u8> {
    rows.iter()
        .flat_map(|row| row.chars())
        .map(|ch| if ch == '#' { 255 } else { 0 })
        .collect()
}

fn blinker_config(turns: u64, workers: usize) -> String {
    format!(
        "grid:\n  width: 5\n  height: 5\nrun:\n  turns: {turns}\n  workers: {workers}\n"
    )
}

fn spawn_collector(mut rx: mpsc::UnboundedReceiver<Event>) -> JoinHandle<Vec<Event>> {
    tokio::spawn(async move {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    })
}

/// Run a controller to completion with commands pre-queued on the
/// control channel. Returns the full event stream (the collector only
/// finishes once the channel closes), the run summary, and the sink.
async fn run_with(
    yaml: &str,
    initial: &[&str],
    commands: &[ControlCommand],
) -> (Vec<Event>, RunSummary, MemorySink) {
    let config = SimulationConfig::parse(yaml).unwrap();
    let mut source = MemorySource::new(art_bytes(initial));
    let sink = MemorySink::new();

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (control_tx, control_rx) = mpsc::unbounded_channel();
    for command in commands {
        control_tx.send(*command).unwrap();
    }
    drop(control_tx);

    let controller = SimulationController::new(
        &config,
        &mut source,
        Box::new(sink.clone()),
        events_tx,
        control_rx,
    )
    .unwrap();

    let collector = spawn_collector(events_rx);
    let summary = controller.run().await.unwrap();
    let events = collector.await.unwrap();
    (events, summary, sink)
}

fn position_of(events: &[Event], wanted: &Event) -> usize {
    events
        .iter()
        .position(|event| event == wanted)
        .unwrap_or_else(|| panic!("event not found: {wanted:?}"))
}

#[tokio::test]
async fn full_run_event_protocol() {
    let (events, summary, sink) = run_with(&blinker_config(4, 2), BLINKER, &[]).await;

    // Initial load announces the three live cells at turn 0.
    let initial_flips: Vec<&Event> = events
        .iter()
        .filter(|event| matches!(event, Event::CellFlipped { turn: 0, .. }))
        .collect();
    assert_eq!(initial_flips.len(), 3);

    // TurnComplete(n) precedes TurnComplete(n+1), for turns 1..=4.
    let turn_completes: Vec<u64> = events
        .iter()
        .filter_map(|event| match event {
            Event::TurnComplete { turn } => Some(*turn),
            _ => None,
        })
        .collect();
    assert_eq!(turn_completes, vec![1, 2, 3, 4]);

    // Every CellFlipped tagged n appears before TurnComplete(n).
    for turn in 1..=4u64 {
        let barrier = position_of(&events, &Event::TurnComplete { turn });
        for (idx, event) in events.iter().enumerate() {
            if let Event::CellFlipped { turn: flip_turn, .. } = event {
                if *flip_turn == turn {
                    assert!(idx < barrier, "flip for turn {turn} after its barrier");
                }
            }
        }
    }

    // Shutdown sequencing: the stream ends with the final snapshot's
    // completion, the final report, and the quitting state change.
    let tail = &events[events.len() - 3..];
    assert!(matches!(
        tail[0],
        Event::ImageOutputComplete { turn: 4, ref label } if label == "5x5x4"
    ));
    // Period 2: after 4 turns the blinker is back in horizontal phase.
    assert_eq!(
        tail[1],
        Event::FinalTurnComplete {
            turn: 4,
            alive: vec![Cell::new(1, 2), Cell::new(2, 2), Cell::new(3, 2)],
        }
    );
    assert_eq!(
        tail[2],
        Event::StateChange {
            turn: 4,
            new_state: ExecutionState::Quitting,
        }
    );

    // The sink saw the idle handshake and holds the final image.
    assert!(sink.was_flushed());
    let images = sink.images();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].label, "5x5x4");
    assert_eq!(images[0].bytes, art_bytes(BLINKER));

    assert_eq!(
        summary,
        RunSummary {
            turns_completed: 4,
            alive: 3,
        }
    );
}

#[tokio::test]
async fn quit_exits_after_the_current_turn() {
    let (events, summary, sink) =
        run_with(&blinker_config(1000, 2), BLINKER, &[ControlCommand::Quit]).await;

    // Quit is observed at the first turn boundary: one in-flight turn
    // completes, then the loop exits.
    assert_eq!(summary.turns_completed, 1);

    // Quit writes a snapshot immediately, and shutdown writes the final
    // one; both are taken at turn 1.
    let images = sink.images();
    assert_eq!(images.len(), 2);
    assert!(images.iter().all(|image| image.label == "5x5x1"));

    assert_eq!(
        events.last(),
        Some(&Event::StateChange {
            turn: 1,
            new_state: ExecutionState::Quitting,
        })
    );
}

#[tokio::test]
async fn save_snapshots_the_current_turn_and_keeps_running() {
    let (events, summary, sink) =
        run_with(&blinker_config(3, 2), BLINKER, &[ControlCommand::Save]).await;

    assert_eq!(summary.turns_completed, 3);

    let images = sink.images();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].label, "5x5x1");
    assert_eq!(images[1].label, "5x5x3");

    let outputs = events
        .iter()
        .filter(|event| matches!(event, Event::ImageOutputComplete { .. }))
        .count();
    assert_eq!(outputs, 2);
}

#[tokio::test]
async fn pause_and_resume_are_idempotent() {
    // The second pause, the save while paused, and the second resume
    // must all be no-ops: no extra StateChange, no extra snapshot.
    let commands = [
        ControlCommand::Pause,
        ControlCommand::Pause,
        ControlCommand::Save,
        ControlCommand::Resume,
        ControlCommand::Resume,
        ControlCommand::Quit,
    ];
    let (events, summary, sink) =
        run_with(&blinker_config(1000, 2), BLINKER, &commands).await;

    let state_changes: Vec<ExecutionState> = events
        .iter()
        .filter_map(|event| match event {
            Event::StateChange { new_state, .. } => Some(*new_state),
            _ => None,
        })
        .collect();
    assert_eq!(
        state_changes,
        vec![
            ExecutionState::Paused,
            ExecutionState::Executing,
            ExecutionState::Quitting,
        ]
    );

    // Two snapshots: the quit-time write and the final write. The save
    // issued while paused produced none.
    assert_eq!(sink.images().len(), 2);
    assert_eq!(summary.turns_completed, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 3)]
async fn ticker_is_silent_while_paused() {
    const CYCLES: usize = 20;

    // A 1ms interval means a ticker that outlives the pause transition
    // fires inside the paused window with near certainty on every cycle.
    let yaml = "grid:\n  width: 5\n  height: 5\n\
                run:\n  turns: 1000000\n  workers: 2\n\
                stats:\n  interval_ms: 1\n";
    let config = SimulationConfig::parse(yaml).unwrap();
    let mut source = MemorySource::new(art_bytes(BLINKER));
    let sink = MemorySink::new();

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (control_tx, control_rx) = mpsc::unbounded_channel();

    let controller = SimulationController::new(
        &config,
        &mut source,
        Box::new(sink.clone()),
        events_tx,
        control_rx,
    )
    .unwrap();

    let collector = spawn_collector(events_rx);

    // Drive repeated pause/resume cycles, holding each pause across
    // several ticker periods, then quit.
    let driver = tokio::spawn(async move {
        for _ in 0..CYCLES {
            control_tx.send(ControlCommand::Pause).unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
            control_tx.send(ControlCommand::Resume).unwrap();
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        control_tx.send(ControlCommand::Quit).unwrap();
    });

    let _summary = controller.run().await.unwrap();
    driver.await.unwrap();
    let events = collector.await.unwrap();

    // Every window from StateChange(Paused) to the next
    // StateChange(Executing) must be free of AliveCellsCount: the ticker
    // is stopped before Paused is announced and restarted only after
    // Executing is re-entered.
    let mut paused_windows = 0;
    let mut paused = false;
    for (idx, event) in events.iter().enumerate() {
        match event {
            Event::StateChange {
                new_state: ExecutionState::Paused,
                ..
            } => {
                paused = true;
                paused_windows += 1;
            }
            Event::StateChange {
                new_state: ExecutionState::Executing,
                ..
            } => paused = false,
            Event::AliveCellsCount { .. } => {
                assert!(!paused, "ticker fired while paused (event {idx})");
            }
            _ => {}
        }
    }
    assert_eq!(paused_windows, CYCLES);
}

#[tokio::test]
async fn zero_turn_run_goes_straight_to_shutdown() {
    let (events, summary, sink) = run_with(&blinker_config(0, 2), BLINKER, &[]).await;

    assert_eq!(summary.turns_completed, 0);
    assert!(
        events
            .iter()
            .all(|event| !matches!(event, Event::TurnComplete { .. }))
    );
    assert_eq!(sink.images().len(), 1);
    assert_eq!(sink.images()[0].label, "5x5x0");
    assert_eq!(
        events.last(),
        Some(&Event::StateChange {
            turn: 0,
            new_state: ExecutionState::Quitting,
        })
    );
}

#[tokio::test]
async fn runs_are_deterministic_across_worker_counts() {
    let soup: &[&str] = &[
        "..#....#",
        "#..##...",
        ".###...#",
        "....#...",
        ".#...##.",
        "###....#",
        "........",
        "#..#..#.",
    ];
    let yaml_for = |workers: usize| {
        format!("grid:\n  width: 8\n  height: 8\nrun:\n  turns: 12\n  workers: {workers}\n")
    };

    let (_, reference_summary, reference_sink) = run_with(&yaml_for(1), soup, &[]).await;
    let reference_image = reference_sink.images().pop().unwrap();

    for workers in [2, 3, 7] {
        let (_, summary, sink) = run_with(&yaml_for(workers), soup, &[]).await;
        let image = sink.images().pop().unwrap();
        assert_eq!(summary, reference_summary, "summary diverged at {workers}");
        assert_eq!(image.bytes, reference_image.bytes, "grid diverged at {workers}");
    }
}
