//! Keyboard control input for a running simulation.
//!
//! A background task reads lines from stdin, decodes the first character
//! of each line into a [`ControlCommand`], and forwards it to the
//! controller's control channel. Unrecognized input is logged and
//! dropped. The task ends when stdin closes; dropping the sender then
//! lets the controller observe a disconnected channel.

use conway_types::ControlCommand;
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Spawn the stdin reader task.
///
/// Returns the receiving half for the controller and the task handle.
/// The task exits on its own when stdin reaches end of file or the
/// controller drops the receiver.
pub fn spawn_stdin_reader() -> (mpsc::UnboundedReceiver<ControlCommand>, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let Some(key) = line.trim().chars().next() else {
                continue;
            };
            match ControlCommand::from_char(key) {
                Some(command) => {
                    debug!(?command, "control command read");
                    if tx.send(command).is_err() {
                        // Controller gone; nothing left to control.
                        break;
                    }
                }
                None => warn!(key = %key, "unrecognized control key"),
            }
        }
        debug!("control input closed");
    });

    (rx, handle)
}
