//! Execution states and decoded control commands.
//!
//! The simulation controller is a three-state machine driven exclusively
//! by external control commands -- there are no spontaneous transitions.
//! The raw input collaborator delivers already-decoded single characters;
//! [`ControlCommand::from_char`] is the decode boundary, and unrecognized
//! characters are dropped there (a no-op, not an error).

use serde::{Deserialize, Serialize};

/// The controller's execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionState {
    /// The turn loop is advancing and the statistics ticker is live.
    Executing,
    /// The turn loop is blocked waiting for a resume command; the
    /// statistics ticker is fully stopped.
    Paused,
    /// A quit was observed; the loop exits at the current turn boundary.
    Quitting,
}

impl std::fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Executing => write!(f, "executing"),
            Self::Paused => write!(f, "paused"),
            Self::Quitting => write!(f, "quitting"),
        }
    }
}

/// A single decoded control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlCommand {
    /// Write a snapshot of the current grid at the current turn.
    Save,
    /// Write a snapshot, then exit the loop after the current turn.
    Quit,
    /// Enter the paused state and stop the statistics ticker.
    Pause,
    /// Leave the paused state and restart the statistics ticker.
    Resume,
}

impl ControlCommand {
    /// Decode a command character. Returns `None` for anything that is
    /// not a recognized command.
    pub const fn from_char(input: char) -> Option<Self> {
        match input {
            's' => Some(Self::Save),
            'q' => Some(Self::Quit),
            'p' => Some(Self::Pause),
            'r' => Some(Self::Resume),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognized_commands_decode() {
        assert_eq!(ControlCommand::from_char('s'), Some(ControlCommand::Save));
        assert_eq!(ControlCommand::from_char('q'), Some(ControlCommand::Quit));
        assert_eq!(ControlCommand::from_char('p'), Some(ControlCommand::Pause));
        assert_eq!(ControlCommand::from_char('r'), Some(ControlCommand::Resume));
    }

    #[test]
    fn unrecognized_characters_are_dropped() {
        assert_eq!(ControlCommand::from_char('x'), None);
        assert_eq!(ControlCommand::from_char('S'), None);
        assert_eq!(ControlCommand::from_char(' '), None);
        assert_eq!(ControlCommand::from_char('\n'), None);
    }

    #[test]
    fn execution_state_display() {
        assert_eq!(ExecutionState::Executing.to_string(), "executing");
        assert_eq!(ExecutionState::Paused.to_string(), "paused");
        assert_eq!(ExecutionState::Quitting.to_string(), "quitting");
    }
}
