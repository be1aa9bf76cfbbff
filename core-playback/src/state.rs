//! Playback state machine.
//!
//! Earlier iterations of this feature set the state ad hoc from many call
//! sites, which allowed impossible transitions (resuming from `Stopped`,
//! buffering with nothing selected). The state is now only changed through a
//! closed transition table keyed by `(current state, event)`; combinations
//! not in the table are ignored, never applied.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;
use tracing::debug;

/// Observable playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing has been selected for playback yet.
    WaitingForSelection,
    /// The engine is repositioning or filling its buffer.
    Buffering,
    /// Audio is playing.
    Playing,
    /// Playback is suspended but the item remains loaded.
    Paused,
    /// Playback ended and the current item was cleared.
    Stopped,
    /// Playback is blocked on network connectivity.
    WaitingForConnection,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::WaitingForSelection => "waiting_for_selection",
            PlaybackState::Buffering => "buffering",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Stopped => "stopped",
            PlaybackState::WaitingForConnection => "waiting_for_connection",
        };
        f.write_str(name)
    }
}

/// Events that may move the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateEvent {
    /// A new item was loaded and playback was started.
    PlayRequested,
    /// The user (or an interruption) asked to pause.
    PauseRequested,
    /// The user asked to resume from pause.
    ResumeRequested,
    /// Playback was stopped and the item cleared.
    StopRequested,
    /// An absolute seek was issued; completion is asynchronous.
    SeekStarted,
    /// The outstanding seek finished. `resume_playing` restores the state
    /// captured when the seek began.
    SeekCompleted { resume_playing: bool },
    /// A system interruption suspended audio output.
    InterruptionBegan,
    /// The interruption ended; `should_resume` carries the platform hint.
    InterruptionEnded { should_resume: bool },
    /// Network connectivity was lost mid-stream.
    ConnectionLost,
    /// Network connectivity came back.
    ConnectionRestored,
}

/// The closed transition table.
///
/// Returns the next state for a valid `(state, event)` pair and `None` for
/// combinations that must be ignored.
pub fn transition(state: PlaybackState, event: StateEvent) -> Option<PlaybackState> {
    use PlaybackState::*;
    use StateEvent::*;

    match (state, event) {
        // Play replaces the loaded item outright, so it is valid from
        // anywhere.
        (_, PlayRequested) => Some(Playing),

        (Playing, PauseRequested) => Some(Paused),
        (Buffering, PauseRequested) => Some(Paused),

        (Paused, ResumeRequested) => Some(Playing),

        (Playing, StopRequested)
        | (Paused, StopRequested)
        | (Buffering, StopRequested)
        | (WaitingForConnection, StopRequested) => Some(Stopped),

        (Playing, SeekStarted) | (Paused, SeekStarted) => Some(Buffering),
        (Buffering, SeekCompleted { resume_playing }) => {
            Some(if resume_playing { Playing } else { Paused })
        }

        (Playing, InterruptionBegan) | (Buffering, InterruptionBegan) => Some(Paused),
        (Paused, InterruptionEnded { should_resume: true }) => Some(Playing),

        (Playing, ConnectionLost) | (Buffering, ConnectionLost) => Some(WaitingForConnection),
        (WaitingForConnection, ConnectionRestored) => Some(Buffering),

        _ => None,
    }
}

/// Owner of the current state plus its broadcast side.
///
/// Lives inside the coordinator task; consumers observe the state through the
/// paired `watch` receiver.
#[derive(Debug)]
pub struct StateMachine {
    current: PlaybackState,
    tx: watch::Sender<PlaybackState>,
}

impl StateMachine {
    /// Create a machine in `WaitingForSelection` and return the receiver half.
    pub fn new() -> (Self, watch::Receiver<PlaybackState>) {
        let (tx, rx) = watch::channel(PlaybackState::WaitingForSelection);
        (
            Self {
                current: PlaybackState::WaitingForSelection,
                tx,
            },
            rx,
        )
    }

    /// The current state.
    pub fn current(&self) -> PlaybackState {
        self.current
    }

    /// Apply an event through the transition table.
    ///
    /// Returns the new state when the transition was accepted; invalid
    /// combinations are logged and ignored.
    pub fn apply(&mut self, event: StateEvent) -> Option<PlaybackState> {
        match transition(self.current, event) {
            Some(next) => {
                debug!(from = %self.current, to = %next, ?event, "playback state transition");
                self.current = next;
                // Receivers may all be gone during shutdown; that is fine.
                let _ = self.tx.send(next);
                Some(next)
            }
            None => {
                debug!(state = %self.current, ?event, "ignoring invalid state transition");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PlaybackState::*;
    use super::StateEvent::*;
    use super::*;

    #[test]
    fn play_is_valid_from_anywhere() {
        for state in [
            WaitingForSelection,
            Buffering,
            Playing,
            Paused,
            Stopped,
            WaitingForConnection,
        ] {
            assert_eq!(transition(state, PlayRequested), Some(Playing));
        }
    }

    #[test]
    fn pause_resume_round_trip() {
        assert_eq!(transition(Playing, PauseRequested), Some(Paused));
        assert_eq!(transition(Paused, ResumeRequested), Some(Playing));
    }

    #[test]
    fn resume_from_stopped_is_ignored() {
        assert_eq!(transition(Stopped, ResumeRequested), None);
        assert_eq!(transition(WaitingForSelection, ResumeRequested), None);
    }

    #[test]
    fn stop_from_idle_states_is_ignored() {
        assert_eq!(transition(WaitingForSelection, StopRequested), None);
        assert_eq!(transition(Stopped, StopRequested), None);
    }

    #[test]
    fn seek_brackets_through_buffering() {
        assert_eq!(transition(Playing, SeekStarted), Some(Buffering));
        assert_eq!(
            transition(
                Buffering,
                SeekCompleted {
                    resume_playing: true
                }
            ),
            Some(Playing)
        );
        assert_eq!(
            transition(
                Buffering,
                SeekCompleted {
                    resume_playing: false
                }
            ),
            Some(Paused)
        );
    }

    #[test]
    fn seek_from_stopped_is_ignored() {
        assert_eq!(transition(Stopped, SeekStarted), None);
        assert_eq!(transition(WaitingForSelection, SeekStarted), None);
    }

    #[test]
    fn interruption_truth_table() {
        assert_eq!(transition(Playing, InterruptionBegan), Some(Paused));
        assert_eq!(
            transition(
                Paused,
                InterruptionEnded {
                    should_resume: true
                }
            ),
            Some(Playing)
        );
        // Not advisable to resume: stay paused.
        assert_eq!(
            transition(
                Paused,
                InterruptionEnded {
                    should_resume: false
                }
            ),
            None
        );
        // Interruption ending while already playing changes nothing.
        assert_eq!(
            transition(
                Playing,
                InterruptionEnded {
                    should_resume: true
                }
            ),
            None
        );
    }

    #[test]
    fn connection_loss_and_recovery() {
        assert_eq!(transition(Playing, ConnectionLost), Some(WaitingForConnection));
        assert_eq!(
            transition(WaitingForConnection, ConnectionRestored),
            Some(Buffering)
        );
        assert_eq!(transition(Paused, ConnectionLost), None);
    }

    #[test]
    fn machine_rejects_invalid_and_keeps_state() {
        let (mut machine, rx) = StateMachine::new();
        assert_eq!(machine.current(), WaitingForSelection);

        assert_eq!(machine.apply(ResumeRequested), None);
        assert_eq!(machine.current(), WaitingForSelection);
        assert_eq!(*rx.borrow(), WaitingForSelection);

        assert_eq!(machine.apply(PlayRequested), Some(Playing));
        assert_eq!(*rx.borrow(), Playing);
    }
}
