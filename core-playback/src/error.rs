//! # Playback Error Types

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// Operation requires a loaded item but none is present.
    #[error("No item loaded")]
    NoItemLoaded,

    /// The media engine rejected or failed a command.
    #[error("Engine command failed: {0}")]
    EngineCommand(String),

    /// The coordinator task has shut down; its handle is no longer usable.
    #[error("Playback coordinator is shut down")]
    CoordinatorClosed,

    /// A bridge capability failed.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` if the operation may succeed when retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlaybackError::EngineCommand(_) | PlaybackError::Bridge(BridgeError::OperationFailed(_))
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(PlaybackError::EngineCommand("busy".into()).is_transient());
        assert!(!PlaybackError::CoordinatorClosed.is_transient());
        assert!(!PlaybackError::NoItemLoaded.is_transient());
    }
}
