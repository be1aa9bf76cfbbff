//! Error type shared by all bridge trait implementations.

use thiserror::Error;

/// Failure reported by a platform bridge.
///
/// Bridges translate their native error surface (engine status codes, HTTP
/// failures, OS session denials) into these coarse categories; the core only
/// decides between "retry", "degrade", and "give up", never on the native
/// detail.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The capability is absent on this platform or not yet granted.
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    /// The bridge accepted the call but the operation failed.
    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The media engine rejected or failed a playback command.
    #[error("Media engine error: {0}")]
    EngineError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Whether a retry could plausibly succeed. Missing capabilities are
    /// permanent; operational failures may be transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BridgeError::OperationFailed(_) | BridgeError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_capability_is_not_retryable() {
        assert!(!BridgeError::NotAvailable("media session".into()).is_retryable());
        assert!(BridgeError::OperationFailed("timeout".into()).is_retryable());
    }
}
