//! Runtime configuration and startup errors.

use thiserror::Error;

/// Errors raised while assembling or running the core runtime.
///
/// Capability problems are detected at build time, not at first use: a
/// coordinator constructed from a valid [`CoreConfig`] never discovers a
/// missing engine mid-playback.
///
/// [`CoreConfig`]: crate::config::CoreConfig
#[derive(Error, Debug)]
pub enum Error {
    /// A tunable was out of range or a filter string failed to parse.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required platform bridge was not provided. The message names the
    /// adapter the host should inject.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when the host can fix the problem by injecting a bridge
    /// implementation rather than changing configuration values.
    pub fn is_capability_missing(&self) -> bool {
        matches!(self, Error::CapabilityMissing { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_errors_are_classified() {
        let error = Error::CapabilityMissing {
            capability: "PlayerEngine".into(),
            message: "inject an engine adapter".into(),
        };
        assert!(error.is_capability_missing());
        assert!(!Error::Config("bad filter".into()).is_capability_missing());
    }

    #[test]
    fn display_includes_capability_name() {
        let error = Error::CapabilityMissing {
            capability: "PlayerEngine".into(),
            message: "missing".into(),
        };
        assert!(error.to_string().contains("PlayerEngine"));
    }
}
