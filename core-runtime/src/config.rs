//! # Core Configuration Module
//!
//! Provides configuration management for the playback core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `CoreConfig` instance holding all bridge dependencies and tunables the
//! coordinator needs. It enforces fail-fast validation so a missing required
//! bridge surfaces at construction, not mid-playback.
//!
//! ## Required Dependencies
//!
//! - `PlayerEngine` - the platform media engine adapter
//!
//! ## Optional Dependencies
//!
//! - `HttpClient` - artwork retrieval; without it now-playing info is
//!   published text-only
//! - `MediaSession` - OS lock-screen surface; without it publication is
//!   skipped entirely
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .player_engine(Arc::new(MyEngine::new()))
//!     .http_client(Arc::new(MyHttpClient))
//!     .media_session(Arc::new(MyMediaSession))
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{HttpClient, MediaSession, PlayerEngine};
use std::sync::Arc;
use std::time::Duration;

/// Default sampling interval for the elapsed-time observer channel.
pub const DEFAULT_ELAPSED_INTERVAL: Duration = Duration::from_millis(500);

/// Default offset applied by `seek_forward` / `seek_backward`.
pub const DEFAULT_SEEK_STEP: Duration = Duration::from_secs(15);

/// Core configuration for the playback coordinator.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Platform media engine adapter (required).
    pub player_engine: Arc<dyn PlayerEngine>,

    /// HTTP client for artwork retrieval (optional).
    pub http_client: Option<Arc<dyn HttpClient>>,

    /// OS media-session surface (optional).
    pub media_session: Option<Arc<dyn MediaSession>>,

    /// Sampling interval for the elapsed-time channel.
    pub elapsed_interval: Duration,

    /// Fixed offset for relative seeks.
    pub seek_step: Duration,

    /// Buffer capacity for the event bus.
    pub event_capacity: usize,
}

impl CoreConfig {
    /// Start building a configuration.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("http_client", &self.http_client.is_some())
            .field("media_session", &self.media_session.is_some())
            .field("elapsed_interval", &self.elapsed_interval)
            .field("seek_step", &self.seek_step)
            .field("event_capacity", &self.event_capacity)
            .finish()
    }
}

/// Builder for [`CoreConfig`] with fail-fast validation.
#[derive(Default)]
pub struct CoreConfigBuilder {
    player_engine: Option<Arc<dyn PlayerEngine>>,
    http_client: Option<Arc<dyn HttpClient>>,
    media_session: Option<Arc<dyn MediaSession>>,
    elapsed_interval: Option<Duration>,
    seek_step: Option<Duration>,
    event_capacity: Option<usize>,
}

impl CoreConfigBuilder {
    /// Set the platform media engine adapter (required).
    pub fn player_engine(mut self, engine: Arc<dyn PlayerEngine>) -> Self {
        self.player_engine = Some(engine);
        self
    }

    /// Set the HTTP client used for artwork retrieval.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Set the OS media-session surface.
    pub fn media_session(mut self, session: Arc<dyn MediaSession>) -> Self {
        self.media_session = Some(session);
        self
    }

    /// Override the elapsed-time sampling interval (default 500 ms).
    pub fn elapsed_interval(mut self, interval: Duration) -> Self {
        self.elapsed_interval = Some(interval);
        self
    }

    /// Override the relative seek step (default 15 s).
    pub fn seek_step(mut self, step: Duration) -> Self {
        self.seek_step = Some(step);
        self
    }

    /// Override the event-bus buffer capacity (default 100).
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = Some(capacity);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityMissing`] when no player engine was
    /// provided, and [`Error::Config`] for invalid tunables.
    pub fn build(self) -> Result<CoreConfig> {
        let player_engine = self.player_engine.ok_or_else(|| Error::CapabilityMissing {
            capability: "PlayerEngine".to_string(),
            message: "No media engine implementation provided. \
                      Desktop: use bridge_desktop::SimulatedEngine. \
                      Mobile: inject the platform-native adapter."
                .to_string(),
        })?;

        let elapsed_interval = self.elapsed_interval.unwrap_or(DEFAULT_ELAPSED_INTERVAL);
        if elapsed_interval.is_zero() {
            return Err(Error::Config(
                "elapsed_interval must be greater than zero".to_string(),
            ));
        }

        let seek_step = self.seek_step.unwrap_or(DEFAULT_SEEK_STEP);
        if seek_step.is_zero() {
            return Err(Error::Config(
                "seek_step must be greater than zero".to_string(),
            ));
        }

        let event_capacity = self
            .event_capacity
            .unwrap_or(crate::events::DEFAULT_EVENT_BUFFER_SIZE);
        if event_capacity == 0 {
            return Err(Error::Config(
                "event_capacity must be greater than zero".to_string(),
            ));
        }

        Ok(CoreConfig {
            player_engine,
            http_client: self.http_client,
            media_session: self.media_session,
            elapsed_interval,
            seek_step,
            event_capacity,
        })
    }
}
