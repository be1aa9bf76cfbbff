//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback core and
//! platform-specific implementations. Each trait represents a capability the
//! core requires but that must be implemented differently per platform
//! (desktop, iOS, Android).
//!
//! ## Traits
//!
//! ### Media Engine
//! - [`PlayerEngine`](engine::PlayerEngine) - Native media engine: load, play,
//!   pause, seek, position/duration queries, and an asynchronous event feed
//!   (end of item, interruptions, item presence, duration discovery)
//!
//! ### OS Integration
//! - [`MediaSession`](media_session::MediaSession) - Lock-screen / control
//!   center surface: session activation, now-playing publication, and the
//!   remote command feed
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations used for
//!   best-effort artwork retrieval
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to the host
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with descriptive errors when a required capability is
//! missing:
//!
//! ```ignore
//! use core_runtime::error::Error;
//!
//! pub fn new(config: CoreConfig) -> Result<Self> {
//!     let engine = config.player_engine
//!         .ok_or_else(|| Error::CapabilityMissing {
//!             capability: "PlayerEngine".to_string(),
//!             message: "No media engine implementation provided. \
//!                      Desktop: use bridge_desktop::SimulatedEngine. \
//!                      Mobile: inject the platform-native adapter.".to_string()
//!         })?;
//!     // ...
//! }
//! ```
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type for
//! consistent error handling. Platform implementations should:
//!
//! - Convert platform-specific errors to `BridgeError`
//! - Provide actionable error messages
//! - Include error context (e.g., URLs, session identifiers)
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds to support safe concurrent
//! usage across async tasks. Implementations must ensure thread safety.

pub mod engine;
pub mod error;
pub mod http;
pub mod media_session;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use engine::{EngineEvent, MediaSource, PlayerEngine};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use media_session::{MediaSession, NowPlayingInfo, RemoteCommand};
pub use time::{Clock, LogEntry, LogLevel, LoggerSink, SystemClock};
