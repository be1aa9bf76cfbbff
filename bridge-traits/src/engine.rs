//! Media engine bridge trait and supporting types.
//!
//! These abstractions let the playback core drive a platform media engine
//! (AVPlayer, ExoPlayer, GStreamer, ...) without knowing anything about
//! decoding, buffering, or hardware output. Host applications supply a
//! concrete implementation for their platform; the core only issues commands
//! and consumes the engine's event feed.

use crate::error::Result;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::broadcast;

/// Source locator handed to the engine when loading an item.
///
/// Podcast episodes are typically remote HTTP(S) streams, but local files are
/// supported for downloaded episodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Audio file stored locally on the filesystem.
    LocalFile { path: std::path::PathBuf },
    /// Remote HTTP(S) stream to be fetched by the engine.
    RemoteStream {
        url: String,
        headers: HashMap<String, String>,
    },
}

impl MediaSource {
    /// Build a remote stream source without extra headers.
    pub fn remote(url: impl Into<String>) -> Self {
        Self::RemoteStream {
            url: url.into(),
            headers: HashMap::new(),
        }
    }

    /// Determine whether the source represents remote content.
    pub fn is_remote(&self) -> bool {
        matches!(self, MediaSource::RemoteStream { .. })
    }

    /// The URL or path string identifying the source.
    pub fn locator(&self) -> String {
        match self {
            MediaSource::LocalFile { path } => path.display().to_string(),
            MediaSource::RemoteStream { url, .. } => url.clone(),
        }
    }
}

/// Events pushed by the engine to the playback core.
///
/// These map the callback/notification surface of native media engines into a
/// single typed feed consumed through a `broadcast` receiver. The engine never
/// decides what happens next; it only reports what occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The loaded item played to its end.
    PlaybackEnded,
    /// A system event (phone call, another app) suspended audio output.
    InterruptionBegan,
    /// The system interruption ended. `should_resume` carries the platform's
    /// hint that resuming playback is advisable.
    InterruptionEnded { should_resume: bool },
    /// The loaded item changed from absent to present or vice versa.
    ItemChanged { loaded: bool },
    /// The engine learned a finite, numeric duration for the loaded item.
    ///
    /// Implementations must NOT emit this for indefinite sources (live
    /// streams) or before a real duration is known; the typed payload is how
    /// NaN/indefinite values are kept out of the core.
    DurationBecameKnown(Duration),
}

/// Trait for platform media engine adapters.
///
/// The core holds exactly one engine per coordinator and calls it from a
/// single task; implementations may still be shared (`Send + Sync`) because
/// observer channels sample `position()` from their own tasks.
///
/// # Contract
///
/// - `seek` resolves only once the engine has finished repositioning; the
///   core brackets the call with a buffering state.
/// - `seek` targets are clamped by the engine to the item bounds; the core
///   does not re-validate them.
/// - Commands issued with no loaded item must be inexpensive no-ops, not
///   errors (the core treats them as such).
/// - `subscribe` may be called any number of times; each receiver observes
///   every event emitted after subscription.
#[async_trait::async_trait]
pub trait PlayerEngine: Send + Sync {
    /// Replace whatever is loaded with the given source. Does not start
    /// playback by itself.
    async fn load(&self, source: MediaSource) -> Result<()>;

    /// Unload the current item, releasing engine resources.
    async fn unload(&self) -> Result<()>;

    /// Begin or resume playback of the loaded item.
    async fn play(&self) -> Result<()>;

    /// Pause playback without releasing the loaded item.
    async fn pause(&self) -> Result<()>;

    /// Seek to an absolute position, clamped to the item bounds. Resolves
    /// when the repositioning is complete.
    async fn seek(&self, position: Duration) -> Result<()>;

    /// Current playback position. Zero when nothing is loaded.
    async fn position(&self) -> Duration;

    /// Total duration of the loaded item. `None` while unknown or when the
    /// source is indefinite (live stream).
    async fn duration(&self) -> Option<Duration>;

    /// Current playback rate (0.0 when paused/stopped, 1.0 when playing).
    async fn playback_rate(&self) -> f32;

    /// Whether an item is currently loaded.
    async fn is_loaded(&self) -> bool;

    /// Subscribe to the engine's event feed.
    fn subscribe(&self) -> broadcast::Receiver<EngineEvent>;
}
