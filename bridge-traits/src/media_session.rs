//! OS Media Session Abstraction
//!
//! Surfaces now-playing metadata to the platform's lock screen / control
//! center and relays remote commands (headset buttons, lock-screen controls)
//! back into the core.
//!
//! On iOS this maps to `MPNowPlayingInfoCenter` + `MPRemoteCommandCenter` and
//! audio-session activation; on Android to `MediaSession` and audio focus.
//! Desktop shims may simply log publications.
//!
//! # Degraded operation
//!
//! Session activation can fail (audio focus denied, backgrounding rules). The
//! core treats that as non-fatal: playback is still attempted and the failure
//! is reported as a diagnostic event. Implementations should therefore return
//! errors rather than panic.

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::broadcast;

/// Metadata bundle handed to the OS media controls.
///
/// Rebuilt from scratch on every play/resume/metadata refresh; never
/// persisted. Artwork is optional because its fetch is best-effort, and it
/// is skipped during serialization so snapshots stay text-sized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NowPlayingInfo {
    /// Display title for the item.
    pub title: String,
    /// Display author/artist string.
    pub author: String,
    /// Elapsed playback time at publication.
    pub elapsed: Duration,
    /// Total duration, when known. `None` for indefinite sources.
    pub duration: Option<Duration>,
    /// Playback rate (0.0 paused, 1.0 playing).
    pub playback_rate: f32,
    /// Encoded artwork image bytes, when the fetch succeeded.
    #[serde(skip)]
    pub artwork: Option<Bytes>,
}

impl NowPlayingInfo {
    /// Attach fetched artwork bytes.
    pub fn with_artwork(mut self, artwork: Bytes) -> Self {
        self.artwork = Some(artwork);
        self
    }

    /// Whether this publication carries artwork.
    pub fn has_artwork(&self) -> bool {
        self.artwork.is_some()
    }
}

/// Remote commands forwarded from OS-level media controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    Play,
    Pause,
    NextTrack,
    PreviousTrack,
    SeekForward,
    SeekBackward,
}

/// Trait for platform media-session adapters.
#[async_trait]
pub trait MediaSession: Send + Sync {
    /// Activate the platform audio session / media focus for playback.
    /// Called on every `play`; idempotent.
    async fn activate(&self) -> Result<()>;

    /// Publish a now-playing snapshot to the OS controls, replacing any
    /// previous publication.
    async fn publish(&self, info: NowPlayingInfo) -> Result<()>;

    /// Clear the now-playing surface (playback stopped).
    async fn clear(&self) -> Result<()>;

    /// Subscribe to remote commands issued through the OS controls.
    fn commands(&self) -> broadcast::Receiver<RemoteCommand>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_playing_defaults_have_no_artwork() {
        let info = NowPlayingInfo {
            title: "Episode 1".into(),
            author: "Some Show".into(),
            ..Default::default()
        };
        assert!(!info.has_artwork());
        assert_eq!(info.duration, None);
    }

    #[test]
    fn with_artwork_attaches_bytes() {
        let info = NowPlayingInfo::default().with_artwork(Bytes::from_static(b"\x89PNG"));
        assert!(info.has_artwork());
    }

    #[test]
    fn serialization_keeps_text_and_drops_artwork() {
        let info = NowPlayingInfo {
            title: "Episode 1".into(),
            author: "Some Show".into(),
            elapsed: Duration::from_secs(42),
            duration: Some(Duration::from_secs(1800)),
            playback_rate: 1.0,
            artwork: None,
        }
        .with_artwork(Bytes::from_static(b"\x89PNG"));

        let json = serde_json::to_string(&info).unwrap();
        assert!(!json.contains("artwork"));

        let back: NowPlayingInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back.title, "Episode 1");
        assert_eq!(back.duration, Some(Duration::from_secs(1800)));
        assert!(!back.has_artwork());
    }
}
