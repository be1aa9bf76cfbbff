//! Media Session Shim
//!
//! Desktop builds have no lock screen or control center, so the session
//! surface just records publications and logs them through `tracing`. The
//! remote-command feed is still real; tests and demo harnesses push commands
//! into it to exercise the coordinator's remote handling.

use bridge_traits::error::Result;
use bridge_traits::media_session::{MediaSession, NowPlayingInfo, RemoteCommand};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info};

const COMMAND_CAPACITY: usize = 16;

/// Recording media session backed by tracing output.
pub struct TracingMediaSession {
    commands: broadcast::Sender<RemoteCommand>,
    last_published: Mutex<Option<NowPlayingInfo>>,
    active: Mutex<bool>,
}

impl TracingMediaSession {
    pub fn new() -> Self {
        let (commands, _) = broadcast::channel(COMMAND_CAPACITY);
        Self {
            commands,
            last_published: Mutex::new(None),
            active: Mutex::new(false),
        }
    }

    /// Inject a remote command as if the OS transport controls sent it.
    pub fn push_command(&self, command: RemoteCommand) {
        self.commands.send(command).ok();
    }

    /// The most recently published snapshot, if any.
    pub fn last_published(&self) -> Option<NowPlayingInfo> {
        self.last_published.lock().clone()
    }

    /// Whether the session has been activated since construction.
    pub fn is_active(&self) -> bool {
        *self.active.lock()
    }
}

impl Default for TracingMediaSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaSession for TracingMediaSession {
    async fn activate(&self) -> Result<()> {
        let mut active = self.active.lock();
        if !*active {
            info!("media session activated");
            *active = true;
        }
        Ok(())
    }

    async fn publish(&self, info: NowPlayingInfo) -> Result<()> {
        debug!(
            title = %info.title,
            author = %info.author,
            elapsed_ms = info.elapsed.as_millis() as u64,
            duration_ms = info.duration.map(|d| d.as_millis() as u64),
            rate = info.playback_rate,
            artwork = info.has_artwork(),
            "now playing updated"
        );
        *self.last_published.lock() = Some(info);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        debug!("now playing cleared");
        *self.last_published.lock() = None;
        Ok(())
    }

    fn commands(&self) -> broadcast::Receiver<RemoteCommand> {
        self.commands.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn publish_records_latest_snapshot() {
        let session = TracingMediaSession::new();
        assert!(session.last_published().is_none());

        let info = NowPlayingInfo {
            title: "Episode 5".to_string(),
            author: "The Show".to_string(),
            elapsed: Duration::from_secs(12),
            duration: Some(Duration::from_secs(1800)),
            playback_rate: 1.0,
            artwork: None,
        };
        session.publish(info.clone()).await.unwrap();
        assert_eq!(session.last_published(), Some(info));

        session.clear().await.unwrap();
        assert!(session.last_published().is_none());
    }

    #[tokio::test]
    async fn pushed_commands_reach_subscribers() {
        let session = TracingMediaSession::new();
        let mut rx = session.commands();
        session.push_command(RemoteCommand::Pause);
        assert_eq!(rx.recv().await.unwrap(), RemoteCommand::Pause);
    }

    #[tokio::test]
    async fn activate_is_idempotent() {
        let session = TracingMediaSession::new();
        assert!(!session.is_active());
        session.activate().await.unwrap();
        session.activate().await.unwrap();
        assert!(session.is_active());
    }
}
