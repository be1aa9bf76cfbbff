//! Now-playing snapshot assembly and publication.
//!
//! Every play/resume/metadata refresh rebuilds a fresh snapshot from the
//! current item and engine readings and hands it to the media-session bridge.
//! Artwork is fetched best-effort in the background: the text-only snapshot
//! is published immediately and upgraded in place once the bytes arrive.
//! Loading a new item cancels the stale in-flight fetch.
//!
//! All failures here are non-fatal for playback. They are logged and
//! surfaced as [`DiagnosticEvent`]s on the event bus.

use crate::item::PlayableItem;
use bridge_traits::http::{HttpClient, HttpRequest};
use bridge_traits::media_session::{MediaSession, NowPlayingInfo};
use bridge_traits::error::BridgeError;
use bytes::Bytes;
use core_runtime::events::{CoreEvent, DiagnosticEvent, EventBus};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Publishes now-playing snapshots to the OS media session.
///
/// Owned by the coordinator task. When no media session bridge is configured
/// every operation is a cheap no-op; when no HTTP client is configured the
/// snapshot is published text-only.
pub struct NowPlayingPublisher {
    media_session: Option<Arc<dyn MediaSession>>,
    http_client: Option<Arc<dyn HttpClient>>,
    bus: EventBus,
    artwork_guard: CancellationToken,
}

impl NowPlayingPublisher {
    pub fn new(
        media_session: Option<Arc<dyn MediaSession>>,
        http_client: Option<Arc<dyn HttpClient>>,
        bus: EventBus,
    ) -> Self {
        Self {
            media_session,
            http_client,
            bus,
            artwork_guard: CancellationToken::new(),
        }
    }

    /// Cancel any in-flight artwork fetch. Called when a new item replaces
    /// the current one so a slow fetch for the old item cannot clobber the
    /// new publication.
    pub fn supersede(&mut self) {
        self.artwork_guard.cancel();
        self.artwork_guard = CancellationToken::new();
    }

    /// Activate the OS audio session. Failure is degraded, not fatal:
    /// playback proceeds and the condition is reported on the bus.
    pub async fn activate_session(&self) {
        let Some(session) = &self.media_session else {
            return;
        };
        if let Err(error) = session.activate().await {
            warn!(%error, "media session activation failed, continuing degraded");
            self.bus
                .emit(CoreEvent::Diagnostic(
                    DiagnosticEvent::MediaSessionUnavailable {
                        message: error.to_string(),
                    },
                ))
                .ok();
        }
    }

    /// Rebuild and publish the snapshot for the given item.
    ///
    /// Publishes text-only immediately; when the item carries an artwork URL
    /// and an HTTP client is available, a guarded background fetch upgrades
    /// the publication once the bytes arrive.
    pub async fn publish(
        &self,
        item: &PlayableItem,
        elapsed: Duration,
        duration: Option<Duration>,
        playback_rate: f32,
    ) {
        let Some(session) = &self.media_session else {
            return;
        };

        let info = NowPlayingInfo {
            title: item.title.clone(),
            author: item.author.clone(),
            elapsed,
            duration,
            playback_rate,
            artwork: None,
        };

        if let Err(error) = session.publish(info.clone()).await {
            warn!(%error, "now-playing publication failed");
            return;
        }

        let Some(url) = item.artwork_url.clone() else {
            return;
        };
        let Some(client) = self.http_client.clone() else {
            debug!("no HTTP client configured, publishing without artwork");
            return;
        };

        let session = Arc::clone(session);
        let bus = self.bus.clone();
        let token = self.artwork_guard.child_token();
        let item_id = item.id.to_string();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(url, "artwork fetch superseded by a newer item");
                }
                fetched = fetch_artwork(client, &url) => match fetched {
                    Ok(bytes) => {
                        if let Err(error) = session.publish(info.with_artwork(bytes)).await {
                            warn!(%error, "artwork publication failed");
                        }
                    }
                    Err(error) => {
                        warn!(%error, url, "artwork fetch failed, now-playing stays text-only");
                        bus.emit(CoreEvent::Diagnostic(DiagnosticEvent::ArtworkFetchFailed {
                            item_id,
                            url,
                            message: error.to_string(),
                        }))
                        .ok();
                    }
                },
            }
        });
    }

    /// Clear the now-playing surface (playback stopped).
    pub async fn clear(&self) {
        let Some(session) = &self.media_session else {
            return;
        };
        if let Err(error) = session.clear().await {
            warn!(%error, "failed to clear now-playing info");
        }
    }
}

/// Fetch artwork bytes over the HTTP bridge.
async fn fetch_artwork(
    client: Arc<dyn HttpClient>,
    url: &str,
) -> Result<Bytes, BridgeError> {
    let request = HttpRequest::get(url).timeout(Duration::from_secs(15));
    let response = client.execute(request).await?;
    if !response.is_success() {
        return Err(BridgeError::OperationFailed(format!(
            "artwork fetch returned HTTP {}",
            response.status
        )));
    }
    Ok(response.body)
}
