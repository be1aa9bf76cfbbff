//! Now-playing publication behavior: artwork upgrades, degraded paths, and
//! supersession of stale fetches.

use async_trait::async_trait;
use bridge_desktop::TracingMediaSession;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::media_session::{MediaSession, NowPlayingInfo, RemoteCommand};
use bytes::Bytes;
use core_playback::{NowPlayingPublisher, PlayableItem};
use core_runtime::events::{CoreEvent, DiagnosticEvent, EventBus};
use mockall::mock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(2);

mock! {
    ArtworkClient {}

    #[async_trait]
    impl HttpClient for ArtworkClient {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
    }
}

mock! {
    Session {}

    #[async_trait]
    impl MediaSession for Session {
        async fn activate(&self) -> BridgeResult<()>;
        async fn publish(&self, info: NowPlayingInfo) -> BridgeResult<()>;
        async fn clear(&self) -> BridgeResult<()>;
        fn commands(&self) -> broadcast::Receiver<RemoteCommand>;
    }
}

/// Client that takes a while before answering, for supersession tests.
struct SlowClient {
    delay: Duration,
    body: Bytes,
}

#[async_trait]
impl HttpClient for SlowClient {
    async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
        tokio::time::sleep(self.delay).await;
        Ok(HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: self.body.clone(),
        })
    }
}

fn item_with_artwork() -> PlayableItem {
    PlayableItem::new("Episode 1", "The Show", "https://cdn.test/ep1.mp3")
        .with_artwork_url("https://cdn.test/art1.jpg")
}

fn ok_response(body: &'static [u8]) -> HttpResponse {
    HttpResponse {
        status: 200,
        headers: HashMap::new(),
        body: Bytes::from_static(body),
    }
}

#[tokio::test]
async fn publish_without_session_is_a_no_op() {
    let bus = EventBus::new(16);
    let publisher = NowPlayingPublisher::new(None, None, bus);
    let item = item_with_artwork();
    // Must not panic or spawn anything that fails loudly.
    publisher
        .publish(&item, Duration::ZERO, None, 1.0)
        .await;
    publisher.clear().await;
}

#[tokio::test]
async fn publishes_text_only_without_http_client() {
    let session = Arc::new(TracingMediaSession::new());
    let bus = EventBus::new(16);
    let publisher = NowPlayingPublisher::new(Some(session.clone()), None, bus);

    let item = item_with_artwork();
    publisher
        .publish(&item, Duration::from_secs(10), Some(Duration::from_secs(60)), 1.0)
        .await;

    let info = session.last_published().expect("nothing published");
    assert_eq!(info.title, "Episode 1");
    assert_eq!(info.elapsed, Duration::from_secs(10));
    assert_eq!(info.duration, Some(Duration::from_secs(60)));
    assert!(!info.has_artwork());
}

#[tokio::test]
async fn artwork_fetch_upgrades_the_publication() {
    let session = Arc::new(TracingMediaSession::new());
    let bus = EventBus::new(16);

    let mut client = MockArtworkClient::new();
    client
        .expect_execute()
        .withf(|req| req.url == "https://cdn.test/art1.jpg")
        .returning(|_| Ok(ok_response(b"jpeg-bytes")));

    let publisher =
        NowPlayingPublisher::new(Some(session.clone()), Some(Arc::new(client)), bus);
    publisher
        .publish(&item_with_artwork(), Duration::ZERO, None, 1.0)
        .await;

    timeout(WAIT, async {
        loop {
            if let Some(info) = session.last_published() {
                if info.has_artwork() {
                    assert_eq!(info.artwork, Some(Bytes::from_static(b"jpeg-bytes")));
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("artwork upgrade never arrived");
}

#[tokio::test]
async fn failed_artwork_fetch_emits_diagnostic_and_stays_text_only() {
    let session = Arc::new(TracingMediaSession::new());
    let bus = EventBus::new(16);
    let mut events = bus.subscribe();

    let mut client = MockArtworkClient::new();
    client
        .expect_execute()
        .returning(|_| Err(BridgeError::OperationFailed("connection refused".into())));

    let item = item_with_artwork();
    let publisher =
        NowPlayingPublisher::new(Some(session.clone()), Some(Arc::new(client)), bus);
    publisher.publish(&item, Duration::ZERO, None, 1.0).await;

    let event = timeout(WAIT, events.recv())
        .await
        .expect("no diagnostic emitted")
        .unwrap();
    match event {
        CoreEvent::Diagnostic(DiagnosticEvent::ArtworkFetchFailed { item_id, url, .. }) => {
            assert_eq!(item_id, item.id.to_string());
            assert_eq!(url, "https://cdn.test/art1.jpg");
        }
        other => panic!("unexpected event: {other:?}"),
    }

    let info = session.last_published().expect("text-only publish missing");
    assert!(!info.has_artwork());
}

#[tokio::test]
async fn non_success_artwork_status_is_a_failure() {
    let session = Arc::new(TracingMediaSession::new());
    let bus = EventBus::new(16);
    let mut events = bus.subscribe();

    let mut client = MockArtworkClient::new();
    client.expect_execute().returning(|_| {
        Ok(HttpResponse {
            status: 404,
            headers: HashMap::new(),
            body: Bytes::new(),
        })
    });

    let publisher =
        NowPlayingPublisher::new(Some(session.clone()), Some(Arc::new(client)), bus);
    publisher
        .publish(&item_with_artwork(), Duration::ZERO, None, 1.0)
        .await;

    let event = timeout(WAIT, events.recv())
        .await
        .expect("no diagnostic emitted")
        .unwrap();
    assert!(matches!(
        event,
        CoreEvent::Diagnostic(DiagnosticEvent::ArtworkFetchFailed { .. })
    ));
}

#[tokio::test]
async fn superseded_fetch_never_lands() {
    let session = Arc::new(TracingMediaSession::new());
    let bus = EventBus::new(16);
    let client = Arc::new(SlowClient {
        delay: Duration::from_millis(150),
        body: Bytes::from_static(b"stale-art"),
    });

    let mut publisher = NowPlayingPublisher::new(Some(session.clone()), Some(client), bus);
    publisher
        .publish(&item_with_artwork(), Duration::ZERO, None, 1.0)
        .await;

    // A new item replaces the current one before the fetch resolves.
    publisher.supersede();
    let next = PlayableItem::new("Episode 2", "The Show", "https://cdn.test/ep2.mp3");
    publisher.publish(&next, Duration::ZERO, None, 1.0).await;

    tokio::time::sleep(Duration::from_millis(300)).await;
    let info = session.last_published().expect("nothing published");
    assert_eq!(info.title, "Episode 2");
    assert!(!info.has_artwork(), "stale artwork clobbered the new item");
}

#[tokio::test]
async fn activation_failure_surfaces_as_diagnostic() {
    let bus = EventBus::new(16);
    let mut events = bus.subscribe();

    let mut session = MockSession::new();
    session
        .expect_activate()
        .returning(|| Err(BridgeError::NotAvailable("audio focus denied".into())));

    let publisher = NowPlayingPublisher::new(Some(Arc::new(session)), None, bus);
    publisher.activate_session().await;

    let event = timeout(WAIT, events.recv())
        .await
        .expect("no diagnostic emitted")
        .unwrap();
    assert!(matches!(
        event,
        CoreEvent::Diagnostic(DiagnosticEvent::MediaSessionUnavailable { .. })
    ));
}
