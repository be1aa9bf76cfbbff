//! Simulated Player Engine
//!
//! A clock-driven [`PlayerEngine`] for desktop demos and integration tests.
//! Playback position advances in real time while playing, end of item fires
//! after the configured duration elapses, and test hooks can inject
//! interruptions or force completion without waiting.

use bridge_traits::engine::{EngineEvent, MediaSource, PlayerEngine};
use bridge_traits::error::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

const EVENT_CAPACITY: usize = 64;

/// Mutable engine state. Position is derived, not ticked: `base_position`
/// plus wall time since `resumed_at` while playing.
struct Inner {
    source: Option<MediaSource>,
    duration: Option<Duration>,
    base_position: Duration,
    resumed_at: Option<Instant>,
    rate: f32,
    end_task: Option<JoinHandle<()>>,
}

impl Inner {
    fn position(&self) -> Duration {
        match self.resumed_at {
            Some(resumed_at) => self.base_position + resumed_at.elapsed().mul_f32(self.rate),
            None => self.base_position,
        }
    }

    /// Fold elapsed play time into `base_position` and stop the clock.
    fn settle(&mut self) {
        self.base_position = self.position();
        self.resumed_at = None;
        if let Some(task) = self.end_task.take() {
            task.abort();
        }
    }
}

/// Builder for [`SimulatedEngine`].
#[derive(Default)]
pub struct SimulatedEngineBuilder {
    durations: HashMap<String, Duration>,
    default_duration: Option<Duration>,
}

impl SimulatedEngineBuilder {
    /// Advertise a known duration for a source locator.
    pub fn with_source_duration(mut self, locator: impl Into<String>, duration: Duration) -> Self {
        self.durations.insert(locator.into(), duration);
        self
    }

    /// Duration assumed for sources without a configured one. When unset,
    /// unconfigured sources look like indefinite streams.
    pub fn with_default_duration(mut self, duration: Duration) -> Self {
        self.default_duration = Some(duration);
        self
    }

    pub fn build(self) -> SimulatedEngine {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        SimulatedEngine {
            inner: Arc::new(Mutex::new(Inner {
                source: None,
                duration: None,
                base_position: Duration::ZERO,
                resumed_at: None,
                rate: 1.0,
                end_task: None,
            })),
            events,
            durations: self.durations,
            default_duration: self.default_duration,
        }
    }
}

/// In-process media engine that plays nothing but keeps honest time.
pub struct SimulatedEngine {
    inner: Arc<Mutex<Inner>>,
    events: broadcast::Sender<EngineEvent>,
    durations: HashMap<String, Duration>,
    default_duration: Option<Duration>,
}

impl SimulatedEngine {
    pub fn builder() -> SimulatedEngineBuilder {
        SimulatedEngineBuilder::default()
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Simulate the platform taking the audio output away (phone call,
    /// another app). The engine pauses itself like a real one would.
    pub fn begin_interruption(&self) {
        self.inner.lock().settle();
        self.events.send(EngineEvent::InterruptionBegan).ok();
    }

    /// Simulate the interruption ending. `should_resume` mirrors the
    /// platform's advice about whether playback may restart.
    pub fn end_interruption(&self, should_resume: bool) {
        self.events
            .send(EngineEvent::InterruptionEnded { should_resume })
            .ok();
    }

    /// Jump straight to end of item and fire completion. Lets tests exercise
    /// queue advancement without waiting out the clock.
    pub fn complete_current(&self) {
        {
            let mut inner = self.inner.lock();
            if inner.source.is_none() {
                return;
            }
            inner.settle();
            if let Some(duration) = inner.duration {
                inner.base_position = duration;
            }
        }
        self.events.send(EngineEvent::PlaybackEnded).ok();
    }

    /// Arm the end-of-item timer for the remaining play time.
    fn schedule_end(&self, inner: &mut Inner) {
        let Some(duration) = inner.duration else {
            return;
        };
        let remaining = duration.saturating_sub(inner.base_position);
        let remaining = if inner.rate > 0.0 {
            remaining.div_f32(inner.rate)
        } else {
            remaining
        };

        let state = Arc::clone(&self.inner);
        let events = self.events.clone();
        inner.end_task = Some(tokio::spawn(async move {
            tokio::time::sleep(remaining).await;
            {
                let mut inner = state.lock();
                inner.base_position = duration;
                inner.resumed_at = None;
                inner.end_task = None;
            }
            events.send(EngineEvent::PlaybackEnded).ok();
        }));
    }
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlayerEngine for SimulatedEngine {
    async fn load(&self, source: MediaSource) -> Result<()> {
        let locator = source.locator();
        let duration = self
            .durations
            .get(&locator)
            .copied()
            .or(self.default_duration);

        {
            let mut inner = self.inner.lock();
            inner.settle();
            inner.source = Some(source);
            inner.duration = duration;
            inner.base_position = Duration::ZERO;
        }

        debug!(%locator, ?duration, "simulated engine loaded source");
        self.events.send(EngineEvent::ItemChanged { loaded: true }).ok();
        if let Some(duration) = duration {
            self.events
                .send(EngineEvent::DurationBecameKnown(duration))
                .ok();
        }
        Ok(())
    }

    async fn unload(&self) -> Result<()> {
        {
            let mut inner = self.inner.lock();
            inner.settle();
            inner.source = None;
            inner.duration = None;
            inner.base_position = Duration::ZERO;
        }
        self.events.send(EngineEvent::ItemChanged { loaded: false }).ok();
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        // Commands without a loaded item are no-ops per the engine contract.
        if inner.source.is_none() {
            return Ok(());
        }
        if inner.resumed_at.is_some() {
            return Ok(());
        }
        inner.resumed_at = Some(Instant::now());
        self.schedule_end(&mut inner);
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.inner.lock().settle();
        Ok(())
    }

    async fn seek(&self, position: Duration) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.source.is_none() {
            return Ok(());
        }
        let was_playing = inner.resumed_at.is_some();
        inner.settle();
        inner.base_position = match inner.duration {
            Some(duration) => position.min(duration),
            None => position,
        };
        if was_playing {
            inner.resumed_at = Some(Instant::now());
            self.schedule_end(&mut inner);
        }
        Ok(())
    }

    async fn position(&self) -> Duration {
        self.inner.lock().position()
    }

    async fn duration(&self) -> Option<Duration> {
        self.inner.lock().duration
    }

    async fn playback_rate(&self) -> f32 {
        let inner = self.inner.lock();
        if inner.resumed_at.is_some() {
            inner.rate
        } else {
            0.0
        }
    }

    async fn is_loaded(&self) -> bool {
        self.inner.lock().source.is_some()
    }

    fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(url: &str) -> MediaSource {
        MediaSource::remote(url.to_string())
    }

    #[tokio::test]
    async fn load_reports_item_and_duration() {
        let engine = SimulatedEngine::builder()
            .with_source_duration("https://cdn.test/ep1.mp3", Duration::from_secs(60))
            .build();
        let mut events = engine.subscribe();

        engine.load(remote("https://cdn.test/ep1.mp3")).await.unwrap();

        assert!(matches!(
            events.recv().await.unwrap(),
            EngineEvent::ItemChanged { loaded: true }
        ));
        assert_eq!(
            events.recv().await.unwrap(),
            EngineEvent::DurationBecameKnown(Duration::from_secs(60))
        );
        assert!(engine.is_loaded().await);
    }

    #[tokio::test]
    async fn unconfigured_source_has_no_duration() {
        let engine = SimulatedEngine::new();
        engine.load(remote("https://cdn.test/live")).await.unwrap();
        assert_eq!(engine.duration().await, None);
    }

    #[tokio::test]
    async fn position_advances_only_while_playing() {
        let engine = SimulatedEngine::builder()
            .with_default_duration(Duration::from_secs(600))
            .build();
        engine.load(remote("https://cdn.test/ep.mp3")).await.unwrap();

        assert_eq!(engine.position().await, Duration::ZERO);
        engine.play().await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        engine.pause().await.unwrap();

        let paused_at = engine.position().await;
        assert!(paused_at > Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(engine.position().await, paused_at);
    }

    #[tokio::test]
    async fn seek_clamps_to_duration() {
        let engine = SimulatedEngine::builder()
            .with_default_duration(Duration::from_secs(100))
            .build();
        engine.load(remote("https://cdn.test/ep.mp3")).await.unwrap();

        engine.seek(Duration::from_secs(500)).await.unwrap();
        assert_eq!(engine.position().await, Duration::from_secs(100));
    }

    #[tokio::test]
    async fn play_without_source_is_a_no_op() {
        let engine = SimulatedEngine::new();
        assert!(engine.play().await.is_ok());
        assert_eq!(engine.position().await, Duration::ZERO);
        assert_eq!(engine.playback_rate().await, 0.0);
    }

    #[tokio::test]
    async fn short_item_fires_playback_ended() {
        let engine = SimulatedEngine::builder()
            .with_default_duration(Duration::from_millis(20))
            .build();
        let mut events = engine.subscribe();
        engine.load(remote("https://cdn.test/ep.mp3")).await.unwrap();
        engine.play().await.unwrap();

        loop {
            match events.recv().await.unwrap() {
                EngineEvent::PlaybackEnded => break,
                _ => continue,
            }
        }
        assert_eq!(engine.position().await, Duration::from_millis(20));
    }

    #[tokio::test]
    async fn complete_current_forces_end() {
        let engine = SimulatedEngine::builder()
            .with_default_duration(Duration::from_secs(3600))
            .build();
        let mut events = engine.subscribe();
        engine.load(remote("https://cdn.test/ep.mp3")).await.unwrap();
        engine.play().await.unwrap();
        engine.complete_current();

        loop {
            match events.recv().await.unwrap() {
                EngineEvent::PlaybackEnded => break,
                _ => continue,
            }
        }
    }
}
