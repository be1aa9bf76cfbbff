//! Observer channels bridging the engine into push-based feeds.
//!
//! The native engine exposes position by polling and reports duration/item
//! changes through its event feed. These observers turn both into
//! `tokio::sync::watch` channels the UI layer can await. Each observer owns a
//! background task that is aborted when the observer is dropped, so no
//! callbacks outlive their owner.

use bridge_traits::engine::{EngineEvent, PlayerEngine};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::trace;

/// Emits the current playback position at a fixed sampling interval.
///
/// Sampling can be suppressed while the user drags a scrub slider so the UI
/// is not fighting stale updates mid-gesture.
pub struct ElapsedTimeObserver {
    rx: watch::Receiver<Duration>,
    suppressed: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl ElapsedTimeObserver {
    /// Spawn the sampling task against the given engine.
    pub fn spawn(engine: Arc<dyn PlayerEngine>, interval: Duration) -> Self {
        let (tx, rx) = watch::channel(Duration::ZERO);
        let suppressed = Arc::new(AtomicBool::new(false));
        let suppressed_flag = Arc::clone(&suppressed);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if suppressed_flag.load(Ordering::Relaxed) {
                    continue;
                }
                let position = engine.position().await;
                trace!(?position, "elapsed time sample");
                if tx.send(position).is_err() {
                    break;
                }
            }
        });

        Self {
            rx,
            suppressed,
            task,
        }
    }

    /// Subscribe to position samples. The receiver holds the most recent
    /// value.
    pub fn subscribe(&self) -> watch::Receiver<Duration> {
        self.rx.clone()
    }

    /// Suppress or re-enable sampling (scrub gesture in progress).
    pub fn set_suppressed(&self, suppressed: bool) {
        self.suppressed.store(suppressed, Ordering::Relaxed);
    }

    /// Whether sampling is currently suppressed.
    pub fn is_suppressed(&self) -> bool {
        self.suppressed.load(Ordering::Relaxed)
    }
}

impl Drop for ElapsedTimeObserver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Emits the item duration once the engine learns a finite value.
///
/// Holds `None` until a real duration is known. Indefinite sources (live
/// streams) never produce an emission; the engine contract keeps NaN and
/// indefinite values out of the feed, and a zero duration is additionally
/// treated as "not yet known" rather than surfaced.
pub struct DurationObserver {
    rx: watch::Receiver<Option<Duration>>,
    task: JoinHandle<()>,
}

impl DurationObserver {
    /// Spawn the observer on an engine event subscription.
    pub fn spawn(mut events: broadcast::Receiver<EngineEvent>) -> Self {
        let (tx, rx) = watch::channel(None);

        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(EngineEvent::DurationBecameKnown(duration)) => {
                        if duration.is_zero() {
                            continue;
                        }
                        if tx.send(Some(duration)).is_err() {
                            break;
                        }
                    }
                    // A new item invalidates whatever duration was known.
                    Ok(EngineEvent::ItemChanged { loaded: false }) => {
                        if tx.send(None).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Self { rx, task }
    }

    /// Subscribe to duration updates.
    pub fn subscribe(&self) -> watch::Receiver<Option<Duration>> {
        self.rx.clone()
    }
}

impl Drop for DurationObserver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Emits a boolean whenever the loaded item appears or disappears.
///
/// Drives "waiting for selection" vs "buffering" UI state.
pub struct ItemPresenceObserver {
    rx: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

impl ItemPresenceObserver {
    /// Spawn the observer on an engine event subscription.
    pub fn spawn(mut events: broadcast::Receiver<EngineEvent>) -> Self {
        let (tx, rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(EngineEvent::ItemChanged { loaded }) => {
                        if tx.send(loaded).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Self { rx, task }
    }

    /// Subscribe to presence updates.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.rx.clone()
    }
}

impl Drop for ItemPresenceObserver {
    fn drop(&mut self) {
        self.task.abort();
    }
}
