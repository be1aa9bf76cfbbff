//! # Event Bus System
//!
//! Provides an event-driven architecture for the playback core using
//! `tokio::sync::broadcast`. This module enables decoupled communication
//! between the coordinator and its consumers (UI layer, OS integration,
//! diagnostics) through typed events.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: Strongly-typed enum hierarchies for playback and
//!   diagnostic domains
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with filtering
//! - **Subscription Management**: Multiple subscribers can listen independently
//!
//! ## Error Handling
//!
//! The event bus uses `tokio::sync::broadcast`, which can produce two types
//! of errors:
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n`
//!   events. This is non-fatal; the subscriber can continue receiving.
//! - **`RecvError::Closed`**: All senders have been dropped; shutdown signal.
//!
//! Subscribers should handle `Lagged` gracefully and treat `Closed` as a
//! signal to exit.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
///
/// This is the main event type published and received through the event bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Playback lifecycle events
    Playback(PlaybackEvent),
    /// Degraded-but-non-fatal conditions surfaced for reporting
    Diagnostic(DiagnosticEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Diagnostic(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Diagnostic(_) => EventSeverity::Warning,
            CoreEvent::Playback(PlaybackEvent::Started { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::Completed { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::Stopped) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events describing the playback lifecycle as observed by the coordinator.
///
/// Position is reported in milliseconds to keep payloads serializable and
/// lightweight; fine-grained elapsed-time sampling flows through the
/// dedicated observer channels instead of the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A new item started playing.
    Started {
        /// The item ID being played.
        item_id: String,
        /// Item title.
        title: String,
    },
    /// Playback paused.
    Paused {
        /// Position when paused (milliseconds).
        position_ms: u64,
    },
    /// Playback resumed after pause.
    Resumed {
        /// Position when resumed (milliseconds).
        position_ms: u64,
    },
    /// Playback stopped and the current item was cleared.
    Stopped,
    /// Item finished playing naturally.
    Completed {
        /// The item ID that completed.
        item_id: String,
    },
    /// The coordinator advanced to the next queued item.
    QueueAdvanced {
        /// The item ID now playing.
        item_id: String,
        /// Items remaining in the queue after the advance.
        remaining: usize,
    },
    /// A seek was issued; observers see a buffering state until it completes.
    SeekStarted {
        /// Seek target (milliseconds).
        target_ms: u64,
    },
    /// A seek completed and playback state was restored.
    SeekCompleted {
        /// Position after the seek (milliseconds).
        position_ms: u64,
    },
    /// A system interruption suspended playback.
    InterruptionBegan,
    /// A system interruption ended.
    InterruptionEnded {
        /// Whether the platform advised resuming.
        should_resume: bool,
        /// Whether the coordinator actually resumed.
        resumed: bool,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Resumed { .. } => "Playback resumed",
            PlaybackEvent::Stopped => "Playback stopped",
            PlaybackEvent::Completed { .. } => "Item completed",
            PlaybackEvent::QueueAdvanced { .. } => "Advanced to next queued item",
            PlaybackEvent::SeekStarted { .. } => "Seek started",
            PlaybackEvent::SeekCompleted { .. } => "Seek completed",
            PlaybackEvent::InterruptionBegan => "Playback interrupted",
            PlaybackEvent::InterruptionEnded { .. } => "Interruption ended",
        }
    }
}

// ============================================================================
// Diagnostic Events
// ============================================================================

/// Non-fatal degradations that callers may want to report.
///
/// These replace the silent logs of earlier iterations: the operation they
/// describe already continued in degraded form by the time the event is
/// published.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum DiagnosticEvent {
    /// Artwork could not be fetched; now-playing info was published without
    /// artwork.
    ArtworkFetchFailed {
        /// The item whose artwork failed.
        item_id: String,
        /// The artwork URL that failed.
        url: String,
        /// Human-readable failure message.
        message: String,
    },
    /// The OS media session could not be activated; playback was still
    /// attempted but may not survive backgrounding.
    MediaSessionUnavailable {
        /// Human-readable failure message.
        message: String,
    },
}

impl DiagnosticEvent {
    fn description(&self) -> &str {
        match self {
            DiagnosticEvent::ArtworkFetchFailed { .. } => "Artwork fetch failed",
            DiagnosticEvent::MediaSessionUnavailable { .. } => "Media session unavailable",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned for each subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of events to buffer per subscriber.
    ///   When a subscriber falls behind by more than this amount, it will
    ///   receive a `RecvError::Lagged` error.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    /// Returns an error if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver that will receive all future
    /// events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with additional filtering
/// capabilities.
///
/// This provides a more ergonomic API for consuming events with optional
/// filtering by event type or severity.
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter function to this stream.
    ///
    /// Only events that match the filter will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// This will skip events that don't match the filter and return the next
    /// matching event.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n`
    /// events. Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;

            let Some(filter) = &self.filter else {
                return Ok(event);
            };

            if filter(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    let Some(filter) = &self.filter else {
                        return Some(Ok(event));
                    };

                    if filter(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_creation() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        let event = CoreEvent::Playback(PlaybackEvent::Stopped);

        // Should error when no subscribers
        assert!(bus.emit(event).is_err());
    }

    #[tokio::test]
    async fn test_event_emission_with_subscribers() {
        let bus = EventBus::new(10);
        let mut sub = bus.subscribe();

        let event = CoreEvent::Playback(PlaybackEvent::Started {
            item_id: "ep-1".to_string(),
            title: "Episode One".to_string(),
        });

        let result = bus.emit(event.clone());
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), 1);

        let received = sub.recv().await.unwrap();
        assert_eq!(received, event);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = CoreEvent::Playback(PlaybackEvent::QueueAdvanced {
            item_id: "ep-2".to_string(),
            remaining: 3,
        });

        bus.emit(event.clone()).ok();

        let received1 = sub1.recv().await.unwrap();
        let received2 = sub2.recv().await.unwrap();

        assert_eq!(received1, event);
        assert_eq!(received2, event);
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Diagnostic(_)));

        // Emit playback event (should be filtered out)
        bus.emit(CoreEvent::Playback(PlaybackEvent::Paused { position_ms: 1000 }))
            .ok();

        // Emit diagnostic event (should pass through)
        let diagnostic = CoreEvent::Diagnostic(DiagnosticEvent::ArtworkFetchFailed {
            item_id: "ep-1".to_string(),
            url: "https://example.com/a.jpg".to_string(),
            message: "timeout".to_string(),
        });
        bus.emit(diagnostic.clone()).ok();

        let received = stream.recv().await.unwrap();
        assert_eq!(received, diagnostic);
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2); // Very small buffer
        let mut sub = bus.subscribe();

        for i in 0..5 {
            bus.emit(CoreEvent::Playback(PlaybackEvent::SeekStarted {
                target_ms: i * 1000,
            }))
            .ok();
        }

        // First recv should indicate lagging
        let result = sub.recv().await;
        assert!(matches!(result, Err(RecvError::Lagged(_))));
    }

    #[tokio::test]
    async fn test_event_severity() {
        let warning = CoreEvent::Diagnostic(DiagnosticEvent::MediaSessionUnavailable {
            message: "no audio focus".to_string(),
        });
        assert_eq!(warning.severity(), EventSeverity::Warning);

        let info = CoreEvent::Playback(PlaybackEvent::Started {
            item_id: "ep-1".to_string(),
            title: "Episode One".to_string(),
        });
        assert_eq!(info.severity(), EventSeverity::Info);

        let debug = CoreEvent::Playback(PlaybackEvent::SeekCompleted { position_ms: 42 });
        assert_eq!(debug.severity(), EventSeverity::Debug);
    }

    #[tokio::test]
    async fn test_event_serialization() {
        let event = CoreEvent::Playback(PlaybackEvent::InterruptionEnded {
            should_resume: true,
            resumed: true,
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("InterruptionEnded"));

        let deserialized: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe());

        assert!(stream.try_recv().is_none());
    }
}
