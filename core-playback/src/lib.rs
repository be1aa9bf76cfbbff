//! # Core Playback
//!
//! Platform-agnostic playback domain: the FIFO queue, the playback state
//! machine, the coordinator actor that drives a [`PlayerEngine`], and the
//! observer channels UI layers subscribe to.
//!
//! ## Architecture
//!
//! ```text
//! PlaybackCoordinator (handle)
//!        | mpsc commands
//!        v
//! CoordinatorTask ----> PlayerEngine (bridge trait)
//!   |    |    |
//!   |    |    +--> NowPlayingPublisher --> MediaSession / HttpClient
//!   |    +--> StateMachine --> watch<PlaybackState>
//!   +--> EventBus --> broadcast<CoreEvent>
//!
//! ElapsedTimeObserver / DurationObserver / ItemPresenceObserver
//!   poll or fold engine output into watch channels
//! ```
//!
//! The coordinator owns all mutable session state; everything the outside
//! world sees flows through channels, so readers never contend with the
//! playback loop.
//!
//! [`PlayerEngine`]: bridge_traits::engine::PlayerEngine

pub mod coordinator;
pub mod error;
pub mod item;
pub mod now_playing;
pub mod observers;
pub mod queue;
pub mod state;

pub use coordinator::PlaybackCoordinator;
pub use error::{PlaybackError, Result};
pub use item::PlayableItem;
pub use now_playing::NowPlayingPublisher;
pub use observers::{DurationObserver, ElapsedTimeObserver, ItemPresenceObserver};
pub use queue::PlaybackQueue;
pub use state::{PlaybackState, StateEvent, StateMachine};
