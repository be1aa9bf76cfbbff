//! # Playback Coordinator
//!
//! Orchestrates the playback session: one current item, one FIFO queue, one
//! media engine. Converts user intents and engine events into state-machine
//! transitions, queue mutations, and now-playing publications.
//!
//! ## Actor model
//!
//! All mutable playback state (queue, current item, state machine, pending
//! seek) lives inside a single spawned task. The public
//! [`PlaybackCoordinator`] handle sends typed commands over an mpsc channel
//! and reads results back through oneshot replies and `watch` feeds. Engine
//! events and OS remote commands are folded into the same select loop, so no
//! callback ever mutates coordinator state from a foreign execution context.
//!
//! ## Behavioral contracts
//!
//! - **Auto-advance**: when the engine reports end of item the coordinator
//!   dequeues and plays the next item, or stops when the queue is empty.
//!   Playback never silently halts mid-queue.
//! - **Conditional resume**: an interruption pauses unconditionally; when it
//!   ends, playback resumes only if the state is still `Paused` and the
//!   platform advised resuming.
//! - **Seek bracketing**: absolute seeks move the state to `Buffering` before
//!   the engine call and restore the prior state when the seek resolves. A
//!   newer seek supersedes an outstanding one; the stale completion is
//!   discarded.

use crate::error::{PlaybackError, Result};
use crate::item::PlayableItem;
use crate::now_playing::NowPlayingPublisher;
use crate::observers::{DurationObserver, ElapsedTimeObserver, ItemPresenceObserver};
use crate::queue::PlaybackQueue;
use crate::state::{PlaybackState, StateEvent, StateMachine};
use bridge_traits::engine::{EngineEvent, MediaSource, PlayerEngine};
use bridge_traits::media_session::RemoteCommand;
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Commands accepted by the coordinator task.
enum Command {
    Play(PlayableItem),
    Pause,
    Resume,
    Stop,
    SeekForward,
    SeekBackward,
    SeekTo(Duration),
    Enqueue(PlayableItem),
    Dequeue(oneshot::Sender<Option<PlayableItem>>),
    CurrentItem(oneshot::Sender<Option<PlayableItem>>),
    QueueSnapshot(oneshot::Sender<Vec<PlayableItem>>),
    RefreshNowPlaying,
    Shutdown,
}

/// Messages the task sends itself from spawned sub-tasks.
enum InternalMsg {
    SeekFinished {
        generation: u64,
        result: std::result::Result<(), bridge_traits::BridgeError>,
        target: Duration,
    },
}

/// Handle to a running playback coordinator.
///
/// Cheap operations push a command and return once it is accepted; query
/// operations await a reply. Dropping the handle tears down the coordinator
/// task and every observer channel.
pub struct PlaybackCoordinator {
    commands: mpsc::Sender<Command>,
    state_rx: watch::Receiver<PlaybackState>,
    bus: EventBus,
    elapsed: ElapsedTimeObserver,
    durations: DurationObserver,
    presence: ItemPresenceObserver,
    task: Option<JoinHandle<()>>,
}

impl PlaybackCoordinator {
    /// Spawn a coordinator from the given configuration.
    pub fn new(config: CoreConfig) -> Self {
        let engine = Arc::clone(&config.player_engine);
        let bus = EventBus::new(config.event_capacity);
        let (machine, state_rx) = StateMachine::new();

        let elapsed = ElapsedTimeObserver::spawn(Arc::clone(&engine), config.elapsed_interval);
        let durations = DurationObserver::spawn(engine.subscribe());
        let presence = ItemPresenceObserver::spawn(engine.subscribe());

        let publisher = NowPlayingPublisher::new(
            config.media_session.clone(),
            config.http_client.clone(),
            bus.clone(),
        );
        let remote_commands = config.media_session.as_ref().map(|s| s.commands());

        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();

        let task = CoordinatorTask {
            engine: Arc::clone(&engine),
            engine_events: engine.subscribe(),
            remote_commands,
            commands: cmd_rx,
            internal_tx,
            internal_rx,
            queue: PlaybackQueue::new(),
            current: None,
            machine,
            publisher,
            bus: bus.clone(),
            seek_step: config.seek_step,
            seek_generation: 0,
            pending_seek: None,
        };
        let task = tokio::spawn(task.run());

        Self {
            commands: cmd_tx,
            state_rx,
            bus,
            elapsed,
            durations,
            presence,
            task: Some(task),
        }
    }

    /// Replace whatever is loaded with `item` and start playback.
    pub async fn play(&self, item: PlayableItem) -> Result<()> {
        self.send(Command::Play(item)).await
    }

    /// Pause playback, keeping the current item loaded.
    pub async fn pause(&self) -> Result<()> {
        self.send(Command::Pause).await
    }

    /// Resume playback from pause.
    pub async fn resume(&self) -> Result<()> {
        self.send(Command::Resume).await
    }

    /// Stop playback, reset the position, and clear the current item.
    pub async fn stop(&self) -> Result<()> {
        self.send(Command::Stop).await
    }

    /// Seek forward by the configured step (default 15 s).
    pub async fn seek_forward(&self) -> Result<()> {
        self.send(Command::SeekForward).await
    }

    /// Seek backward by the configured step (default 15 s).
    pub async fn seek_backward(&self) -> Result<()> {
        self.send(Command::SeekBackward).await
    }

    /// Seek to an absolute position, bracketed by a buffering state.
    pub async fn seek_to(&self, position: Duration) -> Result<()> {
        self.send(Command::SeekTo(position)).await
    }

    /// Append an item to the playback queue.
    pub async fn enqueue(&self, item: PlayableItem) -> Result<()> {
        self.send(Command::Enqueue(item)).await
    }

    /// Remove and return the front queued item, if any.
    pub async fn dequeue(&self) -> Result<Option<PlayableItem>> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Dequeue(tx)).await?;
        rx.await.map_err(|_| PlaybackError::CoordinatorClosed)
    }

    /// The item currently loaded, if any.
    pub async fn current_item(&self) -> Result<Option<PlayableItem>> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::CurrentItem(tx)).await?;
        rx.await.map_err(|_| PlaybackError::CoordinatorClosed)
    }

    /// The pending queue contents in play order.
    pub async fn queue_snapshot(&self) -> Result<Vec<PlayableItem>> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::QueueSnapshot(tx)).await?;
        rx.await.map_err(|_| PlaybackError::CoordinatorClosed)
    }

    /// Rebuild and republish the now-playing snapshot.
    pub async fn refresh_now_playing(&self) -> Result<()> {
        self.send(Command::RefreshNowPlaying).await
    }

    /// The current playback state.
    pub fn state(&self) -> PlaybackState {
        *self.state_rx.borrow()
    }

    /// Read-only feed of playback state transitions.
    pub fn state_changes(&self) -> watch::Receiver<PlaybackState> {
        self.state_rx.clone()
    }

    /// Subscribe to coordinator events (lifecycle + diagnostics).
    pub fn events(&self) -> broadcast::Receiver<CoreEvent> {
        self.bus.subscribe()
    }

    /// The underlying event bus, for composing filtered streams.
    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    /// Read-only feed of sampled playback positions.
    pub fn elapsed_times(&self) -> watch::Receiver<Duration> {
        self.elapsed.subscribe()
    }

    /// Read-only feed of known item durations.
    pub fn durations(&self) -> watch::Receiver<Option<Duration>> {
        self.durations.subscribe()
    }

    /// Read-only feed of item presence flips.
    pub fn item_presence(&self) -> watch::Receiver<bool> {
        self.presence.subscribe()
    }

    /// Suppress or re-enable elapsed-time sampling during a scrub gesture.
    pub fn set_scrubbing(&self, scrubbing: bool) {
        self.elapsed.set_suppressed(scrubbing);
    }

    /// Gracefully shut the coordinator down, waiting for the task to exit.
    pub async fn shutdown(mut self) -> Result<()> {
        self.commands.send(Command::Shutdown).await.ok();
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        task.await.map_err(|e| PlaybackError::Internal(e.to_string()))
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PlaybackError::CoordinatorClosed)
    }
}

impl Drop for PlaybackCoordinator {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Record of a seek in flight.
#[derive(Debug, Clone, Copy)]
struct PendingSeek {
    resume_playing: bool,
}

/// The actor owning all mutable playback state.
struct CoordinatorTask {
    engine: Arc<dyn PlayerEngine>,
    engine_events: broadcast::Receiver<EngineEvent>,
    remote_commands: Option<broadcast::Receiver<RemoteCommand>>,
    commands: mpsc::Receiver<Command>,
    internal_tx: mpsc::UnboundedSender<InternalMsg>,
    internal_rx: mpsc::UnboundedReceiver<InternalMsg>,
    queue: PlaybackQueue,
    current: Option<PlayableItem>,
    machine: StateMachine,
    publisher: NowPlayingPublisher,
    bus: EventBus,
    seek_step: Duration,
    seek_generation: u64,
    pending_seek: Option<PendingSeek>,
}

impl CoordinatorTask {
    async fn run(mut self) {
        debug!("playback coordinator started");
        loop {
            tokio::select! {
                maybe_cmd = self.commands.recv() => {
                    match maybe_cmd {
                        Some(Command::Shutdown) | None => break,
                        Some(cmd) => self.handle_command(cmd).await,
                    }
                }
                engine_event = self.engine_events.recv() => {
                    match engine_event {
                        Ok(event) => self.handle_engine_event(event).await,
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!(missed, "coordinator lagged behind engine events");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            warn!("engine event feed closed, coordinator exiting");
                            break;
                        }
                    }
                }
                Some(msg) = self.internal_rx.recv() => {
                    self.handle_internal(msg).await;
                }
                remote = Self::next_remote(&mut self.remote_commands) => {
                    match remote {
                        Some(command) => self.handle_remote(command).await,
                        // Feed closed; stop selecting on it.
                        None => self.remote_commands = None,
                    }
                }
            }
        }
        debug!("playback coordinator stopped");
    }

    /// Pend forever when no media session provides remote commands.
    async fn next_remote(
        rx: &mut Option<broadcast::Receiver<RemoteCommand>>,
    ) -> Option<RemoteCommand> {
        match rx {
            Some(rx) => loop {
                match rx.recv().await {
                    Ok(command) => return Some(command),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            },
            None => std::future::pending().await,
        }
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Play(item) => self.start_item(item).await,
            Command::Pause => self.pause().await,
            Command::Resume => self.resume().await,
            Command::Stop => self.stop().await,
            Command::SeekForward => self.relative_seek(true).await,
            Command::SeekBackward => self.relative_seek(false).await,
            Command::SeekTo(position) => self.seek_to(position).await,
            Command::Enqueue(item) => {
                debug!(item_id = %item.id, title = %item.title, "item enqueued");
                self.queue.enqueue(item);
            }
            Command::Dequeue(reply) => {
                reply.send(self.queue.dequeue()).ok();
            }
            Command::CurrentItem(reply) => {
                reply.send(self.current.clone()).ok();
            }
            Command::QueueSnapshot(reply) => {
                reply.send(self.queue.snapshot()).ok();
            }
            Command::RefreshNowPlaying => self.publish_now_playing().await,
            // Intercepted by the run loop before dispatch.
            Command::Shutdown => {}
        }
    }

    async fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::PlaybackEnded => {
                if let Some(finished) = &self.current {
                    self.bus
                        .emit(CoreEvent::Playback(PlaybackEvent::Completed {
                            item_id: finished.id.to_string(),
                        }))
                        .ok();
                }
                self.advance_queue().await;
            }
            EngineEvent::InterruptionBegan => {
                if self.machine.apply(StateEvent::InterruptionBegan).is_some() {
                    if let Err(error) = self.engine.pause().await {
                        warn!(%error, "engine pause failed during interruption");
                    }
                    info!("audio interrupted, playback paused");
                    self.bus
                        .emit(CoreEvent::Playback(PlaybackEvent::InterruptionBegan))
                        .ok();
                }
            }
            EngineEvent::InterruptionEnded { should_resume } => {
                let resumed = self
                    .machine
                    .apply(StateEvent::InterruptionEnded { should_resume })
                    .is_some();
                if resumed {
                    if let Err(error) = self.engine.play().await {
                        warn!(%error, "engine resume failed after interruption");
                    }
                    self.publish_now_playing().await;
                }
                self.bus
                    .emit(CoreEvent::Playback(PlaybackEvent::InterruptionEnded {
                        should_resume,
                        resumed,
                    }))
                    .ok();
            }
            // Consumed by the observer channels.
            EngineEvent::ItemChanged { .. } | EngineEvent::DurationBecameKnown(_) => {}
        }
    }

    async fn handle_internal(&mut self, msg: InternalMsg) {
        match msg {
            InternalMsg::SeekFinished {
                generation,
                result,
                target,
            } => {
                if generation != self.seek_generation {
                    debug!(generation, "discarding superseded seek completion");
                    return;
                }
                let pending = self.pending_seek.take();
                if let Err(error) = result {
                    warn!(%error, "engine seek failed");
                }
                let resume_playing = pending.map(|p| p.resume_playing).unwrap_or(true);
                self.machine
                    .apply(StateEvent::SeekCompleted { resume_playing });
                self.bus
                    .emit(CoreEvent::Playback(PlaybackEvent::SeekCompleted {
                        position_ms: target.as_millis() as u64,
                    }))
                    .ok();
            }
        }
    }

    async fn handle_remote(&mut self, command: RemoteCommand) {
        debug!(?command, "remote command received");
        match command {
            RemoteCommand::Play => self.resume().await,
            RemoteCommand::Pause => self.pause().await,
            RemoteCommand::NextTrack => self.advance_queue().await,
            RemoteCommand::PreviousTrack => self.seek_to(Duration::ZERO).await,
            RemoteCommand::SeekForward => self.relative_seek(true).await,
            RemoteCommand::SeekBackward => self.relative_seek(false).await,
        }
    }

    /// Load `item`, start playback, and refresh the OS surfaces.
    async fn start_item(&mut self, item: PlayableItem) {
        self.publisher.supersede();
        self.pending_seek = None;
        self.seek_generation += 1; // invalidate outstanding seek completions

        let source = MediaSource::remote(item.stream_url.clone());
        if let Err(error) = self.engine.load(source).await {
            warn!(%error, item_id = %item.id, "engine failed to load item");
            return;
        }
        if let Err(error) = self.engine.play().await {
            warn!(%error, item_id = %item.id, "engine failed to start playback");
        }

        info!(item_id = %item.id, title = %item.title, "playback started");
        self.current = Some(item.clone());
        self.machine.apply(StateEvent::PlayRequested);
        self.publisher.activate_session().await;
        self.bus
            .emit(CoreEvent::Playback(PlaybackEvent::Started {
                item_id: item.id.to_string(),
                title: item.title.clone(),
            }))
            .ok();
        self.publish_now_playing().await;
    }

    async fn pause(&mut self) {
        if self.machine.apply(StateEvent::PauseRequested).is_none() {
            return;
        }
        if let Err(error) = self.engine.pause().await {
            warn!(%error, "engine pause failed");
        }
        let position = self.engine.position().await;
        self.bus
            .emit(CoreEvent::Playback(PlaybackEvent::Paused {
                position_ms: position.as_millis() as u64,
            }))
            .ok();
    }

    async fn resume(&mut self) {
        if self.machine.apply(StateEvent::ResumeRequested).is_none() {
            return;
        }
        if let Err(error) = self.engine.play().await {
            warn!(%error, "engine resume failed");
        }
        let position = self.engine.position().await;
        self.bus
            .emit(CoreEvent::Playback(PlaybackEvent::Resumed {
                position_ms: position.as_millis() as u64,
            }))
            .ok();
        self.publish_now_playing().await;
    }

    async fn stop(&mut self) {
        // Stopping with nothing selected is a no-op, not an error.
        if self.machine.apply(StateEvent::StopRequested).is_none() {
            return;
        }
        if let Err(error) = self.engine.pause().await {
            warn!(%error, "engine pause failed during stop");
        }
        if let Err(error) = self.engine.seek(Duration::ZERO).await {
            warn!(%error, "engine position reset failed during stop");
        }
        if let Err(error) = self.engine.unload().await {
            warn!(%error, "engine unload failed during stop");
        }
        self.current = None;
        self.pending_seek = None;
        self.seek_generation += 1; // invalidate outstanding seek completions
        self.publisher.supersede();
        self.publisher.clear().await;
        info!("playback stopped");
        self.bus
            .emit(CoreEvent::Playback(PlaybackEvent::Stopped))
            .ok();
    }

    /// Dequeue the next item and play it, or stop at end of queue.
    async fn advance_queue(&mut self) {
        match self.queue.dequeue() {
            Some(next) => {
                let remaining = self.queue.len();
                self.bus
                    .emit(CoreEvent::Playback(PlaybackEvent::QueueAdvanced {
                        item_id: next.id.to_string(),
                        remaining,
                    }))
                    .ok();
                self.start_item(next).await;
            }
            None => {
                debug!("queue exhausted, stopping");
                self.stop().await;
            }
        }
    }

    /// Fixed-offset seek. Relative seeks are not bracketed by a buffering
    /// state; target clamping is left to the engine.
    async fn relative_seek(&mut self, forward: bool) {
        if self.current.is_none() {
            debug!("relative seek ignored, no item loaded");
            return;
        }
        let position = self.engine.position().await;
        let target = if forward {
            position.saturating_add(self.seek_step)
        } else {
            position.saturating_sub(self.seek_step)
        };

        let engine = Arc::clone(&self.engine);
        tokio::spawn(async move {
            if let Err(error) = engine.seek(target).await {
                warn!(%error, "relative seek failed");
            }
        });
    }

    /// Absolute seek bracketed by `Buffering`. A newer seek supersedes an
    /// outstanding one; the stale completion is discarded by generation.
    async fn seek_to(&mut self, target: Duration) {
        if self.current.is_none() {
            debug!("seek ignored, no item loaded");
            return;
        }

        let resume_playing = match self.machine.current() {
            PlaybackState::Playing => true,
            PlaybackState::Paused => false,
            // Superseding a seek in flight keeps the original resume target.
            PlaybackState::Buffering => match self.pending_seek {
                Some(pending) => pending.resume_playing,
                None => return,
            },
            _ => return,
        };

        if self.machine.current() != PlaybackState::Buffering
            && self.machine.apply(StateEvent::SeekStarted).is_none()
        {
            return;
        }

        self.seek_generation += 1;
        self.pending_seek = Some(PendingSeek { resume_playing });
        self.bus
            .emit(CoreEvent::Playback(PlaybackEvent::SeekStarted {
                target_ms: target.as_millis() as u64,
            }))
            .ok();

        let engine = Arc::clone(&self.engine);
        let internal = self.internal_tx.clone();
        let generation = self.seek_generation;
        tokio::spawn(async move {
            let result = engine.seek(target).await;
            internal
                .send(InternalMsg::SeekFinished {
                    generation,
                    result,
                    target,
                })
                .ok();
        });
    }

    async fn publish_now_playing(&mut self) {
        let Some(item) = self.current.clone() else {
            return;
        };
        let elapsed = self.engine.position().await;
        let duration = self.engine.duration().await;
        let rate = self.engine.playback_rate().await;
        self.publisher.publish(&item, elapsed, duration, rate).await;
    }
}
