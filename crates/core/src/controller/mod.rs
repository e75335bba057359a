//! Playback controller - the streaming session state machine
//!
//! The controller owns the session handle, the prompt set, the scheduler and
//! the playback state. It is mutated only by its dispatcher loop, which
//! consumes one [`ControlEvent`] at a time:
//!
//! - user commands from [`ControllerHandle`]
//! - session events, tagged with the id of the session that raised them
//! - timer expiries (lookahead priming, throttled prompt flushes)
//!
//! ```text
//!            play()                 lookahead elapsed
//! stopped ──────────▶ loading ─────────────────────▶ playing
//!    ▲                 │  ▲                          │   │
//!    │     toggle/stop │  │ play()          underrun │   │ pause()
//!    └─────────────────┘  └───────── paused ◀────────┼───┘
//!    ▲                                               │
//!    └───────── stop() / connection error ───────────┘
//! ```
//!
//! Timers never touch state directly. They post an event back into the loop,
//! and the handler checks that the world still matches: a lookahead timer
//! carries the epoch of the playback sequence that armed it, so a pause or
//! stop in the meantime makes it a no-op.
//!
//! Connecting works the same way. The connect runs on its own task and posts
//! [`ControlEvent::Connected`] tagged with its attempt number, so commands keep
//! flowing while it is pending. Stop, pause or a toggle while connecting
//! abandon the attempt, and a session that connects after being abandoned is
//! closed on arrival.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use promptdj_core::audio::OutputGraph;
//! use promptdj_core::controller::{Notifier, PlaybackController};
//! use promptdj_core::session::{MusicSession, SessionConnector, SessionEventSink};
//! use promptdj_core::{Error, PlaybackState, PlayerConfig, PromptSet};
//!
//! struct Offline;
//!
//! #[async_trait]
//! impl SessionConnector for Offline {
//!     async fn connect(
//!         &self,
//!         _model: &str,
//!         _events: SessionEventSink,
//!     ) -> promptdj_core::Result<Box<dyn MusicSession>> {
//!         Err(Error::Connect("offline".into()))
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let config = PlayerConfig::default();
//! let graph = OutputGraph::new(config.audio.sample_rate, config.audio.channels);
//! let mut prompts = PromptSet::new();
//! prompts.add_weighted("Minimal Techno", 1.0, "#5200ff");
//! let (notifier, mut notifications) = Notifier::channel();
//!
//! let (controller, events) =
//!     PlaybackController::new(config, Arc::new(Offline), graph, prompts, notifier).unwrap();
//! let (handle, task) = controller.spawn(events);
//!
//! handle.play();
//! let notice = notifications.recv().await.unwrap();
//! assert!(notice.message.contains("offline"));
//! assert_eq!(handle.state(), PlaybackState::Stopped);
//!
//! handle.shutdown();
//! task.await.unwrap();
//! # });
//! ```

mod handle;
mod notify;
mod throttle;

pub use handle::ControllerHandle;
pub use notify::{Notification, NotificationLevel, Notifier, CONNECTION_LOST, NO_ACTIVE_PROMPTS};
pub use throttle::{Admission, Throttle};

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use crate::audio::{AudioChunkDecoder, OutputGraph};
use crate::config::PlayerConfig;
use crate::playback::{Anchor, PlaybackScheduler, PlaybackState, ScheduleOutcome};
use crate::prompts::{FilteredSet, PromptSet, WeightedPrompt};
use crate::session::{
    AudioChunk, GenerationConfig, MusicSession, SessionConnector, SessionEvent, SessionEventSink,
    SessionId,
};
use crate::{Error, Result};

/// A user-level request
#[derive(Debug, Clone)]
pub enum Command {
    /// Start or resume playback
    Play,
    /// Pause, keeping the session connected
    Pause,
    /// Stop and release the session
    Stop,
    /// Play/pause toggle as bound to the UI and media keys
    Toggle,
    /// Replace the prompt set
    UpdatePrompts(PromptSet),
    /// Replace the generation parameters
    SetGenerationConfig(GenerationConfig),
    /// Stop and end the dispatcher loop
    Shutdown,
}

/// Everything the dispatcher loop consumes
pub enum ControlEvent {
    /// User request
    Command(Command),
    /// Event raised by a session
    Session {
        /// Session that raised the event
        id: SessionId,
        /// The event
        event: SessionEvent,
    },
    /// Lookahead or recovery delay elapsed
    BufferPrimed {
        /// Playback epoch that armed the timer
        epoch: u64,
    },
    /// Throttle interval for prompt pushes elapsed
    FlushPrompts,
    /// A connect attempt finished
    Connected {
        /// Attempt number assigned when the connect started
        attempt: u64,
        /// Id the session's events are tagged with
        id: SessionId,
        /// The connected session or the connect error
        result: Result<Box<dyn MusicSession>>,
    },
}

impl std::fmt::Debug for ControlEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlEvent::Command(command) => f.debug_tuple("Command").field(command).finish(),
            ControlEvent::Session { id, event } => f
                .debug_struct("Session")
                .field("id", id)
                .field("event", event)
                .finish(),
            ControlEvent::BufferPrimed { epoch } => f
                .debug_struct("BufferPrimed")
                .field("epoch", epoch)
                .finish(),
            ControlEvent::FlushPrompts => f.write_str("FlushPrompts"),
            ControlEvent::Connected { attempt, id, result } => f
                .debug_struct("Connected")
                .field("attempt", attempt)
                .field("id", id)
                .field("ok", &result.is_ok())
                .finish(),
        }
    }
}

struct ActiveSession {
    id: SessionId,
    session: Box<dyn MusicSession>,
}

/// The streaming session state machine
pub struct PlaybackController {
    config: PlayerConfig,
    connector: Arc<dyn SessionConnector>,
    events_tx: mpsc::UnboundedSender<ControlEvent>,

    decoder: AudioChunkDecoder,
    scheduler: PlaybackScheduler,

    prompts: PromptSet,
    filtered: FilteredSet,
    generation: GenerationConfig,
    push_throttle: Throttle<Vec<WeightedPrompt>>,

    session: Option<ActiveSession>,
    connection_error: bool,
    /// Attempt number of the connect in flight
    connecting: Option<u64>,
    connect_attempts: u64,

    state_tx: watch::Sender<PlaybackState>,
    /// Bumped whenever a playback sequence starts or ends
    epoch: u64,

    notifier: Notifier,
}

impl PlaybackController {
    /// Create a controller and the receiving end of its event channel
    ///
    /// `graph` must render in the stream format named by `config.audio`.
    pub fn new(
        config: PlayerConfig,
        connector: Arc<dyn SessionConnector>,
        graph: OutputGraph,
        prompts: PromptSet,
        notifier: Notifier,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ControlEvent>)> {
        config.validate()?;
        if graph.sample_rate() != config.audio.sample_rate
            || graph.channels() != config.audio.channels
        {
            return Err(Error::Config(format!(
                "output graph renders {} Hz / {} ch but the stream is {} Hz / {} ch",
                graph.sample_rate(),
                graph.channels(),
                config.audio.sample_rate,
                config.audio.channels
            )));
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(PlaybackState::Stopped);

        let controller = Self {
            decoder: AudioChunkDecoder::new(config.audio.sample_rate, config.audio.channels),
            scheduler: PlaybackScheduler::new(
                graph,
                config.buffer.lookahead_secs,
                config.buffer.recovery_gap_secs,
            ),
            generation: config.generation.clone(),
            push_throttle: Throttle::new(config.prompts.interval()),
            config,
            connector,
            events_tx,
            prompts,
            filtered: FilteredSet::new(),
            session: None,
            connection_error: false,
            connecting: None,
            connect_attempts: 0,
            state_tx,
            epoch: 0,
            notifier,
        };

        Ok((controller, events_rx))
    }

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        *self.state_tx.borrow()
    }

    /// Whether the last session ended in an error
    pub fn connection_error(&self) -> bool {
        self.connection_error
    }

    /// Whether a session is open
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Whether a connect attempt is in flight
    pub fn is_connecting(&self) -> bool {
        self.connecting.is_some()
    }

    /// Id of the open session
    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|active| active.id)
    }

    /// Current prompt set
    pub fn prompts(&self) -> &PromptSet {
        &self.prompts
    }

    /// Prompts the service has refused
    pub fn filtered(&self) -> &FilteredSet {
        &self.filtered
    }

    /// Current generation parameters
    pub fn generation_config(&self) -> &GenerationConfig {
        &self.generation
    }

    /// The lookahead scheduler
    pub fn scheduler(&self) -> &PlaybackScheduler {
        &self.scheduler
    }

    /// The output graph
    pub fn graph(&self) -> &OutputGraph {
        self.scheduler.graph()
    }

    /// Sender feeding this controller's dispatcher loop
    pub fn sender(&self) -> mpsc::UnboundedSender<ControlEvent> {
        self.events_tx.clone()
    }

    /// Watch receiver of the playback state
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state_tx.subscribe()
    }

    /// Run the dispatcher loop on a new task
    pub fn spawn(
        self,
        events: mpsc::UnboundedReceiver<ControlEvent>,
    ) -> (ControllerHandle, JoinHandle<()>) {
        let handle = ControllerHandle::new(self.sender(), self.subscribe());
        let task = tokio::spawn(self.run(events));
        (handle, task)
    }

    /// Dispatcher loop: handle events until shutdown
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<ControlEvent>) {
        info!("Playback controller started (model '{}')", self.config.model);
        while let Some(event) = events.recv().await {
            if !self.handle(event).await {
                break;
            }
        }
        info!("Playback controller stopped");
    }

    /// Handle one event; returns false when the loop should end
    pub async fn handle(&mut self, event: ControlEvent) -> bool {
        match event {
            ControlEvent::Command(command) => return self.handle_command(command).await,
            ControlEvent::Session { id, event } => self.handle_session_event(id, event).await,
            ControlEvent::BufferPrimed { epoch } => self.on_buffer_primed(epoch),
            ControlEvent::FlushPrompts => {
                if let Some(snapshot) = self.push_throttle.fire_due(tokio::time::Instant::now()) {
                    self.push_prompts(snapshot).await;
                }
            }
            ControlEvent::Connected {
                attempt,
                id,
                result,
            } => self.on_connected(attempt, id, result).await,
        }
        true
    }

    async fn handle_command(&mut self, command: Command) -> bool {
        debug!("Command {:?} in state {}", command, self.state());
        match command {
            Command::Play => self.play().await,
            Command::Pause => self.pause().await,
            Command::Stop => self.stop().await,
            Command::Toggle => self.toggle().await,
            Command::UpdatePrompts(prompts) => self.update_prompts(prompts).await,
            Command::SetGenerationConfig(config) => self.set_generation_config(config).await,
            Command::Shutdown => {
                self.stop().await;
                return false;
            }
        }
        true
    }

    /// Start or resume playback
    pub async fn play(&mut self) {
        let state = self.state();
        if matches!(state, PlaybackState::Loading | PlaybackState::Playing) {
            trace!("play() ignored in state {}", state);
            return;
        }

        if self.snapshot().is_empty() {
            self.notifier.warn(NO_ACTIVE_PROMPTS);
            return;
        }

        self.set_state(PlaybackState::Loading);

        if self.session.is_some() && !self.connection_error {
            self.start_sequence(false).await;
        } else {
            self.begin_connect().await;
        }
    }

    /// Pause playback, keeping the session connected
    pub async fn pause(&mut self) {
        let state = self.state();
        if state == PlaybackState::Stopped {
            trace!("pause() ignored while stopped");
            return;
        }

        if self.connecting.take().is_some() {
            debug!("Connect abandoned by pause");
        }
        if state.is_active() {
            if let Some(active) = self.session.as_mut() {
                if let Err(e) = active.session.pause().await {
                    warn!("Session pause failed: {}", e);
                }
            }
        }

        self.set_state(PlaybackState::Paused);
        self.silence(self.config.gain.pause_ramp_secs);
    }

    /// Stop playback and release the session
    pub async fn stop(&mut self) {
        if self.connecting.take().is_some() {
            debug!("Connect abandoned by stop");
        }
        if let Some(mut active) = self.session.take() {
            if let Err(e) = active.session.stop().await {
                warn!("Session {} stop failed: {}", active.id, e);
            }
            if let Err(e) = active.session.close().await {
                warn!("Session {} close failed: {}", active.id, e);
            }
            info!(session_id = %active.id, "Session released");
        }

        if self.push_throttle.has_pending() {
            debug!("Dropping pending prompt push");
        }
        self.push_throttle.cancel();
        self.set_state(PlaybackState::Stopped);
        self.silence(self.config.gain.stop_ramp_secs);
        self.scheduler.reset();
    }

    /// Play/pause toggle
    ///
    /// A toggle while loading cancels, including a connect still in flight:
    /// there is no stable audio to pause yet.
    pub async fn toggle(&mut self) {
        match self.state() {
            PlaybackState::Playing => self.pause().await,
            PlaybackState::Paused | PlaybackState::Stopped => self.play().await,
            PlaybackState::Loading => self.stop().await,
        }
    }

    /// Replace the prompt set and push the change upstream, throttled
    pub async fn update_prompts(&mut self, prompts: PromptSet) {
        self.prompts = prompts;
        self.filtered.retain_active(&self.prompts);
        self.offer_snapshot().await;
    }

    /// Replace the generation parameters
    ///
    /// A change of bpm or scale only takes effect after a context reset, so
    /// one follows the update.
    pub async fn set_generation_config(&mut self, config: GenerationConfig) {
        let needs_reset = config.requires_context_reset(&self.generation);
        self.generation = config;

        let Some(active) = self.session.as_mut() else {
            return;
        };
        let mut result = active
            .session
            .set_generation_config(&self.generation)
            .await;
        if result.is_ok() && needs_reset {
            debug!("bpm/scale changed, resetting context of session {}", active.id);
            result = active.session.reset_context().await;
        }
        match result {
            Ok(()) => {}
            Err(e) if e.is_fatal_to_session() => self.fail_session(&e).await,
            Err(e) => {
                warn!("Generation config update failed: {}", e);
                self.notifier
                    .warn(format!("Failed to update generation settings: {}", e));
            }
        }
    }

    /// Prompts to send upstream
    fn snapshot(&self) -> Vec<WeightedPrompt> {
        self.prompts.active_snapshot(&self.filtered)
    }

    /// Open a new session on a separate task
    ///
    /// The outcome comes back as [`ControlEvent::Connected`]. If the loop is
    /// gone by then, the task closes the session itself.
    async fn begin_connect(&mut self) {
        if let Some(mut stale) = self.session.take() {
            debug!("Closing stale session {}", stale.id);
            if let Err(e) = stale.session.close().await {
                warn!("Stale session {} close failed: {}", stale.id, e);
            }
        }

        self.connect_attempts += 1;
        let attempt = self.connect_attempts;
        self.connecting = Some(attempt);

        let id = SessionId::new();
        info!(session_id = %id, model = %self.config.model, attempt, "Connecting session");
        let sink = SessionEventSink::new(id, self.events_tx.clone());
        let connector = Arc::clone(&self.connector);
        let model = self.config.model.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = connector.connect(&model, sink).await;
            let event = ControlEvent::Connected { attempt, id, result };
            if let Err(mpsc::error::SendError(ControlEvent::Connected {
                result: Ok(mut session),
                ..
            })) = tx.send(event)
            {
                debug!(session_id = %id, "Controller gone, closing session");
                if let Err(e) = session.close().await {
                    warn!("Session {} close failed: {}", id, e);
                }
            }
        });
    }

    async fn on_connected(
        &mut self,
        attempt: u64,
        id: SessionId,
        result: Result<Box<dyn MusicSession>>,
    ) {
        if self.connecting != Some(attempt) {
            match result {
                Ok(mut session) => {
                    info!(session_id = %id, attempt, "Closing session of abandoned connect");
                    if let Err(e) = session.close().await {
                        warn!("Session {} close failed: {}", id, e);
                    }
                }
                Err(e) => debug!(attempt, "Abandoned connect failed: {}", e),
            }
            return;
        }
        self.connecting = None;

        match result {
            Ok(session) => {
                self.session = Some(ActiveSession { id, session });
                self.connection_error = false;
                info!(session_id = %id, "Session connected");
                self.start_sequence(true).await;
            }
            Err(e) => {
                error!("Failed to connect to '{}': {}", self.config.model, e);
                self.connection_error = true;
                self.silence(self.config.gain.stop_ramp_secs);
                self.set_state(PlaybackState::Stopped);
                self.notifier
                    .error(format!("Failed to connect to the music service: {}", e));
            }
        }
    }

    /// Bring the open session up to date and start a new playback sequence
    async fn start_sequence(&mut self, fresh: bool) {
        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            self.pause().await;
            self.notifier.warn(NO_ACTIVE_PROMPTS);
            return;
        }

        if let Err(e) = self.bring_up(fresh, &snapshot).await {
            self.fail_session(&e).await;
            return;
        }
        self.push_throttle.mark_fired(tokio::time::Instant::now());

        self.scheduler.reset();
        self.epoch += 1;
        self.graph().ramp_gain(1.0, self.config.gain.play_ramp_secs);

        let result = match self.session.as_mut() {
            Some(active) => active.session.play().await,
            None => Err(Error::NoSession),
        };
        if let Err(e) = result {
            self.fail_session(&e).await;
        }
    }

    /// Configure a session before signalling play: config first on a fresh
    /// session, then prompts
    async fn bring_up(&mut self, fresh: bool, snapshot: &[WeightedPrompt]) -> Result<()> {
        let active = self.session.as_mut().ok_or(Error::NoSession)?;
        if fresh {
            active
                .session
                .set_generation_config(&self.generation)
                .await?;
        }
        active
            .session
            .set_weighted_prompts(snapshot)
            .await
            .map_err(|e| Error::PromptPush(e.to_string()))
    }

    async fn offer_snapshot(&mut self) {
        let snapshot = self.snapshot();
        let now = tokio::time::Instant::now();
        match self.push_throttle.offer(snapshot, now) {
            Admission::Fire(snapshot) => self.push_prompts(snapshot).await,
            Admission::Arm { deadline } => {
                trace!("Prompt push deferred to throttle deadline");
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep_until(deadline).await;
                    let _ = tx.send(ControlEvent::FlushPrompts);
                });
            }
            Admission::Coalesced => trace!("Prompt push coalesced"),
        }
    }

    /// Deliver a (throttled) snapshot upstream
    async fn push_prompts(&mut self, snapshot: Vec<WeightedPrompt>) {
        if snapshot.is_empty() {
            if self.state().is_active() {
                info!("No active prompts left, pausing");
                self.pause().await;
                self.notifier.warn(NO_ACTIVE_PROMPTS);
            }
            return;
        }

        let Some(active) = self.session.as_mut() else {
            return;
        };
        debug!("Pushing {} prompts to session {}", snapshot.len(), active.id);
        match active.session.set_weighted_prompts(&snapshot).await {
            Ok(()) => {}
            Err(e) if e.is_fatal_to_session() => self.fail_session(&e).await,
            Err(e) => {
                warn!("Prompt push failed: {}", e);
                self.notifier
                    .error(format!("Failed to update prompts: {}", e));
            }
        }
    }

    async fn handle_session_event(&mut self, id: SessionId, event: SessionEvent) {
        if self.session_id() != Some(id) {
            trace!("Ignoring event from stale session {}: {:?}", id, event);
            return;
        }

        match event {
            SessionEvent::SetupComplete => {
                debug!("Session {} setup complete", id);
                self.connection_error = false;
            }
            SessionEvent::FilteredPrompt {
                text,
                filtered_reason,
            } => {
                info!("Prompt '{}' filtered: {}", text, filtered_reason);
                self.notifier.warn(if filtered_reason.is_empty() {
                    format!("Prompt \"{}\" was filtered", text)
                } else {
                    format!("Prompt \"{}\" was filtered: {}", text, filtered_reason)
                });
                self.filtered.insert(text);
                self.offer_snapshot().await;
            }
            SessionEvent::AudioChunks(chunks) => self.on_audio(chunks),
            SessionEvent::Error(message) => {
                self.fail_session(&Error::Stream(message)).await;
            }
            SessionEvent::Closed { was_clean: false, reason } => {
                self.fail_session(&Error::UncleanClose { reason }).await;
            }
            SessionEvent::Closed { was_clean: true, reason } => {
                info!("Session {} closed: {}", id, reason);
                self.session = None;
                self.push_throttle.cancel();
                if self.state() != PlaybackState::Stopped {
                    self.set_state(PlaybackState::Stopped);
                    self.silence(self.config.gain.stop_ramp_secs);
                    self.scheduler.reset();
                    self.notifier.info("The music session ended.");
                }
            }
        }
    }

    fn on_audio(&mut self, chunks: Vec<AudioChunk>) {
        for chunk in chunks {
            let buffer = match self.decoder.decode(&chunk.data) {
                Ok(buffer) => buffer,
                Err(e) => {
                    warn!("Dropping undecodable audio chunk: {}", e);
                    continue;
                }
            };

            let outcome = match self.scheduler.schedule_chunk(buffer, self.state()) {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Dropping audio chunk: {}", e);
                    continue;
                }
            };

            if let ScheduleOutcome::Scheduled {
                anchor: Some(anchor),
                ..
            } = outcome
            {
                match anchor {
                    Anchor::Initial { primed_after } => self.arm_primed_timer(primed_after),
                    Anchor::Underrun { primed_after, .. } => {
                        self.set_state(PlaybackState::Loading);
                        self.epoch += 1;
                        self.arm_primed_timer(primed_after);
                    }
                }
            }
        }
    }

    fn arm_primed_timer(&self, delay: Duration) {
        let epoch = self.epoch;
        let deadline = tokio::time::Instant::now() + delay;
        let tx = self.events_tx.clone();
        trace!("Arming primed timer for epoch {} in {:?}", epoch, delay);
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = tx.send(ControlEvent::BufferPrimed { epoch });
        });
    }

    fn on_buffer_primed(&mut self, epoch: u64) {
        if epoch != self.epoch || self.state() != PlaybackState::Loading {
            trace!("Stale primed timer (epoch {}, current {})", epoch, self.epoch);
            return;
        }
        info!("Buffer primed, playing");
        self.set_state(PlaybackState::Playing);
    }

    /// Tear down the current session after a fatal error
    async fn fail_session(&mut self, cause: &Error) {
        error!("Session failed: {}", cause);
        self.connecting = None;
        if let Some(mut active) = self.session.take() {
            if let Err(e) = active.session.close().await {
                warn!("Session {} close failed: {}", active.id, e);
            }
        }
        self.connection_error = true;
        self.push_throttle.cancel();
        self.set_state(PlaybackState::Stopped);
        self.silence(self.config.gain.stop_ramp_secs);
        self.scheduler.reset();
        self.notifier.error(CONNECTION_LOST);
    }

    /// Fade out and cut scheduled audio at the end of the fade
    fn silence(&mut self, ramp_secs: f64) {
        let graph = self.scheduler.graph();
        graph.ramp_gain(0.0, ramp_secs);
        let dropped = graph.stop_all_at(graph.current_time() + ramp_secs);
        if dropped > 0 {
            debug!("Dropped {} scheduled chunks", dropped);
        }
        self.epoch += 1;
    }

    fn set_state(&mut self, state: PlaybackState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            debug!(from = %previous, to = %state, epoch = self.epoch, "Playback state changed");
        }
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state())
            .field("session", &self.session_id())
            .field("connection_error", &self.connection_error)
            .field("epoch", &self.epoch)
            .field("prompts", &self.prompts.len())
            .field("filtered", &self.filtered.len())
            .finish()
    }
}
