//! Mock music session for controller tests
//!
//! [`MockConnector`] hands out [`MockSession`]s that record every upstream
//! call in one shared log, and keeps the event sink of each connection so a
//! test can play the server's part.
//!
//! [`Harness`] wires a [`PlaybackController`] to the mock and drives its
//! event queue by hand, so tests decide exactly when each event is handled.
//!
//! # Usage
//!
//! ```ignore
//! let mut h = Harness::new(Harness::config(), Harness::one_prompt());
//! h.command(Command::Play).await;
//! h.send_audio(vec![h.chunk(500)]);
//! h.drain().await;
//! ```

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use promptdj_core::audio::AudioChunkDecoder;
use promptdj_core::controller::{Command, ControlEvent, Notifier};
use promptdj_core::session::{
    AudioChunk, GenerationConfig, MusicSession, SessionConnector, SessionEvent, SessionEventSink,
};
use promptdj_core::{
    Error, Notification, PlaybackController, PlaybackState, PlayerConfig, PromptSet, Result,
    WeightedPrompt,
};

/// Sample rate used by every test: one frame per millisecond
pub const RATE: u32 = 1_000;

/// One upstream call made by the controller
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Connect(String),
    SetWeightedPrompts(Vec<WeightedPrompt>),
    SetGenerationConfig(GenerationConfig),
    Play,
    Pause,
    Stop,
    ResetContext,
    Close,
}

#[derive(Default)]
struct Shared {
    calls: Vec<Call>,
    sinks: Vec<SessionEventSink>,
    fail_connect: Option<String>,
    fail_prompts: Option<Error>,
    connect_gate: Option<oneshot::Receiver<()>>,
    fail_close: bool,
}

/// Connector recording calls and injecting failures
#[derive(Clone, Default)]
pub struct MockConnector {
    shared: Arc<Mutex<Shared>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.shared.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.shared.lock().calls.clear();
    }

    /// Snapshots sent with `set_weighted_prompts`, in order
    pub fn prompt_pushes(&self) -> Vec<Vec<WeightedPrompt>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SetWeightedPrompts(prompts) => Some(prompts),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Call) -> usize {
        self.calls().iter().filter(|call| *call == wanted).count()
    }

    pub fn connect_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Connect(_)))
            .count()
    }

    /// Sink of the most recent connection
    pub fn sink(&self) -> SessionEventSink {
        self.shared
            .lock()
            .sinks
            .last()
            .cloned()
            .expect("no session connected")
    }

    /// Sinks of every connection, oldest first
    pub fn sinks(&self) -> Vec<SessionEventSink> {
        self.shared.lock().sinks.clone()
    }

    /// Make the next connect fail with `Error::Connect(message)`
    pub fn fail_next_connect(&self, message: &str) {
        self.shared.lock().fail_connect = Some(message.to_string());
    }

    /// Hold the next connect until the returned sender fires or is dropped
    pub fn gate_next_connect(&self) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.shared.lock().connect_gate = Some(gate);
        release
    }

    /// Make every close report an error
    pub fn fail_closes(&self) {
        self.shared.lock().fail_close = true;
    }

    /// Make every prompt push fail with `error` until cleared
    pub fn fail_prompt_pushes(&self, error: Option<Error>) {
        self.shared.lock().fail_prompts = error;
    }

    fn record(&self, call: Call) {
        self.shared.lock().calls.push(call);
    }
}

#[async_trait]
impl SessionConnector for MockConnector {
    async fn connect(&self, model: &str, events: SessionEventSink) -> Result<Box<dyn MusicSession>> {
        self.record(Call::Connect(model.to_string()));
        let gate = self.shared.lock().connect_gate.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let mut shared = self.shared.lock();
        if let Some(message) = shared.fail_connect.take() {
            return Err(Error::Connect(message));
        }
        shared.sinks.push(events);
        Ok(Box::new(MockSession {
            connector: self.clone(),
        }))
    }
}

/// Session half of the mock
pub struct MockSession {
    connector: MockConnector,
}

#[async_trait]
impl MusicSession for MockSession {
    async fn set_weighted_prompts(&mut self, prompts: &[WeightedPrompt]) -> Result<()> {
        self.connector
            .record(Call::SetWeightedPrompts(prompts.to_vec()));
        match &self.connector.shared.lock().fail_prompts {
            Some(Error::PromptPush(message)) => Err(Error::PromptPush(message.clone())),
            Some(Error::Stream(message)) => Err(Error::Stream(message.clone())),
            Some(other) => Err(Error::PromptPush(other.to_string())),
            None => Ok(()),
        }
    }

    async fn set_generation_config(&mut self, config: &GenerationConfig) -> Result<()> {
        self.connector
            .record(Call::SetGenerationConfig(config.clone()));
        Ok(())
    }

    async fn play(&mut self) -> Result<()> {
        self.connector.record(Call::Play);
        Ok(())
    }

    async fn pause(&mut self) -> Result<()> {
        self.connector.record(Call::Pause);
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.connector.record(Call::Stop);
        Ok(())
    }

    async fn reset_context(&mut self) -> Result<()> {
        self.connector.record(Call::ResetContext);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.connector.record(Call::Close);
        if self.connector.shared.lock().fail_close {
            return Err(Error::Stream("socket already closed".to_string()));
        }
        Ok(())
    }
}

/// Controller wired to a [`MockConnector`], driven by hand
pub struct Harness {
    pub controller: PlaybackController,
    pub events: mpsc::UnboundedReceiver<ControlEvent>,
    pub connector: MockConnector,
    pub notifications: mpsc::UnboundedReceiver<Notification>,
    decoder: AudioChunkDecoder,
}

impl Harness {
    /// Mono 1 kHz stream, 1.5 s lookahead, 0.2 s recovery gap
    pub fn config() -> PlayerConfig {
        PlayerConfig::default()
            .with_audio(RATE, 1)
            .with_lookahead(1.5)
            .with_recovery_gap(0.2)
    }

    /// A single prompt at weight 1.0
    pub fn one_prompt() -> PromptSet {
        let mut prompts = PromptSet::new();
        prompts.add_weighted("Minimal Techno", 1.0, "#5200ff");
        prompts
    }

    pub fn new(config: PlayerConfig, prompts: PromptSet) -> Self {
        init_tracing();
        let connector = MockConnector::new();
        let (notifier, notifications) = Notifier::channel();
        let graph = promptdj_core::audio::OutputGraph::new(
            config.audio.sample_rate,
            config.audio.channels,
        );
        let decoder = AudioChunkDecoder::new(config.audio.sample_rate, config.audio.channels);
        let (controller, events) = PlaybackController::new(
            config,
            Arc::new(connector.clone()),
            graph,
            prompts,
            notifier,
        )
        .expect("valid test config");

        Self {
            controller,
            events,
            connector,
            notifications,
            decoder,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.controller.state()
    }

    /// Handle a command directly
    pub async fn command(&mut self, command: Command) {
        self.controller.handle(ControlEvent::Command(command)).await;
    }

    /// Play, wait for the connect to land, and handle everything queued
    pub async fn start(&mut self) {
        self.command(Command::Play).await;
        self.finish_connect().await;
        self.drain().await;
    }

    /// Handle events until no connect attempt is in flight
    pub async fn finish_connect(&mut self) {
        while self.controller.is_connecting() {
            self.next_event().await;
        }
    }

    /// Handle every event already queued; returns how many were handled
    pub async fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.controller.handle(event).await;
            handled += 1;
        }
        handled
    }

    /// Wait for the next event (timers included) and handle it
    pub async fn next_event(&mut self) {
        let event = self.events.recv().await.expect("event channel closed");
        self.controller.handle(event).await;
    }

    /// Notifications emitted so far
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(notification) = self.notifications.try_recv() {
            out.push(notification);
        }
        out
    }

    /// An encoded chunk of `millis` milliseconds
    pub fn chunk(&self, millis: usize) -> AudioChunk {
        let channels = self.decoder.channels() as usize;
        AudioChunk {
            data: self.decoder.encode(&vec![0.25; millis * channels]),
            mime_type: Some(format!("audio/l16;rate={};channels={}", RATE, channels)),
        }
    }

    /// Deliver audio from the current session
    pub fn send_audio(&self, chunks: Vec<AudioChunk>) {
        self.connector.sink().send(SessionEvent::AudioChunks(chunks));
    }

    /// Deliver any event from the current session
    pub fn send_event(&self, event: SessionEvent) {
        self.connector.sink().send(event);
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
