//! Remote music session abstraction
//!
//! The controller talks to the generative model through two traits:
//!
//! - [`SessionConnector`] opens a session for a model id.
//! - [`MusicSession`] is the open session: prompt/config updates and
//!   playback signals.
//!
//! Server-side callbacks (`onmessage`, `onerror`, `onclose`) are not closures
//! over controller state. A transport pushes [`SessionEvent`]s into the
//! [`SessionEventSink`] it was handed at connect time, and the controller's
//! dispatcher loop consumes them in arrival order.
//!
//! # Lifecycle
//!
//! 1. `connect()` resolves once the session accepts messages
//! 2. Active: prompts/config pushed, `play()`/`pause()` signalled
//! 3. `stop()` then `close()`, or the transport reports an error / close
//! 4. Terminal: a closed session is never reused; the next play reconnects

pub mod messages;

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::controller::ControlEvent;
use crate::prompts::WeightedPrompt;
use crate::Result;

pub use messages::{AudioChunk, FilteredPrompt, GenerationConfig, Scale, ServerContent, ServerMessage};

/// Unique identifier of one connection attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Asynchronous events raised by a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Server acknowledged the setup
    SetupComplete,
    /// A prompt was rejected by the service's policy layer
    FilteredPrompt {
        /// Rejected text
        text: String,
        /// Reason shown to the user
        filtered_reason: String,
    },
    /// Audio arrived, in playback order
    AudioChunks(Vec<AudioChunk>),
    /// Transport-level error; fatal to the session
    Error(String),
    /// Session closed
    Closed {
        /// Whether the close was orderly
        was_clean: bool,
        /// Close reason
        reason: String,
    },
}

/// Where a session delivers its events
///
/// Every event is tagged with the session id, so events from a session the
/// controller has already abandoned are recognized and ignored.
#[derive(Debug, Clone)]
pub struct SessionEventSink {
    session_id: SessionId,
    tx: mpsc::UnboundedSender<ControlEvent>,
}

impl SessionEventSink {
    pub(crate) fn new(session_id: SessionId, tx: mpsc::UnboundedSender<ControlEvent>) -> Self {
        Self { session_id, tx }
    }

    /// Id of the session this sink belongs to
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Deliver an event; returns false once the controller has shut down
    pub fn send(&self, event: SessionEvent) -> bool {
        self.tx
            .send(ControlEvent::Session {
                id: self.session_id,
                event,
            })
            .is_ok()
    }

    /// Deliver every event carried by a server frame
    pub fn send_message(&self, message: ServerMessage) -> bool {
        message.into_events().into_iter().all(|event| self.send(event))
    }
}

/// An open session to the remote generative model
#[async_trait]
pub trait MusicSession: Send {
    /// Replace the weighted prompt list
    async fn set_weighted_prompts(&mut self, prompts: &[WeightedPrompt]) -> Result<()>;

    /// Replace the generation parameters
    async fn set_generation_config(&mut self, config: &GenerationConfig) -> Result<()>;

    /// Start or resume producing audio
    async fn play(&mut self) -> Result<()>;

    /// Pause audio production, keeping the context
    async fn pause(&mut self) -> Result<()>;

    /// Stop audio production
    async fn stop(&mut self) -> Result<()>;

    /// Drop the generation context so bpm/scale changes apply
    async fn reset_context(&mut self) -> Result<()>;

    /// Close the connection; idempotent
    async fn close(&mut self) -> Result<()>;
}

/// Opens sessions to the remote model
#[async_trait]
pub trait SessionConnector: Send + Sync {
    /// Connect to `model`, delivering server events into `events`
    ///
    /// Resolves once the session is ready to accept messages.
    async fn connect(&self, model: &str, events: SessionEventSink) -> Result<Box<dyn MusicSession>>;
}
