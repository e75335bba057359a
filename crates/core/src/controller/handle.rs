use tokio::sync::{mpsc, watch};
use tracing::warn;

use super::{Command, ControlEvent};
use crate::playback::PlaybackState;
use crate::prompts::PromptSet;
use crate::session::GenerationConfig;

/// Cloneable front end of a running [`PlaybackController`](super::PlaybackController)
///
/// Used by the UI and the media-session integration. Every method enqueues a
/// command and returns immediately; the dispatcher applies commands in order.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    tx: mpsc::UnboundedSender<ControlEvent>,
    state: watch::Receiver<PlaybackState>,
}

impl ControllerHandle {
    pub(crate) fn new(
        tx: mpsc::UnboundedSender<ControlEvent>,
        state: watch::Receiver<PlaybackState>,
    ) -> Self {
        Self { tx, state }
    }

    /// Start or resume playback
    pub fn play(&self) -> bool {
        self.send(Command::Play)
    }

    /// Pause playback
    pub fn pause(&self) -> bool {
        self.send(Command::Pause)
    }

    /// Stop playback and release the session
    pub fn stop(&self) -> bool {
        self.send(Command::Stop)
    }

    /// Play/pause toggle
    pub fn toggle(&self) -> bool {
        self.send(Command::Toggle)
    }

    /// Replace the prompt set
    pub fn update_prompts(&self, prompts: PromptSet) -> bool {
        self.send(Command::UpdatePrompts(prompts))
    }

    /// Replace the generation parameters
    pub fn set_generation_config(&self, config: GenerationConfig) -> bool {
        self.send(Command::SetGenerationConfig(config))
    }

    /// Stop and end the dispatcher loop
    pub fn shutdown(&self) -> bool {
        self.send(Command::Shutdown)
    }

    /// Last published playback state
    pub fn state(&self) -> PlaybackState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state.clone()
    }

    /// Enqueue a command; false once the controller has shut down
    fn send(&self, command: Command) -> bool {
        let sent = self.tx.send(ControlEvent::Command(command)).is_ok();
        if !sent {
            warn!("Playback controller is gone, command dropped");
        }
        sent
    }
}
