//! Playback state

use serde::{Deserialize, Serialize};

/// Playback state shared by the UI, the media session and the output gain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// No session playing; initial and terminal state
    #[default]
    Stopped,
    /// Connecting, or buffering before audio is audible
    Loading,
    /// Audio is being scheduled and heard
    Playing,
    /// Session kept open, output faded out
    Paused,
}

impl PlaybackState {
    /// Whether incoming audio should be scheduled in this state
    pub fn accepts_audio(self) -> bool {
        matches!(self, PlaybackState::Loading | PlaybackState::Playing)
    }

    /// Whether the remote session is expected to be producing audio
    pub fn is_active(self) -> bool {
        self.accepts_audio()
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PlaybackState::Stopped => "stopped",
            PlaybackState::Loading => "loading",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
        };
        f.write_str(name)
    }
}
