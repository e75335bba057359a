//! Message shapes exchanged with the remote music session
//!
//! Field names follow the service's camelCase JSON so a transport can
//! deserialize server frames straight into [`ServerMessage`].

use serde::{Deserialize, Serialize};

use super::SessionEvent;

/// One encoded audio chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioChunk {
    /// Base64-encoded 16-bit PCM
    pub data: String,
    /// Declared MIME type, e.g. `audio/l16;rate=48000;channels=2`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// A prompt the service refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredPrompt {
    /// Rejected prompt text
    pub text: String,
    /// Human readable reason
    #[serde(default)]
    pub filtered_reason: String,
}

/// Audio payload of a server frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerContent {
    /// Chunks in playback order
    #[serde(default)]
    pub audio_chunks: Vec<AudioChunk>,
}

/// One message delivered through the session's `onmessage` callback
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerMessage {
    /// Present once the session is ready
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_complete: Option<serde_json::Value>,
    /// Present when a prompt was rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filtered_prompt: Option<FilteredPrompt>,
    /// Present when audio arrived
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_content: Option<ServerContent>,
}

impl ServerMessage {
    /// Split a frame into the events it carries, in handling order
    pub fn into_events(self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.setup_complete.is_some() {
            events.push(SessionEvent::SetupComplete);
        }
        if let Some(filtered) = self.filtered_prompt {
            events.push(SessionEvent::FilteredPrompt {
                text: filtered.text,
                filtered_reason: filtered.filtered_reason,
            });
        }
        if let Some(content) = self.server_content {
            if !content.audio_chunks.is_empty() {
                events.push(SessionEvent::AudioChunks(content.audio_chunks));
            }
        }
        events
    }
}

/// Musical scale hint for the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum Scale {
    CMajorAMinor,
    DFlatMajorBFlatMinor,
    DMajorBMinor,
    EFlatMajorCMinor,
    EMajorDFlatMinor,
    FMajorDMinor,
    GFlatMajorEFlatMinor,
    GMajorEMinor,
    AFlatMajorFMinor,
    AMajorGFlatMinor,
    BFlatMajorGMinor,
    BMajorAFlatMinor,
    ScaleUnspecified,
}

/// Generation parameters forwarded with `set_generation_config`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationConfig {
    /// How closely the model follows prompts
    pub guidance: f32,
    /// Sampling temperature
    pub temperature: f32,
    /// Top-k sampling
    pub top_k: u32,
    /// Beats per minute; takes effect after a context reset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bpm: Option<u32>,
    /// Scale; takes effect after a context reset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
    /// Note density in [0, 1]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density: Option<f32>,
    /// Tonal brightness in [0, 1]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f32>,
    /// Random seed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Drop the bass line
    pub mute_bass: bool,
    /// Drop the drums
    pub mute_drums: bool,
    /// Keep only bass and drums
    pub only_bass_and_drums: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            guidance: 4.0,
            temperature: 1.1,
            top_k: 40,
            bpm: None,
            scale: None,
            density: None,
            brightness: None,
            seed: None,
            mute_bass: false,
            mute_drums: false,
            only_bass_and_drums: false,
        }
    }
}

impl GenerationConfig {
    /// Whether switching from `previous` to `self` needs a context reset
    pub fn requires_context_reset(&self, previous: &GenerationConfig) -> bool {
        self.bpm != previous.bpm || self.scale != previous.scale
    }
}
