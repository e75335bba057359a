//! Player configuration
//!
//! Loaded once before the controller starts and immutable afterwards.
//!
//! # Example
//!
//! ```
//! use promptdj_core::PlayerConfig;
//!
//! let config = PlayerConfig::from_toml_str(r#"
//!     model = "lyria-realtime-exp"
//!
//!     [buffer]
//!     lookahead_secs = 1.5
//! "#).unwrap();
//!
//! assert_eq!(config.buffer.lookahead_secs, 1.5);
//! assert_eq!(config.audio.sample_rate, 48000);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::session::GenerationConfig;
use crate::{Error, Result};

/// Default model id
pub const DEFAULT_MODEL: &str = "lyria-realtime-exp";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Remote model id passed to the connector
    pub model: String,

    /// Stream format
    pub audio: AudioFormatConfig,

    /// Lookahead buffering
    pub buffer: BufferConfig,

    /// Output fades
    pub gain: GainConfig,

    /// Upstream prompt updates
    pub prompts: PromptPushConfig,

    /// Initial generation parameters
    pub generation: GenerationConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            audio: AudioFormatConfig::default(),
            buffer: BufferConfig::default(),
            gain: GainConfig::default(),
            prompts: PromptPushConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

impl PlayerConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: PlayerConfig = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let toml = std::fs::read_to_string(path)?;
        Self::from_toml_str(&toml)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(Error::Config("model must not be empty".to_string()));
        }
        if self.audio.sample_rate == 0 {
            return Err(Error::Config("audio.sample_rate must be positive".to_string()));
        }
        if self.audio.channels == 0 {
            return Err(Error::Config("audio.channels must be positive".to_string()));
        }
        if !(self.buffer.lookahead_secs > 0.0) {
            return Err(Error::Config(
                "buffer.lookahead_secs must be positive".to_string(),
            ));
        }
        if !(self.buffer.recovery_gap_secs >= 0.0)
            || self.buffer.recovery_gap_secs >= self.buffer.lookahead_secs
        {
            return Err(Error::Config(format!(
                "buffer.recovery_gap_secs ({}) must be in [0, lookahead_secs ({}))",
                self.buffer.recovery_gap_secs, self.buffer.lookahead_secs
            )));
        }
        for (name, value) in [
            ("gain.play_ramp_secs", self.gain.play_ramp_secs),
            ("gain.pause_ramp_secs", self.gain.pause_ramp_secs),
            ("gain.stop_ramp_secs", self.gain.stop_ramp_secs),
        ] {
            if !(value >= 0.0) {
                return Err(Error::Config(format!("{} must not be negative", name)));
            }
        }
        if self.gain.stop_ramp_secs > self.gain.pause_ramp_secs {
            return Err(Error::Config(
                "gain.stop_ramp_secs must not exceed gain.pause_ramp_secs".to_string(),
            ));
        }
        if self.prompts.push_interval_ms == 0 {
            return Err(Error::Config(
                "prompts.push_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the model id
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the lookahead buffering delay
    pub fn with_lookahead(mut self, lookahead_secs: f64) -> Self {
        self.buffer.lookahead_secs = lookahead_secs;
        self
    }

    /// Set the underrun recovery gap
    pub fn with_recovery_gap(mut self, recovery_gap_secs: f64) -> Self {
        self.buffer.recovery_gap_secs = recovery_gap_secs;
        self
    }

    /// Set the stream format
    pub fn with_audio(mut self, sample_rate: u32, channels: u16) -> Self {
        self.audio = AudioFormatConfig {
            sample_rate,
            channels,
        };
        self
    }

    /// Set the prompt push interval
    pub fn with_push_interval(mut self, interval: Duration) -> Self {
        self.prompts.push_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Set the initial generation parameters
    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }
}

/// Stream format of decoded chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioFormatConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Interleaved channels
    pub channels: u16,
}

impl Default for AudioFormatConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000, // Model output rate
            channels: 2,
        }
    }
}

/// Lookahead buffering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Delay before the first chunk of a sequence plays
    pub lookahead_secs: f64,
    /// Delay used to resync after an underrun
    pub recovery_gap_secs: f64,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            lookahead_secs: 2.0,
            recovery_gap_secs: 0.2,
        }
    }
}

/// Output fade durations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainConfig {
    /// Fade-in on play
    pub play_ramp_secs: f64,
    /// Fade-out on pause
    pub pause_ramp_secs: f64,
    /// Fade-out on stop
    pub stop_ramp_secs: f64,
}

impl Default for GainConfig {
    fn default() -> Self {
        Self {
            play_ramp_secs: 0.1,
            pause_ramp_secs: 0.2,
            stop_ramp_secs: 0.1,
        }
    }
}

/// Upstream prompt updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptPushConfig {
    /// Minimum spacing between prompt pushes
    pub push_interval_ms: u64,
}

impl Default for PromptPushConfig {
    fn default() -> Self {
        Self {
            push_interval_ms: 200,
        }
    }
}

impl PromptPushConfig {
    /// Push interval as a duration
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.push_interval_ms)
    }
}
