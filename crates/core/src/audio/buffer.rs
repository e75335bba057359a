//! Decoded PCM buffers with zero-copy sharing

use std::sync::Arc;

/// Decoded audio ready for scheduling
///
/// Samples are interleaved f32 in -1.0..1.0. The sample storage is shared, so
/// cloning a buffer to hand it to the output graph does not copy audio.
#[derive(Clone)]
pub struct AudioBuffer {
    samples: Arc<Vec<f32>>,
    sample_rate: u32,
    channels: u16,
}

impl AudioBuffer {
    /// Create a new buffer (takes ownership of interleaved samples)
    ///
    /// A trailing partial frame is ignored by [`frames`](Self::frames).
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self::from_arc(Arc::new(samples), sample_rate, channels)
    }

    /// Create from Arc (zero-copy)
    pub fn from_arc(samples: Arc<Vec<f32>>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels: channels.max(1),
        }
    }

    /// A buffer of `frames` frames of silence
    pub fn silence(frames: usize, sample_rate: u32, channels: u16) -> Self {
        let channels = channels.max(1);
        Self::new(vec![0.0; frames * channels as usize], sample_rate, channels)
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Interleaved samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Check if buffer holds no frames
    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }
}

impl std::fmt::Debug for AudioBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AudioBuffer({} frames, {}Hz, {}ch)",
            self.frames(),
            self.sample_rate,
            self.channels
        )
    }
}
