//! Output audio graph
//!
//! A pull-rendered mix timeline: scheduled sources → gain → output. The graph
//! owns the audio clock, which advances only as frames are rendered, so the
//! playback scheduler and the device callback always agree on "now".
//!
//! The handle is cheap to clone. The controller schedules through one clone
//! while an audio backend pulls samples through another.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use super::buffer::AudioBuffer;
use super::gain::{GainEnvelope, GainEvent};
use crate::{Error, Result};

/// Where a buffer landed on the audio clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledSpan {
    /// Start time in seconds
    pub start: f64,
    /// Duration in seconds
    pub duration: f64,
}

impl ScheduledSpan {
    /// End time in seconds
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Counters for the output graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    /// Sources handed to the graph
    pub sources_started: u64,
    /// Sources that played to their end or were cut
    pub sources_finished: u64,
    /// Sources dropped before they produced any audio
    pub sources_cancelled: u64,
    /// Frames rendered so far (the audio clock)
    pub frames_rendered: u64,
}

struct ScheduledSource {
    buffer: AudioBuffer,
    start_frame: u64,
    stop_frame: Option<u64>,
}

impl ScheduledSource {
    fn end_frame(&self) -> u64 {
        let natural = self.start_frame + self.buffer.frames() as u64;
        match self.stop_frame {
            Some(stop) => natural.min(stop),
            None => natural,
        }
    }
}

struct GraphInner {
    sample_rate: u32,
    channels: u16,
    sources: VecDeque<ScheduledSource>,
    gain: GainEnvelope,
    stats: GraphStats,
}

impl GraphInner {
    fn now(&self) -> f64 {
        self.stats.frames_rendered as f64 / self.sample_rate as f64
    }

    fn frame_at(&self, time: f64) -> u64 {
        (time.max(0.0) * self.sample_rate as f64).round() as u64
    }
}

/// Shared output graph handle
#[derive(Clone)]
pub struct OutputGraph {
    inner: Arc<Mutex<GraphInner>>,
}

impl OutputGraph {
    /// Create a graph rendering at `sample_rate` with `channels` channels
    ///
    /// The output gain starts at 0 so nothing is audible until a fade-in.
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            inner: Arc::new(Mutex::new(GraphInner {
                sample_rate: sample_rate.max(1),
                channels: channels.max(1),
                sources: VecDeque::new(),
                gain: GainEnvelope::new(0.0),
                stats: GraphStats::default(),
            })),
        }
    }

    /// Output sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.inner.lock().sample_rate
    }

    /// Output channel count
    pub fn channels(&self) -> u16 {
        self.inner.lock().channels
    }

    /// Current audio clock time in seconds
    pub fn current_time(&self) -> f64 {
        self.inner.lock().now()
    }

    /// Schedule `buffer` to start at audio clock time `when`
    ///
    /// Returns the span the buffer occupies. Times in the past are clamped to
    /// the current time.
    pub fn start_source(&self, buffer: AudioBuffer, when: f64) -> Result<ScheduledSpan> {
        let mut inner = self.inner.lock();
        if buffer.sample_rate() != inner.sample_rate || buffer.channels() != inner.channels {
            return Err(Error::FormatMismatch {
                buffer_rate: buffer.sample_rate(),
                buffer_channels: buffer.channels(),
                output_rate: inner.sample_rate,
                output_channels: inner.channels,
            });
        }

        let start_frame = inner.frame_at(when).max(inner.stats.frames_rendered);
        let span = ScheduledSpan {
            start: start_frame as f64 / inner.sample_rate as f64,
            duration: buffer.duration_secs(),
        };

        // Keep sources ordered by start so rendering can stop scanning early.
        let position = inner
            .sources
            .iter()
            .position(|source| source.start_frame > start_frame)
            .unwrap_or(inner.sources.len());
        inner.sources.insert(
            position,
            ScheduledSource {
                buffer,
                start_frame,
                stop_frame: None,
            },
        );
        inner.stats.sources_started += 1;

        Ok(span)
    }

    /// Cut every scheduled source at audio clock time `when`
    ///
    /// Sources that would start at or after `when` are dropped outright.
    /// Returns how many sources were dropped.
    pub fn stop_all_at(&self, when: f64) -> usize {
        let mut inner = self.inner.lock();
        let stop_frame = inner.frame_at(when).max(inner.stats.frames_rendered);

        let before = inner.sources.len();
        inner.sources.retain(|source| source.start_frame < stop_frame);
        let dropped = before - inner.sources.len();

        for source in inner.sources.iter_mut() {
            source.stop_frame = Some(source.stop_frame.map_or(stop_frame, |s| s.min(stop_frame)));
        }
        inner.stats.sources_cancelled += dropped as u64;
        dropped
    }

    /// Ramp the output gain to `target` over `duration` seconds from now
    ///
    /// Returns the value the ramp was anchored at.
    pub fn ramp_gain(&self, target: f32, duration: f64) -> f32 {
        let mut inner = self.inner.lock();
        let now = inner.now();
        inner.gain.ramp_to(target, duration, now)
    }

    /// Set the output gain immediately
    pub fn set_gain(&self, value: f32) {
        let mut inner = self.inner.lock();
        let now = inner.now();
        inner.gain.set_value_at(value, now);
    }

    /// Output gain at the current audio clock time
    pub fn gain(&self) -> f32 {
        let inner = self.inner.lock();
        inner.gain.value_at(inner.now())
    }

    /// Output gain at audio clock time `t`
    pub fn gain_at(&self, t: f64) -> f32 {
        self.inner.lock().gain.value_at(t)
    }

    /// Pending gain automation points
    pub fn gain_events(&self) -> Vec<GainEvent> {
        self.inner.lock().gain.events().to_vec()
    }

    /// Number of sources still scheduled or playing
    pub fn pending_sources(&self) -> usize {
        self.inner.lock().sources.len()
    }

    /// Graph counters
    pub fn stats(&self) -> GraphStats {
        self.inner.lock().stats
    }

    /// Render interleaved output into `out` and advance the clock
    ///
    /// `out.len()` should be a multiple of the channel count; a trailing
    /// partial frame is zeroed and does not advance the clock.
    pub fn render(&self, out: &mut [f32]) {
        out.fill(0.0);

        let mut inner = self.inner.lock();
        let channels = inner.channels as usize;
        let frames = (out.len() / channels) as u64;
        if frames == 0 {
            return;
        }

        let block_start = inner.stats.frames_rendered;
        let block_end = block_start + frames;

        for source in inner.sources.iter() {
            if source.start_frame >= block_end {
                break;
            }
            let from = source.start_frame.max(block_start);
            let to = source.end_frame().min(block_end);
            if from >= to {
                continue;
            }

            let samples = source.buffer.samples();
            let src_offset = ((from - source.start_frame) as usize) * channels;
            let dst_offset = ((from - block_start) as usize) * channels;
            let len = ((to - from) as usize) * channels;
            for (dst, src) in out[dst_offset..dst_offset + len]
                .iter_mut()
                .zip(&samples[src_offset..src_offset + len])
            {
                *dst += *src;
            }
        }

        let sample_rate = inner.sample_rate as f64;
        for (index, frame) in out[..frames as usize * channels]
            .chunks_exact_mut(channels)
            .enumerate()
        {
            let t = (block_start + index as u64) as f64 / sample_rate;
            let gain = inner.gain.value_at(t);
            for sample in frame.iter_mut() {
                *sample *= gain;
            }
        }

        let before = inner.sources.len();
        inner.sources.retain(|source| source.end_frame() > block_end);
        inner.stats.sources_finished += (before - inner.sources.len()) as u64;
        inner.stats.frames_rendered = block_end;
    }

    /// Render and discard `seconds` of output
    ///
    /// Drives the clock forward when no device is pulling (headless runs).
    pub fn advance(&self, seconds: f64) {
        if seconds <= 0.0 {
            return;
        }
        let (sample_rate, channels) = {
            let inner = self.inner.lock();
            (inner.sample_rate, inner.channels as usize)
        };
        let mut remaining = (seconds * sample_rate as f64).round() as usize;
        let mut scratch = vec![0.0f32; 1024 * channels];
        while remaining > 0 {
            let frames = remaining.min(1024);
            self.render(&mut scratch[..frames * channels]);
            remaining -= frames;
        }
    }
}

impl std::fmt::Debug for OutputGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("OutputGraph")
            .field("sample_rate", &inner.sample_rate)
            .field("channels", &inner.channels)
            .field("time", &inner.now())
            .field("sources", &inner.sources.len())
            .finish()
    }
}
