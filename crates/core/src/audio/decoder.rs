//! Audio chunk decoder
//!
//! Turns the base64 payload of one streamed chunk into an [`AudioBuffer`] at
//! the session's fixed sample rate and channel count.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::buffer::AudioBuffer;
use super::format::pcm16le_to_f32;
use crate::error::DecodeError;

const BYTES_PER_SAMPLE: usize = 2;

/// Decoder for 16-bit little-endian interleaved PCM chunks
#[derive(Debug, Clone, Copy)]
pub struct AudioChunkDecoder {
    sample_rate: u32,
    channels: u16,
}

impl AudioChunkDecoder {
    /// Create a decoder for the given stream format
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels: channels.max(1),
        }
    }

    /// Sample rate of decoded buffers
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count of decoded buffers
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Decode one base64 chunk payload
    ///
    /// A failed decode yields no buffer; the caller drops the chunk and keeps
    /// going with the next one.
    pub fn decode(&self, payload: &str) -> Result<AudioBuffer, DecodeError> {
        let bytes = STANDARD.decode(payload.trim())?;
        self.decode_bytes(&bytes)
    }

    /// Decode a chunk that is already raw PCM bytes
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<AudioBuffer, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }

        let frame_bytes = BYTES_PER_SAMPLE * self.channels as usize;
        if bytes.len() % frame_bytes != 0 {
            return Err(DecodeError::Truncated {
                len: bytes.len(),
                frame_bytes,
            });
        }

        let samples = pcm16le_to_f32(bytes).ok_or(DecodeError::Truncated {
            len: bytes.len(),
            frame_bytes,
        })?;

        Ok(AudioBuffer::new(samples, self.sample_rate, self.channels))
    }

    /// Encode interleaved samples the way the remote session sends them
    ///
    /// Used by loopback sessions and test doubles.
    pub fn encode(&self, samples: &[f32]) -> String {
        STANDARD.encode(super::format::f32_to_pcm16le(samples))
    }
}
