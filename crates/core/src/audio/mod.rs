//! Audio primitives for streamed playback
//!
//! - [`AudioBuffer`]: decoded interleaved PCM
//! - [`AudioChunkDecoder`]: base64 16-bit PCM chunk → [`AudioBuffer`]
//! - [`GainEnvelope`]: click-free gain automation
//! - [`OutputGraph`]: scheduled sources, output gain and the audio clock

pub mod buffer;
pub mod decoder;
pub mod format;
pub mod gain;
pub mod graph;

pub use buffer::AudioBuffer;
pub use decoder::AudioChunkDecoder;
pub use gain::{GainEnvelope, GainEvent};
pub use graph::{GraphStats, OutputGraph, ScheduledSpan};
