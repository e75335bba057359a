//! Error types for PromptDJ Core

use thiserror::Error;

/// Result type alias for PromptDJ Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the playback engine
#[derive(Debug, Error)]
pub enum Error {
    /// A single audio chunk could not be decoded (recoverable, per-chunk)
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Sending the weighted prompt list upstream failed (recoverable)
    #[error("Prompt update failed: {0}")]
    PromptPush(String),

    /// Opening a session to the remote model failed
    #[error("Connect error: {0}")]
    Connect(String),

    /// The live session reported an error
    #[error("Stream error: {0}")]
    Stream(String),

    /// The live session closed without a clean shutdown
    #[error("Session closed unexpectedly: {reason}")]
    UncleanClose {
        /// Close reason reported by the transport
        reason: String,
    },

    /// A buffer does not match the output graph format
    #[error("Format mismatch: buffer is {buffer_rate}Hz/{buffer_channels}ch, output is {output_rate}Hz/{output_channels}ch")]
    FormatMismatch {
        /// Sample rate of the rejected buffer
        buffer_rate: u32,
        /// Channel count of the rejected buffer
        buffer_channels: u16,
        /// Sample rate of the output graph
        output_rate: u32,
        /// Channel count of the output graph
        output_channels: u16,
    },

    /// Operation requires a session but none is connected
    #[error("No active session")]
    NoSession,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Whether this error ends the current session.
    ///
    /// Connection-level failures always surface to the state machine;
    /// decode and prompt-push failures are absorbed locally.
    pub fn is_fatal_to_session(&self) -> bool {
        matches!(
            self,
            Error::Connect(_) | Error::Stream(_) | Error::UncleanClose { .. }
        )
    }
}

/// Errors produced while decoding a single audio chunk
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Payload is not valid base64
    #[error("invalid chunk encoding: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    /// Payload decoded to zero bytes
    #[error("chunk payload is empty")]
    Empty,

    /// Payload length is not a whole number of PCM frames
    #[error("chunk payload of {len} bytes is not a multiple of the {frame_bytes}-byte frame size")]
    Truncated {
        /// Decoded payload length in bytes
        len: usize,
        /// Bytes per interleaved frame
        frame_bytes: usize,
    },
}
