//! PromptDJ Core - Streaming playback engine for real-time generated music
//!
//! This crate consumes a remote music-generation session that streams encoded
//! audio chunks, and plays them back gaplessly against a local audio clock.
//!
//! # Architecture
//!
//! ```text
//!  UI / media session ──▶ ControllerHandle ──▶ ┌────────────────────────┐
//!                                             │   PlaybackController   │
//!  SessionConnector ──▶ SessionEvent ───────▶ │  (single dispatcher)   │
//!                                             └───────────┬────────────┘
//!                                                         │
//!                  AudioChunkDecoder ──▶ PlaybackScheduler ──▶ OutputGraph
//!                                                            (gain envelope,
//!                                                             audio clock)
//! ```
//!
//! - [`audio`]: decoded PCM buffers, chunk decoder, gain envelope, output graph
//! - [`playback`]: playback state and the lookahead scheduler
//! - [`prompts`]: weighted prompts, filtered set, default prompt library
//! - [`session`]: the abstract remote session and its events
//! - [`controller`]: the playback state machine and its dispatcher loop
//!
//! The crate never opens a device or a socket itself. A transport implements
//! [`session::SessionConnector`], and an audio backend pulls samples out of
//! [`audio::OutputGraph::render`].

#![warn(clippy::all)]

pub mod audio;
pub mod config;
pub mod controller;
pub mod playback;
pub mod prompts;
pub mod session;

mod error;
pub use error::{DecodeError, Error, Result};

pub use config::PlayerConfig;
pub use controller::{ControllerHandle, Notification, NotificationLevel, PlaybackController};
pub use playback::{PlaybackScheduler, PlaybackState};
pub use prompts::{FilteredSet, Prompt, PromptId, PromptSet, WeightedPrompt};
