//! Playback state and lookahead scheduling

pub mod scheduler;
pub mod state;

pub use scheduler::{Anchor, DiscardReason, PlaybackScheduler, ScheduleOutcome, SchedulerStats};
pub use state::PlaybackState;
