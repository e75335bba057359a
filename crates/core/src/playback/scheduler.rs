//! PlaybackScheduler - gapless lookahead scheduling of decoded chunks
//!
//! The scheduler keeps a single cursor, `next_start_time`, on the output
//! graph's clock. Each accepted buffer starts exactly at the cursor and the
//! cursor advances by the buffer's duration, so in-order chunks play back to
//! back with no gap and no overlap.
//!
//! # Priming
//!
//! The first chunk of a playback sequence anchors the cursor at
//! `now + lookahead`. That delay absorbs network jitter; the caller arms a
//! one-shot timer for the same delay and promotes `loading → playing` when it
//! fires, provided the state is still `loading`.
//!
//! # Underrun
//!
//! If the cursor has fallen behind the clock, the buffer ran dry. The cursor
//! is re-anchored a short `recovery_gap` ahead of now (a local resync, not a
//! full rebuffer) and the caller drops back to `loading` until the gap has
//! elapsed.

use std::time::Duration;
use tracing::{debug, trace, warn};

use super::state::PlaybackState;
use crate::audio::{AudioBuffer, OutputGraph, ScheduledSpan};
use crate::Result;

/// Why a buffer was not scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// Playback is paused or stopped; late audio must never play
    Inactive(PlaybackState),
    /// No playback sequence is priming and the cursor is unset
    NotPrimed,
    /// The buffer holds no frames
    Empty,
}

/// How the cursor was (re)anchored for a scheduled buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// First buffer of a sequence; promote to playing after `primed_after`
    Initial {
        /// Lookahead delay before audio becomes audible
        primed_after: Duration,
    },
    /// Cursor had fallen behind the clock; back to loading for `primed_after`
    Underrun {
        /// Recovery gap before audio becomes audible again
        primed_after: Duration,
        /// How far behind the clock the cursor was, in seconds
        behind_by: f64,
    },
}

/// Result of offering one decoded buffer to the scheduler
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleOutcome {
    /// The buffer was placed on the output graph
    Scheduled {
        /// Where the buffer landed
        span: ScheduledSpan,
        /// Set when this buffer (re)anchored the cursor
        anchor: Option<Anchor>,
    },
    /// The buffer was dropped
    Discarded(DiscardReason),
}

/// Scheduler counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Buffers placed on the graph
    pub scheduled: u64,
    /// Buffers dropped
    pub discarded: u64,
    /// Underruns detected
    pub underruns: u64,
}

/// Lookahead scheduler over an [`OutputGraph`]
#[derive(Debug)]
pub struct PlaybackScheduler {
    graph: OutputGraph,
    next_start_time: Option<f64>,
    lookahead_secs: f64,
    recovery_gap_secs: f64,
    stats: SchedulerStats,
}

impl PlaybackScheduler {
    /// Create a scheduler
    ///
    /// # Arguments
    /// * `graph` - Output graph whose clock and sources are used
    /// * `lookahead_secs` - Initial buffering delay for a new sequence
    /// * `recovery_gap_secs` - Resync delay after an underrun; must be below
    ///   `lookahead_secs`, otherwise half the lookahead is used
    pub fn new(graph: OutputGraph, lookahead_secs: f64, recovery_gap_secs: f64) -> Self {
        let lookahead_secs = lookahead_secs.max(0.0);
        let recovery_gap_secs = if recovery_gap_secs < lookahead_secs {
            recovery_gap_secs.max(0.0)
        } else {
            lookahead_secs / 2.0
        };
        Self {
            graph,
            next_start_time: None,
            lookahead_secs,
            recovery_gap_secs,
            stats: SchedulerStats::default(),
        }
    }

    /// Output graph this scheduler writes to
    pub fn graph(&self) -> &OutputGraph {
        &self.graph
    }

    /// Initial buffering delay in seconds
    pub fn lookahead_secs(&self) -> f64 {
        self.lookahead_secs
    }

    /// Underrun resync delay in seconds
    pub fn recovery_gap_secs(&self) -> f64 {
        self.recovery_gap_secs
    }

    /// Cursor position, or None when unset
    pub fn next_start_time(&self) -> Option<f64> {
        self.next_start_time
    }

    /// Scheduler counters
    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// Unset the cursor
    ///
    /// Called when a fresh playback sequence begins, never mid-stream.
    pub fn reset(&mut self) {
        trace!("Schedule cursor reset");
        self.next_start_time = None;
    }

    /// Offer a decoded buffer for playback in `state`
    ///
    /// Buffers are placed in the order they are offered. Errors come only
    /// from the output graph rejecting the buffer format.
    pub fn schedule_chunk(
        &mut self,
        buffer: AudioBuffer,
        state: PlaybackState,
    ) -> Result<ScheduleOutcome> {
        if !state.accepts_audio() {
            return Ok(self.discard(DiscardReason::Inactive(state)));
        }
        if buffer.is_empty() {
            return Ok(self.discard(DiscardReason::Empty));
        }

        let now = self.graph.current_time();
        let mut anchor = None;

        let start = match self.next_start_time {
            None if state == PlaybackState::Loading => {
                let start = now + self.lookahead_secs;
                debug!(now, start, "Priming playback with lookahead");
                anchor = Some(Anchor::Initial {
                    primed_after: Duration::from_secs_f64(self.lookahead_secs),
                });
                start
            }
            None => return Ok(self.discard(DiscardReason::NotPrimed)),
            Some(cursor) if cursor < now => {
                let behind_by = now - cursor;
                self.stats.underruns += 1;
                warn!(
                    behind_by_ms = behind_by * 1000.0,
                    underruns = self.stats.underruns,
                    "Playback underrun, resyncing"
                );
                anchor = Some(Anchor::Underrun {
                    primed_after: Duration::from_secs_f64(self.recovery_gap_secs),
                    behind_by,
                });
                now + self.recovery_gap_secs
            }
            Some(cursor) => cursor,
        };

        let duration = buffer.duration_secs();
        let span = self.graph.start_source(buffer, start)?;
        self.next_start_time = Some(start + duration);
        self.stats.scheduled += 1;
        trace!(start = span.start, duration, "Chunk scheduled");

        Ok(ScheduleOutcome::Scheduled { span, anchor })
    }

    fn discard(&mut self, reason: DiscardReason) -> ScheduleOutcome {
        self.stats.discarded += 1;
        trace!(?reason, "Chunk discarded");
        ScheduleOutcome::Discarded(reason)
    }
}
