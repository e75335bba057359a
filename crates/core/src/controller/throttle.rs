//! Coalescing throttle
//!
//! At most one delivery per interval, always with the most recent value. The
//! first offer after a quiet period fires immediately; offers inside the
//! interval replace each other and the survivor is delivered when the
//! interval ends.
//!
//! The throttle does not own a timer. [`Throttle::offer`] says when a timer
//! must be armed, and the owner calls [`Throttle::fire_due`] when it fires.

use tokio::time::{Duration, Instant};

/// What the owner must do after an offer
#[derive(Debug, PartialEq)]
pub enum Admission<T> {
    /// Deliver this value now
    Fire(T),
    /// Value held; arm a timer for `deadline`
    Arm {
        /// When the held value becomes due
        deadline: Instant,
    },
    /// Value held; a timer is already armed
    Coalesced,
}

/// Timer-guarded latest-value throttle
#[derive(Debug)]
pub struct Throttle<T> {
    interval: Duration,
    last_fired: Option<Instant>,
    pending: Option<T>,
    armed: bool,
}

impl<T> Throttle<T> {
    /// Create a throttle with the given minimum spacing
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
            pending: None,
            armed: false,
        }
    }

    /// Minimum spacing between deliveries
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a value is waiting for its timer
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Offer a new value at `now`
    pub fn offer(&mut self, value: T, now: Instant) -> Admission<T> {
        let quiet = self
            .last_fired
            .map_or(true, |last| now.duration_since(last) >= self.interval);

        if quiet && !self.armed {
            self.pending = None;
            self.last_fired = Some(now);
            return Admission::Fire(value);
        }

        self.pending = Some(value);
        if self.armed {
            return Admission::Coalesced;
        }

        self.armed = true;
        let deadline = self.last_fired.map_or(now, |last| last + self.interval);
        Admission::Arm { deadline }
    }

    /// Take the held value when the armed timer fires
    pub fn fire_due(&mut self, now: Instant) -> Option<T> {
        self.armed = false;
        let value = self.pending.take()?;
        self.last_fired = Some(now);
        Some(value)
    }

    /// Record a delivery made outside the throttle at `now`
    ///
    /// Any held value is dropped and the next offer waits out the interval
    /// from `now`.
    pub fn mark_fired(&mut self, now: Instant) {
        self.pending = None;
        self.last_fired = Some(now);
    }

    /// Drop any held value
    ///
    /// A timer that is already armed will find nothing when it fires.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
