//! Output gain automation
//!
//! A small automation timeline for the output gain parameter. Every ramp
//! cancels whatever automation is still pending and anchors at the value the
//! gain actually has at that instant, so an interrupted fade continues from
//! where it was instead of jumping to a stale target.

/// One automation point on the gain timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GainEvent {
    /// Hold `value` from `time` onwards
    SetValue {
        /// Audio clock time in seconds
        time: f64,
        /// Gain value
        value: f32,
    },
    /// Ramp linearly from the previous point to `value`, arriving at `time`
    LinearRamp {
        /// Audio clock time in seconds at which `value` is reached
        time: f64,
        /// Target gain value
        value: f32,
    },
}

impl GainEvent {
    /// Time of this automation point
    pub fn time(&self) -> f64 {
        match *self {
            GainEvent::SetValue { time, .. } | GainEvent::LinearRamp { time, .. } => time,
        }
    }

    /// Value reached at this automation point
    pub fn value(&self) -> f32 {
        match *self {
            GainEvent::SetValue { value, .. } | GainEvent::LinearRamp { value, .. } => value,
        }
    }
}

/// Gain envelope for the output node
#[derive(Debug, Clone)]
pub struct GainEnvelope {
    initial: f32,
    events: Vec<GainEvent>,
}

impl GainEnvelope {
    /// Create an envelope resting at `initial`
    pub fn new(initial: f32) -> Self {
        Self {
            initial,
            events: Vec::new(),
        }
    }

    /// Pending automation points, in time order
    pub fn events(&self) -> &[GainEvent] {
        &self.events
    }

    /// Gain value at audio clock time `t`
    pub fn value_at(&self, t: f64) -> f32 {
        let mut prev_time = f64::NEG_INFINITY;
        let mut prev_value = self.initial;

        for event in &self.events {
            match *event {
                GainEvent::SetValue { time, value } => {
                    if time > t {
                        return prev_value;
                    }
                    prev_time = time;
                    prev_value = value;
                }
                GainEvent::LinearRamp { time, value } => {
                    if time > t {
                        if !prev_time.is_finite() || time <= prev_time {
                            return prev_value;
                        }
                        let progress = ((t - prev_time) / (time - prev_time)) as f32;
                        return prev_value + (value - prev_value) * progress;
                    }
                    prev_time = time;
                    prev_value = value;
                }
            }
        }

        prev_value
    }

    /// Set the gain to `value` immediately at `now`
    pub fn set_value_at(&mut self, value: f32, now: f64) {
        self.initial = self.value_at(now);
        self.events.clear();
        self.events.push(GainEvent::SetValue { time: now, value });
    }

    /// Ramp to `target` over `duration` seconds starting at `now`
    ///
    /// Pending automation is cancelled and the ramp starts from the gain value
    /// at `now`. Returns the anchored start value.
    pub fn ramp_to(&mut self, target: f32, duration: f64, now: f64) -> f32 {
        let start = self.value_at(now);
        self.events.clear();
        self.initial = start;
        if duration > 0.0 {
            self.events.push(GainEvent::SetValue {
                time: now,
                value: start,
            });
            self.events.push(GainEvent::LinearRamp {
                time: now + duration,
                value: target,
            });
        } else {
            self.events.push(GainEvent::SetValue {
                time: now,
                value: target,
            });
        }
        start
    }
}

impl Default for GainEnvelope {
    fn default() -> Self {
        Self::new(1.0)
    }
}
