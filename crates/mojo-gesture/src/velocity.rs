#![forbid(unsafe_code)]

//! Smoothed pointer velocity.
//!
//! Each move contributes a raw velocity `(position - last) / dt` in px/s. The
//! tracker keeps the two most recent raw samples and reports their weighted
//! average: `round(w * newest + (1 - w) * previous)`, with `w = 0.7` by
//! default. A single sample reports itself, rounded.
//!
//! Samples with zero elapsed time are dropped (the position still advances)
//! so coalesced host events cannot divide by zero.

use mojo_core::geometry::{Point, Velocity};
use web_time::Instant;

/// Maximum raw samples kept.
pub const HISTORY_LEN: usize = 2;

/// A single observed pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerSample {
    pub position: Point,
    pub timestamp: Instant,
}

/// Two-sample weighted velocity tracker.
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    recent_weight: f64,
    last: Option<PointerSample>,
    history: [Option<Velocity>; HISTORY_LEN],
    velocity: Velocity,
}

impl VelocityTracker {
    /// Create a tracker weighting the newest sample by `recent_weight`.
    #[must_use]
    pub fn new(recent_weight: f64) -> Self {
        Self {
            recent_weight: recent_weight.clamp(0.0, 1.0),
            last: None,
            history: [None; HISTORY_LEN],
            velocity: Velocity::ZERO,
        }
    }

    /// Start tracking from `sample` without recording a velocity.
    pub fn reset(&mut self, sample: PointerSample) {
        self.last = Some(sample);
        self.history = [None; HISTORY_LEN];
        self.velocity = Velocity::ZERO;
    }

    /// Record a new position and return the smoothed velocity.
    pub fn record(&mut self, sample: PointerSample) -> Velocity {
        let Some(last) = self.last.replace(sample) else {
            return self.velocity;
        };
        let dt = sample.timestamp.saturating_duration_since(last.timestamp);
        if dt.is_zero() {
            return self.velocity;
        }
        let secs = dt.as_secs_f64();
        let raw = Velocity::new(
            f64::from(sample.position.x - last.position.x) / secs,
            f64::from(sample.position.y - last.position.y) / secs,
        );
        self.history = [Some(raw), self.history[0]];
        self.velocity = self.smoothed();
        self.velocity
    }

    /// Current smoothed velocity.
    #[must_use]
    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    /// Number of raw samples currently held.
    #[must_use]
    pub fn samples(&self) -> usize {
        self.history.iter().flatten().count()
    }

    fn smoothed(&self) -> Velocity {
        match self.history {
            [Some(newest), Some(previous)] => {
                let w = self.recent_weight;
                Velocity::new(
                    (w * newest.x + (1.0 - w) * previous.x).round(),
                    (w * newest.y + (1.0 - w) * previous.y).round(),
                )
            }
            [Some(only), None] => Velocity::new(only.x.round(), only.y.round()),
            _ => Velocity::ZERO,
        }
    }
}

impl Default for VelocityTracker {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_VELOCITY_RECENT_WEIGHT)
    }
}
