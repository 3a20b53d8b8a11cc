#![forbid(unsafe_code)]

//! Windowed pointer velocity estimation.
//!
//! [`VelocityTracker`] keeps the pointer samples from the trailing window and
//! reports velocity as displacement over elapsed time between the oldest
//! retained sample and the newest one. Units are logical pixels per second.

use std::collections::VecDeque;

use web_time::{Duration, Instant};

use crate::geometry::{Delta, Point};

const MAX_SAMPLES: usize = 32;

/// Estimates pointer velocity from recent samples.
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    window: Duration,
    samples: VecDeque<(Point, Instant)>,
}

impl VelocityTracker {
    /// Create a tracker that considers samples no older than `window`.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            samples: VecDeque::with_capacity(MAX_SAMPLES),
        }
    }

    /// Record a pointer position.
    pub fn record(&mut self, point: Point, now: Instant) {
        if self.samples.len() == MAX_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back((point, now));
        self.prune(now);
    }

    /// Velocity at `now` in px/s. Zero if fewer than two samples remain in
    /// the window or no time has elapsed between them.
    #[must_use]
    pub fn velocity(&self, now: Instant) -> Delta {
        let mut recent = self
            .samples
            .iter()
            .filter(|(_, t)| now.saturating_duration_since(*t) <= self.window);
        let Some(&(first, t0)) = recent.next() else {
            return Delta::default();
        };
        let Some(&(last, t1)) = recent.last() else {
            return Delta::default();
        };
        let secs = t1.saturating_duration_since(t0).as_secs_f64();
        if secs <= 0.0 {
            return Delta::default();
        }
        let d = last.delta_from(first);
        Delta::new(d.dx / secs, d.dy / secs)
    }

    /// Forget all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    fn prune(&mut self, now: Instant) {
        while self.samples.len() > 1 {
            let (_, oldest) = self.samples[0];
            if now.saturating_duration_since(oldest) > self.window {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }
}
