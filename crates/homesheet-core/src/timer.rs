#![forbid(unsafe_code)]

//! Polled, owner-cancelled scheduled tasks.
//!
//! Each timer is a plain value held by the component that needs it. The
//! owner calls `poll(now)` from its event or frame handler and gets `true`
//! exactly once per firing. Nothing runs in the background, so a timer that
//! is never polled again (because its owner was torn down) can never fire
//! against a destroyed scene.
//!
//! # Invariants
//!
//! 1. `cancel()` is idempotent: cancelling an idle timer is a no-op.
//! 2. After `cancel()`, `poll()` returns `false` until the timer is re-armed.
//! 3. A firing is reported by exactly one `poll()` call.

use web_time::{Duration, Instant};

/// Trailing-edge debounce: fires once `delay` has passed since the last
/// [`poke`](Debounce::poke).
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    /// Create an idle debounce with the given delay.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Restart the quiet period from `now`.
    pub fn poke(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Returns `true` once the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether a firing is scheduled.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// The configured delay.
    #[inline]
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Throttle: the first [`signal`](Throttle::signal) schedules a firing
/// `interval` later; signals arriving while one is scheduled are absorbed.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    deadline: Option<Instant>,
}

impl Throttle {
    /// Create an idle throttle with the given interval.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    /// Request a firing. Absorbed if one is already scheduled.
    ///
    /// Returns `true` if this signal scheduled a new firing.
    pub fn signal(&mut self, now: Instant) -> bool {
        if self.deadline.is_some() {
            return false;
        }
        self.deadline = Some(now + self.interval);
        true
    }

    /// Returns `true` once the scheduled firing is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether a firing is scheduled.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

/// Fixed-period repeating timer.
///
/// Missed periods are not replayed: if the host stalls for several periods,
/// the next `poll` fires once and the schedule restarts from `now`.
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    next: Option<Instant>,
}

impl Interval {
    /// Create a stopped interval.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self { period, next: None }
    }

    /// Start (or restart) so the first firing is one period after `now`.
    pub fn start(&mut self, now: Instant) {
        if self.period.is_zero() {
            return;
        }
        self.next = Some(now + self.period);
    }

    /// Stop firing. Idempotent.
    pub fn stop(&mut self) {
        self.next = None;
    }

    /// Whether the interval is running.
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.next.is_some()
    }

    /// The configured period.
    #[inline]
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Returns `true` if a period boundary was crossed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(next) = self.next else {
            return false;
        };
        if now < next {
            return false;
        }
        let following = next + self.period;
        self.next = Some(if now >= following {
            now + self.period
        } else {
            following
        });
        true
    }
}

/// A task that runs on the next frame after it was scheduled.
///
/// Scheduling twice before the frame runs the task once.
#[derive(Debug, Clone, Default)]
pub struct FrameTask {
    scheduled: bool,
}

impl FrameTask {
    /// Create an unscheduled task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run on the next frame.
    pub fn schedule(&mut self) {
        self.scheduled = true;
    }

    /// Called from the frame handler. Returns `true` if the task was due.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.scheduled)
    }

    /// Drop the scheduled run. Idempotent.
    pub fn cancel(&mut self) {
        self.scheduled = false;
    }

    /// Whether the task will run on the next frame.
    #[inline]
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }
}
