#![forbid(unsafe_code)]

//! Mass-spring-damper used to settle the sheet after a release.
//!
//! ```text
//!   m·a = -k·(x - target) - c·v
//! ```
//!
//! With the defaults (k = 300, c = 30, m = 0.5) the settle is slightly
//! overdamped: `c` exceeds `2·sqrt(k·m)`, so a spring released from rest
//! does not swing past its target. A seeded release velocity toward the
//! target can still carry it across once, by a bounded amount, before it
//! returns without oscillating. A spring reports rest once it is within
//! `rest_delta` of the target and slower than `rest_speed`, and at that
//! moment it is placed exactly on the target.
//!
//! Time advances in semi-implicit Euler substeps of at most 4ms, which keeps
//! the result independent of the host's frame rate. Non-finite construction
//! inputs are replaced so NaN cannot reach a layout.

use web_time::Duration;

use super::Animation;

/// Maximum dt per integration step (4ms).
const MAX_STEP_SECS: f64 = 0.004;

/// Minimum stiffness to prevent degenerate springs.
const MIN_STIFFNESS: f64 = 0.1;

/// Minimum mass to prevent division blow-up.
const MIN_MASS: f64 = 0.001;

/// Tunable spring parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    /// Restoring force strength.
    pub stiffness: f64,
    /// Velocity drag.
    pub damping: f64,
    /// Inertia.
    pub mass: f64,
    /// Distance to target below which the spring may rest.
    pub rest_delta: f64,
    /// Speed below which the spring may rest.
    pub rest_speed: f64,
}

impl Default for SpringParams {
    /// Sheet-settle defaults: stiffness 300, damping 30, mass 0.5.
    fn default() -> Self {
        Self {
            stiffness: 300.0,
            damping: 30.0,
            mass: 0.5,
            rest_delta: 0.01,
            rest_speed: 0.01,
        }
    }
}

impl SpringParams {
    /// Damping coefficient at which these parameters become critically damped.
    #[must_use]
    pub fn critical_damping(&self) -> f64 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }
}

/// A one-dimensional spring heading for `target`.
///
/// # Example
///
/// ```
/// use homesheet_core::animation::{Animation, Spring};
/// use homesheet_core::Duration;
///
/// let mut spring = Spring::new(0.0, -250.0).with_velocity(-800.0);
/// for _ in 0..120 {
///     spring.tick(Duration::from_millis(16));
/// }
/// assert!(spring.is_complete());
/// assert_eq!(spring.position(), -250.0);
/// ```
#[derive(Debug, Clone)]
pub struct Spring {
    position: f64,
    velocity: f64,
    target: f64,
    origin: (f64, f64),
    params: SpringParams,
    resting: bool,
}

impl Spring {
    /// Create a spring at `initial` heading for `target`, with
    /// [`SpringParams::default`].
    #[must_use]
    pub fn new(initial: f64, target: f64) -> Self {
        let target = finite_or(target, 0.0);
        let initial = finite_or(initial, target);
        Self {
            position: initial,
            velocity: 0.0,
            target,
            origin: (initial, 0.0),
            params: SpringParams::default(),
            resting: false,
        }
    }

    /// Apply a full parameter set (builder pattern).
    #[must_use]
    pub fn with_params(self, params: SpringParams) -> Self {
        self.with_stiffness(params.stiffness)
            .with_damping(params.damping)
            .with_mass(params.mass)
            .with_rest_delta(params.rest_delta)
            .with_rest_speed(params.rest_speed)
    }

    /// Stiffness, floored at 0.1.
    #[must_use]
    pub fn with_stiffness(mut self, k: f64) -> Self {
        self.params.stiffness = k.max(MIN_STIFFNESS);
        self
    }

    /// Damping, floored at 0.
    #[must_use]
    pub fn with_damping(mut self, c: f64) -> Self {
        self.params.damping = c.max(0.0);
        self
    }

    /// Mass, floored at a small positive value.
    #[must_use]
    pub fn with_mass(mut self, m: f64) -> Self {
        self.params.mass = m.max(MIN_MASS);
        self
    }

    /// Distance to target under which the spring may rest.
    #[must_use]
    pub fn with_rest_delta(mut self, delta: f64) -> Self {
        self.params.rest_delta = delta.abs();
        self
    }

    /// Speed under which the spring may rest.
    #[must_use]
    pub fn with_rest_speed(mut self, speed: f64) -> Self {
        self.params.rest_speed = speed.abs();
        self
    }

    /// Seed the starting velocity, typically the pointer velocity at release.
    #[must_use]
    pub fn with_velocity(mut self, velocity: f64) -> Self {
        let velocity = finite_or(velocity, 0.0);
        self.velocity = velocity;
        self.origin.1 = velocity;
        self
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Effective parameters after clamping.
    #[inline]
    #[must_use]
    pub fn params(&self) -> &SpringParams {
        &self.params
    }

    /// Point the spring somewhere else. A resting spring starts moving again.
    pub fn set_target(&mut self, target: f64) {
        if target.is_finite() && (self.target - target).abs() > self.params.rest_delta {
            self.target = target;
            self.resting = false;
        }
    }

    /// Add `velocity_delta` to the current velocity.
    pub fn impulse(&mut self, velocity_delta: f64) {
        if velocity_delta.is_finite() {
            self.velocity += velocity_delta;
            self.resting = false;
        }
    }

    #[inline]
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.resting
    }

    /// Integrate `dt` in substeps of at most 4ms, then snap to the target
    /// if both rest thresholds are met.
    pub fn advance(&mut self, dt: Duration) {
        let mut remaining = dt.as_secs_f64();
        if self.resting || remaining <= 0.0 {
            return;
        }

        let SpringParams {
            stiffness,
            damping,
            mass,
            rest_delta,
            rest_speed,
        } = self.params;
        while remaining > 0.0 {
            let h = remaining.min(MAX_STEP_SECS);
            let force = -stiffness * (self.position - self.target) - damping * self.velocity;
            self.velocity += force / mass * h;
            self.position += self.velocity * h;
            remaining -= h;
        }

        if (self.position - self.target).abs() < rest_delta && self.velocity.abs() < rest_speed {
            self.position = self.target;
            self.velocity = 0.0;
            self.resting = true;
        }
    }
}

fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() { v } else { fallback }
}

impl Animation for Spring {
    fn tick(&mut self, dt: Duration) {
        self.advance(dt);
    }

    fn is_complete(&self) -> bool {
        self.resting
    }

    fn value(&self) -> f64 {
        self.position
    }

    fn reset(&mut self) {
        (self.position, self.velocity) = self.origin;
        self.resting = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_16: Duration = Duration::from_millis(16);

    fn run_frames(spring: &mut Spring, frames: usize) {
        (0..frames).for_each(|_| spring.tick(MS_16));
    }

    #[test]
    fn spring_reaches_target_exactly() {
        let mut spring = Spring::new(0.0, -320.0);
        run_frames(&mut spring, 200);
        assert!(spring.is_complete());
        assert_eq!(spring.position(), -320.0);
        assert_eq!(spring.velocity(), 0.0);
    }

    #[test]
    fn fresh_spring_is_moving_from_initial() {
        let spring = Spring::new(-42.0, 0.0);
        assert_eq!(spring.position(), -42.0);
        assert!(!spring.is_complete());
    }

    #[test]
    fn default_params_do_not_overshoot() {
        // c = 30 > 2√(300 × 0.5) ≈ 24.5, so the default settle is overdamped.
        let params = SpringParams::default();
        assert!(params.damping > params.critical_damping());

        let mut spring = Spring::new(0.0, -300.0);
        let mut min_pos = 0.0_f64;
        for _ in 0..300 {
            spring.tick(MS_16);
            min_pos = min_pos.min(spring.position());
        }
        assert!(min_pos >= -300.0 - 1e-6, "overshoot to {min_pos}");
    }

    #[test]
    fn fast_release_crosses_target_once() {
        let target = -300.0;
        let mut spring = Spring::new(0.0, target).with_velocity(-30_000.0);
        let mut crossings = 0;
        let mut lowest = 0.0_f64;
        let mut above = true;
        for _ in 0..400 {
            spring.tick(MS_16);
            lowest = lowest.min(spring.position());
            let now_above = spring.position() > target;
            if now_above != above && spring.position() != target {
                crossings += 1;
            }
            above = now_above;
        }
        assert!(lowest < target, "expected a crossing");
        assert!(lowest > 2.0 * target, "overshoot to {lowest}");
        assert_eq!(crossings, 1);
        assert!(spring.is_complete());
        assert_eq!(spring.position(), target);
    }

    #[test]
    fn release_velocity_carries_into_motion() {
        let mut still = Spring::new(0.0, -300.0);
        let mut flung = Spring::new(0.0, -300.0).with_velocity(-1500.0);
        still.tick(MS_16);
        flung.tick(MS_16);
        assert!(
            flung.position() < still.position(),
            "flung {} should lead still {}",
            flung.position(),
            still.position()
        );
    }

    #[test]
    fn heavier_mass_responds_slower() {
        let mut light = Spring::new(0.0, 100.0).with_mass(0.5);
        let mut heavy = Spring::new(0.0, 100.0).with_mass(4.0);
        run_frames(&mut light, 3);
        run_frames(&mut heavy, 3);
        assert!(light.position() > heavy.position());
    }

    #[test]
    fn low_damping_overshoots() {
        let params = SpringParams {
            damping: 4.0,
            ..SpringParams::default()
        };
        let mut spring = Spring::new(0.0, 100.0).with_params(params);
        let peak = (0..200)
            .map(|_| {
                spring.tick(MS_16);
                spring.position()
            })
            .fold(f64::MIN, f64::max);
        assert!(peak > 100.0, "expected overshoot, peak {peak}");
    }

    #[test]
    fn long_frame_stays_stable() {
        let mut spring = Spring::new(0.0, 100.0).with_stiffness(1000.0);
        spring.tick(Duration::from_millis(500));
        assert!(spring.position().is_finite());
        assert!((spring.position() - 100.0).abs() < 1.0);
    }

    #[test]
    fn zero_dt_is_noop() {
        let mut spring = Spring::new(5.0, 100.0);
        spring.tick(Duration::ZERO);
        assert_eq!(spring.position(), 5.0);
    }

    #[test]
    fn at_rest_stays_put() {
        let mut spring = Spring::new(0.0, 10.0);
        run_frames(&mut spring, 200);
        assert!(spring.is_at_rest());
        spring.tick(Duration::from_secs(1));
        assert_eq!(spring.position(), 10.0);
    }

    #[test]
    fn retarget_resumes_motion() {
        let mut spring = Spring::new(0.0, 10.0);
        run_frames(&mut spring, 200);
        spring.set_target(50.0);
        assert!(!spring.is_at_rest());
        run_frames(&mut spring, 200);
        assert_eq!(spring.position(), 50.0);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut spring = Spring::new(0.0, 10.0).with_velocity(3.0);
        run_frames(&mut spring, 10);
        spring.reset();
        assert_eq!(spring.position(), 0.0);
        assert_eq!(spring.velocity(), 3.0);
        assert!(!spring.is_complete());
    }

    #[test]
    fn non_finite_inputs_are_neutralised() {
        let spring = Spring::new(f64::NAN, 12.0).with_velocity(f64::INFINITY);
        assert_eq!(spring.position(), 12.0);
        assert_eq!(spring.velocity(), 0.0);
    }

    #[test]
    fn params_are_clamped() {
        let spring = Spring::new(0.0, 1.0)
            .with_stiffness(-5.0)
            .with_damping(-1.0)
            .with_mass(0.0);
        assert!(spring.params().stiffness > 0.0);
        assert_eq!(spring.params().damping, 0.0);
        assert!(spring.params().mass > 0.0);
    }
}
