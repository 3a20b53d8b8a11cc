#![forbid(unsafe_code)]

//! Time-driven animation primitives.
//!
//! An [`Animation`] is advanced by the host's frame clock via
//! [`tick`](Animation::tick). Animations never read the clock themselves.

use web_time::Duration;

pub mod spring;

pub use spring::{Spring, SpringParams};

/// A value animated over time.
pub trait Animation {
    /// Advance the animation by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its resting value.
    fn is_complete(&self) -> bool;

    /// Current animated value.
    fn value(&self) -> f64;

    /// Restart from the initial value.
    fn reset(&mut self);
}
