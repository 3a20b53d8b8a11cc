// Forbid unsafe in production; deny in tests.
#![cfg_attr(not(test), forbid(unsafe_code))]
#![cfg_attr(test, deny(unsafe_code))]

//! Core: host-agnostic primitives for layered, gesture-driven surfaces.
//!
//! # Role in homesheet
//! `homesheet-core` is the physics and plumbing layer. It knows nothing about
//! sheets, carousels, or rails; it provides the pieces those components are
//! assembled from.
//!
//! # Primary responsibilities
//! - **Geometry**: pointer positions, axes, and movement directions.
//! - **Animation**: the [`Animation`](animation::Animation) trait and a
//!   mass-aware damped [`Spring`](animation::spring::Spring).
//! - **Timers**: polled debounce, throttle, interval, and next-frame tasks that
//!   are owned and cancelled by the component that created them.
//! - **Velocity**: a windowed pointer [`VelocityTracker`](velocity::VelocityTracker).
//! - **Viewport**: the [`ScrollableViewport`](viewport::ScrollableViewport)
//!   capability over whatever scroll primitive the host platform offers.
//!
//! # How it fits in the system
//! The engine crate (`homesheet`) drives these primitives from pointer events
//! and frame callbacks. Nothing here reads a clock: every time-dependent call
//! takes an explicit `Instant` or `Duration`, which keeps the engine
//! deterministic under test.

pub mod animation;
pub mod geometry;
pub mod timer;
pub mod velocity;
pub mod viewport;

pub use web_time::{Duration, Instant};
