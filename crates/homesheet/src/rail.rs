#![forbid(unsafe_code)]

//! Drag bounds for horizontal rails inside the sheet.
//!
//! A rail is a row of cards wider than its container. It may be dragged left
//! until its right edge meets the container's right edge, and never right of
//! its resting position:
//!
//! ```text
//!   min_offset = -max(0, content_width - container_width)
//!   max_offset = 0
//! ```
//!
//! [`RailConstraint::compute`] is a pure function of the two widths.
//! [`ElasticRail`] wraps it for one mounted rail: it throttles resize
//! signals, reports only changed bounds, and pulls the rail back inside when
//! new bounds leave it stranded.

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use homesheet_core::timer::Throttle;
use homesheet_core::viewport::ScrollableViewport;
use homesheet_core::{Duration, Instant};

/// Rail recompute throttling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct RailConfig {
    /// Minimum spacing between recomputes after a resize (default: 100ms).
    pub resize_throttle_ms: u64,
}

impl Default for RailConfig {
    fn default() -> Self {
        Self {
            resize_throttle_ms: 100,
        }
    }
}

/// Allowed horizontal offsets of one rail.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RailConstraint {
    /// Measured container width.
    pub container_width: f64,
    /// Measured content width.
    pub content_width: f64,
    /// Leftmost allowed offset, never positive.
    pub min_offset: f64,
}

impl RailConstraint {
    /// Bounds for the given widths. A missing or non-finite measurement
    /// yields the neutral constraint (no travel).
    #[must_use]
    pub fn compute(container_width: Option<f64>, content_width: Option<f64>) -> Self {
        let (Some(container), Some(content)) = (
            container_width.filter(|w| w.is_finite()),
            content_width.filter(|w| w.is_finite()),
        ) else {
            return Self::default();
        };
        let overflow = content - container;
        Self {
            container_width: container,
            content_width: content,
            min_offset: if overflow > 0.0 { -overflow } else { 0.0 },
        }
    }

    /// Bounds for a rail viewport: its visible width against its content width.
    #[must_use]
    pub fn measure(viewport: &dyn ScrollableViewport) -> Self {
        Self::compute(viewport.viewport_size(), viewport.content_size())
    }

    /// Like [`measure`](Self::measure), but `None` unless both widths are
    /// available and finite.
    #[must_use]
    pub fn try_measure(viewport: &dyn ScrollableViewport) -> Option<Self> {
        let measured = |w: Option<f64>| w.is_some_and(f64::is_finite);
        (measured(viewport.viewport_size()) && measured(viewport.content_size()))
            .then(|| Self::measure(viewport))
    }

    /// Rightmost allowed offset.
    #[inline]
    #[must_use]
    pub const fn max_offset(&self) -> f64 {
        0.0
    }

    /// Clamp `offset` into `[min_offset, 0]`.
    #[must_use]
    pub fn clamp(&self, offset: f64) -> f64 {
        offset.clamp(self.min_offset, self.max_offset())
    }

    /// The corrected offset if `offset` lies outside the bounds.
    #[must_use]
    pub fn correction(&self, offset: f64) -> Option<f64> {
        let clamped = self.clamp(offset);
        (clamped != offset).then_some(clamped)
    }
}

/// Identifies a rail on the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RailId(pub u32);

/// New bounds for a rail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RailUpdate {
    /// Which rail.
    pub id: RailId,
    /// The new bounds.
    pub constraint: RailConstraint,
    /// The rail's offset after being pulled back inside, if it had to move.
    pub corrected_offset: Option<f64>,
}

/// One mounted rail.
#[derive(Debug, Clone)]
pub struct ElasticRail {
    id: RailId,
    throttle: Throttle,
    constraint: Option<RailConstraint>,
    offset: f64,
}

impl ElasticRail {
    /// An unmeasured rail at rest.
    #[must_use]
    pub fn new(id: RailId, config: RailConfig) -> Self {
        Self {
            id,
            throttle: Throttle::new(Duration::from_millis(config.resize_throttle_ms)),
            constraint: None,
            offset: 0.0,
        }
    }

    /// Rail identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> RailId {
        self.id
    }

    /// Last computed bounds.
    #[inline]
    #[must_use]
    pub fn constraint(&self) -> RailConstraint {
        self.constraint.unwrap_or_default()
    }

    /// Current drag offset.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Record the offset the platform drag left the rail at.
    pub fn set_offset(&mut self, offset: f64) {
        if offset.is_finite() {
            self.offset = offset;
        }
    }

    /// Measure right away. Call once the rail is laid out.
    pub fn mount(&mut self, viewport: Option<&dyn ScrollableViewport>) -> Option<RailUpdate> {
        self.recompute(viewport)
    }

    /// A size observer saw the container or content change.
    pub fn on_resize(&mut self, now: Instant) {
        self.throttle.signal(now);
    }

    /// Recompute if a throttled resize is due.
    pub fn poll(
        &mut self,
        now: Instant,
        viewport: Option<&dyn ScrollableViewport>,
    ) -> Option<RailUpdate> {
        if self.throttle.poll(now) {
            self.recompute(viewport)
        } else {
            None
        }
    }

    /// Measure and report bounds if `min_offset` changed. The offset moves
    /// only if the new bounds exclude it. An unmeasurable rail keeps its
    /// last bounds and offset until the next recompute.
    pub fn recompute(&mut self, viewport: Option<&dyn ScrollableViewport>) -> Option<RailUpdate> {
        let Some(next) = viewport.and_then(|vp| RailConstraint::try_measure(vp)) else {
            tracing::trace!(rail = self.id.0, "rail not measurable");
            return None;
        };
        let previous = self.constraint.replace(next);
        if previous.is_some_and(|p| p.min_offset == next.min_offset) {
            return None;
        }

        let corrected_offset = next.correction(self.offset);
        if let Some(offset) = corrected_offset {
            self.offset = offset;
        }
        tracing::debug!(
            rail = self.id.0,
            min_offset = next.min_offset,
            container = next.container_width,
            content = next.content_width,
            ?corrected_offset,
            "rail bounds changed"
        );
        Some(RailUpdate {
            id: self.id,
            constraint: next,
            corrected_offset,
        })
    }

    /// Drop any pending recompute. Idempotent.
    pub fn teardown(&mut self) {
        self.throttle.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homesheet_core::viewport::MemoryViewport;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn overflow_gives_negative_min() {
        let c = RailConstraint::compute(Some(375.0), Some(1200.0));
        assert_eq!(c.min_offset, -825.0);
        assert_eq!(c.max_offset(), 0.0);
    }

    #[test]
    fn fitting_content_cannot_move() {
        for content in [375.0, 200.0, 0.0] {
            let c = RailConstraint::compute(Some(375.0), Some(content));
            assert_eq!(c.min_offset, 0.0);
            assert!(c.min_offset.is_sign_positive(), "no negative zero");
        }
    }

    #[test]
    fn missing_measurements_are_neutral() {
        assert_eq!(RailConstraint::compute(None, None), RailConstraint::default());
        assert_eq!(RailConstraint::compute(Some(300.0), None).min_offset, 0.0);
        assert_eq!(RailConstraint::compute(Some(f64::NAN), Some(900.0)).min_offset, 0.0);
    }

    #[test]
    fn compute_is_idempotent() {
        let a = RailConstraint::compute(Some(390.0), Some(1711.5));
        let b = RailConstraint::compute(Some(390.0), Some(1711.5));
        assert_eq!(a.min_offset.to_bits(), b.min_offset.to_bits());
    }

    #[test]
    fn correction_only_outside() {
        let c = RailConstraint::compute(Some(100.0), Some(400.0));
        assert_eq!(c.correction(-150.0), None);
        assert_eq!(c.correction(-350.0), Some(-300.0));
        assert_eq!(c.correction(20.0), Some(0.0));
    }

    #[test]
    fn mount_reports_first_measurement() {
        let vp = MemoryViewport::new(375.0, 900.0);
        let mut rail = ElasticRail::new(RailId(1), RailConfig::default());
        let update = rail.mount(Some(&vp)).unwrap();
        assert_eq!(update.constraint.min_offset, -525.0);
        assert_eq!(update.corrected_offset, None);
    }

    #[test]
    fn unchanged_bounds_are_not_reported() {
        let vp = MemoryViewport::new(375.0, 900.0);
        let mut rail = ElasticRail::new(RailId(1), RailConfig::default());
        rail.mount(Some(&vp));
        assert!(rail.recompute(Some(&vp)).is_none());
    }

    #[test]
    fn shrinking_content_pulls_rail_back() {
        let mut vp = MemoryViewport::new(375.0, 900.0);
        let mut rail = ElasticRail::new(RailId(2), RailConfig::default());
        rail.mount(Some(&vp));
        rail.set_offset(-500.0);

        vp.set_content_size(600.0);
        let update = rail.recompute(Some(&vp)).unwrap();
        assert_eq!(update.constraint.min_offset, -225.0);
        assert_eq!(update.corrected_offset, Some(-225.0));
        assert_eq!(rail.offset(), -225.0);
    }

    #[test]
    fn growing_content_leaves_offset_alone() {
        let mut vp = MemoryViewport::new(375.0, 900.0);
        let mut rail = ElasticRail::new(RailId(2), RailConfig::default());
        rail.mount(Some(&vp));
        rail.set_offset(-200.0);
        vp.set_content_size(1500.0);
        let update = rail.recompute(Some(&vp)).unwrap();
        assert_eq!(update.corrected_offset, None);
        assert_eq!(rail.offset(), -200.0);
    }

    #[test]
    fn resize_signals_are_throttled() {
        let t = Instant::now();
        let mut vp = MemoryViewport::new(375.0, 900.0);
        let mut rail = ElasticRail::new(RailId(3), RailConfig::default());
        rail.mount(Some(&vp));

        vp.set_content_size(1000.0);
        rail.on_resize(t);
        rail.on_resize(t + ms(30));
        rail.on_resize(t + ms(60));
        assert!(rail.poll(t + ms(99), Some(&vp)).is_none());
        assert!(rail.poll(t + ms(100), Some(&vp)).is_some());
        assert!(rail.poll(t + ms(200), Some(&vp)).is_none());
    }

    #[test]
    fn missing_viewport_keeps_bounds_and_offset() {
        let vp = MemoryViewport::new(375.0, 900.0);
        let mut rail = ElasticRail::new(RailId(4), RailConfig::default());
        rail.mount(Some(&vp));
        rail.set_offset(-300.0);

        assert!(rail.recompute(None).is_none());
        assert_eq!(rail.constraint().min_offset, -525.0);
        assert_eq!(rail.offset(), -300.0);

        assert!(rail.recompute(Some(&vp)).is_none());
        assert_eq!(rail.offset(), -300.0);
    }

    #[test]
    fn unmounted_viewport_keeps_offset() {
        let mut vp = MemoryViewport::new(375.0, 900.0);
        let mut rail = ElasticRail::new(RailId(6), RailConfig::default());
        rail.mount(Some(&vp));
        rail.set_offset(-300.0);

        vp.set_mounted(false);
        assert!(rail.recompute(Some(&vp)).is_none());
        assert_eq!(rail.offset(), -300.0);

        vp.set_mounted(true);
        assert!(rail.recompute(Some(&vp)).is_none());
        assert_eq!(rail.offset(), -300.0);
    }

    #[test]
    fn unmeasurable_mount_reports_later() {
        let mut vp = MemoryViewport::unmounted();
        let mut rail = ElasticRail::new(RailId(7), RailConfig::default());
        assert!(rail.mount(Some(&vp)).is_none());
        assert_eq!(rail.constraint(), RailConstraint::default());

        vp.set_mounted(true);
        vp.set_viewport_size(375.0);
        vp.set_content_size(900.0);
        let update = rail.recompute(Some(&vp)).unwrap();
        assert_eq!(update.constraint.min_offset, -525.0);
    }

    #[test]
    fn teardown_drops_pending_resize() {
        let t = Instant::now();
        let vp = MemoryViewport::new(375.0, 900.0);
        let mut rail = ElasticRail::new(RailId(5), RailConfig::default());
        rail.on_resize(t);
        rail.teardown();
        rail.teardown();
        assert!(rail.poll(t + ms(500), Some(&vp)).is_none());
    }
}
