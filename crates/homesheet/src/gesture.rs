#![forbid(unsafe_code)]

//! Pointer arbitration between the sheet and the scrollers beneath it.
//!
//! One pointer can mean four things on the home screen: drag the sheet,
//! swipe the media carousel, scroll the sheet content, or swipe a rail inside
//! the content. [`GestureRouter`] decides which, once per gesture, and drives
//! the [`PanelController`] when the sheet wins.
//!
//! # State Machine
//!
//! ```text
//!   Idle ──down(handle)──▶ Claimed ─────────────────────┐
//!   Idle ──down(other)───▶ Pending ──move past lock──▶ Claimed | Forwarded
//!                                                       │
//!   any ──up / cancel──────────────────────────────────▶ Idle
//! ```
//!
//! # Invariants
//!
//! 1. The locked axis is chosen at the first move whose `|dx|` or `|dy|`
//!    exceeds `axis_lock_threshold`, and is the larger of the two at that
//!    instant.
//! 2. Once locked, neither the axis nor the routing changes until the
//!    session ends.
//! 3. Only a `Claimed` session reaches the sheet; a `Forwarded` session is
//!    never seen by [`PanelController`].
//! 4. Pointer-cancel is handled exactly like pointer-up.
//!
//! # Failure Modes
//!
//! - A second pointer-down while a session is active is ignored; the first
//!   pointer keeps the session.
//! - Moves or releases with no active session are no-ops.

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use homesheet_core::geometry::{Axis, Delta, Point, VerticalDirection};
use homesheet_core::velocity::VelocityTracker;
use homesheet_core::viewport::ScrollableViewport;
use homesheet_core::{Duration, Instant};

use crate::panel::{PanelController, PanelEffect, PanelMode};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Axis detection and routing tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct GestureConfig {
    /// Movement (px, either axis) before the axis locks (default: 3).
    pub axis_lock_threshold: f64,
    /// Trailing window used for release velocity (default: 100ms).
    pub velocity_window_ms: u64,
    /// Whether an upward drag inside an expanded sheet drags the sheet
    /// rather than scrolling its content (default: true). Hosts whose
    /// content must scroll forward from the sheet body set this to false.
    pub claim_upward_when_expanded: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            axis_lock_threshold: 3.0,
            velocity_window_ms: 100,
            claim_upward_when_expanded: true,
        }
    }
}

impl GestureConfig {
    /// Velocity window as a [`Duration`].
    #[must_use]
    pub fn velocity_window(&self) -> Duration {
        Duration::from_millis(self.velocity_window_ms)
    }
}

// ---------------------------------------------------------------------------
// Session types
// ---------------------------------------------------------------------------

/// Where the pointer went down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerOrigin {
    /// The dedicated drag handle at the top of the sheet.
    Handle,
    /// Anywhere else on the sheet, including its content and rails.
    Sheet,
    /// The media carousel above the sheet.
    Carousel,
}

/// Who receives the movement of an unclaimed gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForwardTarget {
    /// The sheet's own vertical content scroll.
    ContentScroll,
    /// The carousel or a rail, whichever is under the pointer.
    HorizontalScroller,
    /// Nothing scrolls; the platform handles the event as it likes.
    Surface,
}

/// Routing decision for the active gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Routing {
    /// No gesture in progress.
    Idle,
    /// Pointer is down but the axis has not locked yet.
    Pending,
    /// The sheet owns the gesture; the host must stop propagation.
    Claimed,
    /// The gesture belongs to something else and must pass through untouched.
    Forwarded(ForwardTarget),
}

impl Routing {
    /// Whether the host should stop the event from reaching scrollers.
    #[inline]
    #[must_use]
    pub fn is_claimed(self) -> bool {
        self == Self::Claimed
    }
}

/// One pointer-down to pointer-up interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    /// Where the pointer went down.
    pub start_point: Point,
    /// Most recent pointer position.
    pub last_point: Point,
    /// Axis chosen at lock time.
    pub locked_axis: Option<Axis>,
    /// What the pointer went down on.
    pub origin: PointerOrigin,
    /// Current routing decision.
    pub routing: Routing,
}

impl DragSession {
    /// Displacement since pointer-down.
    #[inline]
    #[must_use]
    pub fn delta(&self) -> Delta {
        self.last_point.delta_from(self.start_point)
    }
}

// ---------------------------------------------------------------------------
// Routing rules
// ---------------------------------------------------------------------------

/// Decide the routing of a gesture at the instant its axis locks.
///
/// `delta` is the displacement at lock time and only its vertical sign is
/// consulted. `mode` and `content_at_top` describe the sheet at that instant.
#[must_use]
pub fn route(
    axis: Axis,
    delta: Delta,
    origin: PointerOrigin,
    mode: PanelMode,
    content_at_top: bool,
    config: &GestureConfig,
) -> Routing {
    if origin == PointerOrigin::Handle {
        return Routing::Claimed;
    }
    if axis == Axis::Horizontal {
        return Routing::Forwarded(ForwardTarget::HorizontalScroller);
    }
    match VerticalDirection::of(delta.dy) {
        VerticalDirection::Up => {
            if mode == PanelMode::Expanded
                && origin == PointerOrigin::Sheet
                && !config.claim_upward_when_expanded
            {
                Routing::Forwarded(ForwardTarget::ContentScroll)
            } else {
                Routing::Claimed
            }
        }
        VerticalDirection::Down => match (origin, mode) {
            (PointerOrigin::Carousel, _) => Routing::Forwarded(ForwardTarget::Surface),
            (_, PanelMode::Expanded) if !content_at_top => {
                Routing::Forwarded(ForwardTarget::ContentScroll)
            }
            _ => Routing::Claimed,
        },
    }
}

// ---------------------------------------------------------------------------
// GestureRouter
// ---------------------------------------------------------------------------

/// Classifies each pointer gesture and feeds claimed ones to the sheet.
#[derive(Debug, Clone)]
pub struct GestureRouter {
    config: GestureConfig,
    session: Option<DragSession>,
    velocity: VelocityTracker,
}

impl GestureRouter {
    /// Create an idle router.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            velocity: VelocityTracker::new(config.velocity_window()),
            config,
            session: None,
        }
    }

    /// Tuning.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// The active session, if any.
    #[inline]
    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Current routing, [`Routing::Idle`] between gestures.
    #[must_use]
    pub fn routing(&self) -> Routing {
        self.session.map_or(Routing::Idle, |s| s.routing)
    }

    /// Begin a session. A handle press claims the gesture for the sheet
    /// immediately; any other press waits for the axis to lock.
    pub fn on_pointer_down(
        &mut self,
        point: Point,
        origin: PointerOrigin,
        now: Instant,
        panel: &mut PanelController,
        content: &mut dyn ScrollableViewport,
    ) -> Routing {
        if let Some(session) = &self.session {
            tracing::trace!(?origin, "second pointer ignored");
            return session.routing;
        }

        self.velocity.clear();
        self.velocity.record(point, now);

        let (locked_axis, routing) = if origin == PointerOrigin::Handle {
            panel.begin_drag(true, content);
            (Some(Axis::Vertical), Routing::Claimed)
        } else {
            (None, Routing::Pending)
        };

        self.session = Some(DragSession {
            start_point: point,
            last_point: point,
            locked_axis,
            origin,
            routing,
        });
        tracing::trace!(?origin, ?routing, x = point.x, y = point.y, "pointer down");
        routing
    }

    /// Track movement, lock the axis when it crosses the threshold, and
    /// drag the sheet if the gesture is claimed.
    pub fn on_pointer_move(
        &mut self,
        point: Point,
        now: Instant,
        panel: &mut PanelController,
        content: &mut dyn ScrollableViewport,
    ) -> Routing {
        let Some(session) = self.session.as_mut() else {
            return Routing::Idle;
        };
        session.last_point = point;
        self.velocity.record(point, now);
        let delta = session.delta();

        if session.locked_axis.is_none() {
            if !delta.exceeds(self.config.axis_lock_threshold) {
                return Routing::Pending;
            }
            let axis = delta.dominant_axis();
            let content_at_top = panel.content_at_top(content);
            let routing = route(
                axis,
                delta,
                session.origin,
                panel.mode(),
                content_at_top,
                &self.config,
            );
            session.locked_axis = Some(axis);
            session.routing = routing;
            tracing::debug!(
                ?axis,
                ?routing,
                origin = ?session.origin,
                dx = delta.dx,
                dy = delta.dy,
                content_at_top,
                "gesture axis locked"
            );
            if routing.is_claimed() {
                panel.begin_drag(false, content);
            }
        }

        if session.routing.is_claimed() {
            panel.drag_to(delta.dy, content);
        }
        session.routing
    }

    /// End the session. Returns the sheet's effects if the gesture was
    /// claimed, otherwise nothing.
    pub fn on_pointer_up(
        &mut self,
        now: Instant,
        panel: &mut PanelController,
        content: &mut dyn ScrollableViewport,
    ) -> Vec<PanelEffect> {
        let Some(session) = self.session.take() else {
            return Vec::new();
        };
        let velocity = self.velocity.velocity(now);
        self.velocity.clear();

        if !session.routing.is_claimed() {
            tracing::trace!(routing = ?session.routing, "unclaimed gesture released");
            return Vec::new();
        }
        panel.end_drag(velocity.dy, session.delta().dy, content)
    }

    /// Same as [`on_pointer_up`](Self::on_pointer_up).
    pub fn on_pointer_cancel(
        &mut self,
        now: Instant,
        panel: &mut PanelController,
        content: &mut dyn ScrollableViewport,
    ) -> Vec<PanelEffect> {
        tracing::debug!("pointer cancelled");
        self.on_pointer_up(now, panel, content)
    }

    /// Forget any session without touching the sheet.
    pub fn reset(&mut self) {
        self.session = None;
        self.velocity.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{PanelBounds, PanelConfig};
    use homesheet_core::viewport::MemoryViewport;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    struct Rig {
        router: GestureRouter,
        panel: PanelController,
        content: MemoryViewport,
        t0: Instant,
    }

    impl Rig {
        fn new() -> Self {
            let mut content = MemoryViewport::new(500.0, 2000.0);
            let mut panel =
                PanelController::new(PanelBounds::new(0.0, -300.0), PanelConfig::default());
            panel.attach(&mut content);
            Self {
                router: GestureRouter::new(GestureConfig::default()),
                panel,
                content,
                t0: Instant::now(),
            }
        }

        fn down(&mut self, x: f64, y: f64, origin: PointerOrigin) -> Routing {
            self.router.on_pointer_down(
                Point::new(x, y),
                origin,
                self.t0,
                &mut self.panel,
                &mut self.content,
            )
        }

        fn mv(&mut self, x: f64, y: f64, at: u64) -> Routing {
            self.router.on_pointer_move(
                Point::new(x, y),
                self.t0 + ms(at),
                &mut self.panel,
                &mut self.content,
            )
        }

        fn up(&mut self, at: u64) -> Vec<PanelEffect> {
            self.router
                .on_pointer_up(self.t0 + ms(at), &mut self.panel, &mut self.content)
        }

        fn settle(&mut self) {
            for _ in 0..500 {
                self.panel.tick(ms(16), &mut self.content);
                if !self.panel.is_settling() {
                    break;
                }
            }
        }

        fn expand(&mut self) {
            self.down(100.0, 500.0, PointerOrigin::Handle);
            self.mv(100.0, 350.0, 50);
            self.up(60);
            self.settle();
            assert_eq!(self.panel.mode(), PanelMode::Expanded);
        }
    }

    // --- route() ---

    #[test]
    fn horizontal_is_always_forwarded() {
        let c = GestureConfig::default();
        for mode in [PanelMode::Collapsed, PanelMode::Expanded] {
            for origin in [PointerOrigin::Sheet, PointerOrigin::Carousel] {
                assert_eq!(
                    route(Axis::Horizontal, Delta::new(5.0, 1.0), origin, mode, true, &c),
                    Routing::Forwarded(ForwardTarget::HorizontalScroller)
                );
            }
        }
    }

    #[test]
    fn upward_is_claimed_in_every_mode() {
        let c = GestureConfig::default();
        for mode in [PanelMode::Collapsed, PanelMode::Expanded] {
            for at_top in [true, false] {
                assert_eq!(
                    route(Axis::Vertical, Delta::new(0.0, -5.0), PointerOrigin::Sheet, mode, at_top, &c),
                    Routing::Claimed
                );
            }
        }
    }

    #[test]
    fn upward_in_expanded_content_can_be_forwarded() {
        let c = GestureConfig {
            claim_upward_when_expanded: false,
            ..GestureConfig::default()
        };
        assert_eq!(
            route(
                Axis::Vertical,
                Delta::new(0.0, -5.0),
                PointerOrigin::Sheet,
                PanelMode::Expanded,
                false,
                &c
            ),
            Routing::Forwarded(ForwardTarget::ContentScroll)
        );
    }

    #[test]
    fn downward_expanded_depends_on_content_top() {
        let c = GestureConfig::default();
        let down = Delta::new(0.0, 5.0);
        assert_eq!(
            route(Axis::Vertical, down, PointerOrigin::Sheet, PanelMode::Expanded, true, &c),
            Routing::Claimed
        );
        assert_eq!(
            route(Axis::Vertical, down, PointerOrigin::Sheet, PanelMode::Expanded, false, &c),
            Routing::Forwarded(ForwardTarget::ContentScroll)
        );
        assert_eq!(
            route(Axis::Vertical, down, PointerOrigin::Handle, PanelMode::Expanded, false, &c),
            Routing::Claimed
        );
    }

    #[test]
    fn downward_over_carousel_passes_through() {
        let c = GestureConfig::default();
        assert_eq!(
            route(
                Axis::Vertical,
                Delta::new(0.0, 8.0),
                PointerOrigin::Carousel,
                PanelMode::Collapsed,
                true,
                &c
            ),
            Routing::Forwarded(ForwardTarget::Surface)
        );
    }

    // --- Router ---

    #[test]
    fn handle_claims_on_down() {
        let mut rig = Rig::new();
        assert_eq!(rig.down(10.0, 500.0, PointerOrigin::Handle), Routing::Claimed);
        assert!(rig.panel.state().drag_active);
        assert!(rig.panel.state().originated_from_handle);
        assert_eq!(rig.router.session().and_then(|s| s.locked_axis), Some(Axis::Vertical));
    }

    #[test]
    fn pending_until_threshold_exceeded() {
        let mut rig = Rig::new();
        assert_eq!(rig.down(0.0, 0.0, PointerOrigin::Sheet), Routing::Pending);
        assert_eq!(rig.mv(2.0, -3.0, 5), Routing::Pending, "3px is not past the lock");
        assert!(!rig.panel.state().drag_active);
        assert_eq!(rig.mv(2.0, -4.0, 10), Routing::Claimed);
        assert!(rig.panel.state().drag_active);
    }

    #[test]
    fn axis_lock_is_sticky() {
        let mut rig = Rig::new();
        rig.down(0.0, 0.0, PointerOrigin::Sheet);
        assert_eq!(
            rig.mv(6.0, 1.0, 5),
            Routing::Forwarded(ForwardTarget::HorizontalScroller)
        );
        // Later motion is overwhelmingly vertical; the lock holds.
        assert_eq!(
            rig.mv(7.0, -200.0, 30),
            Routing::Forwarded(ForwardTarget::HorizontalScroller)
        );
        assert_eq!(rig.router.session().and_then(|s| s.locked_axis), Some(Axis::Horizontal));
        assert_eq!(rig.panel.offset(), 0.0, "sheet never moved");
        assert!(rig.up(40).is_empty());
    }

    #[test]
    fn claimed_drag_moves_sheet_and_expands() {
        let mut rig = Rig::new();
        rig.down(50.0, 600.0, PointerOrigin::Sheet);
        for (i, y) in [595.0, 560.0, 520.0, 480.0, 450.0].into_iter().enumerate() {
            rig.mv(50.0, y, (i as u64 + 1) * 10);
        }
        assert_eq!(rig.panel.offset(), -150.0);
        let effects = rig.up(55);
        assert!(effects.contains(&PanelEffect::ModeChanged(PanelMode::Expanded)));
        assert!(rig.router.session().is_none());
    }

    #[test]
    fn expanded_scrolled_content_keeps_downward_pan() {
        let mut rig = Rig::new();
        rig.expand();
        rig.content.scroll_to(120.0);

        rig.down(50.0, 200.0, PointerOrigin::Sheet);
        assert_eq!(
            rig.mv(50.0, 210.0, 10),
            Routing::Forwarded(ForwardTarget::ContentScroll)
        );
        assert_eq!(rig.mv(50.0, 400.0, 40), Routing::Forwarded(ForwardTarget::ContentScroll));
        assert!(rig.up(50).is_empty());
        assert_eq!(rig.panel.mode(), PanelMode::Expanded);
        assert!(!rig.panel.state().drag_active);
    }

    #[test]
    fn second_pointer_is_ignored() {
        let mut rig = Rig::new();
        rig.down(0.0, 0.0, PointerOrigin::Sheet);
        assert_eq!(rig.down(300.0, 10.0, PointerOrigin::Handle), Routing::Pending);
        assert!(!rig.panel.state().originated_from_handle);
        assert_eq!(rig.router.session().map(|s| s.origin), Some(PointerOrigin::Sheet));
    }

    #[test]
    fn cancel_settles_like_up() {
        let mut rig = Rig::new();
        rig.down(0.0, 500.0, PointerOrigin::Handle);
        rig.mv(0.0, 440.0, 20);
        let effects =
            rig.router
                .on_pointer_cancel(rig.t0 + ms(30), &mut rig.panel, &mut rig.content);
        assert!(effects.iter().any(|e| matches!(e, PanelEffect::DragEnded(_))));
        assert!(!rig.panel.state().drag_active);
        assert!(rig.panel.is_settling());
        assert_eq!(rig.router.routing(), Routing::Idle);
    }

    #[test]
    fn held_pointer_releases_with_zero_velocity() {
        let mut rig = Rig::new();
        rig.down(0.0, 500.0, PointerOrigin::Handle);
        rig.mv(0.0, 494.0, 10);
        // 6px is under the drag threshold and the pointer rests for 400ms.
        let effects = rig.up(410);
        let outcome = effects.iter().find_map(|e| match e {
            PanelEffect::DragEnded(o) => Some(*o),
            _ => None,
        });
        let outcome = outcome.expect("claimed gesture reports its outcome");
        assert_eq!(outcome.velocity, 0.0);
        assert_eq!(outcome.to, PanelMode::Collapsed);
    }

    #[test]
    fn strays_without_session_are_noops() {
        let mut rig = Rig::new();
        assert_eq!(rig.mv(10.0, 10.0, 5), Routing::Idle);
        assert!(rig.up(10).is_empty());
    }
}
