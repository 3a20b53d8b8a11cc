#![forbid(unsafe_code)]

//! Sheet state machine and settle animation.
//!
//! The sheet rests either `Collapsed` (revealing the carousel) or `Expanded`
//! (covering it). Between pointer-down and release it is dragging; after
//! release a spring settles it onto a resting offset.
//!
//! The logic is split in two:
//!
//! - [`PanelMachine`] is a pure value. [`step`](PanelMachine::step) maps an
//!   event to the next machine and a list of [`PanelEffect`]s. It never
//!   touches a viewport or a spring.
//! - [`PanelController`] owns the machine, interprets effects against the
//!   content viewport, and runs the cancellable settle [`Spring`].
//!
//! # State Machine
//!
//! ```text
//!   Collapsed ──BeginDrag──▶ Dragging ──EndDrag──▶ Settling ──SettleComplete──▶ Collapsed | Expanded
//!   Expanded  ──BeginDrag──▶    ▲                     │
//!                               └─────BeginDrag───────┘  (settle cancelled)
//! ```
//!
//! # Invariants
//!
//! 1. While dragging, `expanded_offset - max_overshoot <= offset <=
//!    collapsed_offset + max_overshoot`.
//! 2. After `SettleComplete`, `offset` is exactly one of the two resting
//!    offsets.
//! 3. An expand switches `mode` before the settle starts; a collapse switches
//!    `mode` only when the settle completes.
//! 4. A collapse from `Expanded` requires the content to be at its top,
//!    unless the drag started on the handle.
//! 5. At most one settle is in flight; `BeginDrag` cancels it.

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use homesheet_core::Duration;
use homesheet_core::animation::{Animation, Spring, SpringParams};
use homesheet_core::viewport::ScrollableViewport;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Settle spring parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct SpringConfig {
    /// Restoring force strength.
    pub stiffness: f64,
    /// Velocity drag.
    pub damping: f64,
    /// Inertia.
    pub mass: f64,
    /// Distance below which the spring may rest.
    pub rest_delta: f64,
    /// Speed below which the spring may rest.
    pub rest_speed: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        let p = SpringParams::default();
        Self {
            stiffness: p.stiffness,
            damping: p.damping,
            mass: p.mass,
            rest_delta: p.rest_delta,
            rest_speed: p.rest_speed,
        }
    }
}

impl SpringConfig {
    /// Convert to core spring parameters.
    #[must_use]
    pub fn params(&self) -> SpringParams {
        SpringParams {
            stiffness: self.stiffness,
            damping: self.damping,
            mass: self.mass,
            rest_delta: self.rest_delta,
            rest_speed: self.rest_speed,
        }
    }
}

/// Sheet drag thresholds and settle spring.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct PanelConfig {
    /// Drag distance (px) that commits a mode change (default: 10).
    pub drag_threshold: f64,
    /// Release speed (px/s) that commits a mode change (default: 10).
    pub velocity_threshold: f64,
    /// Fraction of drag applied beyond the resting offsets (default: 0.1).
    pub overshoot_damping: f64,
    /// Hard cap on elastic overshoot (px, default: 60).
    pub max_overshoot: f64,
    /// Content scroll offset still treated as "at top" (px, default: 0).
    pub content_top_tolerance: f64,
    /// Settle spring.
    pub spring: SpringConfig,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 10.0,
            velocity_threshold: 10.0,
            overshoot_damping: 0.1,
            max_overshoot: 60.0,
            content_top_tolerance: 0.0,
            spring: SpringConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Resting mode of the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelMode {
    /// Sheet rests low; the carousel is visible; content does not scroll.
    Collapsed,
    /// Sheet covers the carousel; content scrolls.
    Expanded,
}

/// The two resting offsets of the sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelBounds {
    /// Offset when collapsed (by convention 0).
    pub collapsed_offset: f64,
    /// Offset when expanded (negative: the sheet moves up).
    pub expanded_offset: f64,
}

impl PanelBounds {
    /// Create bounds. `expanded_offset` is clamped to be no greater than
    /// `collapsed_offset`.
    #[must_use]
    pub fn new(collapsed_offset: f64, expanded_offset: f64) -> Self {
        Self {
            collapsed_offset,
            expanded_offset: expanded_offset.min(collapsed_offset),
        }
    }

    /// Resting offset for `mode`.
    #[inline]
    #[must_use]
    pub fn offset_for(&self, mode: PanelMode) -> f64 {
        match mode {
            PanelMode::Collapsed => self.collapsed_offset,
            PanelMode::Expanded => self.expanded_offset,
        }
    }

    /// Apply rubber-band resistance outside the resting range.
    #[must_use]
    pub fn elastic(&self, raw: f64, damping: f64, max_overshoot: f64) -> f64 {
        if raw > self.collapsed_offset {
            self.collapsed_offset + ((raw - self.collapsed_offset) * damping).min(max_overshoot)
        } else if raw < self.expanded_offset {
            self.expanded_offset - ((self.expanded_offset - raw) * damping).min(max_overshoot)
        } else {
            raw
        }
    }
}

/// Observable sheet state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelState {
    /// Resting mode (see invariant 3 for when it flips).
    pub mode: PanelMode,
    /// Live vertical translation.
    pub offset: f64,
    /// Whether a drag session is active.
    pub drag_active: bool,
    /// Whether the active drag started on the handle.
    pub originated_from_handle: bool,
}

/// Summary of a completed drag, reported once per gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOutcome {
    /// Mode held when the drag began.
    pub from: PanelMode,
    /// Mode the sheet is settling toward.
    pub to: PanelMode,
    /// Total vertical drag distance (px, positive = downward).
    pub distance: f64,
    /// Release velocity (px/s, positive = downward).
    pub velocity: f64,
    /// Whether the drag started on the handle.
    pub from_handle: bool,
}

/// Input to the sheet state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelEvent {
    /// A drag session was claimed for the sheet.
    BeginDrag {
        /// Drag started on the dedicated handle.
        from_handle: bool,
    },
    /// Pointer moved; `dy` is the total displacement since the session began.
    DragTo {
        /// Total vertical displacement (px).
        dy: f64,
    },
    /// Pointer released or cancelled.
    EndDrag {
        /// Release velocity (px/s).
        velocity: f64,
        /// Total vertical displacement (px).
        distance: f64,
        /// Whether the content was scrolled to its top at release.
        content_at_top: bool,
    },
    /// The settle animation moved the sheet.
    SettleProgress {
        /// New offset.
        offset: f64,
    },
    /// The settle animation came to rest.
    SettleComplete,
    /// Screen geometry changed.
    Relayout {
        /// New resting offsets.
        bounds: PanelBounds,
    },
    /// The screen is unmounting.
    Teardown,
}

/// Side effect requested by the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelEffect {
    /// `mode` changed.
    ModeChanged(PanelMode),
    /// Allow or refuse scrolling of the sheet content.
    ContentScrollEnabled(bool),
    /// Scroll the sheet content back to its top.
    ResetContentScroll,
    /// Start a settle animation.
    StartSettle {
        /// Current offset.
        from: f64,
        /// Resting offset.
        to: f64,
        /// Initial velocity (px/s).
        velocity: f64,
    },
    /// Point the in-flight settle at a new resting offset.
    RetargetSettle {
        /// New resting offset.
        to: f64,
    },
    /// Abandon the in-flight settle without completing it.
    CancelSettle,
    /// A drag session ended.
    DragEnded(DragOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragAnchor {
    start_offset: f64,
    mode_before: PanelMode,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SettleTarget {
    mode: PanelMode,
    offset: f64,
}

// ---------------------------------------------------------------------------
// PanelMachine
// ---------------------------------------------------------------------------

/// Pure sheet state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelMachine {
    state: PanelState,
    bounds: PanelBounds,
    config: PanelConfig,
    drag: Option<DragAnchor>,
    settle: Option<SettleTarget>,
}

impl PanelMachine {
    /// A collapsed sheet resting at `bounds.collapsed_offset`.
    #[must_use]
    pub fn new(bounds: PanelBounds, config: PanelConfig) -> Self {
        Self {
            state: PanelState {
                mode: PanelMode::Collapsed,
                offset: bounds.collapsed_offset,
                drag_active: false,
                originated_from_handle: false,
            },
            bounds,
            config,
            drag: None,
            settle: None,
        }
    }

    /// Observable state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> &PanelState {
        &self.state
    }

    /// Resting offsets.
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> PanelBounds {
        self.bounds
    }

    /// Tuning.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Whether a settle animation is in flight.
    #[inline]
    #[must_use]
    pub fn is_settling(&self) -> bool {
        self.settle.is_some()
    }

    /// Mode the in-flight settle is heading for.
    #[must_use]
    pub fn settle_target(&self) -> Option<PanelMode> {
        self.settle.map(|s| s.mode)
    }

    /// Apply `event`, returning the next machine and its effects.
    #[must_use]
    pub fn step(mut self, event: PanelEvent) -> (Self, Vec<PanelEffect>) {
        let mut effects = Vec::with_capacity(4);
        match event {
            PanelEvent::BeginDrag { from_handle } => self.begin_drag(from_handle, &mut effects),
            PanelEvent::DragTo { dy } => self.drag_to(dy),
            PanelEvent::EndDrag {
                velocity,
                distance,
                content_at_top,
            } => self.end_drag(velocity, distance, content_at_top, &mut effects),
            PanelEvent::SettleProgress { offset } => {
                if self.settle.is_some() && offset.is_finite() {
                    self.state.offset = offset;
                }
            }
            PanelEvent::SettleComplete => self.settle_complete(&mut effects),
            PanelEvent::Relayout { bounds } => self.relayout(bounds, &mut effects),
            PanelEvent::Teardown => {
                if self.settle.take().is_some() {
                    effects.push(PanelEffect::CancelSettle);
                }
                self.drag = None;
                self.state.drag_active = false;
                self.state.originated_from_handle = false;
            }
        }
        (self, effects)
    }

    fn begin_drag(&mut self, from_handle: bool, effects: &mut Vec<PanelEffect>) {
        if self.drag.is_some() {
            return;
        }
        if self.settle.take().is_some() {
            effects.push(PanelEffect::CancelSettle);
        }
        self.drag = Some(DragAnchor {
            start_offset: self.state.offset,
            mode_before: self.state.mode,
        });
        self.state.drag_active = true;
        self.state.originated_from_handle = from_handle;
    }

    fn drag_to(&mut self, dy: f64) {
        let Some(anchor) = self.drag else {
            return;
        };
        if !dy.is_finite() {
            return;
        }
        self.state.offset = self.bounds.elastic(
            anchor.start_offset + dy,
            self.config.overshoot_damping,
            self.config.max_overshoot,
        );
    }

    fn end_drag(
        &mut self,
        velocity: f64,
        distance: f64,
        content_at_top: bool,
        effects: &mut Vec<PanelEffect>,
    ) {
        let Some(anchor) = self.drag.take() else {
            return;
        };
        let velocity = if velocity.is_finite() { velocity } else { 0.0 };
        let distance = if distance.is_finite() { distance } else { 0.0 };
        let from_handle = self.state.originated_from_handle;
        self.state.drag_active = false;
        self.state.originated_from_handle = false;

        let from = anchor.mode_before;
        let distance_up = distance < -self.config.drag_threshold;
        let distance_down = distance > self.config.drag_threshold;
        let fling_up = velocity < -self.config.velocity_threshold;
        let fling_down = velocity > self.config.velocity_threshold;

        let expanding = from == PanelMode::Collapsed && (distance_up || fling_up);
        let collapsing = from == PanelMode::Expanded
            && (content_at_top || from_handle)
            && (distance_down || fling_down);

        let to = if expanding {
            PanelMode::Expanded
        } else if collapsing {
            PanelMode::Collapsed
        } else {
            from
        };

        match to {
            PanelMode::Expanded => {
                if self.state.mode != PanelMode::Expanded {
                    self.state.mode = PanelMode::Expanded;
                    effects.push(PanelEffect::ModeChanged(PanelMode::Expanded));
                }
                effects.push(PanelEffect::ContentScrollEnabled(true));
            }
            PanelMode::Collapsed if collapsing => {
                effects.push(PanelEffect::ContentScrollEnabled(false));
            }
            PanelMode::Collapsed => {}
        }

        let target = self.bounds.offset_for(to);
        self.settle = Some(SettleTarget { mode: to, offset: target });
        effects.push(PanelEffect::StartSettle {
            from: self.state.offset,
            to: target,
            velocity,
        });
        effects.push(PanelEffect::DragEnded(DragOutcome {
            from,
            to,
            distance,
            velocity,
            from_handle,
        }));
    }

    fn settle_complete(&mut self, effects: &mut Vec<PanelEffect>) {
        let Some(target) = self.settle.take() else {
            return;
        };
        self.state.offset = target.offset;
        if target.mode == PanelMode::Collapsed && self.state.mode != PanelMode::Collapsed {
            self.state.mode = PanelMode::Collapsed;
            effects.push(PanelEffect::ModeChanged(PanelMode::Collapsed));
            effects.push(PanelEffect::ResetContentScroll);
            effects.push(PanelEffect::ContentScrollEnabled(false));
        }
    }

    fn relayout(&mut self, bounds: PanelBounds, effects: &mut Vec<PanelEffect>) {
        self.bounds = bounds;
        if let Some(target) = self.settle.as_mut() {
            target.offset = bounds.offset_for(target.mode);
            effects.push(PanelEffect::RetargetSettle { to: target.offset });
        } else if self.drag.is_none() {
            self.state.offset = bounds.offset_for(self.state.mode);
        }
    }
}

// ---------------------------------------------------------------------------
// PanelController
// ---------------------------------------------------------------------------

/// Owns the sheet machine and runs its effects.
#[derive(Debug, Clone)]
pub struct PanelController {
    machine: PanelMachine,
    spring: Option<Spring>,
}

impl PanelController {
    /// A collapsed sheet.
    #[must_use]
    pub fn new(bounds: PanelBounds, config: PanelConfig) -> Self {
        Self {
            machine: PanelMachine::new(bounds, config),
            spring: None,
        }
    }

    /// Bring the content viewport in line with a freshly mounted collapsed
    /// sheet: scrolled to its top and not scrollable.
    pub fn attach(&mut self, content: &mut dyn ScrollableViewport) {
        let enabled = self.mode() == PanelMode::Expanded;
        if !enabled {
            content.set_scroll_offset(0.0);
        }
        content.set_scroll_enabled(enabled);
    }

    /// Observable state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> &PanelState {
        self.machine.state()
    }

    /// Resting mode.
    #[inline]
    #[must_use]
    pub fn mode(&self) -> PanelMode {
        self.machine.state().mode
    }

    /// Live offset.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.machine.state().offset
    }

    /// Resting offsets.
    #[inline]
    #[must_use]
    pub fn bounds(&self) -> PanelBounds {
        self.machine.bounds()
    }

    /// Tuning.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PanelConfig {
        self.machine.config()
    }

    /// The underlying pure machine.
    #[inline]
    #[must_use]
    pub fn machine(&self) -> &PanelMachine {
        &self.machine
    }

    /// Whether a settle animation is in flight.
    #[inline]
    #[must_use]
    pub fn is_settling(&self) -> bool {
        self.spring.is_some()
    }

    /// Whether the content viewport counts as scrolled to its top.
    #[must_use]
    pub fn content_at_top(&self, content: &dyn ScrollableViewport) -> bool {
        content.is_at_start(self.config().content_top_tolerance)
    }

    /// Start a drag session, cancelling any in-flight settle.
    pub fn begin_drag(
        &mut self,
        from_handle: bool,
        content: &mut dyn ScrollableViewport,
    ) -> Vec<PanelEffect> {
        self.apply(PanelEvent::BeginDrag { from_handle }, content)
    }

    /// Move the sheet to `dy` past where the drag began.
    pub fn drag_to(&mut self, dy: f64, content: &mut dyn ScrollableViewport) -> Vec<PanelEffect> {
        let effects = self.apply(PanelEvent::DragTo { dy }, content);
        tracing::trace!(dy, offset = self.offset(), "panel drag");
        effects
    }

    /// Release the drag and start settling toward the resolved mode.
    pub fn end_drag(
        &mut self,
        velocity: f64,
        distance: f64,
        content: &mut dyn ScrollableViewport,
    ) -> Vec<PanelEffect> {
        let content_at_top = self.content_at_top(content);
        self.apply(
            PanelEvent::EndDrag {
                velocity,
                distance,
                content_at_top,
            },
            content,
        )
    }

    /// Advance the settle animation by `dt`.
    pub fn tick(&mut self, dt: Duration, content: &mut dyn ScrollableViewport) -> Vec<PanelEffect> {
        let Some(spring) = self.spring.as_mut() else {
            return Vec::new();
        };
        spring.tick(dt);
        let offset = spring.value();
        let done = spring.is_complete();

        let mut effects = self.apply(PanelEvent::SettleProgress { offset }, content);
        if done {
            self.spring = None;
            effects.extend(self.apply(PanelEvent::SettleComplete, content));
            tracing::debug!(
                mode = ?self.mode(),
                offset = self.offset(),
                "panel settle finished"
            );
        }
        effects
    }

    /// Replace the resting offsets after a layout change.
    pub fn set_bounds(
        &mut self,
        bounds: PanelBounds,
        content: &mut dyn ScrollableViewport,
    ) -> Vec<PanelEffect> {
        self.apply(PanelEvent::Relayout { bounds }, content)
    }

    /// Abandon any drag or settle. Idempotent.
    pub fn teardown(&mut self, content: &mut dyn ScrollableViewport) {
        let _ = self.apply(PanelEvent::Teardown, content);
        self.spring = None;
    }

    fn apply(&mut self, event: PanelEvent, content: &mut dyn ScrollableViewport) -> Vec<PanelEffect> {
        let (machine, effects) = self.machine.step(event);
        self.machine = machine;
        for effect in &effects {
            self.interpret(effect, content);
        }
        effects
    }

    fn interpret(&mut self, effect: &PanelEffect, content: &mut dyn ScrollableViewport) {
        match *effect {
            PanelEffect::ModeChanged(mode) => {
                tracing::debug!(?mode, "panel mode changed");
            }
            PanelEffect::ContentScrollEnabled(enabled) => content.set_scroll_enabled(enabled),
            PanelEffect::ResetContentScroll => content.set_scroll_offset(0.0),
            PanelEffect::StartSettle { from, to, velocity } => {
                tracing::debug!(from, to, velocity, "panel settle started");
                self.spring = Some(
                    Spring::new(from, to)
                        .with_params(self.config().spring.params())
                        .with_velocity(velocity),
                );
            }
            PanelEffect::RetargetSettle { to } => {
                if let Some(spring) = self.spring.as_mut() {
                    spring.set_target(to);
                }
            }
            PanelEffect::CancelSettle => {
                tracing::debug!(offset = self.offset(), "panel settle cancelled");
                self.spring = None;
            }
            PanelEffect::DragEnded(outcome) => {
                tracing::debug!(
                    from = ?outcome.from,
                    to = ?outcome.to,
                    distance = outcome.distance,
                    velocity = outcome.velocity,
                    "panel drag ended"
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
