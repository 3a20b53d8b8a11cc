#![forbid(unsafe_code)]

//! The home screen: router, sheet, carousel and rails behind one API.
//!
//! [`HomeScreen`] is what a host platform talks to. It receives pointer,
//! scroll, resize and frame callbacks, and borrows the platform's scroll
//! containers through [`HomeHost`] for the duration of each call.
//!
//! # Frame order
//!
//! [`frame`](HomeScreen::frame) runs, in order:
//!
//! 1. the carousel's next-frame task (restore smooth scrolling after a jump),
//! 2. one spring step of the sheet settle, with `dt` capped at
//!    `max_frame_delta_ms`,
//! 3. carousel timers (autoplay, settle debounce),
//! 4. throttled rail recomputes.
//!
//! # Hooks
//!
//! Every call that completes a gesture or settle returns [`HomeEvent`]s and
//! also forwards them to the [`HomeObserver`], if one is set. Hooks fire once
//! per completed gesture or settle, never per frame.

use std::collections::BTreeMap;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use homesheet_core::geometry::Point;
use homesheet_core::viewport::ScrollableViewport;
use homesheet_core::{Duration, Instant};

use crate::carousel::{CarouselEngine, Slide, SlideSettled};
use crate::config::HomeConfig;
use crate::gesture::{GestureRouter, PointerOrigin, Routing};
use crate::layout::ScreenLayout;
use crate::panel::{DragOutcome, PanelController, PanelEffect, PanelMode, PanelState};
use crate::rail::{ElasticRail, RailId, RailUpdate};

/// Frame clock handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct FrameConfig {
    /// Largest time step fed to the settle spring (default: 64ms).
    pub max_frame_delta_ms: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_delta_ms: 64,
        }
    }
}

/// Scroll containers owned by the host platform.
pub trait HomeHost {
    /// The media carousel's horizontal scroller.
    fn carousel(&mut self) -> &mut dyn ScrollableViewport;
    /// The sheet content's vertical scroller.
    fn content(&mut self) -> &mut dyn ScrollableViewport;
    /// A rail's horizontal extent, or `None` if it is not laid out.
    fn rail(&self, id: RailId) -> Option<&dyn ScrollableViewport>;
}

/// Something collaborators may want to react to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HomeEvent {
    /// The sheet's resting mode changed.
    ModeChanged(PanelMode),
    /// A sheet drag was released.
    DragEnded(DragOutcome),
    /// The carousel came to rest.
    SlideSettled(SlideSettled),
    /// A rail's bounds changed.
    RailChanged(RailUpdate),
}

/// Completion hooks. Every method defaults to doing nothing.
pub trait HomeObserver {
    /// A sheet drag was released.
    fn on_drag_end(&mut self, _outcome: &DragOutcome) {}
    /// The carousel came to rest.
    fn on_slide_settle(&mut self, _settled: &SlideSettled) {}
    /// The sheet's resting mode changed.
    fn on_mode_change(&mut self, _mode: PanelMode) {}
}

/// The composed home screen engine.
pub struct HomeScreen {
    config: HomeConfig,
    layout: ScreenLayout,
    router: GestureRouter,
    panel: PanelController,
    carousel: CarouselEngine,
    rails: BTreeMap<RailId, ElasticRail>,
    observer: Option<Box<dyn HomeObserver>>,
    last_frame: Option<Instant>,
    holding_carousel: bool,
}

impl std::fmt::Debug for HomeScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeScreen")
            .field("mode", &self.panel.mode())
            .field("offset", &self.panel.offset())
            .field("routing", &self.router.routing())
            .field("active_index", &self.carousel.active_index())
            .field("rails", &self.rails.len())
            .finish()
    }
}

impl HomeScreen {
    /// Create an engine for a viewport of the given size.
    #[must_use]
    pub fn new(config: HomeConfig, viewport_width: f64, viewport_height: f64) -> Self {
        let layout = ScreenLayout::compute(viewport_width, viewport_height, &config.layout);
        Self {
            router: GestureRouter::new(config.gesture),
            panel: PanelController::new(layout.bounds, config.panel),
            carousel: CarouselEngine::new(config.carousel),
            rails: BTreeMap::new(),
            observer: None,
            last_frame: None,
            holding_carousel: false,
            layout,
            config,
        }
    }

    /// Install completion hooks.
    pub fn set_observer(&mut self, observer: Box<dyn HomeObserver>) {
        self.observer = Some(observer);
    }

    /// Configuration in effect.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &HomeConfig {
        &self.config
    }

    /// Current geometry.
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &ScreenLayout {
        &self.layout
    }

    /// Sheet resting mode.
    #[inline]
    #[must_use]
    pub fn mode(&self) -> PanelMode {
        self.panel.mode()
    }

    /// Sheet state.
    #[inline]
    #[must_use]
    pub fn panel_state(&self) -> &PanelState {
        self.panel.state()
    }

    /// The sheet controller.
    #[inline]
    #[must_use]
    pub fn panel(&self) -> &PanelController {
        &self.panel
    }

    /// The carousel engine.
    #[inline]
    #[must_use]
    pub fn carousel(&self) -> &CarouselEngine {
        &self.carousel
    }

    /// Real index of the settled carousel slide.
    #[inline]
    #[must_use]
    pub fn active_index(&self) -> usize {
        self.carousel.active_index()
    }

    /// Routing of the gesture in progress.
    #[inline]
    #[must_use]
    pub fn routing(&self) -> Routing {
        self.router.routing()
    }

    /// A mounted rail.
    #[must_use]
    pub fn rail(&self, id: RailId) -> Option<&ElasticRail> {
        self.rails.get(&id)
    }

    /// Bind to the host's scrollers and load the carousel.
    pub fn mount(&mut self, items: Vec<Slide>, host: &mut dyn HomeHost, now: Instant) {
        self.panel.attach(host.content());
        self.carousel.initialize(items, host.carousel(), now);
        self.last_frame = None;
        tracing::debug!(
            width = self.layout.container_width,
            carousel_height = self.layout.carousel_height,
            expanded_offset = self.layout.bounds.expanded_offset,
            "home screen mounted"
        );
    }

    /// Replace the carousel slides.
    pub fn set_slides(&mut self, items: Vec<Slide>, host: &mut dyn HomeHost, now: Instant) {
        self.carousel.initialize(items, host.carousel(), now);
    }

    /// Start tracking a rail and measure it.
    pub fn add_rail(&mut self, id: RailId, host: &dyn HomeHost) -> Vec<HomeEvent> {
        let mut rail = ElasticRail::new(id, self.config.rail);
        let update = rail.mount(host.rail(id));
        self.rails.insert(id, rail);
        update.map(HomeEvent::RailChanged).into_iter().collect()
    }

    /// Stop tracking a rail.
    pub fn remove_rail(&mut self, id: RailId) {
        if let Some(mut rail) = self.rails.remove(&id) {
            rail.teardown();
        }
    }

    // --- Pointer ---

    /// Pointer pressed.
    pub fn pointer_down(
        &mut self,
        point: Point,
        origin: PointerOrigin,
        now: Instant,
        host: &mut dyn HomeHost,
    ) -> Routing {
        if self.router.session().is_none() && origin == PointerOrigin::Carousel {
            self.carousel.pause_autoplay();
            self.holding_carousel = true;
        }
        self.router
            .on_pointer_down(point, origin, now, &mut self.panel, host.content())
    }

    /// Pointer moved. A [`Routing::Claimed`] result means the host must keep
    /// the event away from its scrollers.
    pub fn pointer_move(&mut self, point: Point, now: Instant, host: &mut dyn HomeHost) -> Routing {
        self.router
            .on_pointer_move(point, now, &mut self.panel, host.content())
    }

    /// Pointer released.
    pub fn pointer_up(&mut self, now: Instant, host: &mut dyn HomeHost) -> Vec<HomeEvent> {
        let effects = self.router.on_pointer_up(now, &mut self.panel, host.content());
        self.release(now, effects)
    }

    /// Pointer cancelled by the platform. Settles exactly like a release.
    pub fn pointer_cancel(&mut self, now: Instant, host: &mut dyn HomeHost) -> Vec<HomeEvent> {
        let effects = self
            .router
            .on_pointer_cancel(now, &mut self.panel, host.content());
        self.release(now, effects)
    }

    fn release(&mut self, now: Instant, effects: Vec<PanelEffect>) -> Vec<HomeEvent> {
        if std::mem::take(&mut self.holding_carousel) {
            self.carousel.resume_autoplay(now);
        }
        if self.panel.is_settling() {
            self.last_frame = Some(now);
        }
        self.dispatch_panel(effects)
    }

    // --- Scroll and resize ---

    /// The carousel viewport scrolled.
    pub fn carousel_scrolled(&mut self, now: Instant) {
        self.carousel.on_scroll(now);
    }

    /// The platform reported the carousel stopped scrolling.
    pub fn carousel_scroll_ended(&mut self, host: &mut dyn HomeHost) -> Vec<HomeEvent> {
        let settled = self.carousel.on_scroll_end(host.carousel());
        self.dispatch_slide(settled)
    }

    /// The sheet content scrolled. A collapsed, resting sheet does not
    /// scroll, so any offset the platform let through is undone.
    pub fn content_scrolled(&mut self, host: &mut dyn HomeHost) {
        let state = self.panel.state();
        if state.mode == PanelMode::Collapsed && !state.drag_active && !self.panel.is_settling() {
            let content = host.content();
            if content.scroll_offset().is_some_and(|o| o != 0.0) {
                tracing::trace!("collapsed content scroll reverted");
                content.set_scroll_offset(0.0);
            }
        }
    }

    /// A rail's container or content changed size.
    pub fn rail_resized(&mut self, id: RailId, now: Instant) {
        if let Some(rail) = self.rails.get_mut(&id) {
            rail.on_resize(now);
        }
    }

    /// The platform drag left a rail at `offset`.
    pub fn rail_dragged(&mut self, id: RailId, offset: f64) {
        if let Some(rail) = self.rails.get_mut(&id) {
            rail.set_offset(offset);
        }
    }

    /// The viewport changed size.
    pub fn relayout(
        &mut self,
        viewport_width: f64,
        viewport_height: f64,
        host: &mut dyn HomeHost,
    ) -> Vec<HomeEvent> {
        let layout = ScreenLayout::compute(viewport_width, viewport_height, &self.config.layout);
        if layout == self.layout {
            return Vec::new();
        }
        self.layout = layout;
        tracing::debug!(
            width = layout.container_width,
            expanded_offset = layout.bounds.expanded_offset,
            "home screen relayout"
        );
        let effects = self.panel.set_bounds(layout.bounds, host.content());
        self.dispatch_panel(effects)
    }

    // --- Frame ---

    /// Advance animations and timers to `now`.
    pub fn frame(&mut self, now: Instant, host: &mut dyn HomeHost) -> Vec<HomeEvent> {
        self.carousel.on_frame(host.carousel());

        let max_dt = Duration::from_millis(self.config.frame.max_frame_delta_ms);
        let dt = self
            .last_frame
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last))
            .min(max_dt);
        self.last_frame = Some(now);

        let effects = self.panel.tick(dt, host.content());
        let mut events = self.dispatch_panel(effects);

        let settled = self.carousel.poll(now, host.carousel());
        events.extend(self.dispatch_slide(settled));

        for (id, rail) in &mut self.rails {
            if let Some(update) = rail.poll(now, host.rail(*id)) {
                events.push(HomeEvent::RailChanged(update));
            }
        }
        events
    }

    /// Cancel every animation, timer and gesture. Idempotent.
    pub fn teardown(&mut self, host: &mut dyn HomeHost) {
        self.router.reset();
        self.panel.teardown(host.content());
        self.carousel.teardown();
        for rail in self.rails.values_mut() {
            rail.teardown();
        }
        self.holding_carousel = false;
        self.last_frame = None;
        tracing::debug!("home screen torn down");
    }

    fn dispatch_panel(&mut self, effects: Vec<PanelEffect>) -> Vec<HomeEvent> {
        let mut events = Vec::new();
        for effect in effects {
            match effect {
                PanelEffect::ModeChanged(mode) => {
                    if let Some(observer) = self.observer.as_mut() {
                        observer.on_mode_change(mode);
                    }
                    events.push(HomeEvent::ModeChanged(mode));
                }
                PanelEffect::DragEnded(outcome) => {
                    if let Some(observer) = self.observer.as_mut() {
                        observer.on_drag_end(&outcome);
                    }
                    events.push(HomeEvent::DragEnded(outcome));
                }
                _ => {}
            }
        }
        events
    }

    fn dispatch_slide(&mut self, settled: Option<SlideSettled>) -> Vec<HomeEvent> {
        let Some(settled) = settled else {
            return Vec::new();
        };
        if let Some(observer) = self.observer.as_mut() {
            observer.on_slide_settle(&settled);
        }
        vec![HomeEvent::SlideSettled(settled)]
    }
}
