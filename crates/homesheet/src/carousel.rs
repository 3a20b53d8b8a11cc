#![forbid(unsafe_code)]

//! Infinite-loop media carousel.
//!
//! The carousel renders `N` real slides padded with a clone at each end:
//!
//! ```text
//!   frame:  0            1 .. N        N+1
//!           clone(last)  real slides   clone(first)
//! ```
//!
//! It starts parked on frame 1 (real slide 0). When scrolling settles on a
//! clone, the engine jumps instantly to the matching real frame, so the user
//! never sees an end.
//!
//! # Invariants
//!
//! 1. `active_index` is always a real index in `[0, N)` (0 when empty).
//! 2. Settling on a clone schedules exactly one corrective jump, and the
//!    jump's own scroll events never re-enter the settle logic.
//! 3. Smooth scrolling is restored on the frame after every instant jump.
//!
//! # Failure Modes
//!
//! - An unmeasured viewport (no scroll offset) makes settle a no-op; the next
//!   scroll will try again.
//! - A viewport of zero width falls back to `fallback_item_width` for item
//!   geometry.

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use homesheet_core::timer::{Debounce, FrameTask, Interval};
use homesheet_core::viewport::ScrollableViewport;
use homesheet_core::{Duration, Instant};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Carousel timing and geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct CarouselConfig {
    /// Quiet period after the last scroll event before settling (default: 150ms).
    pub settle_debounce_ms: u64,
    /// Whether slides advance on their own (default: true).
    pub autoplay: bool,
    /// Autoplay period (default: 3000ms).
    pub autoplay_interval_ms: u64,
    /// Item width used when the viewport has not been measured (default: 393).
    pub fallback_item_width: f64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            settle_debounce_ms: 150,
            autoplay: true,
            autoplay_interval_ms: 3000,
            fallback_item_width: 393.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Data
// ---------------------------------------------------------------------------

/// Kind of media a slide shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MediaType {
    /// Still image.
    #[default]
    Image,
    /// Video, with the image as its poster.
    Video,
}

/// One carousel item, as supplied by the content collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Slide {
    /// Stable identifier.
    pub id: String,
    /// Image (or poster) reference.
    pub image_ref: String,
    /// Video reference for [`MediaType::Video`] slides.
    pub video_ref: Option<String>,
    /// Media kind.
    pub media_type: MediaType,
    /// Navigation target on tap.
    pub link_ref: Option<String>,
    /// Backdrop shown while media loads.
    pub background_color: Option<String>,
}

impl Slide {
    /// An image slide.
    #[must_use]
    pub fn image(id: impl Into<String>, image_ref: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            image_ref: image_ref.into(),
            ..Self::default()
        }
    }

    /// A video slide with a poster image.
    #[must_use]
    pub fn video(
        id: impl Into<String>,
        poster_ref: impl Into<String>,
        video_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            image_ref: poster_ref.into(),
            video_ref: Some(video_ref.into()),
            media_type: MediaType::Video,
            ..Self::default()
        }
    }

    /// Set the tap target.
    #[must_use]
    pub fn with_link(mut self, link_ref: impl Into<String>) -> Self {
        self.link_ref = Some(link_ref.into());
        self
    }

    /// Set the backdrop color.
    #[must_use]
    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }
}

/// Position of a rendered frame in the padded sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Clone of the last slide, before the first.
    LeadingClone,
    /// A real slide.
    Real,
    /// Clone of the first slide, after the last.
    TrailingClone,
}

/// One rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame<'a> {
    /// Clone or real.
    pub kind: FrameKind,
    /// Real index of the slide this frame shows.
    pub index: usize,
    /// The slide.
    pub slide: &'a Slide,
}

/// Observable carousel state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarouselState {
    /// Real slides in display order.
    pub items: Vec<Slide>,
    /// Real index of the settled slide.
    pub active_index: usize,
    /// Set while an instant jump is waiting for its frame.
    pub is_programmatic_scroll: bool,
}

/// Corrective jump off a clone frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloneJump {
    /// From the trailing clone to the first real slide.
    ToFirst,
    /// From the leading clone to the last real slide.
    ToLast,
}

/// Result of a completed settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideSettled {
    /// Real index now active.
    pub active_index: usize,
    /// Real index active before this settle.
    pub previous_index: usize,
    /// Frame index the scroll came to rest on.
    pub frame_index: i64,
    /// Jump scheduled to leave a clone.
    pub correction: Option<CloneJump>,
}

// ---------------------------------------------------------------------------
// CarouselEngine
// ---------------------------------------------------------------------------

/// Owns the looping carousel's scroll position and active slide.
#[derive(Debug, Clone)]
pub struct CarouselEngine {
    config: CarouselConfig,
    state: CarouselState,
    settle_debounce: Debounce,
    restore_smooth: FrameTask,
    autoplay: Interval,
}

impl CarouselEngine {
    /// An empty carousel.
    #[must_use]
    pub fn new(config: CarouselConfig) -> Self {
        Self {
            settle_debounce: Debounce::new(Duration::from_millis(config.settle_debounce_ms)),
            restore_smooth: FrameTask::new(),
            autoplay: Interval::new(Duration::from_millis(config.autoplay_interval_ms)),
            state: CarouselState::default(),
            config,
        }
    }

    /// Observable state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> &CarouselState {
        &self.state
    }

    /// Real index of the settled slide.
    #[inline]
    #[must_use]
    pub fn active_index(&self) -> usize {
        self.state.active_index
    }

    /// Number of real slides.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.items.len()
    }

    /// Whether there are no slides.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.items.is_empty()
    }

    /// Whether autoplay is currently counting.
    #[inline]
    #[must_use]
    pub fn is_autoplaying(&self) -> bool {
        self.autoplay.is_running()
    }

    /// Whether a settle is waiting for the scroll to go quiet.
    #[inline]
    #[must_use]
    pub fn is_settle_pending(&self) -> bool {
        self.settle_debounce.is_pending()
    }

    /// The padded frame sequence, empty when there are no slides.
    #[must_use]
    pub fn frames(&self) -> Vec<Frame<'_>> {
        let items = &self.state.items;
        let (Some(first), Some(last)) = (items.first(), items.last()) else {
            return Vec::new();
        };
        let n = items.len();
        let mut frames = Vec::with_capacity(n + 2);
        frames.push(Frame {
            kind: FrameKind::LeadingClone,
            index: n - 1,
            slide: last,
        });
        frames.extend(items.iter().enumerate().map(|(index, slide)| Frame {
            kind: FrameKind::Real,
            index,
            slide,
        }));
        frames.push(Frame {
            kind: FrameKind::TrailingClone,
            index: 0,
            slide: first,
        });
        frames
    }

    /// Replace the slides and park on the first real one without animation.
    pub fn initialize(
        &mut self,
        items: Vec<Slide>,
        viewport: &mut dyn ScrollableViewport,
        now: Instant,
    ) {
        self.state.items = items;
        self.state.active_index = 0;
        self.settle_debounce.cancel();
        self.autoplay.stop();

        if self.is_empty() {
            self.restore_smooth.cancel();
            self.state.is_programmatic_scroll = false;
            return;
        }

        let width = self.item_width(viewport);
        self.jump(viewport, width);
        self.resume_autoplay(now);
        tracing::debug!(items = self.len(), width, "carousel initialized");
    }

    /// A scroll event from the carousel viewport.
    ///
    /// Returns `false` when the event was caused by a corrective jump and
    /// ignored.
    pub fn on_scroll(&mut self, now: Instant) -> bool {
        if self.state.is_programmatic_scroll {
            return false;
        }
        self.settle_debounce.poke(now);
        true
    }

    /// The platform reported that scrolling stopped.
    pub fn on_scroll_end(&mut self, viewport: &mut dyn ScrollableViewport) -> Option<SlideSettled> {
        if self.state.is_programmatic_scroll {
            return None;
        }
        self.settle_debounce.cancel();
        self.settle(viewport)
    }

    /// Drive the timers. Call on every frame.
    pub fn poll(
        &mut self,
        now: Instant,
        viewport: &mut dyn ScrollableViewport,
    ) -> Option<SlideSettled> {
        if self.autoplay.poll(now) {
            self.advance(viewport, now);
        }
        if self.settle_debounce.poll(now) {
            return self.settle(viewport);
        }
        None
    }

    /// Run the next-frame task left by an instant jump.
    pub fn on_frame(&mut self, viewport: &mut dyn ScrollableViewport) {
        if self.restore_smooth.take() {
            viewport.set_smooth_scrolling(true);
            self.state.is_programmatic_scroll = false;
        }
    }

    /// Resolve the active slide from the resting scroll offset and leave any
    /// clone frame.
    pub fn settle(&mut self, viewport: &mut dyn ScrollableViewport) -> Option<SlideSettled> {
        let n = self.len();
        if n == 0 || self.state.is_programmatic_scroll {
            return None;
        }
        let offset = viewport.scroll_offset()?;
        let width = self.item_width(viewport);
        if !offset.is_finite() {
            return None;
        }

        let frame_index = (offset / width).round() as i64;
        let count = n as i64;
        let active_index = (frame_index - 1).rem_euclid(count) as usize;

        let correction = if frame_index >= count + 1 {
            self.jump(viewport, width);
            Some(CloneJump::ToFirst)
        } else if frame_index <= 0 {
            self.jump(viewport, count as f64 * width);
            Some(CloneJump::ToLast)
        } else {
            None
        };

        let settled = SlideSettled {
            active_index,
            previous_index: self.state.active_index,
            frame_index,
            correction,
        };
        self.state.active_index = active_index;
        tracing::debug!(
            active_index,
            previous_index = settled.previous_index,
            frame_index,
            ?correction,
            "carousel settled"
        );
        Some(settled)
    }

    /// Smooth-scroll one slide forward.
    pub fn advance(&mut self, viewport: &mut dyn ScrollableViewport, now: Instant) {
        if self.len() < 2 || self.state.is_programmatic_scroll {
            return;
        }
        let width = self.item_width(viewport);
        let target = (self.state.active_index + 2) as f64 * width;
        viewport.set_scroll_offset(target);
        self.settle_debounce.poke(now);
        tracing::trace!(from = self.state.active_index, target, "carousel autoplay");
    }

    /// Stop autoplay while the user holds the carousel.
    pub fn pause_autoplay(&mut self) {
        self.autoplay.stop();
    }

    /// Restart autoplay with a full period from `now`.
    pub fn resume_autoplay(&mut self, now: Instant) {
        if self.config.autoplay && self.len() > 1 {
            self.autoplay.start(now);
        }
    }

    /// Whether slide `index` is the active one or circularly adjacent to it.
    #[must_use]
    pub fn is_priority_slide(&self, index: usize) -> bool {
        let n = self.len();
        if index >= n {
            return false;
        }
        let distance = (index + n - self.state.active_index) % n;
        distance <= 1 || distance == n - 1
    }

    /// Whether slide `index` should have its video loaded.
    #[must_use]
    pub fn should_load_video(&self, index: usize) -> bool {
        self.state
            .items
            .get(index)
            .is_some_and(|s| s.media_type == MediaType::Video && s.video_ref.is_some())
            && self.is_priority_slide(index)
    }

    /// Active slide first, then next, then previous, without repeats.
    #[must_use]
    pub fn preload_indices(&self) -> Vec<usize> {
        let n = self.len();
        if n == 0 {
            return Vec::new();
        }
        let active = self.state.active_index;
        let mut out = Vec::with_capacity(3);
        for index in [active, (active + 1) % n, (active + n - 1) % n] {
            if !out.contains(&index) {
                out.push(index);
            }
        }
        out
    }

    /// Cancel every timer and pending frame task. Idempotent.
    pub fn teardown(&mut self) {
        self.settle_debounce.cancel();
        self.restore_smooth.cancel();
        self.autoplay.stop();
        self.state.is_programmatic_scroll = false;
    }

    fn item_width(&self, viewport: &dyn ScrollableViewport) -> f64 {
        viewport
            .viewport_size()
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(self.config.fallback_item_width)
    }

    fn jump(&mut self, viewport: &mut dyn ScrollableViewport, offset: f64) {
        viewport.set_smooth_scrolling(false);
        viewport.set_scroll_offset(offset);
        self.state.is_programmatic_scroll = true;
        self.restore_smooth.schedule();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
