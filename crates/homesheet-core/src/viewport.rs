#![forbid(unsafe_code)]

//! Scrollable viewport capability.
//!
//! [`ScrollableViewport`] abstracts a single-axis scroll container owned by
//! the host platform (a DOM element, a native scroll view, a retained-mode
//! widget). The engine only observes and nudges it through this trait; it
//! never owns the platform object.
//!
//! Scroll notifications flow the other way: the host forwards its scroll
//! events into the engine component that owns the viewport, so no callback
//! registration is needed here.
//!
//! Every measurement is an `Option`: `None` means "not mounted / not laid out
//! yet", and callers treat it as a neutral no-op.

/// A single-axis scroll container.
pub trait ScrollableViewport {
    /// Current scroll offset along the axis, or `None` if unavailable.
    fn scroll_offset(&self) -> Option<f64>;

    /// Move the scroll offset. Implementations clamp to their own range.
    fn set_scroll_offset(&mut self, offset: f64);

    /// Total scrollable content extent along the axis.
    fn content_size(&self) -> Option<f64>;

    /// Visible extent along the axis.
    fn viewport_size(&self) -> Option<f64>;

    /// Toggle animated (smooth) scrolling for subsequent offset changes.
    fn set_smooth_scrolling(&mut self, _smooth: bool) {}

    /// Allow or refuse user scroll input.
    fn set_scroll_enabled(&mut self, _enabled: bool) {}

    /// Largest reachable offset, `content - viewport`, never negative.
    fn max_scroll_offset(&self) -> Option<f64> {
        let content = self.content_size()?;
        let viewport = self.viewport_size()?;
        Some((content - viewport).max(0.0))
    }

    /// Whether the offset is within `tolerance` of the start. An unavailable
    /// offset counts as "at start".
    fn is_at_start(&self, tolerance: f64) -> bool {
        self.scroll_offset().is_none_or(|o| o <= tolerance)
    }
}

/// One recorded call to [`ScrollableViewport::set_scroll_offset`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollWrite {
    /// Offset after clamping.
    pub offset: f64,
    /// Whether smooth scrolling was active for this write.
    pub smooth: bool,
}

/// In-memory viewport for headless hosts and tests.
///
/// Smooth scrolls complete instantly; the `smooth` flag is recorded so tests
/// can tell an animated move from an instant jump.
#[derive(Debug, Clone)]
pub struct MemoryViewport {
    offset: f64,
    content: f64,
    viewport: f64,
    mounted: bool,
    smooth: bool,
    enabled: bool,
    writes: Vec<ScrollWrite>,
}

impl MemoryViewport {
    /// A mounted viewport of the given sizes at offset 0.
    #[must_use]
    pub fn new(viewport: f64, content: f64) -> Self {
        Self {
            offset: 0.0,
            content: content.max(0.0),
            viewport: viewport.max(0.0),
            mounted: true,
            smooth: true,
            enabled: true,
            writes: Vec::new(),
        }
    }

    /// A viewport that reports no measurements.
    #[must_use]
    pub fn unmounted() -> Self {
        Self {
            mounted: false,
            ..Self::new(0.0, 0.0)
        }
    }

    /// Simulate user scrolling (does not record a write).
    pub fn scroll_to(&mut self, offset: f64) {
        self.offset = self.clamp(offset);
    }

    /// Resize the content extent, clamping the offset into the new range.
    pub fn set_content_size(&mut self, content: f64) {
        self.content = content.max(0.0);
        self.offset = self.clamp(self.offset);
    }

    /// Resize the visible extent, clamping the offset into the new range.
    pub fn set_viewport_size(&mut self, viewport: f64) {
        self.viewport = viewport.max(0.0);
        self.offset = self.clamp(self.offset);
    }

    /// Mount or unmount.
    pub fn set_mounted(&mut self, mounted: bool) {
        self.mounted = mounted;
    }

    /// Whether smooth scrolling is currently active.
    #[must_use]
    pub fn is_smooth(&self) -> bool {
        self.smooth
    }

    /// Whether user scroll input is allowed.
    #[must_use]
    pub fn is_scroll_enabled(&self) -> bool {
        self.enabled
    }

    /// Programmatic offset writes, oldest first.
    #[must_use]
    pub fn writes(&self) -> &[ScrollWrite] {
        &self.writes
    }

    /// Forget recorded writes.
    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    fn clamp(&self, offset: f64) -> f64 {
        if !offset.is_finite() {
            return self.offset;
        }
        offset.clamp(0.0, (self.content - self.viewport).max(0.0))
    }
}

impl ScrollableViewport for MemoryViewport {
    fn scroll_offset(&self) -> Option<f64> {
        self.mounted.then_some(self.offset)
    }

    fn set_scroll_offset(&mut self, offset: f64) {
        if !self.mounted {
            return;
        }
        self.offset = self.clamp(offset);
        self.writes.push(ScrollWrite {
            offset: self.offset,
            smooth: self.smooth,
        });
    }

    fn content_size(&self) -> Option<f64> {
        self.mounted.then_some(self.content)
    }

    fn viewport_size(&self) -> Option<f64> {
        self.mounted.then_some(self.viewport)
    }

    fn set_smooth_scrolling(&mut self, smooth: bool) {
        self.smooth = smooth;
    }

    fn set_scroll_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}
