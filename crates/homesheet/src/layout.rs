#![forbid(unsafe_code)]

//! Screen geometry: carousel height and sheet resting offsets.
//!
//! The carousel keeps a 3:4 portrait ratio but never takes more than 60% of
//! the viewport height. The sheet overlaps the bottom of the carousel by
//! `panel_overlap` so its rounded top edge always covers media; when expanded
//! it docks `dock_gap` below the header.

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::panel::PanelBounds;

/// Screen geometry constants.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct LayoutConfig {
    /// Height of the fixed header (px).
    pub header_height: f64,
    /// Gap between header and the expanded sheet (px).
    pub dock_gap: f64,
    /// How far the collapsed sheet overlaps the carousel (px).
    pub panel_overlap: f64,
    /// Carousel height / width.
    pub aspect_ratio: f64,
    /// Carousel height cap as a fraction of viewport height.
    pub max_height_fraction: f64,
    /// Content column width cap (px).
    pub max_container_width: f64,
    /// Resting offset of the collapsed sheet.
    pub collapsed_offset: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            header_height: 57.0,
            dock_gap: 10.0,
            panel_overlap: 40.0,
            aspect_ratio: 4.0 / 3.0,
            max_height_fraction: 0.6,
            max_container_width: 768.0,
            collapsed_offset: 0.0,
        }
    }
}

/// Measured screen geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenLayout {
    /// Width of the content column.
    pub container_width: f64,
    /// Height of the media carousel.
    pub carousel_height: f64,
    /// Distance from the top of the screen to the collapsed sheet's top edge.
    pub panel_base_offset: f64,
    /// Sheet resting offsets.
    pub bounds: PanelBounds,
}

impl ScreenLayout {
    /// Compute layout for a viewport. Zero or non-finite measurements give a
    /// sheet that cannot move (`expanded_offset == collapsed_offset`).
    #[must_use]
    pub fn compute(viewport_width: f64, viewport_height: f64, config: &LayoutConfig) -> Self {
        let width = finite_or_zero(viewport_width);
        let height = finite_or_zero(viewport_height);

        let container_width = width.min(config.max_container_width);
        let carousel_height =
            (container_width * config.aspect_ratio).min(height * config.max_height_fraction);
        let panel_base_offset = (carousel_height - config.panel_overlap).max(0.0);
        let travel = (panel_base_offset - config.header_height - config.dock_gap).max(0.0);

        Self {
            container_width,
            carousel_height,
            panel_base_offset,
            bounds: PanelBounds::new(config.collapsed_offset, config.collapsed_offset - travel),
        }
    }

    /// Distance the sheet travels between its two resting offsets.
    #[must_use]
    pub fn travel(&self) -> f64 {
        self.bounds.collapsed_offset - self.bounds.expanded_offset
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}
