#![forbid(unsafe_code)]

//! Configuration for the home screen engine.
//!
//! Captures every tunable constant as a single [`HomeConfig`] that can be
//! loaded from TOML or JSON at startup (feature `config`).
//!
//! # Loading
//!
//! ```toml
//! # homesheet.toml
//! [panel]
//! drag_threshold = 12.0
//!
//! [panel.spring]
//! stiffness = 320.0
//!
//! [carousel]
//! autoplay_interval_ms = 4000
//! ```
//!
//! ```rust,ignore
//! let config = HomeConfig::from_toml_file("homesheet.toml")?;
//! let config = HomeConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! Every field defaults to the value the home screen ships with, so
//! `HomeConfig::default()` needs no file at all.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::carousel::CarouselConfig;
use crate::gesture::GestureConfig;
use crate::layout::LayoutConfig;
use crate::panel::PanelConfig;
use crate::rail::RailConfig;
use crate::screen::FrameConfig;

/// Top-level configuration for the home screen engine.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct HomeConfig {
    /// Pointer axis detection and routing.
    pub gesture: GestureConfig,
    /// Sheet drag thresholds and settle spring.
    pub panel: PanelConfig,
    /// Looping media carousel.
    pub carousel: CarouselConfig,
    /// Nested horizontal rails.
    pub rail: RailConfig,
    /// Screen geometry constants.
    pub layout: LayoutConfig,
    /// Frame clock handling.
    pub frame: FrameConfig,
}

impl HomeConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let g = &self.gesture;
        if !(g.axis_lock_threshold >= 0.0) {
            errors.push(format!(
                "gesture.axis_lock_threshold must be >= 0, got {}",
                g.axis_lock_threshold
            ));
        }
        if g.velocity_window_ms == 0 {
            errors.push("gesture.velocity_window_ms must be > 0".into());
        }

        let p = &self.panel;
        if !(p.drag_threshold >= 0.0) {
            errors.push(format!("panel.drag_threshold must be >= 0, got {}", p.drag_threshold));
        }
        if !(p.velocity_threshold >= 0.0) {
            errors.push(format!(
                "panel.velocity_threshold must be >= 0, got {}",
                p.velocity_threshold
            ));
        }
        if !(0.0..=1.0).contains(&p.overshoot_damping) {
            errors.push(format!(
                "panel.overshoot_damping must be in [0, 1], got {}",
                p.overshoot_damping
            ));
        }
        if !(p.max_overshoot >= 0.0) {
            errors.push(format!("panel.max_overshoot must be >= 0, got {}", p.max_overshoot));
        }
        if !(p.content_top_tolerance >= 0.0) {
            errors.push(format!(
                "panel.content_top_tolerance must be >= 0, got {}",
                p.content_top_tolerance
            ));
        }
        if !(p.spring.stiffness > 0.0) {
            errors.push(format!("panel.spring.stiffness must be > 0, got {}", p.spring.stiffness));
        }
        if !(p.spring.damping >= 0.0) {
            errors.push(format!("panel.spring.damping must be >= 0, got {}", p.spring.damping));
        }
        if !(p.spring.mass > 0.0) {
            errors.push(format!("panel.spring.mass must be > 0, got {}", p.spring.mass));
        }
        if !(p.spring.rest_delta > 0.0) || !(p.spring.rest_speed > 0.0) {
            errors.push("panel.spring rest_delta and rest_speed must be > 0".into());
        }

        let c = &self.carousel;
        if c.settle_debounce_ms == 0 {
            errors.push("carousel.settle_debounce_ms must be > 0".into());
        }
        if c.autoplay && c.autoplay_interval_ms == 0 {
            errors.push("carousel.autoplay_interval_ms must be > 0 when autoplay is on".into());
        }
        if !(c.fallback_item_width > 0.0) {
            errors.push(format!(
                "carousel.fallback_item_width must be > 0, got {}",
                c.fallback_item_width
            ));
        }

        if self.rail.resize_throttle_ms == 0 {
            errors.push("rail.resize_throttle_ms must be > 0".into());
        }

        let l = &self.layout;
        for (name, value) in [
            ("header_height", l.header_height),
            ("dock_gap", l.dock_gap),
            ("panel_overlap", l.panel_overlap),
        ] {
            if !(value >= 0.0) {
                errors.push(format!("layout.{name} must be >= 0, got {value}"));
            }
        }
        if !(l.aspect_ratio > 0.0) {
            errors.push(format!("layout.aspect_ratio must be > 0, got {}", l.aspect_ratio));
        }
        if !(l.max_height_fraction > 0.0 && l.max_height_fraction <= 1.0) {
            errors.push(format!(
                "layout.max_height_fraction must be in (0, 1], got {}",
                l.max_height_fraction
            ));
        }
        if !(l.max_container_width > 0.0) {
            errors.push(format!(
                "layout.max_container_width must be > 0, got {}",
                l.max_container_width
            ));
        }
        if !l.collapsed_offset.is_finite() {
            errors.push("layout.collapsed_offset must be finite".into());
        }

        if self.frame.max_frame_delta_ms == 0 {
            errors.push("frame.max_frame_delta_ms must be > 0".into());
        }

        errors
    }

    /// Return `self` if valid, or every validation error at once.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            for error in &errors {
                tracing::warn!(%error, "rejected home screen configuration");
            }
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors that can occur when loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// Validation errors.
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
