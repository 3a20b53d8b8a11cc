#![forbid(unsafe_code)]

//! Geometric primitives for pointer input.
//!
//! Coordinates are logical pixels with the origin at the top-left of the
//! surface, so `y` grows downward and a negative `dy` means "moving up".

/// A pointer position in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate (grows downward).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Displacement from `origin` to `self`.
    #[inline]
    #[must_use]
    pub fn delta_from(self, origin: Point) -> Delta {
        Delta {
            dx: self.x - origin.x,
            dy: self.y - origin.y,
        }
    }
}

/// A displacement between two points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Delta {
    /// Horizontal displacement.
    pub dx: f64,
    /// Vertical displacement (positive = downward).
    pub dy: f64,
}

impl Delta {
    /// Create a new delta.
    #[inline]
    #[must_use]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// The axis with the larger absolute displacement.
    ///
    /// Ties resolve to [`Axis::Horizontal`].
    #[must_use]
    pub fn dominant_axis(self) -> Axis {
        if self.dy.abs() > self.dx.abs() {
            Axis::Vertical
        } else {
            Axis::Horizontal
        }
    }

    /// Component of this delta along `axis`.
    #[inline]
    #[must_use]
    pub fn along(self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.dx,
            Axis::Vertical => self.dy,
        }
    }

    /// Whether either component exceeds `threshold` in magnitude.
    #[inline]
    #[must_use]
    pub fn exceeds(self, threshold: f64) -> bool {
        self.dx.abs() > threshold || self.dy.abs() > threshold
    }
}

/// A movement axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Left/right.
    Horizontal,
    /// Up/down.
    Vertical,
}

/// Direction of travel along the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalDirection {
    /// Toward the top of the surface (negative `dy`).
    Up,
    /// Toward the bottom of the surface (positive `dy`).
    Down,
}

impl VerticalDirection {
    /// Direction of a vertical displacement. Zero counts as downward.
    #[inline]
    #[must_use]
    pub fn of(dy: f64) -> Self {
        if dy < 0.0 { Self::Up } else { Self::Down }
    }
}
