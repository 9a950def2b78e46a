#![forbid(unsafe_code)]

//! Mask cut-out geometry.
//!
//! The mask dims the whole viewport except for a rounded hole around the
//! target. The hole is the target rectangle grown by the mask padding.

use crate::geometry::{NodeRect, Viewport};
use crate::reducer::GeometryState;

/// The hole punched into the mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskCutout {
    /// Left edge of the hole.
    pub x: f64,
    /// Top edge of the hole.
    pub y: f64,
    /// Width of the hole (never negative).
    pub width: f64,
    /// Height of the hole (never negative).
    pub height: f64,
    /// Corner radius.
    pub radius: f64,
    /// Viewport the mask covers.
    pub viewport: Viewport,
}

impl MaskCutout {
    /// Compute the cut-out for the current geometry.
    pub fn from_state(state: &GeometryState, padding: f64, rounded: f64) -> Self {
        let NodeRect {
            left,
            top,
            width,
            height,
            ..
        } = state.target;
        let width = (width + padding * 2.0).max(0.0);
        let height = (height + padding * 2.0).max(0.0);
        Self {
            x: left - padding,
            y: top - padding,
            width,
            height,
            radius: rounded.max(0.0).min(width.min(height) / 2.0),
            viewport: state.viewport,
        }
    }

    /// Check if the hole has no area.
    pub fn is_closed(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a viewport point falls inside the hole.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}
