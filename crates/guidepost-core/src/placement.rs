#![forbid(unsafe_code)]

//! Helper-box placement.
//!
//! Decides where the helper (caption) box goes relative to the highlighted
//! target.
//!
//! # Invariants
//!
//! 1. The resolved box never extends past the viewport when it fits at all.
//! 2. [`Placement::Center`], and any state whose target was not found, centre
//!    the helper in the viewport.
//! 3. A preferred side that does not fit falls back in the order bottom,
//!    top, right, left; if nothing fits, the preferred side is clamped.

use core::fmt;
use core::str::FromStr;

use crate::geometry::{NodeRect, Size};
use crate::reducer::GeometryState;

/// Position hint for the helper box relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Placement {
    /// Above the target.
    Top,
    /// Right of the target.
    Right,
    /// Below the target.
    Bottom,
    /// Left of the target.
    Left,
    /// Centred in the viewport.
    #[default]
    Center,
}

impl Placement {
    /// Lowercase name used in configuration files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Center => "center",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown placement name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePlacementError(String);

impl fmt::Display for ParsePlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown placement: {:?}", self.0)
    }
}

impl std::error::Error for ParsePlacementError {}

impl FromStr for Placement {
    type Err = ParsePlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "right" => Ok(Self::Right),
            "bottom" => Ok(Self::Bottom),
            "left" => Ok(Self::Left),
            "center" | "centre" => Ok(Self::Center),
            _ => Err(ParsePlacementError(s.to_string())),
        }
    }
}

/// Resolved helper box position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelperBox {
    /// Left edge in viewport pixels.
    pub left: f64,
    /// Top edge in viewport pixels.
    pub top: f64,
    /// Helper size used for the computation.
    pub size: Size,
    /// Side actually used (may differ from the hint after fallback).
    pub placement: Placement,
}

/// Compute the helper box position for the current geometry.
///
/// `padding` is the mask padding around the target; `gap` is the space kept
/// between the padded target and the helper.
pub fn resolve_helper_box(state: &GeometryState, padding: f64, gap: f64) -> HelperBox {
    let viewport = state.viewport;
    let size = state.helper;

    if !state.found || state.placement == Placement::Center {
        return HelperBox {
            left: viewport.center_x() - size.width / 2.0,
            top: viewport.center_y() - size.height / 2.0,
            size,
            placement: Placement::Center,
        };
    }

    let target = state.target.inflate(padding);
    let fits = |(x, y): (f64, f64)| {
        x >= 0.0 && y >= 0.0 && x + size.width <= viewport.width && y + size.height <= viewport.height
    };

    let preferred = state.placement;
    let (x, y, placement) = if fits(origin_for(preferred, &target, size, gap)) {
        let (x, y) = origin_for(preferred, &target, size, gap);
        (x, y, preferred)
    } else {
        [
            Placement::Bottom,
            Placement::Top,
            Placement::Right,
            Placement::Left,
        ]
        .into_iter()
        .map(|p| (origin_for(p, &target, size, gap), p))
        .find(|(origin, _)| fits(*origin))
        .map(|((x, y), p)| (x, y, p))
        .unwrap_or_else(|| {
            let (x, y) = origin_for(preferred, &target, size, gap);
            (x, y, preferred)
        })
    };

    HelperBox {
        left: clamp_axis(x, size.width, viewport.width),
        top: clamp_axis(y, size.height, viewport.height),
        size,
        placement,
    }
}

fn origin_for(placement: Placement, target: &NodeRect, size: Size, gap: f64) -> (f64, f64) {
    match placement {
        Placement::Bottom => (target.left, target.top + target.height + gap),
        Placement::Top => (target.left, target.top - size.height - gap),
        Placement::Right => (target.left + target.width + gap, target.top),
        Placement::Left => (target.left - size.width - gap, target.top),
        Placement::Center => (target.left, target.top),
    }
}

fn clamp_axis(origin: f64, extent: f64, limit: f64) -> f64 {
    origin.min(limit - extent).max(0.0)
}
