#![forbid(unsafe_code)]

//! Geometry state and its reducer.
//!
//! [`GeometryState`] is the single source of truth that rendering
//! collaborators read. It only changes through [`GeometryState::apply`].
//!
//! # Invariants
//!
//! 1. After `TargetFound`, `found == true` and the rectangle is the measured
//!    one.
//! 2. After `TargetNotFound`, `found == false`, width and height are zero and
//!    placement is [`Placement::Center`], whatever placement was requested.
//! 3. Fields not carried by an action are preserved.

use crate::geometry::{NodeRect, Size, Viewport};
use crate::placement::Placement;

/// Vertical distance below the viewport used by the fallback rectangle.
pub const FALLBACK_TOP_OFFSET: f64 = 10.0;

/// Offset added to the centre for the fallback right/bottom edges.
pub const FALLBACK_EDGE_OFFSET: f64 = 9.0;

/// Everything the mask and helper need to render.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeometryState {
    /// Target rectangle (measured, provisional, or fallback).
    pub target: NodeRect,
    /// Viewport at the time of the last update.
    pub viewport: Viewport,
    /// Helper box size at the time of the last measured update.
    pub helper: Size,
    /// Placement of the helper box.
    pub placement: Placement,
    /// Whether the target was found in the document.
    pub found: bool,
}

/// Payload of a successful measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetFound {
    /// Measured target rectangle.
    pub rect: NodeRect,
    /// Viewport at measurement time.
    pub viewport: Viewport,
    /// Helper size, if the helper has been laid out.
    pub helper: Option<Size>,
    /// Requested helper placement.
    pub placement: Placement,
}

/// State transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryAction {
    /// A target was measured.
    TargetFound(TargetFound),
    /// No target resolved; show the centred fallback.
    TargetNotFound {
        /// Viewport at resolution time.
        viewport: Viewport,
        /// Placement the step asked for. Logged, then overridden.
        requested: Placement,
    },
}

impl GeometryState {
    /// The all-zero baseline used before open and after close.
    pub const BASELINE: Self = Self {
        target: NodeRect::ZERO,
        viewport: Viewport::new(0.0, 0.0),
        helper: Size::new(0.0, 0.0),
        placement: Placement::Center,
        found: false,
    };

    /// Apply an action, returning the next state.
    #[must_use]
    pub fn reduce(&self, action: GeometryAction) -> Self {
        match action {
            GeometryAction::TargetFound(found) => Self {
                target: found.rect,
                viewport: found.viewport,
                helper: found.helper.unwrap_or(self.helper),
                placement: found.placement,
                found: true,
            },
            GeometryAction::TargetNotFound {
                viewport,
                requested,
            } => {
                #[cfg(feature = "tracing")]
                crate::logging::debug!(
                    target: "guidepost.geometry",
                    requested = %requested,
                    "target not found, centring helper"
                );
                #[cfg(not(feature = "tracing"))]
                let _ = requested;
                let helper_offset = if self.helper.width > 0.0 {
                    self.helper.width / 2.0
                } else {
                    0.0
                };
                Self {
                    target: NodeRect {
                        top: viewport.height + FALLBACK_TOP_OFFSET,
                        right: viewport.center_x() + FALLBACK_EDGE_OFFSET,
                        bottom: viewport.center_y() + FALLBACK_EDGE_OFFSET,
                        left: viewport.center_x() - helper_offset,
                        width: 0.0,
                        height: 0.0,
                    },
                    viewport,
                    helper: self.helper,
                    placement: Placement::Center,
                    found: false,
                }
            }
        }
    }

    /// Apply an action in place.
    pub fn apply(&mut self, action: GeometryAction) {
        *self = self.reduce(action);
    }

    /// Reset to [`GeometryState::BASELINE`].
    pub fn reset(&mut self) {
        *self = Self::BASELINE;
    }
}
