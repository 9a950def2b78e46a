#![forbid(unsafe_code)]

//! In-view test for target rectangles.
//!
//! A target is "in view" when enough of it is visible for the tour to
//! highlight it without scrolling.
//!
//! # Scoring
//!
//! Each axis scores `visible_span / min(span, viewport_span)`. Dividing by the
//! smaller of the two means a target taller (or wider) than the viewport
//! scores 1.0 on that axis as soon as it covers the viewport. The rectangle's
//! score is the product of both axes.
//!
//! # Invariants
//!
//! 1. A rectangle fully inside the viewport scores 1.0 and is in view for
//!    every threshold in `[0, 1]`.
//! 2. A rectangle with no overlap is never in view, whatever the threshold.
//! 3. Thresholds are clamped to `[0, 1]`; NaN is treated as 0.
//!
//! # Failure Modes
//!
//! None. A zero-sized rectangle is in view when its origin lies inside the
//! viewport.

use crate::geometry::{NodeRect, Viewport};

/// Default threshold: the target must be fully visible.
pub const DEFAULT_IN_VIEW_THRESHOLD: f64 = 1.0;

/// Fraction of the rectangle that counts as visible, in `[0, 1]`.
pub fn visible_fraction(rect: &NodeRect, viewport: Viewport) -> f64 {
    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        return 0.0;
    }
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return if rect.origin_in(viewport) { 1.0 } else { 0.0 };
    }
    let fx = axis_fraction(rect.left, rect.width, viewport.width);
    let fy = axis_fraction(rect.top, rect.height, viewport.height);
    (fx * fy).clamp(0.0, 1.0)
}

/// Score one axis. Containment and coverage are exact so that rounding in
/// `start + span` cannot push a fully visible target below a threshold of 1.
fn axis_fraction(start: f64, span: f64, limit: f64) -> f64 {
    let end = start + span;
    if (start >= 0.0 && end <= limit) || (start <= 0.0 && end >= limit) {
        return 1.0;
    }
    let visible = (end.min(limit) - start.max(0.0)).max(0.0);
    (visible / span.min(limit)).min(1.0)
}

/// Decide whether `rect` is sufficiently within `viewport`.
pub fn in_view(rect: &NodeRect, viewport: Viewport, threshold: f64) -> bool {
    let threshold = normalize_threshold(threshold);
    let fraction = visible_fraction(rect, viewport);
    fraction > 0.0 && fraction >= threshold
}

/// Clamp a threshold into `[0, 1]`.
pub fn normalize_threshold(threshold: f64) -> f64 {
    if threshold.is_nan() {
        0.0
    } else {
        threshold.clamp(0.0, 1.0)
    }
}
