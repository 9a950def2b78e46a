#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! All values are CSS pixels in viewport coordinates (origin at the top-left
//! of the visible area). Rectangles may sit partly or wholly outside the
//! viewport, so every coordinate is signed.

/// Size of the visible area.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Viewport {
    /// Create a new viewport.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Horizontal centre.
    #[inline]
    pub fn center_x(&self) -> f64 {
        self.width / 2.0
    }

    /// Vertical centre.
    #[inline]
    pub fn center_y(&self) -> f64 {
        self.height / 2.0
    }
}

/// Width and height of a box whose position is irrelevant (the helper box).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A measured element rectangle.
///
/// Mirrors the shape of a bounding client rect: all six edges are stored as
/// measured. Use [`NodeRect::new`] to derive `right`/`bottom` from an origin
/// and size. Fallback geometry deliberately stores edges that are not
/// derivable from `left`/`top`/`width`/`height`, so the fields stay public
/// and independent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeRect {
    /// Top edge.
    pub top: f64,
    /// Right edge.
    pub right: f64,
    /// Bottom edge.
    pub bottom: f64,
    /// Left edge.
    pub left: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl NodeRect {
    /// All-zero rectangle.
    pub const ZERO: Self = Self {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Create a rectangle from its origin and size.
    #[inline]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            right: left + width,
            bottom: top + height,
            left,
            width,
            height,
        }
    }

    /// Check if the rectangle has no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Move the rectangle by the given deltas.
    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
            left: self.left + dx,
            ..*self
        }
    }

    /// Grow the rectangle by `padding` on every side.
    ///
    /// Negative padding shrinks it; width and height never go below zero.
    #[must_use]
    pub fn inflate(&self, padding: f64) -> Self {
        Self::new(
            self.left - padding,
            self.top - padding,
            (self.width + padding * 2.0).max(0.0),
            (self.height + padding * 2.0).max(0.0),
        )
    }

    /// Visible span of this rectangle within the viewport, per axis.
    ///
    /// Returns `(visible_width, visible_height)`, each clamped at zero.
    pub fn visible_span(&self, viewport: Viewport) -> (f64, f64) {
        let right = self.left + self.width;
        let bottom = self.top + self.height;
        let w = (right.min(viewport.width) - self.left.max(0.0)).max(0.0);
        let h = (bottom.min(viewport.height) - self.top.max(0.0)).max(0.0);
        (w, h)
    }

    /// Check if a point lies inside the viewport.
    #[inline]
    pub fn origin_in(&self, viewport: Viewport) -> bool {
        self.left >= 0.0
            && self.top >= 0.0
            && self.left <= viewport.width
            && self.top <= viewport.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_derives_right_and_bottom() {
        let r = NodeRect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.right, 40.0);
        assert_eq!(r.bottom, 60.0);
    }

    #[test]
    fn zero_is_empty() {
        assert!(NodeRect::ZERO.is_empty());
        assert!(!NodeRect::new(0.0, 0.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn translate_keeps_size() {
        let r = NodeRect::new(10.0, 20.0, 30.0, 40.0).translate(5.0, -25.0);
        assert_eq!(r, NodeRect::new(15.0, -5.0, 30.0, 40.0));
    }

    #[test]
    fn inflate_grows_every_side() {
        let r = NodeRect::new(10.0, 10.0, 20.0, 20.0).inflate(5.0);
        assert_eq!(r, NodeRect::new(5.0, 5.0, 30.0, 30.0));
    }

    #[test]
    fn inflate_negative_never_inverts() {
        let r = NodeRect::new(10.0, 10.0, 4.0, 4.0).inflate(-10.0);
        assert_eq!(r.width, 0.0);
        assert_eq!(r.height, 0.0);
    }

    #[test]
    fn visible_span_clips_to_viewport() {
        let vp = Viewport::new(100.0, 100.0);
        let r = NodeRect::new(-10.0, 90.0, 50.0, 50.0);
        assert_eq!(r.visible_span(vp), (40.0, 10.0));
    }

    #[test]
    fn visible_span_outside_is_zero() {
        let vp = Viewport::new(100.0, 100.0);
        let r = NodeRect::new(0.0, 200.0, 50.0, 50.0);
        assert_eq!(r.visible_span(vp), (50.0, 0.0));
    }
}
