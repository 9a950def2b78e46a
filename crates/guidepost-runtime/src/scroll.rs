#![forbid(unsafe_code)]

//! Smooth scrolling of a target into view.
//!
//! [`ScrollAnimation`] is a time-driven interpolation from the context's
//! current scroll offset to a destination that puts the target at the
//! requested offset. The tour samples it on every tick and writes the
//! position back through its environment.
//!
//! # Invariants
//!
//! 1. The destination is never negative.
//! 2. Sampling at or past `started + duration` lands exactly on the
//!    destination and reports completion.
//! 3. Completion is reported once; later samples return `None`.

use std::time::Duration;

use crate::environment::ScrollContext;
use crate::pipeline::Generation;

/// Offset used when the target is taller than the viewport: its top edge
/// lands just below the viewport top.
pub const TALL_TARGET_OFFSET: f64 = -25.0;

/// Offset applied to the target's top edge when scrolling it into view.
///
/// An explicit override wins. Otherwise targets taller than the viewport
/// are aligned near the top and shorter ones are centred vertically.
pub fn scroll_offset(override_offset: Option<f64>, target_height: f64, viewport_height: f64) -> f64 {
    if let Some(offset) = override_offset {
        return offset;
    }
    if target_height > viewport_height {
        TALL_TARGET_OFFSET
    } else {
        -(viewport_height / 2.0) + target_height / 2.0
    }
}

/// Scroll offset that brings the target to `offset` within its context.
///
/// `target_top` and `anchor` are viewport coordinates; the anchor is the
/// top of the scrolling container (0 for the window).
pub fn scroll_destination(current: f64, target_top: f64, anchor: f64, offset: f64) -> f64 {
    (current + (target_top - anchor) + offset).max(0.0)
}

/// Quadratic ease-in-out over `t` in `[0, 1]`.
pub fn ease_in_out_quad(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

/// One sample of a running animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollFrame {
    /// Scroll offset to apply.
    pub position: f64,
    /// Whether this is the final frame.
    pub done: bool,
}

/// An in-flight scroll for one pipeline run.
#[derive(Debug, Clone)]
pub struct ScrollAnimation<N> {
    generation: Generation,
    index: usize,
    node: N,
    context: ScrollContext<N>,
    from: f64,
    to: f64,
    started: Duration,
    duration: Duration,
    finished: bool,
}

impl<N> ScrollAnimation<N> {
    /// Start an animation at `started`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        generation: Generation,
        index: usize,
        node: N,
        context: ScrollContext<N>,
        from: f64,
        to: f64,
        started: Duration,
        duration: Duration,
    ) -> Self {
        Self {
            generation,
            index,
            node,
            context,
            from,
            to,
            started,
            duration,
            finished: false,
        }
    }

    /// Sample the animation at `now`.
    pub fn sample(&mut self, now: Duration) -> Option<ScrollFrame> {
        if self.finished {
            return None;
        }
        let elapsed = now.saturating_sub(self.started);
        if elapsed >= self.duration {
            self.finished = true;
            return Some(ScrollFrame {
                position: self.to,
                done: true,
            });
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        Some(ScrollFrame {
            position: self.from + (self.to - self.from) * ease_in_out_quad(t),
            done: false,
        })
    }

    /// Run this animation belongs to.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Step being scrolled to.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Node being scrolled into view.
    pub fn node(&self) -> &N {
        &self.node
    }

    /// Scrolling context.
    pub fn context(&self) -> &ScrollContext<N> {
        &self.context
    }

    /// Start offset.
    pub fn from(&self) -> f64 {
        self.from
    }

    /// Destination offset.
    pub fn to(&self) -> f64 {
        self.to
    }

    /// Whether the final frame has been sampled.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anim(duration_ms: u64) -> ScrollAnimation<u32> {
        ScrollAnimation::new(
            Generation::default(),
            0,
            7,
            ScrollContext::Window,
            100.0,
            500.0,
            Duration::from_millis(1000),
            Duration::from_millis(duration_ms),
        )
    }

    #[test]
    fn override_offset_wins() {
        assert_eq!(scroll_offset(Some(-40.0), 800.0, 600.0), -40.0);
    }

    #[test]
    fn tall_target_uses_fixed_offset() {
        assert_eq!(scroll_offset(None, 800.0, 600.0), -25.0);
    }

    #[test]
    fn short_target_is_centred() {
        assert_eq!(scroll_offset(None, 100.0, 600.0), -250.0);
    }

    #[test]
    fn destination_is_clamped_at_zero() {
        assert_eq!(scroll_destination(0.0, 40.0, 0.0, -250.0), 0.0);
        assert_eq!(scroll_destination(200.0, 900.0, 0.0, -250.0), 850.0);
        assert_eq!(scroll_destination(0.0, 700.0, 100.0, -25.0), 575.0);
    }

    #[test]
    fn easing_endpoints_and_midpoint() {
        assert_eq!(ease_in_out_quad(0.0), 0.0);
        assert_eq!(ease_in_out_quad(1.0), 1.0);
        assert_eq!(ease_in_out_quad(0.5), 0.5);
        assert!(ease_in_out_quad(0.25) < 0.25);
        assert!(ease_in_out_quad(0.75) > 0.75);
    }

    #[test]
    fn animation_interpolates_then_completes_once() {
        let mut a = anim(100);
        let start = a.sample(Duration::from_millis(1000)).unwrap();
        assert_eq!(start.position, 100.0);
        assert!(!start.done);

        let mid = a.sample(Duration::from_millis(1050)).unwrap();
        assert_eq!(mid.position, 300.0);

        let end = a.sample(Duration::from_millis(1100)).unwrap();
        assert_eq!(end, ScrollFrame { position: 500.0, done: true });
        assert!(a.is_finished());
        assert_eq!(a.sample(Duration::from_millis(2000)), None);
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let mut a = anim(0);
        let frame = a.sample(Duration::from_millis(1000)).unwrap();
        assert!(frame.done);
        assert_eq!(frame.position, 500.0);
    }
}
