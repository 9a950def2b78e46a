#![forbid(unsafe_code)]

//! Host capabilities.
//!
//! The engine does not know about documents or windows. Everything it needs
//! from the page goes through [`Environment`]: measuring nodes, resolving
//! selectors, reading and writing scroll positions, and the optional
//! observation/focus hooks. A wasm binding implements it over the DOM;
//! tests use [`crate::testing::FakeEnvironment`].
//!
//! # Coordinates
//!
//! [`Environment::node_rect`] returns bounding rectangles in viewport
//! coordinates, like `getBoundingClientRect`. Scroll positions are the
//! `scrollTop` of the scrolling context.

use std::fmt;
use std::time::Duration;

use guidepost_core::geometry::{NodeRect, Size, Viewport};

/// Where a node scrolls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollContext<N> {
    /// The window (used when the nearest scrollable ancestor is the
    /// document body or root).
    Window,
    /// A scrollable ancestor element.
    Element(N),
}

/// Capabilities a host provides to a tour.
pub trait Environment {
    /// Handle to a document node.
    type Node: Clone + fmt::Debug + 'static;

    /// Monotonic time.
    fn now(&self) -> Duration;

    /// Current viewport size.
    fn viewport(&self) -> Viewport;

    /// First node matching `selector`, if any.
    fn query_selector(&self, selector: &str) -> Option<Self::Node>;

    /// Bounding rectangle of `node` in viewport coordinates.
    fn node_rect(&self, node: &Self::Node) -> NodeRect;

    /// Size of the rendered helper box, if it has been laid out.
    fn helper_size(&self) -> Option<Size>;

    /// Nearest scrollable ancestor of `node`.
    fn scroll_parent(&self, node: &Self::Node) -> ScrollContext<Self::Node>;

    /// Current scroll offset of `context`.
    fn scroll_position(&self, context: &ScrollContext<Self::Node>) -> f64;

    /// Set the scroll offset of `context`.
    fn set_scroll_position(&mut self, context: &ScrollContext<Self::Node>, top: f64);

    /// Start delivering mutation records for the subtree under `root`.
    fn observe_mutations(&mut self, _root: &Self::Node) {}

    /// Stop delivering mutation records.
    fn disconnect_mutations(&mut self) {}

    /// Move keyboard focus to the helper box.
    fn focus_helper(&mut self) {}

    /// Engage or release the focus trap around the helper.
    fn set_focus_trap(&mut self, _active: bool) {}
}
