#![forbid(unsafe_code)]

//! In-memory environment for tests.
//!
//! [`FakeEnvironment`] models a page as a flat list of elements with
//! document-space rectangles. Elements live either directly in the window
//! or inside a scrollable container element; their viewport rectangle is
//! derived from the window and container scroll offsets, so scrolling moves
//! them exactly like a browser would. Time comes from a
//! [`DeterministicClock`], and every side-effecting call is logged.
//!
//! ```rust,ignore
//! let mut env = FakeEnvironment::new(Viewport::new(1024.0, 768.0));
//! let button = env.add("#save", NodeRect::new(40.0, 1200.0, 120.0, 32.0));
//! env.advance(Duration::from_millis(16));
//! ```

use std::cell::RefCell;
use std::time::Duration;

use guidepost_core::geometry::{NodeRect, Size, Viewport};

use crate::clock::{Clock, DeterministicClock};
use crate::environment::{Environment, ScrollContext};

/// Handle to an element of a [`FakeEnvironment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FakeNode(usize);

impl FakeNode {
    /// Position in insertion order.
    pub const fn id(self) -> usize {
        self.0
    }
}

/// A logged environment call.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvCall {
    /// `query_selector`.
    Query(String),
    /// `set_scroll_position`.
    SetScroll {
        /// Context written.
        context: ScrollContext<FakeNode>,
        /// Offset written.
        top: f64,
    },
    /// `observe_mutations`.
    Observe(FakeNode),
    /// `disconnect_mutations`.
    Disconnect,
    /// `focus_helper`.
    FocusHelper,
    /// `set_focus_trap`.
    FocusTrap(bool),
}

#[derive(Debug, Clone)]
struct FakeElement {
    selector: Option<String>,
    rect: NodeRect,
    container: Option<FakeNode>,
    attached: bool,
    scroll_top: f64,
}

/// Deterministic in-memory [`Environment`].
#[derive(Debug, Clone)]
pub struct FakeEnvironment {
    clock: DeterministicClock,
    viewport: Viewport,
    helper: Option<Size>,
    window_scroll: f64,
    elements: Vec<FakeElement>,
    observed: Option<FakeNode>,
    focus_trap: bool,
    calls: RefCell<Vec<EnvCall>>,
}

impl FakeEnvironment {
    /// Empty page with the given viewport.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            clock: DeterministicClock::new(),
            viewport,
            helper: None,
            window_scroll: 0.0,
            elements: Vec::new(),
            observed: None,
            focus_trap: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Report a laid-out helper box of `size`.
    #[must_use]
    pub fn with_helper(mut self, size: Size) -> Self {
        self.helper = Some(size);
        self
    }

    /// Add an element in the window. `rect` is in document coordinates.
    pub fn add(&mut self, selector: &str, rect: NodeRect) -> FakeNode {
        self.push(Some(selector), rect, None)
    }

    /// Add an element inside a scrollable `container`. `rect` is relative
    /// to the container's scrolled content.
    pub fn add_in(&mut self, container: FakeNode, selector: &str, rect: NodeRect) -> FakeNode {
        self.push(Some(selector), rect, Some(container))
    }

    /// Add an element no selector matches (for example a node inserted by
    /// a mutation).
    pub fn add_anonymous(&mut self, rect: NodeRect) -> FakeNode {
        self.push(None, rect, None)
    }

    fn push(&mut self, selector: Option<&str>, rect: NodeRect, container: Option<FakeNode>) -> FakeNode {
        self.elements.push(FakeElement {
            selector: selector.map(str::to_string),
            rect,
            container,
            attached: true,
            scroll_top: 0.0,
        });
        FakeNode(self.elements.len() - 1)
    }

    /// Remove an element from the document.
    pub fn detach(&mut self, node: FakeNode) {
        if let Some(el) = self.elements.get_mut(node.0) {
            el.attached = false;
        }
    }

    /// Move or resize an element (document coordinates).
    pub fn set_rect(&mut self, node: FakeNode, rect: NodeRect) {
        if let Some(el) = self.elements.get_mut(node.0) {
            el.rect = rect;
        }
    }

    /// Resize the viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Change the reported helper size.
    pub fn set_helper(&mut self, helper: Option<Size>) {
        self.helper = helper;
    }

    /// Set the window scroll offset directly.
    pub fn set_window_scroll(&mut self, top: f64) {
        self.window_scroll = top;
    }

    /// Window scroll offset.
    pub fn window_scroll(&self) -> f64 {
        self.window_scroll
    }

    /// Scroll offset of a container element.
    pub fn scroll_top(&self, node: FakeNode) -> f64 {
        self.elements.get(node.0).map_or(0.0, |el| el.scroll_top)
    }

    /// Advance the clock.
    pub fn advance(&mut self, dt: Duration) {
        self.clock.advance(dt);
    }

    /// Mutable access to the clock.
    pub fn clock_mut(&mut self) -> &mut DeterministicClock {
        &mut self.clock
    }

    /// Root currently observed for mutations.
    pub fn observed(&self) -> Option<FakeNode> {
        self.observed
    }

    /// Whether the focus trap is engaged.
    pub fn focus_trap_active(&self) -> bool {
        self.focus_trap
    }

    /// Snapshot of the call log.
    pub fn calls(&self) -> Vec<EnvCall> {
        self.calls.borrow().clone()
    }

    /// Forget logged calls.
    pub fn clear_calls(&mut self) {
        self.calls.borrow_mut().clear();
    }

    /// Number of scroll writes so far.
    pub fn scroll_writes(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, EnvCall::SetScroll { .. }))
            .count()
    }

    fn log(&self, call: EnvCall) {
        self.calls.borrow_mut().push(call);
    }

    fn viewport_rect(&self, node: FakeNode) -> NodeRect {
        let Some(el) = self.elements.get(node.0) else {
            return NodeRect::ZERO;
        };
        match el.container {
            None => el.rect.translate(0.0, -self.window_scroll),
            Some(container) => {
                let outer = self.viewport_rect(container);
                let scrolled = self.scroll_top(container);
                el.rect.translate(outer.left, outer.top - scrolled)
            }
        }
    }
}

impl Environment for FakeEnvironment {
    type Node = FakeNode;

    fn now(&self) -> Duration {
        self.clock.now()
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn query_selector(&self, selector: &str) -> Option<FakeNode> {
        self.log(EnvCall::Query(selector.to_string()));
        self.elements
            .iter()
            .position(|el| el.attached && el.selector.as_deref() == Some(selector))
            .map(FakeNode)
    }

    fn node_rect(&self, node: &FakeNode) -> NodeRect {
        self.viewport_rect(*node)
    }

    fn helper_size(&self) -> Option<Size> {
        self.helper
    }

    fn scroll_parent(&self, node: &FakeNode) -> ScrollContext<FakeNode> {
        match self.elements.get(node.0).and_then(|el| el.container) {
            Some(container) => ScrollContext::Element(container),
            None => ScrollContext::Window,
        }
    }

    fn scroll_position(&self, context: &ScrollContext<FakeNode>) -> f64 {
        match context {
            ScrollContext::Window => self.window_scroll,
            ScrollContext::Element(node) => self.scroll_top(*node),
        }
    }

    fn set_scroll_position(&mut self, context: &ScrollContext<FakeNode>, top: f64) {
        match context {
            ScrollContext::Window => self.window_scroll = top,
            ScrollContext::Element(node) => {
                if let Some(el) = self.elements.get_mut(node.0) {
                    el.scroll_top = top;
                }
            }
        }
        self.log(EnvCall::SetScroll {
            context: context.clone(),
            top,
        });
    }

    fn observe_mutations(&mut self, root: &FakeNode) {
        self.observed = Some(*root);
        self.log(EnvCall::Observe(*root));
    }

    fn disconnect_mutations(&mut self) {
        self.observed = None;
        self.log(EnvCall::Disconnect);
    }

    fn focus_helper(&mut self) {
        self.log(EnvCall::FocusHelper);
    }

    fn set_focus_trap(&mut self, active: bool) {
        self.focus_trap = active;
        self.log(EnvCall::FocusTrap(active));
    }
}
