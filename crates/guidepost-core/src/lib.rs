#![forbid(unsafe_code)]

//! Core: geometry, visibility and input primitives for product tours.
//!
//! # Role in Guidepost
//! `guidepost-core` is the pure layer. It owns the rectangle and viewport
//! types, the in-view test, the geometry reducer that produces the state the
//! mask and helper render from, helper placement, the mask cut-out, and the
//! canonical key events plus the keyboard navigation policy.
//!
//! # How it fits in the system
//! The runtime (`guidepost-runtime`) measures targets through its host
//! environment and feeds the results into [`reducer::GeometryState`]. Nothing
//! in this crate performs I/O or reads a clock, so every function here is
//! deterministic and cheap to test.

pub mod event;
pub mod geometry;
pub mod keyboard;
#[cfg(feature = "tracing")]
pub mod logging;
pub mod mask;
pub mod placement;
pub mod reducer;
pub mod visibility;

pub use event::{KeyCode, KeyEvent, KeyEventKind};
pub use geometry::{NodeRect, Size, Viewport};
pub use keyboard::{KeyResponse, KeyboardNavigation, NavCommand, NavKeys};
pub use mask::MaskCutout;
pub use placement::{HelperBox, Placement, resolve_helper_box};
pub use reducer::{GeometryAction, GeometryState, TargetFound};
pub use visibility::{DEFAULT_IN_VIEW_THRESHOLD, in_view, visible_fraction};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
