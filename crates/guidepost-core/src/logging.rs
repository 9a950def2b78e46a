#![forbid(unsafe_code)]

//! Structured logging re-exports.
//!
//! Downstream crates log through these so that enabling the `tracing`
//! feature on `guidepost-core` is enough to pull in a single `tracing`
//! version across the workspace.

pub use tracing::{
    Level, debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn,
    warn_span,
};
