#![forbid(unsafe_code)]

//! Guidepost Runtime
//!
//! The host-driven tour engine: step navigation, the show-step pipeline,
//! smooth scrolling, resize and mutation re-observation, keyboard handling
//! and the view models renderers draw from.
//!
//! # Key Components
//!
//! - [`Tour`] - The tour session; owns all state and deferred work
//! - [`Environment`] - Capabilities the host provides (measuring, scrolling)
//! - [`Step`] - One entry of a tour, with its hooks
//! - [`TourOptions`] - Behaviour and presentation settings
//! - [`TourEvent`] - Notifications drained by listeners
//!
//! # Role in Guidepost
//! `guidepost-runtime` is the orchestrator. It resolves targets through the
//! host, feeds measurements into the `guidepost-core` reducer, drives hooks
//! and animations from [`Tour::tick`], and exposes the resulting geometry.
//!
//! # How it fits in the system
//! A binding (for example a wasm crate over the DOM) implements
//! [`Environment`], forwards input and frame callbacks to a [`Tour`], and
//! renders [`Tour::mask`] and [`Tour::callout`].

pub mod clock;
pub mod config;
pub mod environment;
pub mod error;
pub mod hooks;
pub mod logging;
pub mod navigator;
pub mod pipeline;
pub mod scroll;
pub mod step;
#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;
pub mod tour;
pub mod view;
pub mod watcher;

pub use clock::{Clock, DeterministicClock, WallClock};
pub use config::{ConfigError, TourConfig, TourHooks, TourOptions};
pub use environment::{Environment, ScrollContext};
pub use error::TourError;
pub use hooks::{Hook, HookError, HookFuture, HookKind, HookParams, StepHookArgs};
#[cfg(feature = "tracing-json")]
pub use logging::init_json_logging;
pub use navigator::{CloseReason, NavReason, Navigator, StepChange};
pub use pipeline::{Generation, Stage};
pub use step::{ContentContext, Step, StepContent, StepSpec};
pub use tour::{GeometryCause, Tour, TourEvent};
pub use view::{ButtonAction, ButtonView, CalloutView, DotView, MaskView};
pub use watcher::MutationRecord;
