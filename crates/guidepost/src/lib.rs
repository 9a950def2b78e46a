#![forbid(unsafe_code)]

//! Guidepost public facade crate.
//!
//! Guided product tours: a sequence of steps, each highlighting an element
//! of the host page behind a dimming mask with a helper box next to it.
//! This crate re-exports the stable surface of `guidepost-core` and
//! `guidepost-runtime` and offers a prelude for day-to-day usage.
//!
//! ```rust,ignore
//! use guidepost::prelude::*;
//!
//! let steps = vec![
//!     Step::targeting("#search").text("Find anything here").placement(Placement::Bottom),
//!     Step::targeting("#settings").text("Tune it to taste"),
//! ];
//! let mut tour = Tour::new(env, TourConfig::new(steps))?;
//! tour.open()?;
//! // on every animation frame:
//! tour.tick();
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use guidepost_core::event::{KeyCode, KeyEvent, KeyEventKind};
pub use guidepost_core::geometry::{NodeRect, Size, Viewport};
pub use guidepost_core::keyboard::{KeyResponse, KeyboardNavigation, NavKeys};
pub use guidepost_core::mask::MaskCutout;
pub use guidepost_core::placement::{HelperBox, Placement};
pub use guidepost_core::reducer::GeometryState;

// --- Runtime re-exports ----------------------------------------------------

pub use guidepost_runtime::{
    ButtonAction, CalloutView, CloseReason, ConfigError, Environment, GeometryCause, Hook,
    HookError, HookKind, MaskView, MutationRecord, NavReason, ScrollContext, Step, StepContent,
    StepHookArgs, StepSpec, Tour, TourConfig, TourError, TourEvent, TourHooks, TourOptions,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Guidepost hosts.
#[derive(Debug)]
pub enum Error {
    /// Tour construction or navigation failed.
    Tour(TourError),
    /// Configuration could not be loaded or validated.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tour(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tour(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<TourError> for Error {
    fn from(err: TourError) -> Self {
        Self::Tour(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for Guidepost APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Environment, Error, Hook, HookError, KeyCode, KeyEvent, NodeRect, Placement, Result,
        Step, Tour, TourConfig, TourEvent, TourHooks, TourOptions, Viewport,
    };

    pub use crate::{core, runtime};
}

pub use guidepost_core as core;
pub use guidepost_runtime as runtime;
