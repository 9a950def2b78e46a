#![forbid(unsafe_code)]

//! Asynchronous lifecycle hooks.
//!
//! Steps and tours carry optional hooks that the show-step pipeline awaits
//! in order. A hook is a shared closure returning a [`HookFuture`]. The tour
//! polls those futures itself (see [`crate::pipeline`]), so hooks run on the
//! host's thread and need neither `Send` nor an executor.
//!
//! # Failure Modes
//!
//! A hook resolving to `Err` halts the pipeline run it belongs to. The error
//! is surfaced as [`crate::tour::TourEvent::HookFailed`]; it is never
//! swallowed.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use guidepost_core::placement::Placement;

/// Future returned by a hook.
pub type HookFuture = LocalBoxFuture<'static, Result<(), HookError>>;

/// Extra parameters forwarded untouched to step hooks.
pub type HookParams = Rc<dyn Any>;

/// An optional asynchronous hook taking `A`.
pub enum Hook<A> {
    /// No hook configured.
    Absent,
    /// Hook body.
    Present(Rc<dyn Fn(A) -> HookFuture>),
}

impl<A> Hook<A> {
    /// Wrap an async closure.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(A) -> Fut + 'static,
        Fut: Future<Output = Result<(), HookError>> + 'static,
    {
        Self::Present(Rc::new(move |arg| f(arg).boxed_local()))
    }

    /// Wrap a synchronous closure. It completes in the same poll.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(A) -> Result<(), HookError> + 'static,
    {
        Self::Present(Rc::new(move |arg| futures::future::ready(f(arg)).boxed_local()))
    }

    /// Whether a hook is configured.
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Start the hook, if any.
    pub fn invoke(&self, arg: A) -> Option<HookFuture> {
        match self {
            Self::Absent => None,
            Self::Present(f) => Some(f(arg)),
        }
    }
}

impl<A> Default for Hook<A> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<A> Clone for Hook<A> {
    fn clone(&self) -> Self {
        match self {
            Self::Absent => Self::Absent,
            Self::Present(f) => Self::Present(Rc::clone(f)),
        }
    }
}

impl<A> fmt::Debug for Hook<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("Hook::Absent"),
            Self::Present(_) => f.write_str("Hook::Present(..)"),
        }
    }
}

/// Which hook a pipeline run was waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// The step's own pre-action.
    StepBefore,
    /// The tour-wide before-step hook.
    TourBefore,
    /// The step's main action.
    Action,
    /// The tour-wide after-step hook.
    AfterStep,
}

impl HookKind {
    /// Stable name used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StepBefore => "step.before",
            Self::TourBefore => "tour.before_step",
            Self::Action => "step.action",
            Self::AfterStep => "tour.after_step",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error reported by a hook.
#[derive(Clone)]
pub struct HookError {
    message: String,
    source: Option<Rc<dyn std::error::Error + 'static>>,
}

impl HookError {
    /// Create an error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Attach an underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + 'static) -> Self {
        self.source = Some(Rc::new(source));
        self
    }

    /// Error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookError")
            .field("message", &self.message)
            .field("source", &self.source.as_ref().map(|s| s.to_string()))
            .finish()
    }
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HookError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_deref()
    }
}

/// Arguments passed to step-level and tour-level step hooks.
#[derive(Clone)]
pub struct StepHookArgs {
    /// Index of the step being shown.
    pub index: usize,
    /// Target selector, if the step has one.
    pub selector: Option<String>,
    /// Placement hint.
    pub placement: Placement,
    /// Observe selector, if the step has one.
    pub observe: Option<String>,
    /// Extra parameters configured on the tour.
    pub params: Option<HookParams>,
}

impl fmt::Debug for StepHookArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepHookArgs")
            .field("index", &self.index)
            .field("selector", &self.selector)
            .field("placement", &self.placement)
            .field("observe", &self.observe)
            .field("params", &self.params.is_some())
            .finish()
    }
}

/// Parameterless lifecycle callback (after-open, before-close).
pub type Callback = Rc<dyn Fn()>;
