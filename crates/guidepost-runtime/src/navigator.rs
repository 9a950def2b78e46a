#![forbid(unsafe_code)]

//! Step navigation state machine.
//!
//! The navigator only tracks indices. Showing a step, closing listeners and
//! resetting geometry are the tour's job; every change returned here is a
//! cue for the tour to re-run the show-step pipeline.
//!
//! # Invariants
//!
//! 1. `current < len` at all times (`len > 0` is enforced at construction).
//! 2. `next` from `i` yields `min(i + 1, len - 1)`; `previous` yields
//!    `max(i - 1, 0)`. Neither ever fails.
//! 3. `go_to` outside `0..len` is rejected and leaves the index unchanged.
//! 4. While closed, navigation does nothing.

use std::fmt;

use tracing::debug;

use crate::error::TourError;

/// Why the step changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavReason {
    /// Forward by one.
    Next,
    /// Back by one.
    Previous,
    /// Direct jump.
    Jump,
}

/// Why the tour closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Closed programmatically.
    Api,
    /// Escape key.
    Keyboard,
    /// Click on the mask outside the highlight.
    Mask,
    /// Finish button on the last step.
    Finish,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Api => "api",
            Self::Keyboard => "keyboard",
            Self::Mask => "mask",
            Self::Finish => "finish",
        })
    }
}

/// A transition between two steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepChange {
    /// Index before the change.
    pub from: usize,
    /// Index after the change.
    pub to: usize,
    /// What caused it.
    pub reason: NavReason,
}

/// Current/previous index plus the open flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    len: usize,
    current: usize,
    previous: usize,
    open: bool,
}

impl Navigator {
    /// Create a closed navigator over `len` steps.
    pub fn new(len: usize) -> Result<Self, TourError> {
        if len == 0 {
            return Err(TourError::NoSteps);
        }
        Ok(Self {
            len,
            current: 0,
            previous: 0,
            open: false,
        })
    }

    /// Open at `start_at`, or at the index kept from the last session.
    ///
    /// Returns the index shown. Opening an open navigator keeps its index.
    pub fn open(&mut self, start_at: Option<usize>) -> Result<usize, TourError> {
        if self.open {
            return Ok(self.current);
        }
        let index = start_at.unwrap_or(self.current);
        self.check(index)?;
        self.previous = self.current;
        self.current = index;
        self.open = true;
        debug!(target: "guidepost.nav", index, "opened");
        Ok(index)
    }

    /// Close, optionally rewinding to the first step.
    ///
    /// Returns `false` if already closed.
    pub fn close(&mut self, rewind: bool) -> bool {
        if !self.open {
            return false;
        }
        self.open = false;
        if rewind {
            self.previous = self.current;
            self.current = 0;
        }
        debug!(target: "guidepost.nav", index = self.current, rewind, "closed");
        true
    }

    /// Move forward by one, clamped at the last step.
    pub fn next(&mut self) -> Option<StepChange> {
        let to = (self.current + 1).min(self.len - 1);
        self.move_to(to, NavReason::Next)
    }

    /// Move back by one, clamped at the first step.
    pub fn previous(&mut self) -> Option<StepChange> {
        let to = self.current.saturating_sub(1);
        self.move_to(to, NavReason::Previous)
    }

    /// Jump to `index`.
    ///
    /// Out-of-range indices are rejected. Jumping to the current step, or
    /// jumping while closed, is a no-op.
    pub fn go_to(&mut self, index: usize) -> Result<Option<StepChange>, TourError> {
        self.check(index)?;
        Ok(self.move_to(index, NavReason::Jump))
    }

    fn move_to(&mut self, to: usize, reason: NavReason) -> Option<StepChange> {
        if !self.open || to == self.current {
            return None;
        }
        let change = StepChange {
            from: self.current,
            to,
            reason,
        };
        self.previous = self.current;
        self.current = to;
        debug!(target: "guidepost.nav", from = change.from, to, ?reason, "step changed");
        Some(change)
    }

    fn check(&self, index: usize) -> Result<(), TourError> {
        if index < self.len {
            Ok(())
        } else {
            Err(TourError::StepOutOfRange {
                index,
                len: self.len,
            })
        }
    }

    /// Current index.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Index before the last change.
    pub fn previous_index(&self) -> usize {
        self.previous
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; an empty navigator cannot be built.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the tour is open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether the current step is the first.
    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    /// Whether the current step is the last.
    pub fn is_last(&self) -> bool {
        self.current + 1 == self.len
    }
}
