#![forbid(unsafe_code)]

//! Tour errors.
//!
//! Missing targets are not errors; they produce fallback geometry. `next`
//! and `previous` clamp instead of failing.

use std::fmt;

/// Errors returned by tour construction and navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourError {
    /// The tour was configured without steps.
    NoSteps,
    /// A step index outside `0..len` was requested.
    StepOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of steps.
        len: usize,
    },
    /// Options failed validation.
    InvalidOptions(Vec<String>),
}

impl fmt::Display for TourError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSteps => f.write_str("tour has no steps"),
            Self::StepOutOfRange { index, len } => {
                write!(f, "step {index} out of range for tour of {len} steps")
            }
            Self::InvalidOptions(errors) => {
                write!(f, "invalid tour options: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for TourError {}
