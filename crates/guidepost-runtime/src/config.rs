#![forbid(unsafe_code)]

//! Tour configuration.
//!
//! [`TourOptions`] captures every tunable of a tour as plain data that can
//! be loaded from TOML or JSON (with the `config` feature). Hooks and
//! callbacks live in [`TourHooks`] because closures cannot be serialized.
//! [`TourConfig`] bundles options, steps and hooks for [`crate::Tour::new`].
//!
//! # Loading
//!
//! ```toml
//! # tour.toml
//! scroll_duration_ms = 300
//! in_view_threshold = 0.5
//! disable_keyboard_navigation = ["esc"]
//! accent_color = "#5cb7b7"
//! ```
//!
//! ```rust,ignore
//! let options = TourOptions::from_toml_file("tour.toml")?.validated()?;
//! let steps = load_steps_toml_file("steps.toml")?;
//! ```
//!
//! # Defaults
//!
//! Scroll duration 1 ms, threshold 1.0 (fully visible), close on mask
//! click, no rewind, accent `#007aff`, square corners, mask padding 10,
//! every badge/button/dot toggle on, resize debounce 100 ms, mutation
//! settle 500 ms.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use guidepost_core::keyboard::KeyboardNavigation;
use guidepost_core::visibility::DEFAULT_IN_VIEW_THRESHOLD;

use crate::hooks::{Callback, Hook, HookParams, StepHookArgs};
use crate::navigator::CloseReason;
use crate::step::Step;

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "config")]
use crate::step::StepSpec;

/// Default accent colour of the badge and active dot.
pub const DEFAULT_ACCENT_COLOR: &str = "#007aff";

/// Default space between the target and the mask hole edge.
pub const DEFAULT_MASK_PADDING: f64 = 10.0;

/// Default resize debounce.
pub const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 100;

/// Default delay before re-measuring a node added by a mutation.
pub const DEFAULT_MUTATION_SETTLE_MS: u64 = 500;

/// Every recognised tour option.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct TourOptions {
    /// Step shown on open. `None` resumes from the index the last session
    /// ended on (0 for the first session).
    pub start_at: Option<usize>,
    /// Scroll animation length.
    pub scroll_duration_ms: u64,
    /// Visible fraction required to skip scrolling, in `[0, 1]`.
    pub in_view_threshold: f64,
    /// Fixed scroll offset replacing the computed one.
    pub scroll_offset: Option<f64>,
    /// Block interaction with highlighted targets.
    pub disable_interaction: bool,
    /// Disabled navigation keys.
    #[cfg_attr(feature = "config", serde(rename = "disable_keyboard_navigation"))]
    pub keyboard: KeyboardNavigation,
    /// Close when the mask outside the highlight is clicked.
    pub close_with_mask: bool,
    /// Go back to the first step on close.
    pub rewind_on_close: bool,
    /// Accent colour.
    pub accent_color: String,
    /// Corner radius of the mask hole and helper.
    pub rounded: f64,
    /// Padding between the target and the mask hole edge.
    pub mask_padding: f64,
    /// Space between the padded target and the helper box.
    pub helper_gap: f64,
    /// Extra class for the helper box.
    pub helper_class: Option<String>,
    /// Extra class for the mask.
    pub mask_class: Option<String>,
    /// Extra class for the interaction blocker over the highlight.
    pub highlighted_mask_class: Option<String>,
    /// The host renders its own helper; default styles are off.
    pub custom_helper: bool,
    /// Show the step number badge.
    pub show_badge: bool,
    /// Show previous/next buttons.
    pub show_buttons: bool,
    /// Show navigation dots.
    pub show_navigation: bool,
    /// Print step numbers inside the dots.
    pub show_navigation_number: bool,
    /// Dots are not clickable.
    pub disable_dots_navigation: bool,
    /// Label of the previous button.
    pub prev_label: Option<String>,
    /// Label of the next button.
    pub next_label: Option<String>,
    /// Label of the next button on the last step. Turns it into "finish".
    pub last_step_label: Option<String>,
    /// Resize debounce.
    pub resize_debounce_ms: u64,
    /// Delay before re-measuring a node added by a mutation.
    pub mutation_settle_ms: u64,
}

impl Default for TourOptions {
    fn default() -> Self {
        Self {
            start_at: None,
            scroll_duration_ms: 1,
            in_view_threshold: DEFAULT_IN_VIEW_THRESHOLD,
            scroll_offset: None,
            disable_interaction: false,
            keyboard: KeyboardNavigation::ENABLED,
            close_with_mask: true,
            rewind_on_close: false,
            accent_color: DEFAULT_ACCENT_COLOR.to_string(),
            rounded: 0.0,
            mask_padding: DEFAULT_MASK_PADDING,
            helper_gap: DEFAULT_MASK_PADDING,
            helper_class: None,
            mask_class: None,
            highlighted_mask_class: None,
            custom_helper: false,
            show_badge: true,
            show_buttons: true,
            show_navigation: true,
            show_navigation_number: true,
            disable_dots_navigation: false,
            prev_label: None,
            next_label: None,
            last_step_label: None,
            resize_debounce_ms: DEFAULT_RESIZE_DEBOUNCE_MS,
            mutation_settle_ms: DEFAULT_MUTATION_SETTLE_MS,
        }
    }
}

impl TourOptions {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the options
    /// are valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(0.0..=1.0).contains(&self.in_view_threshold) {
            errors.push(format!(
                "in_view_threshold must be in [0, 1], got {}",
                self.in_view_threshold
            ));
        }

        if let Some(offset) = self.scroll_offset
            && !offset.is_finite()
        {
            errors.push(format!("scroll_offset must be finite, got {offset}"));
        }

        if !self.mask_padding.is_finite() || self.mask_padding < 0.0 {
            errors.push(format!(
                "mask_padding must be >= 0, got {}",
                self.mask_padding
            ));
        }

        if !self.rounded.is_finite() || self.rounded < 0.0 {
            errors.push(format!("rounded must be >= 0, got {}", self.rounded));
        }

        if !self.helper_gap.is_finite() || self.helper_gap < 0.0 {
            errors.push(format!("helper_gap must be >= 0, got {}", self.helper_gap));
        }

        if self.accent_color.trim().is_empty() {
            errors.push("accent_color must not be empty".into());
        }

        errors
    }

    /// Return `self` if it validates.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Scroll animation length.
    pub fn scroll_duration(&self) -> Duration {
        Duration::from_millis(self.scroll_duration_ms)
    }

    /// Resize debounce.
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    /// Mutation settle delay.
    pub fn mutation_settle(&self) -> Duration {
        Duration::from_millis(self.mutation_settle_ms)
    }

    /// Set the start index.
    #[must_use]
    pub fn with_start_at(mut self, index: usize) -> Self {
        self.start_at = Some(index);
        self
    }

    /// Set the scroll duration.
    #[must_use]
    pub fn with_scroll_duration(mut self, duration: Duration) -> Self {
        self.scroll_duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the in-view threshold.
    #[must_use]
    pub fn with_in_view_threshold(mut self, threshold: f64) -> Self {
        self.in_view_threshold = threshold;
        self
    }

    /// Set a fixed scroll offset.
    #[must_use]
    pub fn with_scroll_offset(mut self, offset: f64) -> Self {
        self.scroll_offset = Some(offset);
        self
    }

    /// Set the keyboard policy.
    #[must_use]
    pub fn with_keyboard(mut self, keyboard: KeyboardNavigation) -> Self {
        self.keyboard = keyboard;
        self
    }

    /// Rewind to the first step on close.
    #[must_use]
    pub fn with_rewind_on_close(mut self, rewind: bool) -> Self {
        self.rewind_on_close = rewind;
        self
    }

    /// Block interaction with highlighted targets.
    #[must_use]
    pub fn with_disable_interaction(mut self, disable: bool) -> Self {
        self.disable_interaction = disable;
        self
    }

    /// Close on mask click.
    #[must_use]
    pub fn with_close_with_mask(mut self, close: bool) -> Self {
        self.close_with_mask = close;
        self
    }
}

/// Load a step list from TOML (`[[steps]]` tables).
#[cfg(feature = "config")]
pub fn load_steps_toml_str(s: &str) -> Result<Vec<StepSpec>, ConfigError> {
    #[derive(Deserialize)]
    struct StepFile {
        #[serde(default)]
        steps: Vec<StepSpec>,
    }
    toml::from_str::<StepFile>(s)
        .map(|file| file.steps)
        .map_err(ConfigError::Toml)
}

/// Load a step list from a TOML file on disk.
#[cfg(feature = "config")]
pub fn load_steps_toml_file(path: impl AsRef<Path>) -> Result<Vec<StepSpec>, ConfigError> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
    load_steps_toml_str(&content)
}

/// Load a step list from a JSON array.
#[cfg(feature = "config")]
pub fn load_steps_json_str(s: &str) -> Result<Vec<StepSpec>, ConfigError> {
    serde_json::from_str(s).map_err(ConfigError::Json)
}

/// Load a step list from a JSON file on disk.
#[cfg(feature = "config")]
pub fn load_steps_json_file(path: impl AsRef<Path>) -> Result<Vec<StepSpec>, ConfigError> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
    load_steps_json_str(&content)
}

/// Errors from loading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

/// Tour-level hooks and callbacks.
#[derive(Clone, Default)]
pub struct TourHooks {
    /// Called once the tour has opened and focused the helper.
    pub after_open: Option<Callback>,
    /// Called first when the tour closes.
    pub before_close: Option<Callback>,
    /// Notified with the reason whenever the tour closes.
    pub request_close: Option<Rc<dyn Fn(CloseReason)>>,
    /// Awaited before every step, after the step's own pre-action.
    pub before_step: Hook<StepHookArgs>,
    /// Awaited after every step's main action.
    pub after_step: Hook<StepHookArgs>,
    /// Extra parameters forwarded to step hooks.
    pub params: Option<HookParams>,
    /// Badge text from `(step_number, total)`.
    pub badge: Option<Rc<dyn Fn(usize, usize) -> String>>,
}

impl TourHooks {
    /// No hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the after-open callback.
    #[must_use]
    pub fn after_open(mut self, f: impl Fn() + 'static) -> Self {
        self.after_open = Some(Rc::new(f));
        self
    }

    /// Set the before-close callback.
    #[must_use]
    pub fn before_close(mut self, f: impl Fn() + 'static) -> Self {
        self.before_close = Some(Rc::new(f));
        self
    }

    /// Set the close-request callback.
    #[must_use]
    pub fn request_close(mut self, f: impl Fn(CloseReason) + 'static) -> Self {
        self.request_close = Some(Rc::new(f));
        self
    }

    /// Set the before-step hook.
    #[must_use]
    pub fn before_step(mut self, hook: Hook<StepHookArgs>) -> Self {
        self.before_step = hook;
        self
    }

    /// Set the after-step hook.
    #[must_use]
    pub fn after_step(mut self, hook: Hook<StepHookArgs>) -> Self {
        self.after_step = hook;
        self
    }

    /// Set extra hook parameters.
    #[must_use]
    pub fn params(mut self, params: HookParams) -> Self {
        self.params = Some(params);
        self
    }

    /// Set the badge content function.
    #[must_use]
    pub fn badge(mut self, f: impl Fn(usize, usize) -> String + 'static) -> Self {
        self.badge = Some(Rc::new(f));
        self
    }
}

impl fmt::Debug for TourHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TourHooks")
            .field("after_open", &self.after_open.is_some())
            .field("before_close", &self.before_close.is_some())
            .field("request_close", &self.request_close.is_some())
            .field("before_step", &self.before_step)
            .field("after_step", &self.after_step)
            .field("params", &self.params.is_some())
            .field("badge", &self.badge.is_some())
            .finish()
    }
}

/// Everything a tour is built from.
#[derive(Debug, Clone)]
pub struct TourConfig<N> {
    /// Options.
    pub options: TourOptions,
    /// Steps, in order.
    pub steps: Vec<Step<N>>,
    /// Hooks.
    pub hooks: TourHooks,
}

impl<N> TourConfig<N> {
    /// Default options and no hooks.
    pub fn new(steps: Vec<Step<N>>) -> Self {
        Self {
            options: TourOptions::default(),
            steps,
            hooks: TourHooks::default(),
        }
    }

    /// Replace the options.
    #[must_use]
    pub fn options(mut self, options: TourOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the hooks.
    #[must_use]
    pub fn hooks(mut self, hooks: TourHooks) -> Self {
        self.hooks = hooks;
        self
    }
}
