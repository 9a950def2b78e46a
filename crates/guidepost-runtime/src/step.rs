#![forbid(unsafe_code)]

//! Tour steps.
//!
//! A [`Step`] is immutable once handed to a tour. Build one with the
//! `#[must_use]` builder methods:
//!
//! ```rust,ignore
//! let step = Step::targeting(".search")
//!     .text("Search everything from here.")
//!     .placement(Placement::Bottom)
//!     .observe("#results");
//! ```
//!
//! [`StepSpec`] is the data-only subset that can be loaded from
//! configuration files.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use guidepost_core::placement::Placement;

use crate::hooks::{Hook, HookParams, StepHookArgs};

/// Values available to a content-producing function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentContext {
    /// 1-based number of the step being rendered.
    pub step: usize,
    /// Total number of steps.
    pub total: usize,
    /// Whether the step's target was found.
    pub in_dom: bool,
}

/// Body of the helper box.
#[derive(Clone, Default)]
pub enum StepContent {
    /// No content.
    #[default]
    None,
    /// Fixed text.
    Text(String),
    /// Content computed when the callout is built.
    Render(Rc<dyn Fn(&ContentContext) -> String>),
}

impl StepContent {
    /// Resolve to a string for the given context.
    pub fn resolve(&self, cx: &ContentContext) -> Option<String> {
        match self {
            Self::None => None,
            Self::Text(text) => Some(text.clone()),
            Self::Render(render) => Some(render(cx)),
        }
    }
}

impl fmt::Debug for StepContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Render(_) => f.write_str("Render(..)"),
        }
    }
}

/// One entry of a tour.
pub struct Step<N> {
    /// Selector of the element to highlight.
    pub selector: Option<String>,
    /// Helper box content.
    pub content: StepContent,
    /// Where the helper goes relative to the target.
    pub placement: Placement,
    /// Awaited before the target is looked up.
    pub before: Hook<StepHookArgs>,
    /// Awaited after geometry has been dispatched, with the resolved node.
    pub action: Hook<Option<N>>,
    /// Selector of a subtree to watch for mutations while this step shows.
    pub observe: Option<String>,
    /// Per-step style overrides for the helper box.
    pub style: BTreeMap<String, String>,
    /// Allow interacting with the highlighted target (overrides the tour
    /// setting when present).
    pub interaction: Option<bool>,
}

impl<N> Default for Step<N> {
    fn default() -> Self {
        Self {
            selector: None,
            content: StepContent::None,
            placement: Placement::Center,
            before: Hook::Absent,
            action: Hook::Absent,
            observe: None,
            style: BTreeMap::new(),
            interaction: None,
        }
    }
}

impl<N> Clone for Step<N> {
    fn clone(&self) -> Self {
        Self {
            selector: self.selector.clone(),
            content: self.content.clone(),
            placement: self.placement,
            before: self.before.clone(),
            action: self.action.clone(),
            observe: self.observe.clone(),
            style: self.style.clone(),
            interaction: self.interaction,
        }
    }
}

impl<N> fmt::Debug for Step<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("selector", &self.selector)
            .field("content", &self.content)
            .field("placement", &self.placement)
            .field("before", &self.before)
            .field("action", &self.action)
            .field("observe", &self.observe)
            .field("interaction", &self.interaction)
            .finish_non_exhaustive()
    }
}

impl<N> Step<N> {
    /// A step without a target. It always shows the centred fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// A step highlighting the element matching `selector`.
    pub fn targeting(selector: impl Into<String>) -> Self {
        Self {
            selector: Some(selector.into()),
            ..Self::default()
        }
    }

    /// Set fixed text content.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.content = StepContent::Text(text.into());
        self
    }

    /// Set content computed at render time.
    #[must_use]
    pub fn render(mut self, render: impl Fn(&ContentContext) -> String + 'static) -> Self {
        self.content = StepContent::Render(Rc::new(render));
        self
    }

    /// Set the placement hint.
    #[must_use]
    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Set the pre-action hook.
    #[must_use]
    pub fn before(mut self, hook: Hook<StepHookArgs>) -> Self {
        self.before = hook;
        self
    }

    /// Set the main action hook.
    #[must_use]
    pub fn action(mut self, hook: Hook<Option<N>>) -> Self {
        self.action = hook;
        self
    }

    /// Watch the subtree matching `selector` while this step shows.
    #[must_use]
    pub fn observe(mut self, selector: impl Into<String>) -> Self {
        self.observe = Some(selector.into());
        self
    }

    /// Add a style override.
    #[must_use]
    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(property.into(), value.into());
        self
    }

    /// Allow or forbid interaction with the highlighted target.
    #[must_use]
    pub fn interaction(mut self, allowed: bool) -> Self {
        self.interaction = Some(allowed);
        self
    }

    /// Arguments handed to before/after hooks for this step.
    pub fn hook_args(&self, index: usize, params: Option<&HookParams>) -> StepHookArgs {
        StepHookArgs {
            index,
            selector: self.selector.clone(),
            placement: self.placement,
            observe: self.observe.clone(),
            params: params.cloned(),
        }
    }
}

/// Serializable description of a step, without hooks.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct StepSpec {
    /// Target selector.
    pub selector: Option<String>,
    /// Fixed text content.
    pub content: Option<String>,
    /// Placement hint.
    pub placement: Placement,
    /// Observe selector.
    pub observe: Option<String>,
    /// Style overrides.
    pub style: BTreeMap<String, String>,
    /// Interaction override.
    pub interaction: Option<bool>,
}

impl<N> From<StepSpec> for Step<N> {
    fn from(spec: StepSpec) -> Self {
        Self {
            selector: spec.selector,
            content: spec.content.map_or(StepContent::None, StepContent::Text),
            placement: spec.placement,
            observe: spec.observe,
            style: spec.style,
            interaction: spec.interaction,
            ..Self::default()
        }
    }
}
