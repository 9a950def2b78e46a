#![forbid(unsafe_code)]

//! View models for rendering collaborators.
//!
//! Renderers (mask, helper box, badge, buttons, dots) consume these values
//! and nothing else. They are rebuilt on demand from the tour state, so
//! they are always consistent with the latest geometry.

use std::collections::BTreeMap;

use guidepost_core::mask::MaskCutout;
use guidepost_core::reducer::GeometryState;

use crate::config::{TourHooks, TourOptions};
use crate::navigator::Navigator;
use crate::step::{ContentContext, Step};

/// Base class of the helper box.
pub const HELPER_CLASS: &str = "guidepost__helper";
/// Class added to the helper while the tour is open.
pub const HELPER_OPEN_CLASS: &str = "guidepost__helper--is-open";
/// Base class of the mask.
pub const MASK_CLASS: &str = "guidepost__mask";
/// Class of the element that blocks interaction with the highlight.
pub const MASK_BLOCKER_CLASS: &str = "guidepost__mask--disable-interaction";
/// Base class of a navigation dot.
pub const DOT_CLASS: &str = "guidepost__dot";
/// Class of the active navigation dot.
pub const DOT_ACTIVE_CLASS: &str = "guidepost__dot--is-active";

/// Everything the mask renderer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskView {
    /// Hole around the target.
    pub cutout: MaskCutout,
    /// Classes of the mask.
    pub class_names: Vec<String>,
    /// Classes of the interaction blocker over the hole.
    pub blocker_class_names: Vec<String>,
    /// Whether clicks on the highlighted target are blocked.
    pub interaction_blocked: bool,
}

/// What a button does when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    /// Previous step.
    Previous,
    /// Next step.
    Next,
    /// Close the tour from the last step.
    Finish,
}

/// A previous/next button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonView {
    /// Custom label; renderers draw an arrow when absent.
    pub label: Option<String>,
    /// Whether the button is disabled.
    pub disabled: bool,
    /// Action on press.
    pub action: ButtonAction,
}

/// A navigation dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotView {
    /// Step this dot jumps to.
    pub index: usize,
    /// Whether this is the current step.
    pub active: bool,
    /// Whether clicking does nothing.
    pub disabled: bool,
    /// Number printed inside the dot.
    pub label: Option<String>,
    /// Classes of the dot.
    pub class_names: Vec<String>,
}

/// Everything the helper box renderer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CalloutView {
    /// Current step (0-based).
    pub current: usize,
    /// Number of steps.
    pub total: usize,
    /// Resolved content.
    pub content: Option<String>,
    /// Badge text, when the badge is shown.
    pub badge: Option<String>,
    /// Previous button, when buttons are shown.
    pub prev: Option<ButtonView>,
    /// Next button, when buttons are shown.
    pub next: Option<ButtonView>,
    /// Dots, empty when dot navigation is hidden.
    pub dots: Vec<DotView>,
    /// Classes of the helper box.
    pub class_names: Vec<String>,
    /// Accent colour.
    pub accent_color: String,
    /// Corner radius.
    pub rounded: f64,
    /// Whether the renderer should apply its default styles.
    pub default_styles: bool,
    /// Per-step style overrides.
    pub style: BTreeMap<String, String>,
}

/// Build the mask view for the current step.
pub fn mask_view<N>(geometry: &GeometryState, step: &Step<N>, options: &TourOptions) -> MaskView {
    let interaction_blocked = step
        .interaction
        .map_or(options.disable_interaction, |allowed| !allowed);

    let mut class_names = vec![MASK_CLASS.to_string()];
    class_names.extend(options.mask_class.clone());

    let mut blocker_class_names = vec![MASK_BLOCKER_CLASS.to_string()];
    blocker_class_names.extend(options.highlighted_mask_class.clone());

    MaskView {
        cutout: MaskCutout::from_state(geometry, options.mask_padding, options.rounded),
        class_names,
        blocker_class_names,
        interaction_blocked,
    }
}

/// Build the callout view for the current step.
pub fn callout_view<N>(
    nav: &Navigator,
    steps: &[Step<N>],
    geometry: &GeometryState,
    options: &TourOptions,
    hooks: &TourHooks,
) -> Option<CalloutView> {
    let current = nav.current();
    let total = nav.len();
    let step = steps.get(current)?;

    let content = step.content.resolve(&ContentContext {
        step: current + 1,
        total,
        in_dom: geometry.found,
    });

    let badge = options.show_badge.then(|| match &hooks.badge {
        Some(badge) => badge(current + 1, total),
        None => (current + 1).to_string(),
    });

    let (prev, next) = if options.show_buttons {
        let prev = ButtonView {
            label: options.prev_label.clone(),
            disabled: nav.is_first(),
            action: ButtonAction::Previous,
        };
        let next = match (&options.last_step_label, nav.is_last()) {
            (Some(label), true) => ButtonView {
                label: Some(label.clone()),
                disabled: false,
                action: ButtonAction::Finish,
            },
            (_, is_last) => ButtonView {
                label: options.next_label.clone(),
                disabled: is_last,
                action: ButtonAction::Next,
            },
        };
        (Some(prev), Some(next))
    } else {
        (None, None)
    };

    let dots = if options.show_navigation {
        (0..total)
            .map(|index| {
                let active = index == current;
                let mut class_names = vec![DOT_CLASS.to_string()];
                if active {
                    class_names.push(DOT_ACTIVE_CLASS.to_string());
                }
                DotView {
                    index,
                    active,
                    disabled: active || options.disable_dots_navigation,
                    label: options
                        .show_navigation_number
                        .then(|| (index + 1).to_string()),
                    class_names,
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    let mut class_names = vec![HELPER_CLASS.to_string()];
    class_names.extend(options.helper_class.clone());
    if nav.is_open() {
        class_names.push(HELPER_OPEN_CLASS.to_string());
    }

    Some(CalloutView {
        current,
        total,
        content,
        badge,
        prev,
        next,
        dots,
        class_names,
        accent_color: options.accent_color.clone(),
        rounded: options.rounded,
        default_styles: !options.custom_helper,
        style: step.style.clone(),
    })
}
