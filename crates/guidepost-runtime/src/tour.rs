#![forbid(unsafe_code)]

//! The tour session.
//!
//! [`Tour`] owns the steps, the navigator, the current geometry and every
//! piece of deferred work (pipeline runs, scroll animation, resize debounce,
//! mutation settle timers). The host feeds it inputs (`open`, `next`,
//! `handle_key`, `on_resize`, `on_mutation`, ...) and calls [`Tour::tick`]
//! regularly, typically once per animation frame. Renderers read
//! [`Tour::mask`], [`Tour::callout`] and [`Tour::helper_box`]; listeners
//! drain [`TourEvent`]s.
//!
//! # Invariants
//!
//! 1. At most one pipeline run is live. Starting a run drops the previous
//!    run's pending hook and cancels its scroll.
//! 2. Deferred work tagged with an older [`Generation`] never touches the
//!    geometry.
//! 3. Geometry updates always go through the reducer; nothing else writes
//!    [`GeometryState`].
//! 4. Closing tears down every observer and timer; nothing fires after
//!    [`TourEvent::Closed`].
//!
//! # Failure Modes
//!
//! - A missing target is not an error: the reducer's fallback geometry is
//!   applied and the run continues.
//! - A failing hook halts its run and is reported as
//!   [`TourEvent::HookFailed`] plus a `warn!` on `guidepost.pipeline`.
//!   A scroll already started for the step still lands and applies its
//!   geometry.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use guidepost_core::event::KeyEvent;
use guidepost_core::geometry::{NodeRect, Viewport};
use guidepost_core::keyboard::{KeyResponse, NavCommand};
use guidepost_core::placement::{HelperBox, Placement, resolve_helper_box};
use guidepost_core::reducer::{GeometryAction, GeometryState, TargetFound};
use guidepost_core::visibility::in_view;
use tracing::{debug, info, trace, warn};

use crate::config::{TourConfig, TourHooks, TourOptions};
use crate::environment::{Environment, ScrollContext};
use crate::error::TourError;
use crate::hooks::{HookError, HookFuture, HookKind};
use crate::navigator::{CloseReason, NavReason, Navigator, StepChange};
use crate::pipeline::{Generation, HookPoll, PipelineRun, Stage};
use crate::scroll::{ScrollAnimation, scroll_destination, scroll_offset};
use crate::step::Step;
use crate::view::{ButtonAction, CalloutView, MaskView, callout_view, mask_view};
use crate::watcher::{MutationRecord, MutationWatcher, ResizeDebouncer};

/// What produced a geometry update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryCause {
    /// Centred placeholder dispatched while a pre-action runs.
    Provisional,
    /// Target measured in view.
    Measured,
    /// Target measured after scrolling into view.
    Scrolled,
    /// Target missing; fallback geometry.
    NotFound,
    /// Inserted node re-measured after mutations settled.
    Mutation,
}

/// Notification emitted by a [`Tour`].
#[derive(Debug, Clone)]
pub enum TourEvent {
    /// The tour opened at `index`.
    Opened {
        /// Step shown first.
        index: usize,
    },
    /// The current step changed.
    StepChanged {
        /// Previous index.
        from: usize,
        /// New index.
        to: usize,
        /// What caused it.
        reason: NavReason,
    },
    /// New geometry was applied.
    GeometryUpdated {
        /// Step the geometry belongs to.
        index: usize,
        /// Where it came from.
        cause: GeometryCause,
        /// Whether a target is highlighted.
        found: bool,
    },
    /// A scroll animation started.
    ScrollStarted {
        /// Step being scrolled to.
        index: usize,
        /// Start offset.
        from: f64,
        /// Destination offset.
        to: f64,
    },
    /// A scroll animation landed.
    ScrollFinished {
        /// Step scrolled to.
        index: usize,
    },
    /// A pipeline run completed.
    StepShown {
        /// Step shown.
        index: usize,
    },
    /// A hook failed and halted its run.
    HookFailed {
        /// Step of the halted run.
        index: usize,
        /// Hook that failed.
        hook: HookKind,
        /// Error it returned.
        error: HookError,
    },
    /// Closing was requested.
    CloseRequested {
        /// Why.
        reason: CloseReason,
    },
    /// The tour closed.
    Closed {
        /// Step that was showing.
        index: usize,
    },
}

/// A guided tour bound to a host environment.
pub struct Tour<E: Environment> {
    env: E,
    steps: Vec<Step<E::Node>>,
    options: TourOptions,
    hooks: TourHooks,
    nav: Navigator,
    geometry: GeometryState,
    generation: Generation,
    run: Option<PipelineRun<E::Node>>,
    scroll: Option<ScrollAnimation<E::Node>>,
    resize: ResizeDebouncer,
    watcher: MutationWatcher<E::Node>,
    events: VecDeque<TourEvent>,
}

impl<E: Environment> Tour<E> {
    /// Create a closed tour.
    ///
    /// Fails when there are no steps or the options are invalid.
    pub fn new(env: E, config: TourConfig<E::Node>) -> Result<Self, TourError> {
        let TourConfig {
            options,
            steps,
            hooks,
        } = config;
        let nav = Navigator::new(steps.len())?;

        let mut errors = options.validate();
        if let Some(start) = options.start_at
            && start >= steps.len()
        {
            errors.push(format!(
                "start_at {start} is out of range for {} steps",
                steps.len()
            ));
        }
        if !errors.is_empty() {
            return Err(TourError::InvalidOptions(errors));
        }

        let resize = ResizeDebouncer::new(options.resize_debounce());
        let watcher = MutationWatcher::new(options.mutation_settle());
        Ok(Self {
            env,
            steps,
            options,
            hooks,
            nav,
            geometry: GeometryState::BASELINE,
            generation: Generation::default(),
            run: None,
            scroll: None,
            resize,
            watcher,
            events: VecDeque::new(),
        })
    }

    // --- lifecycle ---------------------------------------------------------

    /// Open the tour and show the starting step.
    ///
    /// Starts at `start_at` when configured, otherwise where the previous
    /// session left off. Opening an open tour does nothing.
    pub fn open(&mut self) -> Result<(), TourError> {
        if self.nav.is_open() {
            return Ok(());
        }
        let index = self.nav.open(self.options.start_at)?;
        info!(target: "guidepost.tour", index, steps = self.nav.len(), "tour opened");
        self.events.push_back(TourEvent::Opened { index });
        self.env.set_focus_trap(true);
        self.show_step(index);
        self.env.focus_helper();
        if let Some(after_open) = &self.hooks.after_open {
            after_open();
        }
        Ok(())
    }

    /// Close the tour.
    pub fn close(&mut self) {
        self.close_with(CloseReason::Api);
    }

    /// Close the tour from the finish button.
    pub fn finish(&mut self) {
        self.close_with(CloseReason::Finish);
    }

    fn close_with(&mut self, reason: CloseReason) {
        if !self.nav.is_open() {
            return;
        }
        if let Some(before_close) = &self.hooks.before_close {
            before_close();
        }
        if let Some(request_close) = &self.hooks.request_close {
            request_close(reason);
        }
        self.events.push_back(TourEvent::CloseRequested { reason });

        let index = self.nav.current();
        self.nav.close(self.options.rewind_on_close);
        self.teardown();
        self.geometry.reset();
        info!(target: "guidepost.tour", %reason, index, "tour closed");
        self.events.push_back(TourEvent::Closed { index });
    }

    fn teardown(&mut self) {
        self.generation = self.generation.next();
        if let Some(run) = self.run.take() {
            debug!(
                target: "guidepost.pipeline",
                generation = run.generation().get(),
                index = run.index(),
                "pipeline run cancelled"
            );
        }
        if self.scroll.take().is_some() {
            debug!(target: "guidepost.scroll", "scroll cancelled");
        }
        self.resize.cancel();
        if self.watcher.is_observing() {
            self.env.disconnect_mutations();
        }
        self.watcher.disconnect();
        self.env.set_focus_trap(false);
    }

    // --- navigation --------------------------------------------------------

    /// Advance one step. Returns `false` on the last step or while closed.
    pub fn next(&mut self) -> bool {
        let change = self.nav.next();
        self.apply_change(change)
    }

    /// Go back one step. Returns `false` on the first step or while closed.
    pub fn previous(&mut self) -> bool {
        let change = self.nav.previous();
        self.apply_change(change)
    }

    /// Jump to `index`.
    ///
    /// Returns whether the step changed; jumping to the current step or
    /// while closed is a no-op.
    pub fn go_to(&mut self, index: usize) -> Result<bool, TourError> {
        let change = self.nav.go_to(index)?;
        Ok(self.apply_change(change))
    }

    /// Re-run the pipeline for the current step.
    pub fn refresh(&mut self) {
        if self.nav.is_open() {
            self.show_step(self.nav.current());
        }
    }

    fn apply_change(&mut self, change: Option<StepChange>) -> bool {
        let Some(StepChange { from, to, reason }) = change else {
            return false;
        };
        self.events
            .push_back(TourEvent::StepChanged { from, to, reason });
        self.show_step(to);
        true
    }

    // --- inputs ------------------------------------------------------------

    /// Handle a key press.
    ///
    /// Escape closes, the arrows navigate. Keys disabled by the options, and
    /// every key while closed, are ignored.
    pub fn handle_key(&mut self, event: &KeyEvent) -> KeyResponse {
        if !self.nav.is_open() {
            return KeyResponse::Ignored;
        }
        let Some(command) = self.options.keyboard.command_for(event) else {
            return KeyResponse::Ignored;
        };
        trace!(target: "guidepost.tour", ?command, "key command");
        match command {
            NavCommand::Close => self.close_with(CloseReason::Keyboard),
            NavCommand::Next => {
                self.next();
            }
            NavCommand::Previous => {
                self.previous();
            }
        }
        KeyResponse::Consumed
    }

    /// Handle a press of a callout button.
    pub fn press(&mut self, action: ButtonAction) {
        match action {
            ButtonAction::Previous => {
                self.previous();
            }
            ButtonAction::Next => {
                self.next();
            }
            ButtonAction::Finish => self.finish(),
        }
    }

    /// Handle a click on navigation dot `index`.
    pub fn select_dot(&mut self, index: usize) -> Result<bool, TourError> {
        if self.options.disable_dots_navigation {
            return Ok(false);
        }
        self.go_to(index)
    }

    /// Handle a click on the mask.
    ///
    /// `on_highlight` is true when the click landed on the interaction
    /// blocker over the highlighted target. Returns whether the tour
    /// closed.
    pub fn on_mask_click(&mut self, on_highlight: bool) -> bool {
        if !self.nav.is_open() || !self.options.close_with_mask || on_highlight {
            return false;
        }
        self.close_with(CloseReason::Mask);
        true
    }

    /// The viewport was resized. The current step is re-shown once resizes
    /// have been quiet for the debounce delay.
    pub fn on_resize(&mut self) {
        if !self.nav.is_open() {
            return;
        }
        let now = self.env.now();
        self.resize.notify(now);
        trace!(target: "guidepost.watch", "resize noted");
    }

    /// A mutation record arrived from the observed subtree.
    pub fn on_mutation(&mut self, record: &MutationRecord<E::Node>) {
        if !self.nav.is_open() {
            debug!(target: "guidepost.watch", "mutation while closed, disconnecting");
            self.env.disconnect_mutations();
            self.watcher.disconnect();
            return;
        }
        let now = self.env.now();
        if self.watcher.record(record, self.generation, now) {
            debug!(
                target: "guidepost.watch",
                pending = self.watcher.pending(),
                "settle timer scheduled"
            );
        }
    }

    /// Advance time-driven work: scroll animation, resize debounce, settle
    /// timers and pending hooks.
    pub fn tick(&mut self) {
        let now = self.env.now();
        self.advance_scroll(now);
        if self.resize.poll(now) && self.nav.is_open() {
            debug!(target: "guidepost.watch", index = self.nav.current(), "resize settled");
            self.show_step(self.nav.current());
        }
        self.fire_settle_timers(now);
        self.drive();
    }

    // --- pipeline ----------------------------------------------------------

    fn show_step(&mut self, index: usize) {
        self.generation = self.generation.next();
        let generation = self.generation;
        if let Some(old) = self.run.take() {
            debug!(
                target: "guidepost.pipeline",
                superseded = old.generation().get(),
                index = old.index(),
                "pipeline run superseded"
            );
        }
        if let Some(old) = self.scroll.take() {
            debug!(
                target: "guidepost.scroll",
                generation = old.generation().get(),
                "scroll cancelled"
            );
        }

        let run = PipelineRun::new(generation, index);
        {
            let _guard = run.span().enter();
            debug!(target: "guidepost.pipeline", "showing step");
            if self.steps[index].before.is_present() {
                self.dispatch_provisional(index);
            }
        }
        self.run = Some(run);
        self.drive();
    }

    /// Centred placeholder so the callout does not point at the previous
    /// target while the pre-action runs.
    fn dispatch_provisional(&mut self, index: usize) {
        let viewport = self.env.viewport();
        let padding = self.options.mask_padding;
        let rounded = self.options.rounded;
        let rect = NodeRect::new(
            viewport.center_x() - rounded,
            viewport.center_y() - rounded,
            -2.0 * padding,
            -2.0 * padding,
        );
        let action = GeometryAction::TargetFound(TargetFound {
            rect,
            viewport,
            helper: self.env.helper_size(),
            placement: Placement::Center,
        });
        self.apply_geometry(index, GeometryCause::Provisional, action);
    }

    fn drive(&mut self) {
        loop {
            let Some(run) = self.run.as_mut() else {
                return;
            };
            let span = run.span().clone();
            let _guard = span.enter();

            match run.poll_pending() {
                HookPoll::Pending => return,
                HookPoll::Failed(hook, error) => {
                    self.fail_run(hook, error);
                    return;
                }
                HookPoll::Idle => {}
            }

            let (stage, index, generation) = (run.stage(), run.index(), run.generation());
            match stage {
                Stage::StepBefore => {
                    let args = self.steps[index].hook_args(index, self.hooks.params.as_ref());
                    let hook = self.steps[index]
                        .before
                        .invoke(args)
                        .map(|f| (HookKind::StepBefore, f));
                    self.advance_run(Stage::TourBefore, hook);
                }
                Stage::TourBefore => {
                    let args = self.steps[index].hook_args(index, self.hooks.params.as_ref());
                    let hook = self
                        .hooks
                        .before_step
                        .invoke(args)
                        .map(|f| (HookKind::TourBefore, f));
                    self.advance_run(Stage::Locate, hook);
                }
                Stage::Locate => {
                    let node = self.locate(generation, index);
                    if let Some(run) = self.run.as_mut() {
                        run.set_node(node);
                    }
                    self.advance_run(Stage::Action, None);
                }
                Stage::Action => {
                    let node = self.run.as_ref().and_then(|run| run.node().cloned());
                    let hook = self.steps[index]
                        .action
                        .invoke(node)
                        .map(|f| (HookKind::Action, f));
                    self.advance_run(Stage::AfterStep, hook);
                }
                Stage::AfterStep => {
                    let args = self.steps[index].hook_args(index, self.hooks.params.as_ref());
                    let hook = self
                        .hooks
                        .after_step
                        .invoke(args)
                        .map(|f| (HookKind::AfterStep, f));
                    self.advance_run(Stage::Done, hook);
                }
                Stage::Done => {
                    debug!(target: "guidepost.pipeline", "step shown");
                    self.run = None;
                    self.events.push_back(TourEvent::StepShown { index });
                    return;
                }
            }
        }
    }

    fn advance_run(&mut self, stage: Stage, hook: Option<(HookKind, HookFuture)>) {
        if let Some(run) = self.run.as_mut() {
            if let Some((kind, _)) = &hook {
                trace!(target: "guidepost.pipeline", hook = %kind, "awaiting hook");
            }
            run.advance(stage, hook);
        }
    }

    fn fail_run(&mut self, hook: HookKind, error: HookError) {
        let Some(run) = self.run.take() else {
            return;
        };
        let index = run.index();
        warn!(
            target: "guidepost.pipeline",
            index,
            generation = run.generation().get(),
            %hook,
            %error,
            "hook failed, step halted"
        );
        // Pre-hooks fail before the target is located. Anything later has
        // already started the scroll for this step; let it land.
        let located = !matches!(hook, HookKind::StepBefore | HookKind::TourBefore);
        if !located
            && self
                .scroll
                .as_ref()
                .is_some_and(|scroll| scroll.generation() == run.generation())
        {
            self.scroll = None;
        }
        self.events
            .push_back(TourEvent::HookFailed { index, hook, error });
    }

    fn locate(&mut self, generation: Generation, index: usize) -> Option<E::Node> {
        let step = &self.steps[index];
        let placement = step.placement;
        let root = step
            .observe
            .as_deref()
            .and_then(|selector| self.env.query_selector(selector));
        let node = step
            .selector
            .as_deref()
            .and_then(|selector| self.env.query_selector(selector));
        self.observe(root);

        let viewport = self.env.viewport();
        let Some(node) = node else {
            debug!(target: "guidepost.pipeline", ?placement, "target not found");
            self.apply_geometry(
                index,
                GeometryCause::NotFound,
                GeometryAction::TargetNotFound {
                    viewport,
                    requested: placement,
                },
            );
            return None;
        };

        let rect = self.env.node_rect(&node);
        if in_view(&rect, viewport, self.options.in_view_threshold) {
            self.apply_measured(index, rect, GeometryCause::Measured);
        } else {
            self.start_scroll(generation, index, &node, rect, viewport);
        }
        Some(node)
    }

    fn observe(&mut self, root: Option<E::Node>) {
        match root {
            Some(root) => {
                if self.watcher.is_observing() {
                    self.env.disconnect_mutations();
                }
                debug!(target: "guidepost.watch", ?root, "observing mutations");
                self.env.observe_mutations(&root);
                self.watcher.observe(root);
            }
            None if self.watcher.is_observing() => {
                debug!(target: "guidepost.watch", "no subtree to observe, disconnecting");
                self.env.disconnect_mutations();
                self.watcher.disconnect();
            }
            None => {}
        }
    }

    // --- scrolling ---------------------------------------------------------

    fn start_scroll(
        &mut self,
        generation: Generation,
        index: usize,
        node: &E::Node,
        rect: NodeRect,
        viewport: Viewport,
    ) {
        let context = self.env.scroll_parent(node);
        let offset = scroll_offset(self.options.scroll_offset, rect.height, viewport.height);
        let anchor = match &context {
            ScrollContext::Window => 0.0,
            ScrollContext::Element(container) => self.env.node_rect(container).top,
        };
        let from = self.env.scroll_position(&context);
        let to = scroll_destination(from, rect.top, anchor, offset);
        debug!(target: "guidepost.scroll", index, from, to, offset, "scrolling target into view");
        self.events
            .push_back(TourEvent::ScrollStarted { index, from, to });

        let now = self.env.now();
        self.scroll = Some(ScrollAnimation::new(
            generation,
            index,
            node.clone(),
            context,
            from,
            to,
            now,
            self.options.scroll_duration(),
        ));
        self.advance_scroll(now);
    }

    fn advance_scroll(&mut self, now: Duration) {
        let Some(frame) = self.scroll.as_mut().and_then(|anim| anim.sample(now)) else {
            self.scroll = None;
            return;
        };
        let Some(anim) = self.scroll.as_ref() else {
            return;
        };
        self.env.set_scroll_position(anim.context(), frame.position);
        trace!(target: "guidepost.scroll", position = frame.position, done = frame.done, "scroll frame");
        if !frame.done {
            return;
        }

        let Some(anim) = self.scroll.take() else {
            return;
        };
        if anim.generation() != self.generation {
            debug!(
                target: "guidepost.scroll",
                generation = anim.generation().get(),
                "stale scroll completion dropped"
            );
            return;
        }
        let rect = self.env.node_rect(anim.node());
        self.events
            .push_back(TourEvent::ScrollFinished { index: anim.index() });
        self.apply_measured(anim.index(), rect, GeometryCause::Scrolled);
    }

    // --- watchers ----------------------------------------------------------

    fn fire_settle_timers(&mut self, now: Duration) {
        for timer in self.watcher.take_due(now) {
            if !self.nav.is_open() || timer.generation != self.generation {
                debug!(
                    target: "guidepost.watch",
                    generation = timer.generation.get(),
                    "stale settle timer dropped"
                );
                continue;
            }
            debug!(target: "guidepost.watch", node = ?timer.node, "mutations settled, re-measuring");
            let rect = self.env.node_rect(&timer.node);
            self.apply_measured(self.nav.current(), rect, GeometryCause::Mutation);
        }
    }

    // --- geometry ----------------------------------------------------------

    fn apply_measured(&mut self, index: usize, rect: NodeRect, cause: GeometryCause) {
        let action = GeometryAction::TargetFound(TargetFound {
            rect,
            viewport: self.env.viewport(),
            helper: self.env.helper_size(),
            placement: self.steps[index].placement,
        });
        self.apply_geometry(index, cause, action);
    }

    fn apply_geometry(&mut self, index: usize, cause: GeometryCause, action: GeometryAction) {
        self.geometry.apply(action);
        trace!(
            target: "guidepost.geometry",
            index,
            ?cause,
            found = self.geometry.found,
            top = self.geometry.target.top,
            left = self.geometry.target.left,
            "geometry applied"
        );
        self.events.push_back(TourEvent::GeometryUpdated {
            index,
            cause,
            found: self.geometry.found,
        });
    }

    // --- accessors ---------------------------------------------------------

    /// Latest geometry.
    pub fn geometry(&self) -> &GeometryState {
        &self.geometry
    }

    /// Current step index.
    pub fn current(&self) -> usize {
        self.nav.current()
    }

    /// Step index before the last change.
    pub fn previous_index(&self) -> usize {
        self.nav.previous_index()
    }

    /// Number of steps.
    pub fn step_count(&self) -> usize {
        self.nav.len()
    }

    /// Whether the tour is open.
    pub fn is_open(&self) -> bool {
        self.nav.is_open()
    }

    /// Current step definition.
    pub fn current_step(&self) -> &Step<E::Node> {
        &self.steps[self.nav.current()]
    }

    /// All steps.
    pub fn steps(&self) -> &[Step<E::Node>] {
        &self.steps
    }

    /// Options in effect.
    pub fn options(&self) -> &TourOptions {
        &self.options
    }

    /// Generation of the latest pipeline run.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether a pipeline run is in flight.
    pub fn is_busy(&self) -> bool {
        self.run.is_some()
    }

    /// Hook the in-flight run is waiting on.
    pub fn waiting_on(&self) -> Option<HookKind> {
        self.run.as_ref().and_then(PipelineRun::waiting_on)
    }

    /// Whether a scroll animation is running.
    pub fn is_scrolling(&self) -> bool {
        self.scroll.is_some()
    }

    /// Host environment.
    pub fn environment(&self) -> &E {
        &self.env
    }

    /// Mutable host environment.
    pub fn environment_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Mask view, while open.
    pub fn mask(&self) -> Option<MaskView> {
        self.nav
            .is_open()
            .then(|| mask_view(&self.geometry, self.current_step(), &self.options))
    }

    /// Callout view, while open.
    pub fn callout(&self) -> Option<CalloutView> {
        if !self.nav.is_open() {
            return None;
        }
        callout_view(&self.nav, &self.steps, &self.geometry, &self.options, &self.hooks)
    }

    /// Helper box position, while open.
    pub fn helper_box(&self) -> Option<HelperBox> {
        self.nav.is_open().then(|| {
            resolve_helper_box(&self.geometry, self.options.mask_padding, self.options.helper_gap)
        })
    }

    /// Take every event emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<TourEvent> {
        self.events.drain(..).collect()
    }

    /// Give the environment back.
    pub fn into_environment(self) -> E {
        self.env
    }
}

impl<E> fmt::Debug for Tour<E>
where
    E: Environment + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tour")
            .field("env", &self.env)
            .field("nav", &self.nav)
            .field("geometry", &self.geometry)
            .field("generation", &self.generation)
            .field("run", &self.run)
            .field("scroll", &self.scroll)
            .field("pending_events", &self.events.len())
            .finish_non_exhaustive()
    }
}
