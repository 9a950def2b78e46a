#![forbid(unsafe_code)]

//! End-to-end tour scenarios against the in-memory environment.
//!
//! Each test drives a [`Tour`] the way a host would: inputs, then `tick`
//! calls with the fake clock advanced in between, and checks the geometry
//! and the emitted events.
//!
//! Run:
//!   cargo test -p guidepost --test e2e_tour_scenarios

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use futures::channel::oneshot;
use guidepost::runtime::testing::{FakeEnvironment, FakeNode};
use guidepost::{
    CloseReason, GeometryCause, Hook, HookError, HookKind, KeyCode, KeyEvent, KeyResponse,
    KeyboardNavigation, MutationRecord, NavKeys, NodeRect, Placement, Size, Step, Tour,
    TourConfig, TourError, TourEvent, TourHooks, TourOptions, Viewport,
};
use pretty_assertions::assert_eq;

// ============================================================================
// Helpers
// ============================================================================

const VIEWPORT: Viewport = Viewport::new(1024.0, 600.0);
const HELPER: Size = Size::new(300.0, 120.0);

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn page() -> FakeEnvironment {
    FakeEnvironment::new(VIEWPORT).with_helper(HELPER)
}

fn build(env: FakeEnvironment, steps: Vec<Step<FakeNode>>, options: TourOptions) -> Tour<FakeEnvironment> {
    Tour::new(env, TourConfig::new(steps).options(options)).expect("valid tour")
}

/// Advance the clock and tick.
fn step_time(tour: &mut Tour<FakeEnvironment>, dt: Duration) {
    tour.environment_mut().advance(dt);
    tour.tick();
}

fn geometry_causes(events: &[TourEvent]) -> Vec<GeometryCause> {
    events
        .iter()
        .filter_map(|event| match event {
            TourEvent::GeometryUpdated { cause, .. } => Some(*cause),
            _ => None,
        })
        .collect()
}

/// Hook that waits until the returned sender fires (or is dropped).
fn gated_hook<A: 'static>() -> (Hook<A>, oneshot::Sender<()>) {
    let (tx, rx) = oneshot::channel::<()>();
    let slot = Rc::new(RefCell::new(Some(rx)));
    let hook = Hook::new(move |_: A| {
        let rx = slot.borrow_mut().take();
        async move {
            match rx {
                Some(rx) => rx.await.map_err(|_| HookError::new("gate dropped")),
                None => Ok(()),
            }
        }
    });
    (hook, tx)
}

// ============================================================================
// Missing targets
// ============================================================================

#[test]
fn missing_target_uses_centred_fallback() {
    let mut env = page();
    env.add("#first", NodeRect::new(40.0, 80.0, 200.0, 40.0));
    env.add("#third", NodeRect::new(40.0, 200.0, 200.0, 40.0));
    let mut tour = build(
        env,
        vec![
            Step::targeting("#first").placement(Placement::Bottom),
            Step::targeting("#missing")
                .placement(Placement::Right)
                .render(|cx| format!("{} of {}, in dom: {}", cx.step, cx.total, cx.in_dom)),
            Step::targeting("#third"),
        ],
        TourOptions::default(),
    );

    tour.open().unwrap();
    assert!(tour.geometry().found);
    assert_eq!(tour.geometry().target, NodeRect::new(40.0, 80.0, 200.0, 40.0));
    assert_eq!(tour.geometry().helper, HELPER);

    assert!(tour.next());
    let g = *tour.geometry();
    assert!(!g.found);
    assert_eq!(g.target.top, 610.0);
    assert_eq!(g.target.right, 521.0);
    assert_eq!(g.target.bottom, 309.0);
    assert_eq!(g.target.left, 512.0 - 150.0);
    assert_eq!((g.target.width, g.target.height), (0.0, 0.0));
    assert_eq!(g.placement, Placement::Center);
    assert_eq!(g.viewport, VIEWPORT);

    let callout = tour.callout().unwrap();
    assert_eq!(callout.content.as_deref(), Some("2 of 3, in dom: false"));

    let events = tour.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        TourEvent::GeometryUpdated {
            index: 1,
            cause: GeometryCause::NotFound,
            found: false
        }
    )));
    assert!(matches!(events.last(), Some(TourEvent::StepShown { index: 1 })));

    assert!(tour.next());
    assert!(tour.geometry().found);
    assert_eq!(tour.geometry().target.top, 200.0);
}

#[test]
fn step_without_selector_is_centred() {
    let mut tour = build(page(), vec![Step::new().text("Welcome")], TourOptions::default());
    tour.open().unwrap();
    assert!(!tour.geometry().found);
    assert_eq!(tour.geometry().target.left, 512.0);
    let mask = tour.mask().unwrap();
    assert_eq!((mask.cutout.width, mask.cutout.height), (20.0, 20.0));
}

// ============================================================================
// Scrolling
// ============================================================================

#[test]
fn tall_target_scrolls_with_fixed_offset() {
    let mut env = page();
    env.add("#top", NodeRect::new(0.0, 0.0, 100.0, 40.0));
    env.add("#tall", NodeRect::new(0.0, 1500.0, 600.0, 800.0));
    let mut tour = build(
        env,
        vec![Step::targeting("#top"), Step::targeting("#tall")],
        TourOptions::default().with_scroll_duration(ms(300)),
    );
    tour.open().unwrap();
    tour.drain_events();

    tour.next();
    let events = tour.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        TourEvent::ScrollStarted { index: 1, from, to } if *from == 0.0 && *to == 1475.0
    )));
    assert!(tour.is_scrolling());
    // Geometry is not applied until the scroll lands.
    assert_eq!(tour.geometry().target.top, 0.0);

    step_time(&mut tour, ms(150));
    assert_eq!(tour.environment().window_scroll(), 737.5);
    assert!(tour.is_scrolling());

    step_time(&mut tour, ms(150));
    assert!(!tour.is_scrolling());
    assert_eq!(tour.environment().window_scroll(), 1475.0);
    assert_eq!(tour.geometry().target.top, 25.0);
    assert!(tour.geometry().found);

    let events = tour.drain_events();
    assert!(events.iter().any(|e| matches!(e, TourEvent::ScrollFinished { index: 1 })));
    assert_eq!(geometry_causes(&events), vec![GeometryCause::Scrolled]);
}

#[test]
fn short_target_is_centred_in_viewport() {
    let mut env = page();
    env.add("#low", NodeRect::new(0.0, 2000.0, 100.0, 100.0));
    let mut tour = build(env, vec![Step::targeting("#low")], TourOptions::default());
    tour.open().unwrap();
    step_time(&mut tour, ms(1));
    // 2000 - 300 + 50
    assert_eq!(tour.environment().window_scroll(), 1750.0);
    assert_eq!(tour.geometry().target.top, 250.0);
}

#[test]
fn explicit_offset_overrides_heuristics() {
    let mut env = page();
    env.add("#low", NodeRect::new(0.0, 2000.0, 100.0, 100.0));
    let mut tour = build(
        env,
        vec![Step::targeting("#low")],
        TourOptions::default().with_scroll_offset(-40.0),
    );
    tour.open().unwrap();
    step_time(&mut tour, ms(1));
    assert_eq!(tour.environment().window_scroll(), 1960.0);
    assert_eq!(tour.geometry().target.top, 40.0);
}

#[test]
fn target_in_scrollable_panel_scrolls_the_panel() {
    let mut env = page();
    let panel = env.add("#panel", NodeRect::new(0.0, 50.0, 400.0, 300.0));
    env.add_in(panel, "#row", NodeRect::new(10.0, 900.0, 380.0, 40.0));
    let mut tour = build(env, vec![Step::targeting("#row")], TourOptions::default());
    tour.open().unwrap();
    step_time(&mut tour, ms(1));

    assert_eq!(tour.environment().window_scroll(), 0.0);
    // (950 - 50) - 300 + 20
    assert_eq!(tour.environment().scroll_top(panel), 620.0);
    assert_eq!(tour.geometry().target.top, 330.0);
    assert_eq!(tour.geometry().target.left, 10.0);
}

#[test]
fn partially_visible_target_respects_threshold() {
    let mut env = page();
    env.add("#edge", NodeRect::new(0.0, 500.0, 100.0, 200.0));

    let mut strict = build(env.clone(), vec![Step::targeting("#edge")], TourOptions::default());
    strict.open().unwrap();
    assert!(strict.is_scrolling());

    let mut lenient = build(
        env,
        vec![Step::targeting("#edge")],
        TourOptions::default().with_in_view_threshold(0.5),
    );
    lenient.open().unwrap();
    assert!(!lenient.is_scrolling());
    assert_eq!(lenient.geometry().target.top, 500.0);
}

#[test]
fn stale_scroll_completion_is_dropped() {
    let mut env = page();
    env.add("#far", NodeRect::new(0.0, 3000.0, 100.0, 40.0));
    let mut tour = build(
        env,
        vec![Step::new().text("Welcome"), Step::targeting("#far")],
        TourOptions::default().with_scroll_duration(ms(200)),
    );
    tour.open().unwrap();
    tour.go_to(1).unwrap();
    assert!(tour.is_scrolling());
    step_time(&mut tour, ms(50));
    let mid_scroll = tour.environment().window_scroll();
    assert!(mid_scroll > 0.0);

    tour.go_to(0).unwrap();
    tour.drain_events();
    assert!(!tour.is_scrolling());
    step_time(&mut tour, ms(500));

    assert_eq!(tour.environment().window_scroll(), mid_scroll);
    assert_eq!(tour.current(), 0);
    assert!(!tour.geometry().found);
    let events = tour.drain_events();
    assert!(!events.iter().any(|e| matches!(e, TourEvent::ScrollFinished { .. })));
    assert!(geometry_causes(&events).is_empty());
}

// ============================================================================
// Re-observation
// ============================================================================

#[test]
fn added_nodes_are_remeasured_after_settle_delay() {
    let mut env = page();
    let list = env.add("#list", NodeRect::new(20.0, 100.0, 300.0, 200.0));
    let mut tour = build(
        env,
        vec![Step::targeting("#list").observe("#list")],
        TourOptions::default(),
    );
    tour.open().unwrap();
    assert_eq!(tour.environment().observed(), Some(list));
    tour.drain_events();

    let item = tour
        .environment_mut()
        .add_anonymous(NodeRect::new(20.0, 320.0, 300.0, 60.0));
    tour.on_mutation(&MutationRecord::added(vec![item]));

    step_time(&mut tour, ms(499));
    assert_eq!(tour.geometry().target.top, 100.0);

    step_time(&mut tour, ms(1));
    assert_eq!(tour.geometry().target, NodeRect::new(20.0, 320.0, 300.0, 60.0));
    assert_eq!(geometry_causes(&tour.drain_events()), vec![GeometryCause::Mutation]);
}

#[test]
fn removal_only_mutations_change_nothing() {
    let mut env = page();
    let list = env.add("#list", NodeRect::new(20.0, 100.0, 300.0, 200.0));
    let gone = env.add("#row", NodeRect::new(20.0, 120.0, 300.0, 20.0));
    let mut tour = build(
        env,
        vec![Step::targeting("#list").observe("#list")],
        TourOptions::default(),
    );
    tour.open().unwrap();
    tour.drain_events();
    let before = *tour.geometry();

    tour.environment_mut().detach(gone);
    tour.on_mutation(&MutationRecord::removed(vec![gone]));
    step_time(&mut tour, ms(2000));

    assert_eq!(*tour.geometry(), before);
    assert!(geometry_causes(&tour.drain_events()).is_empty());
    assert_eq!(tour.environment().observed(), Some(list));
}

#[test]
fn mutation_while_closed_disconnects() {
    let mut env = page();
    env.add("#list", NodeRect::new(20.0, 100.0, 300.0, 200.0));
    let mut tour = build(
        env,
        vec![Step::targeting("#list").observe("#list")],
        TourOptions::default(),
    );
    tour.open().unwrap();
    tour.close();
    let node = tour.environment_mut().add_anonymous(NodeRect::new(0.0, 0.0, 1.0, 1.0));
    tour.on_mutation(&MutationRecord::added(vec![node]));
    step_time(&mut tour, ms(1000));
    assert_eq!(tour.environment().observed(), None);
    assert_eq!(*tour.geometry(), guidepost::GeometryState::BASELINE);
}

#[test]
fn step_without_observe_disconnects_previous_observer() {
    let mut env = page();
    env.add("#list", NodeRect::new(20.0, 100.0, 300.0, 200.0));
    env.add("#other", NodeRect::new(20.0, 400.0, 100.0, 20.0));
    let mut tour = build(
        env,
        vec![Step::targeting("#list").observe("#list"), Step::targeting("#other")],
        TourOptions::default(),
    );
    tour.open().unwrap();
    assert!(tour.environment().observed().is_some());
    tour.next();
    assert_eq!(tour.environment().observed(), None);
}

#[test]
fn resize_burst_reshows_once() {
    let mut env = page();
    let node = env.add("#box", NodeRect::new(100.0, 100.0, 100.0, 100.0));
    let mut tour = build(env, vec![Step::targeting("#box")], TourOptions::default());
    tour.open().unwrap();
    tour.drain_events();

    for _ in 0..5 {
        tour.on_resize();
        step_time(&mut tour, ms(30));
    }
    tour.environment_mut().set_viewport(Viewport::new(800.0, 500.0));
    tour.environment_mut().set_rect(node, NodeRect::new(50.0, 120.0, 100.0, 100.0));
    assert!(tour.drain_events().is_empty());

    step_time(&mut tour, ms(100));
    assert_eq!(tour.geometry().viewport, Viewport::new(800.0, 500.0));
    assert_eq!(tour.geometry().target.left, 50.0);
    let shown = tour
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, TourEvent::StepShown { .. }))
        .count();
    assert_eq!(shown, 1);
}

// ============================================================================
// Navigation and closing
// ============================================================================

#[test]
fn go_to_out_of_range_is_rejected() {
    let mut env = page();
    env.add("#a", NodeRect::new(0.0, 0.0, 10.0, 10.0));
    let mut tour = build(
        env,
        vec![Step::targeting("#a"), Step::targeting("#a")],
        TourOptions::default(),
    );
    tour.open().unwrap();
    assert_eq!(tour.go_to(5), Err(TourError::StepOutOfRange { index: 5, len: 2 }));
    assert_eq!(tour.current(), 0);
    assert_eq!(tour.go_to(0), Ok(false));
    assert!(!tour.previous());
    assert!(tour.next());
    assert!(!tour.next());
}

#[test]
fn rewind_on_close_restarts_from_first_step() {
    let mut env = page();
    env.add("#a", NodeRect::new(0.0, 0.0, 10.0, 10.0));
    let closes = Rc::new(RefCell::new(Vec::new()));
    let seen = closes.clone();
    let hooks = TourHooks::new().request_close(move |reason| seen.borrow_mut().push(reason));
    let config = TourConfig::new(vec![Step::targeting("#a"); 3])
        .options(TourOptions::default().with_rewind_on_close(true))
        .hooks(hooks);
    let mut tour = Tour::new(env, config).unwrap();

    tour.open().unwrap();
    tour.next();
    tour.next();
    assert_eq!(tour.current(), 2);
    tour.close();
    assert_eq!(tour.current(), 0);
    assert_eq!(tour.previous_index(), 2);
    tour.open().unwrap();
    assert_eq!(tour.current(), 0);
    assert_eq!(*closes.borrow(), vec![CloseReason::Api]);
}

#[test]
fn disabled_escape_keeps_tour_open() {
    let mut env = page();
    env.add("#a", NodeRect::new(0.0, 0.0, 10.0, 10.0));
    let mut tour = build(
        env,
        vec![Step::targeting("#a"), Step::targeting("#a")],
        TourOptions::default().with_keyboard(KeyboardNavigation::disable(NavKeys::ESC)),
    );
    tour.open().unwrap();
    assert_eq!(tour.handle_key(&KeyEvent::new(KeyCode::Escape)), KeyResponse::Ignored);
    assert!(tour.is_open());
    assert_eq!(tour.handle_key(&KeyEvent::new(KeyCode::Right)), KeyResponse::Consumed);
    assert_eq!(tour.current(), 1);
}

#[test]
fn keyboard_fully_disabled() {
    let mut env = page();
    env.add("#a", NodeRect::new(0.0, 0.0, 10.0, 10.0));
    let mut tour = build(
        env,
        vec![Step::targeting("#a"), Step::targeting("#a")],
        TourOptions::default().with_keyboard(KeyboardNavigation::DISABLED),
    );
    tour.open().unwrap();
    for code in [KeyCode::Escape, KeyCode::Left, KeyCode::Right] {
        assert_eq!(tour.handle_key(&KeyEvent::new(code)), KeyResponse::Ignored);
    }
    assert!(tour.is_open());
    assert_eq!(tour.current(), 0);
}

#[test]
fn open_and_close_callbacks_fire_in_order() {
    let mut env = page();
    env.add("#a", NodeRect::new(0.0, 0.0, 10.0, 10.0));
    let log = Rc::new(RefCell::new(Vec::new()));
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    let hooks = TourHooks::new()
        .after_open(move || l1.borrow_mut().push("after_open".to_string()))
        .before_close(move || l2.borrow_mut().push("before_close".to_string()))
        .request_close(move |reason| l3.borrow_mut().push(format!("request_close:{reason}")));
    let config = TourConfig::new(vec![Step::targeting("#a")]).hooks(hooks);
    let mut tour = Tour::new(env, config).unwrap();

    tour.open().unwrap();
    assert!(tour.on_mask_click(false));
    assert_eq!(
        *log.borrow(),
        vec!["after_open", "before_close", "request_close:mask"]
    );
}

// ============================================================================
// Hooks
// ============================================================================

#[test]
fn failing_action_halts_run_after_geometry() {
    let mut env = page();
    env.add("#a", NodeRect::new(0.0, 0.0, 10.0, 10.0));
    env.add("#b", NodeRect::new(0.0, 100.0, 10.0, 10.0));
    let mut tour = build(
        env,
        vec![
            Step::targeting("#a"),
            Step::targeting("#b").action(Hook::sync(|_| Err(HookError::new("boom")))),
        ],
        TourOptions::default(),
    );
    tour.open().unwrap();
    tour.drain_events();

    tour.next();
    assert!(!tour.is_busy());
    assert_eq!(tour.geometry().target.top, 100.0);
    let events = tour.drain_events();
    let failure = events.iter().find_map(|e| match e {
        TourEvent::HookFailed { index, hook, error } => Some((*index, *hook, error.message().to_string())),
        _ => None,
    });
    assert_eq!(failure, Some((1, HookKind::Action, "boom".to_string())));
    assert!(!events.iter().any(|e| matches!(e, TourEvent::StepShown { index: 1 })));
}

#[test]
fn failing_action_still_lands_scroll() {
    let mut env = page();
    env.add("#a", NodeRect::new(0.0, 0.0, 10.0, 10.0));
    env.add("#low", NodeRect::new(0.0, 2000.0, 100.0, 100.0));
    let mut tour = build(
        env,
        vec![
            Step::targeting("#a"),
            Step::targeting("#low").action(Hook::sync(|_| Err(HookError::new("boom")))),
        ],
        TourOptions::default().with_scroll_duration(ms(300)),
    );
    tour.open().unwrap();
    tour.drain_events();

    tour.next();
    assert!(!tour.is_busy());
    assert!(tour.is_scrolling());
    let events = tour.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        TourEvent::HookFailed { index: 1, hook: HookKind::Action, .. }
    )));

    for _ in 0..10 {
        step_time(&mut tour, ms(100));
    }
    assert!(!tour.is_scrolling());
    assert_eq!(tour.environment().window_scroll(), 1750.0);
    assert_eq!(tour.geometry().target.top, 250.0);
    assert!(tour.geometry().found);

    let events = tour.drain_events();
    assert!(events.iter().any(|e| matches!(e, TourEvent::ScrollFinished { index: 1 })));
    assert_eq!(geometry_causes(&events), vec![GeometryCause::Scrolled]);
    assert!(!events.iter().any(|e| matches!(e, TourEvent::StepShown { .. })));
}

#[test]
fn failing_before_step_leaves_previous_geometry() {
    let mut env = page();
    env.add("#a", NodeRect::new(0.0, 0.0, 10.0, 10.0));
    env.add("#b", NodeRect::new(0.0, 100.0, 10.0, 10.0));
    let fail_on_second = Hook::sync(|args: guidepost::StepHookArgs| {
        if args.index == 1 {
            Err(HookError::new("not yet"))
        } else {
            Ok(())
        }
    });
    let config = TourConfig::new(vec![Step::targeting("#a"), Step::targeting("#b")])
        .hooks(TourHooks::new().before_step(fail_on_second));
    let mut tour = Tour::new(env, config).unwrap();
    tour.open().unwrap();
    tour.next();

    assert_eq!(tour.current(), 1);
    assert_eq!(tour.geometry().target.top, 0.0);
    assert!(tour.drain_events().iter().any(|e| matches!(
        e,
        TourEvent::HookFailed {
            index: 1,
            hook: HookKind::TourBefore,
            ..
        }
    )));
}

#[test]
fn pending_pre_action_shows_provisional_geometry_until_resolved() {
    let mut env = page();
    env.add("#a", NodeRect::new(0.0, 0.0, 10.0, 10.0));
    env.add("#b", NodeRect::new(200.0, 100.0, 50.0, 20.0));
    let (gate, open_gate) = gated_hook();
    let mut tour = build(
        env,
        vec![Step::targeting("#a"), Step::targeting("#b").before(gate)],
        TourOptions::default(),
    );
    tour.open().unwrap();
    tour.drain_events();

    tour.next();
    assert!(tour.is_busy());
    assert_eq!(tour.waiting_on(), Some(HookKind::StepBefore));
    let g = *tour.geometry();
    assert!(g.found);
    assert_eq!(g.placement, Placement::Center);
    assert_eq!((g.target.left, g.target.top), (512.0, 300.0));
    assert_eq!((g.target.width, g.target.height), (-20.0, -20.0));
    assert!(tour.mask().unwrap().cutout.is_closed());

    step_time(&mut tour, ms(16));
    assert!(tour.is_busy());

    open_gate.send(()).unwrap();
    step_time(&mut tour, ms(16));
    assert!(!tour.is_busy());
    assert_eq!(tour.geometry().target, NodeRect::new(200.0, 100.0, 50.0, 20.0));
    assert_eq!(
        geometry_causes(&tour.drain_events()),
        vec![GeometryCause::Provisional, GeometryCause::Measured]
    );
}

#[test]
fn navigating_away_drops_pending_run() {
    let mut env = page();
    env.add("#a", NodeRect::new(0.0, 0.0, 10.0, 10.0));
    env.add("#b", NodeRect::new(0.0, 100.0, 10.0, 10.0));
    let (gate, open_gate) = gated_hook();
    let mut tour = build(
        env,
        vec![Step::targeting("#a"), Step::targeting("#b").action(gate)],
        TourOptions::default(),
    );
    tour.open().unwrap();
    tour.next();
    assert_eq!(tour.waiting_on(), Some(HookKind::Action));

    tour.previous();
    assert!(!tour.is_busy());
    assert!(open_gate.send(()).is_err(), "superseded hook future is dropped");
    assert_eq!(tour.geometry().target.top, 0.0);
}

#[test]
fn action_receives_resolved_node() {
    let mut env = page();
    let target = env.add("#a", NodeRect::new(0.0, 0.0, 10.0, 10.0));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let record = seen.clone();
    let step = Step::targeting("#a").action(Hook::sync(move |node: Option<FakeNode>| {
        record.borrow_mut().push(node);
        Ok(())
    }));
    let missing = {
        let record = seen.clone();
        Step::targeting("#nope").action(Hook::sync(move |node: Option<FakeNode>| {
            record.borrow_mut().push(node);
            Ok(())
        }))
    };
    let mut tour = build(env, vec![step, missing], TourOptions::default());
    tour.open().unwrap();
    tour.next();
    assert_eq!(*seen.borrow(), vec![Some(target), None]);
}
