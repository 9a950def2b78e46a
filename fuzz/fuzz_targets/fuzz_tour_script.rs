#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use guidepost_core::event::{KeyCode, KeyEvent};
use guidepost_core::geometry::{NodeRect, Size, Viewport};
use guidepost_runtime::config::{TourConfig, TourOptions};
use guidepost_runtime::step::Step;
use guidepost_runtime::testing::{FakeEnvironment, FakeNode};
use guidepost_runtime::tour::Tour;
use guidepost_runtime::watcher::MutationRecord;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Input {
    Open,
    Close,
    Next,
    Previous,
    GoTo(u8),
    Key(u8),
    Resize(u16, u16),
    Move(u8, i16),
    Mutation(bool),
    MaskClick(bool),
    Advance(u8),
}

#[derive(Debug, Arbitrary)]
struct Script {
    targets: Vec<(i16, u16)>,
    rewind: bool,
    scroll_ms: u8,
    inputs: Vec<Input>,
}

fuzz_target!(|script: Script| {
    let mut env = FakeEnvironment::new(Viewport::new(1024.0, 768.0)).with_helper(Size::new(240.0, 90.0));
    let mut nodes: Vec<FakeNode> = Vec::new();
    let mut steps: Vec<Step<FakeNode>> = Vec::new();
    for (i, (top, height)) in script.targets.iter().take(16).enumerate() {
        let selector = format!("#t{i}");
        // Every third step points at nothing.
        if i % 3 != 2 {
            nodes.push(env.add(&selector, NodeRect::new(10.0, f64::from(*top), 100.0, f64::from(*height))));
        }
        steps.push(Step::targeting(selector).observe("#t0"));
    }
    if steps.is_empty() {
        return;
    }
    let len = steps.len();
    let options = TourOptions::default()
        .with_rewind_on_close(script.rewind)
        .with_scroll_duration(Duration::from_millis(u64::from(script.scroll_ms)));
    let Ok(mut tour) = Tour::new(env, TourConfig::new(steps).options(options)) else {
        return;
    };

    for input in script.inputs.into_iter().take(128) {
        match input {
            Input::Open => {
                let _ = tour.open();
            }
            Input::Close => tour.close(),
            Input::Next => {
                tour.next();
            }
            Input::Previous => {
                tour.previous();
            }
            Input::GoTo(i) => {
                let result = tour.go_to(usize::from(i));
                assert_eq!(result.is_err(), usize::from(i) >= len);
            }
            Input::Key(k) => {
                let code = match k % 4 {
                    0 => KeyCode::Escape,
                    1 => KeyCode::Left,
                    2 => KeyCode::Right,
                    _ => KeyCode::Char(char::from(k)),
                };
                tour.handle_key(&KeyEvent::new(code));
            }
            Input::Resize(w, h) => {
                tour.environment_mut()
                    .set_viewport(Viewport::new(f64::from(w.max(1)), f64::from(h.max(1))));
                tour.on_resize();
            }
            Input::Move(n, top) => {
                if let Some(node) = nodes.get(usize::from(n) % nodes.len().max(1)) {
                    tour.environment_mut()
                        .set_rect(*node, NodeRect::new(10.0, f64::from(top), 100.0, 40.0));
                }
            }
            Input::Mutation(added) => {
                let record = match (added, nodes.first()) {
                    (true, Some(node)) => MutationRecord::added(vec![*node]),
                    (_, node) => MutationRecord::removed(node.copied().into_iter().collect()),
                };
                tour.on_mutation(&record);
            }
            Input::MaskClick(on_highlight) => {
                tour.on_mask_click(on_highlight);
            }
            Input::Advance(ms) => {
                tour.environment_mut().advance(Duration::from_millis(u64::from(ms)));
                tour.tick();
            }
        }

        assert!(tour.current() < len);
        if !tour.is_open() {
            assert!(!tour.is_busy());
            assert!(!tour.is_scrolling());
            assert!(tour.environment().observed().is_none());
        }
        assert!(tour.environment().window_scroll() >= 0.0);
    }
});
