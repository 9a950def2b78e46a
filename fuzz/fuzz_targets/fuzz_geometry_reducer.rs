#![no_main]

use arbitrary::Arbitrary;
use guidepost_core::geometry::{NodeRect, Size, Viewport};
use guidepost_core::mask::MaskCutout;
use guidepost_core::placement::{Placement, resolve_helper_box};
use guidepost_core::reducer::{GeometryAction, GeometryState, TargetFound};
use guidepost_core::visibility::{in_view, visible_fraction};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Found {
        rect: (i16, i16, u16, u16),
        viewport: (u16, u16),
        helper: Option<(u16, u16)>,
        placement: u8,
    },
    NotFound {
        viewport: (u16, u16),
        placement: u8,
    },
    Reset,
}

fn placement(raw: u8) -> Placement {
    match raw % 5 {
        0 => Placement::Top,
        1 => Placement::Right,
        2 => Placement::Bottom,
        3 => Placement::Left,
        _ => Placement::Center,
    }
}

fn viewport((w, h): (u16, u16)) -> Viewport {
    Viewport::new(f64::from(w), f64::from(h))
}

fuzz_target!(|ops: Vec<Op>| {
    let mut state = GeometryState::BASELINE;
    for op in ops.into_iter().take(256) {
        match op {
            Op::Found {
                rect: (left, top, width, height),
                viewport: vp,
                helper,
                placement: p,
            } => {
                let rect = NodeRect::new(
                    f64::from(left),
                    f64::from(top),
                    f64::from(width),
                    f64::from(height),
                );
                let vp = viewport(vp);
                let fraction = visible_fraction(&rect, vp);
                assert!((0.0..=1.0).contains(&fraction), "fraction {fraction}");
                let _ = in_view(&rect, vp, 1.0);

                state.apply(GeometryAction::TargetFound(TargetFound {
                    rect,
                    viewport: vp,
                    helper: helper.map(|(w, h)| Size::new(f64::from(w), f64::from(h))),
                    placement: placement(p),
                }));
                assert!(state.found);
                assert_eq!(state.target, rect);
            }
            Op::NotFound {
                viewport: vp,
                placement: p,
            } => {
                let vp = viewport(vp);
                state.apply(GeometryAction::TargetNotFound {
                    viewport: vp,
                    requested: placement(p),
                });
                assert!(!state.found);
                assert_eq!(state.placement, Placement::Center);
                assert_eq!(state.target.width, 0.0);
                assert_eq!(state.target.height, 0.0);
                assert_eq!(state.target.top, vp.height + 10.0);
            }
            Op::Reset => {
                state.reset();
                assert_eq!(state, GeometryState::BASELINE);
            }
        }

        let cutout = MaskCutout::from_state(&state, 10.0, 4.0);
        assert!(cutout.width >= 0.0 && cutout.height >= 0.0);
        assert!(cutout.radius >= 0.0);
        let helper = resolve_helper_box(&state, 10.0, 10.0);
        assert!(helper.left.is_finite() && helper.top.is_finite());
    }
});
