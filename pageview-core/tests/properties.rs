mod common;

use common::ready_controller;
use pageview_core::zoom::{anchor_scroll_delta, compute_zoom, step_zoom};
use pageview_core::{
    GestureKind, GestureSample, Point, Scale, StepZoomConfig, WheelZoomConfig, ZoomDirection,
};
use proptest::prelude::*;
use std::time::{Duration, Instant};

fn direction() -> impl Strategy<Value = ZoomDirection> {
    prop_oneof![Just(ZoomDirection::In), Just(ZoomDirection::Out)]
}

proptest! {
    #[test]
    fn set_page_clamps(total in 1u32..500, page in any::<u32>()) {
        let mut controller = ready_controller(total);
        let applied = controller.set_page(page);
        prop_assert_eq!(applied, page.clamp(1, total));
        prop_assert_eq!(controller.view().unwrap().current_page, page.clamp(1, total));
    }

    #[test]
    fn wheel_zoom_respects_floor(
        previous in 0.1f64..50.0,
        delta in -500.0f64..500.0,
        dir in direction(),
    ) {
        let config = WheelZoomConfig::default();
        let previous = Scale::wheel(previous, &config);
        let result = compute_zoom(previous, delta.abs(), dir, Point::default(), &config);
        prop_assert!(result.new_scale.value() >= 0.1);
        prop_assert!(result.new_scale.value().is_finite());
    }

    #[test]
    fn step_zoom_stays_in_range(start in 0.1f64..20.0, steps in prop::collection::vec(direction(), 0..40)) {
        let config = StepZoomConfig::default();
        let mut scale = Scale::wheel(start, &WheelZoomConfig::default());
        for dir in steps {
            scale = step_zoom(scale, dir, &config);
            prop_assert!((0.25..=4.0).contains(&scale.value()));
        }
    }

    #[test]
    fn repeated_zoom_pairs_stay_bounded(
        magnitude in 0.0f64..200.0,
        pairs in 1usize..50,
    ) {
        let config = WheelZoomConfig::default();
        let mut scale = Scale::ONE;
        for _ in 0..pairs {
            scale = compute_zoom(scale, magnitude, ZoomDirection::In, Point::default(), &config).new_scale;
            scale = compute_zoom(scale, magnitude, ZoomDirection::Out, Point::default(), &config).new_scale;
            prop_assert!(scale.value() >= 0.1);
        }
        // Rounding may drift, but never far from where the pairs started.
        prop_assert!((scale.value() - 1.0).abs() <= 0.01 * pairs as f64);
    }

    #[test]
    fn anchor_formula(x in -5000.0f64..5000.0, y in -5000.0f64..5000.0, f in 0.05f64..10.0) {
        let delta = anchor_scroll_delta(Point::new(x, y), f);
        prop_assert_eq!(delta.x, x * (f - 1.0));
        prop_assert_eq!(delta.y, y * (f - 1.0));
    }

    #[test]
    fn scroll_during_cooldown_never_zooms(
        deltas in prop::collection::vec(-100.0f64..100.0, 1..20),
        gap_ms in 0u64..99,
    ) {
        let mut controller = ready_controller(10);
        let mut now = Instant::now();

        let plain = GestureSample { delta_y: 10.0, modifier_held: false, pointer: Point::default() };
        controller.handle_wheel(&plain, now);

        for delta in deltas {
            now += Duration::from_millis(gap_ms);
            let sample = GestureSample { delta_y: delta, modifier_held: true, pointer: Point::new(30.0, 40.0) };
            let c = controller.handle_wheel(&sample, now);
            prop_assert_eq!(c.kind, GestureKind::Scroll);
            // Keep the cooldown alive for the next modifier event.
            controller.handle_wheel(&plain, now);
        }
        prop_assert_eq!(controller.view().unwrap().scale, Scale::ONE);
    }

    #[test]
    fn dropped_events_do_not_change_scale(delta in -100.0f64..-1.0, within in 0u64..5) {
        let mut controller = ready_controller(10);
        let t0 = Instant::now();
        let sample = GestureSample { delta_y: delta, modifier_held: true, pointer: Point::new(120.0, 300.0) };

        prop_assert_eq!(controller.handle_wheel(&sample, t0).kind, GestureKind::Zoom);
        let zoomed = controller.view().unwrap().scale;
        let offset = controller.engine().unwrap().offset;
        let renders = controller.engine().unwrap().render_calls;
        prop_assert!(zoomed > Scale::ONE);

        prop_assert_eq!(
            controller.handle_wheel(&sample, t0 + Duration::from_millis(within)).kind,
            GestureKind::Dropped
        );
        prop_assert_eq!(controller.view().unwrap().scale, zoomed);
        prop_assert_eq!(controller.engine().unwrap().offset, offset);
        prop_assert_eq!(controller.engine().unwrap().render_calls, renders);
    }
}

#[test]
fn wheel_scenario_from_unit_scale() {
    let mut controller = ready_controller(10);
    let sample = GestureSample {
        delta_y: -40.0,
        modifier_held: true,
        pointer: Point::default(),
    };
    let c = controller.handle_wheel(&sample, Instant::now());
    assert_eq!(c.kind, GestureKind::Zoom);
    assert!(c.prevent_default);
    assert_eq!(controller.view().unwrap().scale.value(), 1.2);
}

#[test]
fn step_scenario_sixteen_presses() {
    let mut controller = ready_controller(10);
    for _ in 0..4 {
        controller.step_zoom_in().unwrap();
    }
    assert_eq!(controller.view().unwrap().scale.value(), 2.0);
    assert_eq!(controller.step_zoom_in().unwrap().value(), 2.25);
    for _ in 0..11 {
        controller.step_zoom_in().unwrap();
    }
    assert_eq!(controller.view().unwrap().scale.value(), 4.0);
    assert_eq!(controller.engine().unwrap().scale, 4.0);
}
