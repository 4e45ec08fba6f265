// Copyright 2026 the Iris Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Controller lifecycle tests against the simulated page.

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use iris_core::controller::{HighlightController, Observers, State};
use iris_core::cutout::rect_from_box;
use iris_core::environment::style;
use iris_core::time::Duration;
use iris_core::trace::{
    CutoutEvent, FadeInEvent, FadeOutEvent, OverlayCreatedEvent, OverlayRemovedEvent,
    TargetRejectedEvent, TraceSink,
};
use iris_core::{ConfigPatch, EnvironmentError};
use kurbo::{Rect, Size, Vec2};

use super::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn setup(patch: &ConfigPatch) -> (HeadlessEnvironment, HighlightController<HeadlessEnvironment>) {
    let env = HeadlessEnvironment::new(Size::new(1024.0, 768.0));
    let controller = HighlightController::new(env.clone(), patch).unwrap();
    (env, controller)
}

fn counter() -> (Rc<Cell<u32>>, impl Fn() + Clone + 'static) {
    let count = Rc::new(Cell::new(0));
    let c = Rc::clone(&count);
    (count, move || c.set(c.get() + 1))
}

fn recorder() -> (Rc<RefCell<Vec<Rect>>>, impl Fn(Rect) + 'static) {
    let boxes = Rc::new(RefCell::new(Vec::new()));
    let b = Rc::clone(&boxes);
    (boxes, move |rect| b.borrow_mut().push(rect))
}

/// Records a one-line summary of each trace event.
#[derive(Default)]
struct LogSink {
    lines: Vec<String>,
}

impl TraceSink for LogSink {
    fn on_overlay_created(&mut self, e: &OverlayCreatedEvent) {
        self.lines.push(format!("created {}", e.generation));
    }

    fn on_fade_in(&mut self, e: &FadeInEvent) {
        self.lines.push(format!("fade_in {} {}", e.generation, e.opacity));
    }

    fn on_cutout(&mut self, e: &CutoutEvent) {
        self.lines.push(format!("cutout {} {:?}", e.generation, e.cause));
    }

    fn on_fade_out(&mut self, e: &FadeOutEvent) {
        self.lines
            .push(format!("fade_out {} immediate={}", e.generation, e.immediate));
    }

    fn on_overlay_removed(&mut self, e: &OverlayRemovedEvent) {
        self.lines.push(format!("removed {} {:?}", e.generation, e.reason));
    }

    fn on_target_rejected(&mut self, _: &TargetRejectedEvent) {
        self.lines.push(String::from("rejected"));
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn construction_fails_without_a_page() {
    let env = HeadlessEnvironment::unavailable(EnvironmentError::NoWindow);
    let err = HighlightController::new(env, &ConfigPatch::new()).unwrap_err();
    assert_eq!(err, EnvironmentError::NoWindow);
}

#[test]
fn construction_merges_patch_over_defaults() {
    let (_, controller) = setup(&ConfigPatch::new().z_index(5));
    let config = controller.config();
    assert_eq!(config.z_index, 5);
    assert_eq!(config.opacity, 0.7);
    assert_eq!(controller.state(), State::Idle);
}

// ---------------------------------------------------------------------------
// Replacement
// ---------------------------------------------------------------------------

#[test]
fn highlight_replaces_previous_highlight() {
    let (env, controller) = setup(&ConfigPatch::new());
    let a = env.add_element(rect_from_box(10.0, 10.0, 50.0, 50.0));
    let b = env.add_element(rect_from_box(200.0, 200.0, 80.0, 40.0));

    let (a_updates, on_a) = recorder();
    let (a_cleared, clear_a) = counter();
    controller.highlight_with(a, Observers::new().on_update(on_a).on_clear(clear_a));
    assert_eq!(a_updates.borrow().len(), 1);

    let (b_updates, on_b) = recorder();
    controller.highlight_with(b, Observers::new().on_update(on_b));

    assert_eq!(env.attached_nodes().len(), 1);
    assert_eq!(a_cleared.get(), 1);

    // Neither a's geometry nor viewport events reach a's observer again.
    env.resize_element(a, rect_from_box(10.0, 10.0, 70.0, 70.0));
    env.scroll_by(Vec2::new(0.0, 20.0));
    env.resize_viewport(Size::new(800.0, 600.0));
    assert_eq!(a_updates.borrow().len(), 1);
    assert_eq!(b_updates.borrow().len(), 3);
    assert_eq!(
        controller.cutout().map(|c| c.hole()),
        Some(rect_from_box(200.0, 180.0, 80.0, 40.0))
    );
}

#[test]
fn superseded_fade_in_never_runs() {
    let (env, controller) = setup(&ConfigPatch::new());
    let a = env.add_element(rect_from_box(10.0, 10.0, 50.0, 50.0));
    let b = env.add_element(rect_from_box(100.0, 10.0, 50.0, 50.0));

    controller.highlight(a);
    let first = env.overlay().unwrap();
    controller.highlight(b);
    let second = env.overlay().unwrap();
    assert_ne!(first, second);

    assert_eq!(env.run_deferred(), 1);
    assert_eq!(env.style(first, style::OPACITY).as_deref(), Some("0"));
    assert_eq!(env.style(second, style::OPACITY).as_deref(), Some("0.7"));
}

#[test]
fn highlight_during_fade_out_finishes_the_old_clear() {
    let (env, controller) = setup(&ConfigPatch::new());
    let a = env.add_element(rect_from_box(10.0, 10.0, 50.0, 50.0));
    let b = env.add_element(rect_from_box(100.0, 10.0, 50.0, 50.0));

    controller.highlight(a);
    env.run_deferred();
    let (done, on_done) = counter();
    controller.clear_with(on_done);
    assert_eq!(controller.state(), State::FadingOut);

    controller.highlight(b);
    assert_eq!(done.get(), 1);
    assert_eq!(controller.state(), State::Highlighting);
    assert_eq!(env.attached_nodes().len(), 1);

    // The old fade-out listener is gone, so finishing transitions cannot
    // remove the new overlay.
    env.run_deferred();
    env.finish_transitions();
    assert_eq!(controller.state(), State::Highlighting);
    assert_eq!(done.get(), 1);
}

#[test]
fn target_moved_by_outgoing_observer_uses_new_box() {
    let (env, controller) = setup(&ConfigPatch::new());
    let a = env.add_element(rect_from_box(10.0, 10.0, 50.0, 50.0));
    let b = env.add_element(rect_from_box(200.0, 200.0, 80.0, 40.0));
    let moved = rect_from_box(300.0, 100.0, 80.0, 40.0);

    let page = env.clone();
    controller.highlight_with(
        a,
        Observers::new().on_clear(move || page.move_element(b, moved)),
    );
    let (updates, on_update) = recorder();
    controller.highlight_with(b, Observers::new().on_update(on_update));

    assert_eq!(controller.cutout().map(|c| c.hole()), Some(moved));
    assert_eq!(*updates.borrow(), [moved]);
}

#[test]
fn target_detached_by_outgoing_observer_is_ignored() {
    let (env, controller) = setup(&ConfigPatch::new());
    let a = env.add_element(rect_from_box(10.0, 10.0, 50.0, 50.0));
    let b = env.add_element(rect_from_box(200.0, 200.0, 80.0, 40.0));

    let page = env.clone();
    controller.highlight_with(
        a,
        Observers::new().on_clear(move || page.detach_element(b)),
    );
    let (updates, on_update) = recorder();
    controller.highlight_with(b, Observers::new().on_update(on_update));

    assert!(updates.borrow().is_empty());
    assert!(env.attached_nodes().is_empty());
    assert_eq!(controller.state(), State::Idle);
    assert_eq!(env.total_listeners(), 0);
}

#[test]
fn clear_observer_may_highlight_again() {
    let (env, controller) = setup(&ConfigPatch::new());
    let controller = Rc::new(controller);
    let a = env.add_element(rect_from_box(10.0, 10.0, 50.0, 50.0));
    let b = env.add_element(rect_from_box(100.0, 10.0, 50.0, 50.0));

    let reentrant = Rc::clone(&controller);
    controller.highlight_with(
        a,
        Observers::new().on_clear(move || reentrant.highlight(b)),
    );
    controller.clear();

    // a was never shown, so the clear is immediate and b takes over.
    assert_eq!(controller.state(), State::Highlighting);
    assert_eq!(controller.cutout().map(|c| c.hole()), env.bounding_box(&b));
    assert_eq!(env.attached_nodes().len(), 1);
}

// ---------------------------------------------------------------------------
// Clearing
// ---------------------------------------------------------------------------

#[test]
fn clear_when_idle_completes_synchronously() {
    let (env, controller) = setup(&ConfigPatch::new());
    let (done, on_done) = counter();
    controller.clear_with(on_done);
    assert_eq!(done.get(), 1);
    assert!(env.attached_nodes().is_empty());
    assert!(!controller.is_active());
}

#[test]
fn clear_waits_for_transition_end() {
    let (env, controller) = setup(&ConfigPatch::new().fade_duration(10));
    let el = env.add_element(rect_from_box(50.0, 50.0, 200.0, 100.0));
    controller.highlight(el);
    env.run_deferred();
    env.finish_transitions();
    let node = env.overlay().unwrap();

    let seen_attached = Rc::new(Cell::new(None));
    let seen = Rc::clone(&seen_attached);
    let probe = env.clone();
    controller.clear_with(move || seen.set(Some(probe.attached_nodes().len())));

    assert_eq!(seen_attached.get(), None);
    assert!(env.is_transitioning(node, style::OPACITY));
    assert_eq!(env.style(node, style::OPACITY).as_deref(), Some("0"));
    assert_eq!(controller.state(), State::FadingOut);
    // Geometry is released at once; viewport listeners wait for removal.
    assert_eq!(env.listener_count(ListenerKind::Geometry), 0);
    assert_eq!(env.listener_count(ListenerKind::Scroll), 1);

    env.advance(Duration::from_millis(10));
    assert_eq!(env.finish_transitions(), 1);
    assert_eq!(seen_attached.get(), Some(0));
    assert_eq!(controller.state(), State::Idle);
    assert_eq!(env.total_listeners(), 0);
}

#[test]
fn double_clear_fires_observers_once() {
    let (env, controller) = setup(&ConfigPatch::new());
    let el = env.add_element(rect_from_box(50.0, 50.0, 200.0, 100.0));
    let (cleared, on_clear) = counter();
    controller.highlight_with(el, Observers::new().on_clear(on_clear));
    env.run_deferred();

    let (first, on_first) = counter();
    let (second, on_second) = counter();
    controller.clear_with(on_first);
    controller.clear_with(on_second);
    assert_eq!(cleared.get() + first.get() + second.get(), 0);

    env.finish_transitions();
    env.finish_transitions();
    assert_eq!((cleared.get(), first.get(), second.get()), (1, 1, 1));
    assert!(env.attached_nodes().is_empty());

    controller.clear();
    assert_eq!(cleared.get(), 1);
}

#[test]
fn clear_before_fade_in_removes_at_once() {
    let (env, controller) = setup(&ConfigPatch::new());
    let el = env.add_element(rect_from_box(50.0, 50.0, 200.0, 100.0));
    controller.highlight(el);

    let (done, on_done) = counter();
    controller.clear_with(on_done);
    assert_eq!(done.get(), 1);
    assert!(env.attached_nodes().is_empty());
    assert_eq!(env.run_deferred(), 0);
    assert_eq!(env.total_listeners(), 0);
}

#[test]
fn zero_duration_clear_is_immediate() {
    let (env, controller) = setup(&ConfigPatch::new().fade_duration(0));
    let el = env.add_element(rect_from_box(50.0, 50.0, 200.0, 100.0));
    controller.highlight(el);
    env.run_deferred();
    let node = env.overlay().unwrap();
    assert!(!env.is_transitioning(node, style::OPACITY));

    let (done, on_done) = counter();
    controller.clear_with(on_done);
    assert_eq!(done.get(), 1);
    assert_eq!(controller.state(), State::Idle);
}

#[test]
fn zero_opacity_highlight_clears_at_once() {
    let (env, controller) = setup(&ConfigPatch::new().opacity(0.0));
    let el = env.add_element(rect_from_box(50.0, 50.0, 200.0, 100.0));
    let (cleared, on_clear) = counter();
    controller.highlight_with(el, Observers::new().on_clear(on_clear));
    env.run_deferred();
    let node = env.overlay().unwrap();
    assert_eq!(env.style(node, style::OPACITY).as_deref(), Some("0"));
    assert!(!env.is_transitioning(node, style::OPACITY));

    let (done, on_done) = counter();
    controller.clear_with(on_done);
    assert_eq!((cleared.get(), done.get()), (1, 1));
    assert_eq!(controller.state(), State::Idle);
    assert!(env.attached_nodes().is_empty());
    assert_eq!(env.total_listeners(), 0);
}

#[test]
fn opacity_zeroed_while_highlighted_clears_at_once() {
    let (env, controller) = setup(&ConfigPatch::new());
    let el = env.add_element(rect_from_box(50.0, 50.0, 200.0, 100.0));
    let (cleared, on_clear) = counter();
    controller.highlight_with(el, Observers::new().on_clear(on_clear));
    env.run_deferred();
    env.finish_transitions();

    controller.set_config(&ConfigPatch::new().opacity(0.0));
    let (done, on_done) = counter();
    controller.clear_with(on_done);
    assert_eq!((cleared.get(), done.get()), (1, 1));
    assert_eq!(controller.state(), State::Idle);
    assert!(env.attached_nodes().is_empty());
    assert_eq!(env.total_listeners(), 0);
}

#[test]
fn negative_opacity_clamps_to_zero_and_clears_at_once() {
    let (env, controller) = setup(&ConfigPatch::new());
    let el = env.add_element(rect_from_box(50.0, 50.0, 200.0, 100.0));
    controller.highlight(el);
    env.run_deferred();
    let node = env.overlay().unwrap();

    controller.set_config(&ConfigPatch::new().opacity(-0.2));
    assert_eq!(controller.config().opacity, 0.0);
    assert_eq!(env.style(node, style::OPACITY).as_deref(), Some("0"));

    let (done, on_done) = counter();
    controller.clear_with(on_done);
    assert_eq!(done.get(), 1);
    assert!(env.attached_nodes().is_empty());
}

#[test]
fn full_opacity_fades_in_and_out() {
    let (env, controller) = setup(&ConfigPatch::new().opacity(1.5));
    assert_eq!(controller.config().opacity, 1.0);
    let el = env.add_element(rect_from_box(50.0, 50.0, 200.0, 100.0));
    controller.highlight(el);
    env.run_deferred();
    let node = env.overlay().unwrap();
    assert_eq!(env.style(node, style::OPACITY).as_deref(), Some("1"));
    assert_eq!(env.finish_transitions(), 1);

    let (done, on_done) = counter();
    controller.clear_with(on_done);
    assert_eq!(done.get(), 0);
    assert_eq!(controller.state(), State::FadingOut);
    assert!(env.is_transitioning(node, style::OPACITY));

    assert_eq!(env.finish_transitions(), 1);
    assert_eq!(done.get(), 1);
    assert_eq!(controller.state(), State::Idle);
    assert_eq!(env.total_listeners(), 0);
}

#[test]
fn dropping_the_controller_removes_the_overlay() {
    let (env, controller) = setup(&ConfigPatch::new());
    let el = env.add_element(rect_from_box(50.0, 50.0, 200.0, 100.0));
    let (cleared, on_clear) = counter();
    controller.highlight_with(el, Observers::new().on_clear(on_clear));
    env.run_deferred();

    drop(controller);
    assert_eq!(cleared.get(), 1);
    assert!(env.attached_nodes().is_empty());
    assert_eq!(env.total_listeners(), 0);
}

// ---------------------------------------------------------------------------
// Cutout
// ---------------------------------------------------------------------------

#[test]
fn cutout_matches_target_box() {
    let (env, controller) = setup(&ConfigPatch::new());
    for bbox in [
        rect_from_box(0.0, 0.0, 0.0, 0.0),
        rect_from_box(50.0, 50.0, 200.0, 100.0),
        rect_from_box(900.0, 700.0, 400.0, 300.0),
        rect_from_box(-20.0, 10.5, 60.25, 0.0),
    ] {
        let el = env.add_element(bbox);
        controller.highlight(el);
        assert_eq!(controller.cutout().map(|c| c.hole()), Some(bbox));
    }
}

#[test]
fn resize_recomputes_cutout_from_current_box() {
    let (env, controller) = setup(&ConfigPatch::new());
    let el = env.add_element(rect_from_box(50.0, 50.0, 200.0, 100.0));
    let (updates, on_update) = recorder();
    controller.highlight_with(el, Observers::new().on_update(on_update));

    // Layout moved the element without resizing it; only the viewport
    // resize tells the controller.
    let moved = rect_from_box(30.0, 40.0, 200.0, 100.0);
    env.move_element(el, moved);
    assert_eq!(env.resize_viewport(Size::new(640.0, 480.0)), 1);

    assert_eq!(updates.borrow().last(), Some(&moved));
    let cutout = controller.cutout().unwrap();
    assert_eq!(cutout.hole(), moved);
    assert_eq!(cutout.viewport(), Size::new(640.0, 480.0));
    let node = env.overlay().unwrap();
    let css = env.style(node, style::CLIP_PATH).unwrap();
    assert!(css.contains("640px 480px"), "{css}");
    assert!(css.contains("30px 40px"), "{css}");
}

#[test]
fn scroll_and_geometry_changes_track_the_target() {
    let (env, controller) = setup(&ConfigPatch::new());
    let el = env.add_element(rect_from_box(50.0, 300.0, 200.0, 100.0));
    let (updates, on_update) = recorder();
    controller.highlight_with(el, Observers::new().on_update(on_update));

    env.scroll_by(Vec2::new(0.0, 100.0));
    assert_eq!(
        controller.cutout().map(|c| c.hole()),
        Some(rect_from_box(50.0, 200.0, 200.0, 100.0))
    );

    env.resize_element(el, rect_from_box(50.0, 200.0, 300.0, 150.0));
    assert_eq!(
        controller.cutout().map(|c| c.hole()),
        Some(rect_from_box(50.0, 200.0, 300.0, 150.0))
    );
    assert_eq!(updates.borrow().len(), 3);
}

#[test]
fn detached_target_is_ignored() {
    let (env, controller) = setup(&ConfigPatch::new());
    let a = env.add_element(rect_from_box(50.0, 50.0, 200.0, 100.0));
    let gone = env.add_element(rect_from_box(0.0, 0.0, 10.0, 10.0));
    env.detach_element(gone);

    controller.highlight(a);
    let node = env.overlay();
    controller.highlight(gone);
    assert_eq!(env.overlay(), node);
    assert_eq!(controller.cutout().map(|c| c.hole()), env.bounding_box(&a));

    let (idle_env, idle) = setup(&ConfigPatch::new());
    let missing = idle_env.add_element(Rect::ZERO);
    idle_env.detach_element(missing);
    idle.highlight(missing);
    assert_eq!(idle.state(), State::Idle);
    assert!(idle_env.attached_nodes().is_empty());
}

#[test]
fn target_detached_mid_highlight_keeps_last_cutout() {
    let (env, controller) = setup(&ConfigPatch::new());
    let el = env.add_element(rect_from_box(50.0, 50.0, 200.0, 100.0));
    let (updates, on_update) = recorder();
    controller.highlight_with(el, Observers::new().on_update(on_update));

    env.detach_element(el);
    env.resize_viewport(Size::new(500.0, 500.0));
    assert_eq!(updates.borrow().len(), 1);
    assert_eq!(
        controller.cutout().map(|c| c.hole()),
        Some(rect_from_box(50.0, 50.0, 200.0, 100.0))
    );
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn config_updates_restyle_live_overlay() {
    let (env, controller) = setup(&ConfigPatch::new());
    let el = env.add_element(rect_from_box(50.0, 50.0, 200.0, 100.0));
    let (updates, on_update) = recorder();
    controller.highlight_with(el, Observers::new().on_update(on_update));
    env.run_deferred();
    let node = env.overlay().unwrap();

    controller.set_config(&ConfigPatch::new().opacity(0.4));
    assert_eq!(env.style(node, style::OPACITY).as_deref(), Some("0.4"));

    controller.set_config(
        &ConfigPatch::new()
            .fade_duration(500)
            .background_color("rgba(255, 0, 0, 0.5)")
            .z_index(42),
    );
    assert_eq!(
        env.style(node, style::TRANSITION).as_deref(),
        Some("opacity 500ms ease")
    );
    assert_eq!(
        env.style(node, style::BACKGROUND_COLOR).as_deref(),
        Some("rgba(255, 0, 0, 0.5)")
    );
    assert_eq!(env.style(node, style::Z_INDEX).as_deref(), Some("42"));
    // Each update also recomputes the cutout.
    assert_eq!(updates.borrow().len(), 3);
    assert_eq!(env.attached_nodes(), [node]);
}

#[test]
fn opacity_set_before_fade_in_is_used_by_fade_in() {
    let (env, controller) = setup(&ConfigPatch::new());
    let el = env.add_element(rect_from_box(50.0, 50.0, 200.0, 100.0));
    controller.highlight(el);
    let node = env.overlay().unwrap();

    controller.set_config(&ConfigPatch::new().opacity(0.4));
    assert_eq!(env.style(node, style::OPACITY).as_deref(), Some("0"));
    env.run_deferred();
    assert_eq!(env.style(node, style::OPACITY).as_deref(), Some("0.4"));
}

#[test]
fn config_changes_never_create_an_overlay() {
    let (env, controller) = setup(&ConfigPatch::new());
    controller.set_config(&ConfigPatch::new().opacity(0.2).z_index(1));
    assert!(env.attached_nodes().is_empty());
    assert_eq!(controller.config().opacity, 0.2);
    assert!(!controller.is_active());
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[test]
fn default_highlight_styles_and_fades_in() {
    let (env, controller) = setup(&ConfigPatch::new());
    let el = env.add_element(rect_from_box(50.0, 50.0, 200.0, 100.0));
    controller.highlight(el);

    let node = env.overlay().unwrap();
    let get = |property| env.style(node, property);
    assert_eq!(get(style::POSITION).as_deref(), Some("fixed"));
    assert_eq!(get(style::TOP).as_deref(), Some("0"));
    assert_eq!(get(style::LEFT).as_deref(), Some("0"));
    assert_eq!(get(style::WIDTH).as_deref(), Some("100vw"));
    assert_eq!(get(style::HEIGHT).as_deref(), Some("100vh"));
    assert_eq!(
        get(style::BACKGROUND_COLOR).as_deref(),
        Some("rgba(0, 0, 0, 0.7)")
    );
    assert_eq!(get(style::Z_INDEX).as_deref(), Some("9999"));
    assert_eq!(get(style::POINTER_EVENTS).as_deref(), Some("none"));
    assert_eq!(get(style::TRANSITION).as_deref(), Some("opacity 300ms ease"));
    assert_eq!(get(style::OPACITY).as_deref(), Some("0"));
    assert!(!env.is_transitioning(node, style::OPACITY));
    let css = get(style::CLIP_PATH).unwrap();
    assert!(css.contains("50px 50px"), "{css}");

    assert_eq!(env.run_deferred(), 1);
    assert_eq!(get(style::OPACITY).as_deref(), Some("0.7"));
    assert!(env.is_transitioning(node, style::OPACITY));
    assert_eq!(controller.state(), State::Highlighting);
}

#[test]
fn lifecycle_is_traced() {
    let (env, controller) = setup(&ConfigPatch::new());
    let sink = Rc::new(RefCell::new(LogSink::default()));
    controller.set_trace_sink(Box::new(Rc::clone(&sink)));

    let el = env.add_element(rect_from_box(50.0, 50.0, 200.0, 100.0));
    let gone = env.add_element(Rect::ZERO);
    env.detach_element(gone);

    controller.highlight(gone);
    controller.highlight(el);
    env.run_deferred();
    env.scroll_by(Vec2::new(0.0, 5.0));
    controller.clear();
    env.finish_transitions();

    assert_eq!(
        sink.borrow().lines,
        [
            "rejected",
            "created 1",
            "cutout 1 Initial",
            "fade_in 1 0.7",
            "cutout 1 Scroll",
            "fade_out 1 immediate=false",
            "removed 1 FadeOutFinished",
        ]
    );
}
