// Copyright 2026 the Iris Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser-console trace output.
//!
//! [`ConsoleSink`] implements [`TraceSink`] and logs one `console.log` line
//! per lifecycle event. Events only reach it when the `trace` feature is
//! enabled.

use alloc::format;
use alloc::string::String;

use iris_core::trace::{
    ConfigChangedEvent, CutoutEvent, FadeInEvent, FadeOutEvent, OverlayCreatedEvent,
    OverlayRemovedEvent, TargetRejectedEvent, TraceSink,
};
use kurbo::Rect;
use wasm_bindgen::JsValue;

/// Logs trace events to the browser console.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    /// Creates a console sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn log(line: &str) {
    web_sys::console::log_1(&JsValue::from_str(line));
}

fn describe_box(r: Rect) -> String {
    format!(
        "left={} top={} width={} height={}",
        r.x0,
        r.y0,
        r.width(),
        r.height()
    )
}

pub(crate) fn cutout_line(e: &CutoutEvent) -> String {
    format!(
        "Updating cutout ({:?}) #{}: {} in {}x{}",
        e.cause,
        e.generation,
        describe_box(e.hole),
        e.viewport.width,
        e.viewport.height,
    )
}

pub(crate) fn fade_out_line(e: &FadeOutEvent) -> String {
    if e.immediate {
        format!("Removing overlay #{} immediately", e.generation)
    } else {
        format!("Adding transition end listener #{}", e.generation)
    }
}

impl TraceSink for ConsoleSink {
    fn on_overlay_created(&mut self, e: &OverlayCreatedEvent) {
        log(&format!(
            "Creating overlay #{} for {} ({}ms fade)",
            e.generation,
            describe_box(e.target),
            e.fade_duration,
        ));
    }

    fn on_fade_in(&mut self, e: &FadeInEvent) {
        log(&format!("Fading in #{} to {}", e.generation, e.opacity));
    }

    fn on_cutout(&mut self, e: &CutoutEvent) {
        log(&cutout_line(e));
    }

    fn on_fade_out(&mut self, e: &FadeOutEvent) {
        log(&fade_out_line(e));
    }

    fn on_overlay_removed(&mut self, e: &OverlayRemovedEvent) {
        log(&format!("Removed overlay #{} ({:?})", e.generation, e.reason));
    }

    fn on_target_rejected(&mut self, _: &TargetRejectedEvent) {
        log("Ignoring highlight: target is not attached");
    }

    fn on_config_changed(&mut self, e: &ConfigChangedEvent) {
        log(&format!(
            "Options changed {:?}{}",
            e.changes,
            if e.restyled { ", overlay restyled" } else { "" },
        ));
    }
}
