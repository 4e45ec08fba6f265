// Copyright 2026 the Iris Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are printed in milliseconds.

use std::io::Write;

use iris_core::time::HostTime;
use iris_core::trace::{
    ConfigChangedEvent, CutoutEvent, FadeInEvent, FadeOutEvent, OverlayCreatedEvent,
    OverlayRemovedEvent, TargetRejectedEvent, TraceSink,
};
use kurbo::Rect;

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn ms(t: HostTime) -> f64 {
    t.micros() as f64 / 1000.0
}

fn fmt_box(r: Rect) -> String {
    format!("{}x{}@({},{})", r.width(), r.height(), r.x0, r.y0)
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_overlay_created(&mut self, e: &OverlayCreatedEvent) {
        let _ = writeln!(
            self.writer,
            "[created] #{} at {:.3}ms target={} fade={}ms",
            e.generation,
            ms(e.at),
            fmt_box(e.target),
            e.fade_duration,
        );
    }

    fn on_fade_in(&mut self, e: &FadeInEvent) {
        let _ = writeln!(
            self.writer,
            "[fade:in] #{} at {:.3}ms opacity={}",
            e.generation,
            ms(e.at),
            e.opacity,
        );
    }

    fn on_cutout(&mut self, e: &CutoutEvent) {
        let _ = writeln!(
            self.writer,
            "[cutout] #{} at {:.3}ms {:?} hole={} viewport={}x{}",
            e.generation,
            ms(e.at),
            e.cause,
            fmt_box(e.hole),
            e.viewport.width,
            e.viewport.height,
        );
    }

    fn on_fade_out(&mut self, e: &FadeOutEvent) {
        let mode = if e.immediate { "immediate" } else { "transition" };
        let _ = writeln!(
            self.writer,
            "[fade:out] #{} at {:.3}ms {mode}",
            e.generation,
            ms(e.at),
        );
    }

    fn on_overlay_removed(&mut self, e: &OverlayRemovedEvent) {
        let _ = writeln!(
            self.writer,
            "[removed] #{} at {:.3}ms {:?}",
            e.generation,
            ms(e.at),
            e.reason,
        );
    }

    fn on_target_rejected(&mut self, e: &TargetRejectedEvent) {
        let _ = writeln!(self.writer, "[rejected] at {:.3}ms", ms(e.at));
    }

    fn on_config_changed(&mut self, e: &ConfigChangedEvent) {
        let c = e.changes;
        let fields: Vec<&str> = [
            (c.background_color, "background_color"),
            (c.opacity, "opacity"),
            (c.z_index, "z_index"),
            (c.fade_duration, "fade_duration"),
        ]
        .into_iter()
        .filter_map(|(changed, name)| changed.then_some(name))
        .collect();
        let _ = writeln!(
            self.writer,
            "[config] at {:.3}ms {} restyled={}",
            ms(e.at),
            fields.join(","),
            e.restyled,
        );
    }
}
