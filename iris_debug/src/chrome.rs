// Copyright 2026 the Iris Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Each overlay becomes an async span (`"b"` at creation, `"e"` at removal)
//! keyed by its generation, so consecutive highlights stack as separate
//! rows. Everything else is an instant event inside that span.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use iris_core::time::HostTime;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Timestamps are in microseconds, as recorded.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::OverlayCreated(e) => {
                events.push(json!({
                    "ph": "b",
                    "name": "Overlay",
                    "cat": "Overlay",
                    "id": e.generation,
                    "ts": us(e.at),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "left": e.target.x0,
                        "top": e.target.y0,
                        "width": e.target.width(),
                        "height": e.target.height(),
                        "fade_duration_ms": e.fade_duration,
                    }
                }));
            }
            RecordedEvent::FadeIn(e) => {
                events.push(json!({
                    "ph": "n",
                    "name": "FadeIn",
                    "cat": "Overlay",
                    "id": e.generation,
                    "ts": us(e.at),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "opacity": e.opacity,
                    }
                }));
            }
            RecordedEvent::Cutout(e) => {
                events.push(json!({
                    "ph": "n",
                    "name": "Cutout",
                    "cat": "Overlay",
                    "id": e.generation,
                    "ts": us(e.at),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "cause": format!("{:?}", e.cause),
                        "left": e.hole.x0,
                        "top": e.hole.y0,
                        "width": e.hole.width(),
                        "height": e.hole.height(),
                        "viewport": [e.viewport.width, e.viewport.height],
                    }
                }));
            }
            RecordedEvent::FadeOut(e) => {
                events.push(json!({
                    "ph": "n",
                    "name": "FadeOut",
                    "cat": "Overlay",
                    "id": e.generation,
                    "ts": us(e.at),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "immediate": e.immediate,
                    }
                }));
            }
            RecordedEvent::OverlayRemoved(e) => {
                events.push(json!({
                    "ph": "e",
                    "name": "Overlay",
                    "cat": "Overlay",
                    "id": e.generation,
                    "ts": us(e.at),
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "reason": format!("{:?}", e.reason),
                    }
                }));
            }
            RecordedEvent::TargetRejected(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "TargetRejected",
                    "cat": "Controller",
                    "ts": us(e.at),
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                }));
            }
            RecordedEvent::ConfigChanged(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "ConfigChanged",
                    "cat": "Controller",
                    "ts": us(e.at),
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "background_color": e.changes.background_color,
                        "opacity": e.changes.opacity,
                        "z_index": e.changes.z_index,
                        "fade_duration": e.changes.fade_duration,
                        "restyled": e.restyled,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn us(t: HostTime) -> u64 {
    t.micros()
}
