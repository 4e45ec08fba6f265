// Copyright 2026 the Iris Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Rectangles are stored as four `f64` edges and sizes as two.

use iris_core::config::ConfigChanges;
use iris_core::time::HostTime;
use iris_core::trace::{
    ConfigChangedEvent, CutoutCause, CutoutEvent, FadeInEvent, FadeOutEvent, OverlayCreatedEvent,
    OverlayRemovedEvent, RemovalReason, TargetRejectedEvent, TraceSink,
};
use kurbo::{Rect, Size};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_OVERLAY_CREATED: u8 = 1;
const TAG_FADE_IN: u8 = 2;
const TAG_CUTOUT: u8 = 3;
const TAG_FADE_OUT: u8 = 4;
const TAG_OVERLAY_REMOVED: u8 = 5;
const TAG_TARGET_REJECTED: u8 = 6;
const TAG_CONFIG_CHANGED: u8 = 7;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_rect(&mut self, r: Rect) {
        self.write_f64(r.x0);
        self.write_f64(r.y0);
        self.write_f64(r.x1);
        self.write_f64(r.y1);
    }

    fn write_size(&mut self, s: Size) {
        self.write_f64(s.width);
        self.write_f64(s.height);
    }

    fn write_cause(&mut self, c: CutoutCause) {
        self.write_u8(match c {
            CutoutCause::Initial => 0,
            CutoutCause::Scroll => 1,
            CutoutCause::Resize => 2,
            CutoutCause::Geometry => 3,
            CutoutCause::Config => 4,
        });
    }

    fn write_reason(&mut self, r: RemovalReason) {
        self.write_u8(match r {
            RemovalReason::FadeOutFinished => 0,
            RemovalReason::Immediate => 1,
            RemovalReason::Superseded => 2,
            RemovalReason::Dropped => 3,
        });
    }

    fn write_changes(&mut self, c: ConfigChanges) {
        self.write_u8(
            u8::from(c.background_color)
                | (u8::from(c.opacity) << 1)
                | (u8::from(c.z_index) << 2)
                | (u8::from(c.fade_duration) << 3),
        );
    }
}

impl TraceSink for RecorderSink {
    fn on_overlay_created(&mut self, e: &OverlayCreatedEvent) {
        self.write_u8(TAG_OVERLAY_CREATED);
        self.write_u64(e.generation);
        self.write_u64(e.at.micros());
        self.write_rect(e.target);
        self.write_u32(e.fade_duration);
    }

    fn on_fade_in(&mut self, e: &FadeInEvent) {
        self.write_u8(TAG_FADE_IN);
        self.write_u64(e.generation);
        self.write_u64(e.at.micros());
        self.write_f64(e.opacity);
    }

    fn on_cutout(&mut self, e: &CutoutEvent) {
        self.write_u8(TAG_CUTOUT);
        self.write_u64(e.generation);
        self.write_u64(e.at.micros());
        self.write_cause(e.cause);
        self.write_rect(e.hole);
        self.write_size(e.viewport);
    }

    fn on_fade_out(&mut self, e: &FadeOutEvent) {
        self.write_u8(TAG_FADE_OUT);
        self.write_u64(e.generation);
        self.write_u64(e.at.micros());
        self.write_u8(u8::from(e.immediate));
    }

    fn on_overlay_removed(&mut self, e: &OverlayRemovedEvent) {
        self.write_u8(TAG_OVERLAY_REMOVED);
        self.write_u64(e.generation);
        self.write_u64(e.at.micros());
        self.write_reason(e.reason);
    }

    fn on_target_rejected(&mut self, e: &TargetRejectedEvent) {
        self.write_u8(TAG_TARGET_REJECTED);
        self.write_u64(e.at.micros());
    }

    fn on_config_changed(&mut self, e: &ConfigChangedEvent) {
        self.write_u8(TAG_CONFIG_CHANGED);
        self.write_u64(e.at.micros());
        self.write_changes(e.changes);
        self.write_u8(u8::from(e.restyled));
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// An [`OverlayCreatedEvent`].
    OverlayCreated(OverlayCreatedEvent),
    /// A [`FadeInEvent`].
    FadeIn(FadeInEvent),
    /// A [`CutoutEvent`].
    Cutout(CutoutEvent),
    /// A [`FadeOutEvent`].
    FadeOut(FadeOutEvent),
    /// An [`OverlayRemovedEvent`].
    OverlayRemoved(OverlayRemovedEvent),
    /// A [`TargetRejectedEvent`].
    TargetRejected(TargetRejectedEvent),
    /// A [`ConfigChangedEvent`].
    ConfigChanged(ConfigChangedEvent),
}

impl RecordedEvent {
    /// Returns when the event happened.
    #[must_use]
    pub fn at(&self) -> HostTime {
        match self {
            Self::OverlayCreated(e) => e.at,
            Self::FadeIn(e) => e.at,
            Self::Cutout(e) => e.at,
            Self::FadeOut(e) => e.at,
            Self::OverlayRemoved(e) => e.at,
            Self::TargetRejected(e) => e.at,
            Self::ConfigChanged(e) => e.at,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.read_array::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_array().map(f64::from_le_bytes)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|v| v != 0)
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_rect(&mut self) -> Option<Rect> {
        Some(Rect::new(
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
            self.read_f64()?,
        ))
    }

    fn read_size(&mut self) -> Option<Size> {
        Some(Size::new(self.read_f64()?, self.read_f64()?))
    }

    fn read_cause(&mut self) -> Option<CutoutCause> {
        Some(match self.read_u8()? {
            0 => CutoutCause::Initial,
            1 => CutoutCause::Scroll,
            2 => CutoutCause::Resize,
            3 => CutoutCause::Geometry,
            _ => CutoutCause::Config,
        })
    }

    fn read_reason(&mut self) -> Option<RemovalReason> {
        Some(match self.read_u8()? {
            0 => RemovalReason::FadeOutFinished,
            1 => RemovalReason::Immediate,
            2 => RemovalReason::Superseded,
            _ => RemovalReason::Dropped,
        })
    }

    fn read_changes(&mut self) -> Option<ConfigChanges> {
        let bits = self.read_u8()?;
        Some(ConfigChanges {
            background_color: bits & 1 != 0,
            opacity: bits & (1 << 1) != 0,
            z_index: bits & (1 << 2) != 0,
            fade_duration: bits & (1 << 3) != 0,
        })
    }

    fn decode_overlay_created(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::OverlayCreated(OverlayCreatedEvent {
            generation: self.read_u64()?,
            at: self.read_time()?,
            target: self.read_rect()?,
            fade_duration: self.read_u32()?,
        }))
    }

    fn decode_fade_in(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FadeIn(FadeInEvent {
            generation: self.read_u64()?,
            at: self.read_time()?,
            opacity: self.read_f64()?,
        }))
    }

    fn decode_cutout(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Cutout(CutoutEvent {
            generation: self.read_u64()?,
            at: self.read_time()?,
            cause: self.read_cause()?,
            hole: self.read_rect()?,
            viewport: self.read_size()?,
        }))
    }

    fn decode_fade_out(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FadeOut(FadeOutEvent {
            generation: self.read_u64()?,
            at: self.read_time()?,
            immediate: self.read_bool()?,
        }))
    }

    fn decode_overlay_removed(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::OverlayRemoved(OverlayRemovedEvent {
            generation: self.read_u64()?,
            at: self.read_time()?,
            reason: self.read_reason()?,
        }))
    }

    fn decode_target_rejected(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TargetRejected(TargetRejectedEvent {
            at: self.read_time()?,
        }))
    }

    fn decode_config_changed(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ConfigChanged(ConfigChangedEvent {
            at: self.read_time()?,
            changes: self.read_changes()?,
            restyled: self.read_bool()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_OVERLAY_CREATED => self.decode_overlay_created(),
            TAG_FADE_IN => self.decode_fade_in(),
            TAG_CUTOUT => self.decode_cutout(),
            TAG_FADE_OUT => self.decode_fade_out(),
            TAG_OVERLAY_REMOVED => self.decode_overlay_removed(),
            TAG_TARGET_REJECTED => self.decode_target_rejected(),
            TAG_CONFIG_CHANGED => self.decode_config_changed(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
