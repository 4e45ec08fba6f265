// Copyright 2026 the Iris Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the highlight lifecycle.
//!
//! This module provides a [`TraceSink`] trait with one method per lifecycle
//! event. All method bodies default to no-ops, so implementing only the
//! events you care about is fine.
//!
//! [`Tracer`] owns an optional boxed sink. When the `trace` feature is
//! **off**, every `Tracer` method compiles to nothing and installed sinks
//! are dropped. When **on**, each method performs a single `Option` branch
//! before dispatching.
//!
//! Every event that concerns one overlay carries that overlay's
//! `generation`, a counter that increases with each `highlight` call.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use kurbo::{Rect, Size};

use crate::config::ConfigChanges;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What triggered a cutout recomputation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CutoutCause {
    /// The overlay was just created.
    Initial,
    /// The viewport scrolled.
    Scroll,
    /// The viewport was resized.
    Resize,
    /// The target's rendered size changed.
    Geometry,
    /// The configuration was updated.
    Config,
}

/// Why an overlay left the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemovalReason {
    /// The fade-out transition finished.
    FadeOutFinished,
    /// `clear` ran with no transition to wait for.
    Immediate,
    /// A new `highlight` replaced the overlay.
    Superseded,
    /// The controller was dropped.
    Dropped,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when an overlay is created and attached.
#[derive(Clone, Copy, Debug)]
pub struct OverlayCreatedEvent {
    /// Overlay generation.
    pub generation: u64,
    /// When the overlay was attached.
    pub at: HostTime,
    /// The target's bounding box at creation.
    pub target: Rect,
    /// Configured fade duration in milliseconds.
    pub fade_duration: u32,
}

/// Emitted when the deferred fade-in starts.
#[derive(Clone, Copy, Debug)]
pub struct FadeInEvent {
    /// Overlay generation.
    pub generation: u64,
    /// When the fade-in started.
    pub at: HostTime,
    /// Opacity the overlay fades to.
    pub opacity: f64,
}

/// Emitted each time the cutout is recomputed.
#[derive(Clone, Copy, Debug)]
pub struct CutoutEvent {
    /// Overlay generation.
    pub generation: u64,
    /// When the cutout was written.
    pub at: HostTime,
    /// What triggered the recomputation.
    pub cause: CutoutCause,
    /// The exposed rectangle.
    pub hole: Rect,
    /// The viewport size used.
    pub viewport: Size,
}

/// Emitted when `clear` starts tearing an overlay down.
#[derive(Clone, Copy, Debug)]
pub struct FadeOutEvent {
    /// Overlay generation.
    pub generation: u64,
    /// When the fade-out started.
    pub at: HostTime,
    /// `true` if there is no transition to wait for and removal follows at
    /// once.
    pub immediate: bool,
}

/// Emitted when an overlay leaves the page.
#[derive(Clone, Copy, Debug)]
pub struct OverlayRemovedEvent {
    /// Overlay generation.
    pub generation: u64,
    /// When the node was removed.
    pub at: HostTime,
    /// Why it was removed.
    pub reason: RemovalReason,
}

/// Emitted when `highlight` is called with a target that has no geometry.
#[derive(Clone, Copy, Debug)]
pub struct TargetRejectedEvent {
    /// When the call was rejected.
    pub at: HostTime,
}

/// Emitted when a configuration update changed at least one field.
#[derive(Clone, Copy, Debug)]
pub struct ConfigChangedEvent {
    /// When the update was applied.
    pub at: HostTime,
    /// Which fields changed.
    pub changes: ConfigChanges,
    /// Whether a live overlay was restyled.
    pub restyled: bool,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from a
/// [`HighlightController`](crate::controller::HighlightController).
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about. Sinks must not call back into the
/// controller.
pub trait TraceSink {
    /// Called when an overlay is created.
    fn on_overlay_created(&mut self, e: &OverlayCreatedEvent) {
        _ = e;
    }

    /// Called when the fade-in starts.
    fn on_fade_in(&mut self, e: &FadeInEvent) {
        _ = e;
    }

    /// Called when the cutout is recomputed.
    fn on_cutout(&mut self, e: &CutoutEvent) {
        _ = e;
    }

    /// Called when `clear` starts a teardown.
    fn on_fade_out(&mut self, e: &FadeOutEvent) {
        _ = e;
    }

    /// Called when the overlay leaves the page.
    fn on_overlay_removed(&mut self, e: &OverlayRemovedEvent) {
        _ = e;
    }

    /// Called when a target is rejected.
    fn on_target_rejected(&mut self, e: &TargetRejectedEvent) {
        _ = e;
    }

    /// Called when the configuration changes.
    fn on_config_changed(&mut self, e: &ConfigChangedEvent) {
        _ = e;
    }
}

/// Shared sinks, so a caller can keep reading a sink after installing it.
impl<T: TraceSink + ?Sized> TraceSink for Rc<RefCell<T>> {
    fn on_overlay_created(&mut self, e: &OverlayCreatedEvent) {
        self.borrow_mut().on_overlay_created(e);
    }

    fn on_fade_in(&mut self, e: &FadeInEvent) {
        self.borrow_mut().on_fade_in(e);
    }

    fn on_cutout(&mut self, e: &CutoutEvent) {
        self.borrow_mut().on_cutout(e);
    }

    fn on_fade_out(&mut self, e: &FadeOutEvent) {
        self.borrow_mut().on_fade_out(e);
    }

    fn on_overlay_removed(&mut self, e: &OverlayRemovedEvent) {
        self.borrow_mut().on_overlay_removed(e);
    }

    fn on_target_rejected(&mut self, e: &TargetRejectedEvent) {
        self.borrow_mut().on_target_rejected(e);
    }

    fn on_config_changed(&mut self, e: &ConfigChangedEvent) {
        self.borrow_mut().on_config_changed(e);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin owner of an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
/// When **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
#[derive(Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Tracer {
    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        let mut tracer = Self::none();
        tracer.set_sink(Some(sink));
        tracer
    }

    /// Replaces the sink. `None` discards events from now on.
    #[inline]
    pub fn set_sink(&mut self, sink: Option<Box<dyn TraceSink>>) {
        #[cfg(feature = "trace")]
        {
            self.sink = sink;
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
        }
    }

    /// Emits an [`OverlayCreatedEvent`].
    #[inline]
    pub fn overlay_created(&mut self, e: &OverlayCreatedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_overlay_created(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FadeInEvent`].
    #[inline]
    pub fn fade_in(&mut self, e: &FadeInEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_fade_in(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CutoutEvent`].
    #[inline]
    pub fn cutout(&mut self, e: &CutoutEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_cutout(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FadeOutEvent`].
    #[inline]
    pub fn fade_out(&mut self, e: &FadeOutEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_fade_out(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`OverlayRemovedEvent`].
    #[inline]
    pub fn overlay_removed(&mut self, e: &OverlayRemovedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_overlay_removed(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TargetRejectedEvent`].
    #[inline]
    pub fn target_rejected(&mut self, e: &TargetRejectedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_target_rejected(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ConfigChangedEvent`].
    #[inline]
    pub fn config_changed(&mut self, e: &ConfigChangedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_config_changed(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}
