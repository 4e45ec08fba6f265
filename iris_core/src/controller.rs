// Copyright 2026 the Iris Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The highlight state machine.
//!
//! A [`HighlightController`] moves through three phases:
//!
//! ```text
//!            highlight()                 clear()
//!   Idle ───────────────► Highlighting ───────────► FadingOut
//!    ▲                       │    ▲                     │
//!    │  clear() with no      │    │ highlight()         │ transition finished
//!    │  transition to wait   │    └─────────────────────┤
//!    └───────────────────────┘                          ▼
//!                                                      Idle
//! ```
//!
//! `highlight()` from any phase removes the current overlay at once before
//! building the new one, so two overlays never coexist. The target-geometry
//! subscription is released the moment the target stops being current; the
//! viewport subscriptions live exactly as long as the overlay node.
//!
//! Every handler registered with the [`Environment`] carries the generation
//! of the overlay it was installed for. A handler whose overlay is gone does
//! nothing, so a late notification can never reach a newer highlight.
//!
//! Caller-supplied observers always run after the controller's internal
//! borrow is released, so they may call back into the controller.

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::mem;

use kurbo::Rect;

use crate::config::{Config, ConfigChanges, ConfigPatch};
use crate::cutout::Cutout;
use crate::environment::{Environment, Handler, ViewportEvent, style};
use crate::error::EnvironmentError;
use crate::subscription::Subscription;
use crate::trace::{
    ConfigChangedEvent, CutoutCause, CutoutEvent, FadeInEvent, FadeOutEvent, OverlayCreatedEvent,
    OverlayRemovedEvent, RemovalReason, TargetRejectedEvent, TraceSink, Tracer,
};

/// Observer called with the target's bounding box each time the cutout is
/// recomputed.
pub type UpdateObserver = Rc<dyn Fn(Rect)>;

/// One-shot observer called when a highlight is fully torn down.
pub type ClearObserver = Box<dyn FnOnce()>;

/// The observers attached to one `highlight` call.
#[derive(Default)]
pub struct Observers {
    on_update: Option<UpdateObserver>,
    on_clear: Option<ClearObserver>,
}

impl core::fmt::Debug for Observers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Observers")
            .field("on_update", &self.on_update.is_some())
            .field("on_clear", &self.on_clear.is_some())
            .finish()
    }
}

impl Observers {
    /// Creates an empty observer set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the geometry-update observer.
    #[must_use]
    pub fn on_update(mut self, observer: impl Fn(Rect) + 'static) -> Self {
        self.on_update = Some(Rc::new(observer));
        self
    }

    /// Sets the clear observer.
    #[must_use]
    pub fn on_clear(mut self, observer: impl FnOnce() + 'static) -> Self {
        self.on_clear = Some(Box::new(observer));
        self
    }
}

/// The externally visible phase of a [`HighlightController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum State {
    /// No overlay exists.
    Idle,
    /// An overlay tracks the current target.
    Highlighting,
    /// The overlay is fading out and will be removed when the transition
    /// finishes.
    FadingOut,
}

/// Highlights one element at a time by shading the rest of the page.
///
/// See the [module docs](self) for the lifecycle.
pub struct HighlightController<E: Environment + 'static> {
    inner: Rc<RefCell<Inner<E>>>,
}

impl<E: Environment + 'static> core::fmt::Debug for HighlightController<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("HighlightController")
            .field("state", &inner.phase.state())
            .field("generation", &inner.generation)
            .field("config", &inner.config)
            .finish_non_exhaustive()
    }
}

impl<E: Environment + 'static> HighlightController<E> {
    /// Creates a controller with `patch` merged over the default
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns the environment's [`EnvironmentError`] if it cannot host an
    /// overlay.
    pub fn new(env: E, patch: &ConfigPatch) -> Result<Self, EnvironmentError> {
        env.check()?;
        Ok(Self {
            inner: Rc::new(RefCell::new(Inner {
                env,
                config: Config::with_patch(patch),
                phase: Phase::Idle,
                on_update: None,
                on_clear: None,
                generation: 0,
                tracer: Tracer::none(),
            })),
        })
    }

    /// Routes lifecycle events to `sink`.
    ///
    /// Events are only delivered when the `trace` feature is enabled.
    pub fn set_trace_sink(&self, sink: Box<dyn TraceSink>) {
        self.inner.borrow_mut().tracer.set_sink(Some(sink));
    }

    /// Returns a copy of the current configuration.
    #[must_use]
    pub fn config(&self) -> Config {
        self.inner.borrow().config.clone()
    }

    /// Returns the current phase.
    #[must_use]
    pub fn state(&self) -> State {
        self.inner.borrow().phase.state()
    }

    /// Returns `true` while an overlay exists, including during fade-out.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state() != State::Idle
    }

    /// Returns the cutout most recently written to the overlay.
    #[must_use]
    pub fn cutout(&self) -> Option<Cutout> {
        self.inner.borrow().phase.overlay().map(|o| o.cutout)
    }

    /// Highlights `target` with no observers.
    pub fn highlight(&self, target: E::Target) {
        self.highlight_with(target, Observers::new());
    }

    /// Highlights `target`, replacing any previous highlight and observers.
    ///
    /// A target without readable geometry (for instance one that is not
    /// attached to the page) is ignored and the current highlight stays as
    /// it is.
    pub fn highlight_with(&self, target: E::Target, observers: Observers) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.env.bounding_box(&target).is_none() {
                let at = inner.env.now();
                inner.tracer.target_rejected(&TargetRejectedEvent { at });
                return;
            }
        }

        // Tear down first, and let the outgoing observers run, before the new
        // overlay is built.
        let mut notes = Notifications::default();
        self.inner
            .borrow_mut()
            .remove_overlay(RemovalReason::Superseded, &mut notes);
        notes.run();

        let mut notes = Notifications::default();
        {
            let mut inner = self.inner.borrow_mut();
            // An outgoing observer may have highlighted something else, or
            // moved the target.
            inner.remove_overlay(RemovalReason::Superseded, &mut notes);
            let Some(bbox) = inner.env.bounding_box(&target) else {
                let at = inner.env.now();
                inner.tracer.target_rejected(&TargetRejectedEvent { at });
                drop(inner);
                notes.run();
                return;
            };
            inner.on_update = observers.on_update;
            inner.on_clear = observers.on_clear;
            inner.install(Rc::downgrade(&self.inner), target, bbox, &mut notes);
        }
        notes.run();
    }

    /// Fades out and removes the current highlight.
    pub fn clear(&self) {
        self.clear_inner(None);
    }

    /// Like [`clear`](Self::clear), calling `on_done` once the overlay is gone.
    ///
    /// With nothing highlighted, `on_done` runs before this call returns.
    pub fn clear_with(&self, on_done: impl FnOnce() + 'static) {
        self.clear_inner(Some(Box::new(on_done)));
    }

    fn clear_inner(&self, on_done: Option<ClearObserver>) {
        let mut notes = Notifications::default();
        {
            let mut inner = self.inner.borrow_mut();
            let weak = Rc::downgrade(&self.inner);
            inner.begin_clear(weak, on_done, &mut notes);
        }
        notes.run();
    }

    /// Merges `patch` into the configuration.
    ///
    /// A live overlay is restyled at once and its cutout recomputed. The
    /// overlay is never created or destroyed by a configuration change.
    pub fn set_config(&self, patch: &ConfigPatch) {
        let mut notes = Notifications::default();
        {
            let mut inner = self.inner.borrow_mut();
            let changes = inner.config.apply(patch);
            let restyled = inner.restyle(changes);
            if changes.any() {
                let at = inner.env.now();
                inner.tracer.config_changed(&ConfigChangedEvent {
                    at,
                    changes,
                    restyled,
                });
            }
            notes.update = inner.recompute(CutoutCause::Config);
        }
        notes.run();
    }
}

impl<E: Environment + 'static> Drop for HighlightController<E> {
    fn drop(&mut self) {
        let mut notes = Notifications::default();
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.remove_overlay(RemovalReason::Dropped, &mut notes);
        }
        notes.run();
    }
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

struct Inner<E: Environment + 'static> {
    env: E,
    config: Config,
    phase: Phase<E>,
    on_update: Option<UpdateObserver>,
    on_clear: Option<ClearObserver>,
    /// Generation of the most recently created overlay.
    generation: u64,
    tracer: Tracer,
}

enum Phase<E: Environment> {
    Idle,
    Highlighting(Overlay<E>),
    FadingOut {
        overlay: Overlay<E>,
        /// `clear_with` observers waiting for removal.
        pending: Vec<ClearObserver>,
    },
}

impl<E: Environment> Phase<E> {
    fn state(&self) -> State {
        match self {
            Self::Idle => State::Idle,
            Self::Highlighting(_) => State::Highlighting,
            Self::FadingOut { .. } => State::FadingOut,
        }
    }

    fn overlay(&self) -> Option<&Overlay<E>> {
        match self {
            Self::Idle => None,
            Self::Highlighting(overlay) | Self::FadingOut { overlay, .. } => Some(overlay),
        }
    }
}

struct Overlay<E: Environment> {
    generation: u64,
    node: E::Node,
    /// `None` once the overlay starts fading out.
    target: Option<E::Target>,
    /// Whether the fade-in has been applied.
    shown: bool,
    /// Opacity last written to the node.
    opacity: f64,
    cutout: Cutout,
    geometry: Subscription,
    scroll: Subscription,
    resize: Subscription,
    fade_in: Subscription,
    fade_out: Subscription,
}

/// Environment notifications routed back into the controller.
#[derive(Clone, Copy, Debug)]
enum Signal {
    Scroll,
    Resize,
    Geometry,
    FadeIn,
    FadeOutFinished,
}

/// Observer calls collected under the borrow and run after it is released.
#[derive(Default)]
struct Notifications {
    clears: Vec<ClearObserver>,
    update: Option<(UpdateObserver, Rect)>,
}

impl Notifications {
    fn run(self) {
        for clear in self.clears {
            clear();
        }
        if let Some((observer, bbox)) = self.update {
            observer(bbox);
        }
    }
}

fn handler<E: Environment + 'static>(
    weak: &Weak<RefCell<Inner<E>>>,
    generation: u64,
    signal: Signal,
) -> Handler {
    let weak = weak.clone();
    Box::new(move || {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let mut notes = Notifications::default();
        inner.borrow_mut().handle(generation, signal, &mut notes);
        notes.run();
    })
}

impl<E: Environment + 'static> Inner<E> {
    fn handle(&mut self, generation: u64, signal: Signal, notes: &mut Notifications) {
        let current = self.phase.overlay().map(|o| o.generation);
        if current != Some(generation) {
            return;
        }
        match signal {
            Signal::Scroll => notes.update = self.recompute(CutoutCause::Scroll),
            Signal::Resize => notes.update = self.recompute(CutoutCause::Resize),
            Signal::Geometry => notes.update = self.recompute(CutoutCause::Geometry),
            Signal::FadeIn => self.fade_in(),
            Signal::FadeOutFinished => self.finish_fade_out(notes),
        }
    }

    /// Builds, styles, and attaches a new overlay for `target`.
    fn install(
        &mut self,
        weak: Weak<RefCell<Self>>,
        target: E::Target,
        bbox: Rect,
        notes: &mut Notifications,
    ) {
        self.generation += 1;
        let generation = self.generation;
        let env = &self.env;

        let node = env.create_node();
        env.set_style(&node, style::POSITION, "fixed");
        env.set_style(&node, style::TOP, "0");
        env.set_style(&node, style::LEFT, "0");
        env.set_style(&node, style::WIDTH, "100vw");
        env.set_style(&node, style::HEIGHT, "100vh");
        env.set_style(&node, style::POINTER_EVENTS, "none");
        env.set_style(&node, style::OPACITY, "0");
        env.set_style(&node, style::BACKGROUND_COLOR, &self.config.background_color);
        env.set_style(&node, style::Z_INDEX, &format!("{}", self.config.z_index));
        env.set_style(&node, style::TRANSITION, &self.config.transition());

        let cutout = Cutout::new(env.viewport(), bbox);
        env.set_style(&node, style::CLIP_PATH, &cutout.to_css());
        env.attach(&node);

        let geometry = env.observe_geometry(&target, handler(&weak, generation, Signal::Geometry));
        let scroll = env.listen_viewport(
            ViewportEvent::Scroll,
            handler(&weak, generation, Signal::Scroll),
        );
        let resize = env.listen_viewport(
            ViewportEvent::Resize,
            handler(&weak, generation, Signal::Resize),
        );
        let fade_in = env.defer(handler(&weak, generation, Signal::FadeIn));

        let at = env.now();
        self.tracer.overlay_created(&OverlayCreatedEvent {
            generation,
            at,
            target: bbox,
            fade_duration: self.config.fade_duration,
        });
        self.tracer.cutout(&CutoutEvent {
            generation,
            at,
            cause: CutoutCause::Initial,
            hole: cutout.hole(),
            viewport: cutout.viewport(),
        });

        self.phase = Phase::Highlighting(Overlay {
            generation,
            node,
            target: Some(target),
            shown: false,
            opacity: 0.0,
            cutout,
            geometry,
            scroll,
            resize,
            fade_in,
            fade_out: Subscription::inert(),
        });
        notes.update = self.on_update.clone().map(|observer| (observer, bbox));
    }

    /// Reads the target's box and rewrites the cutout.
    ///
    /// Returns the update notification to deliver, if any. A target that has
    /// lost its geometry keeps the previous cutout.
    fn recompute(&mut self, cause: CutoutCause) -> Option<(UpdateObserver, Rect)> {
        let Phase::Highlighting(overlay) = &mut self.phase else {
            return None;
        };
        let target = overlay.target.as_ref()?;
        let bbox = self.env.bounding_box(target)?;

        let cutout = Cutout::new(self.env.viewport(), bbox);
        self.env
            .set_style(&overlay.node, style::CLIP_PATH, &cutout.to_css());
        overlay.cutout = cutout;

        self.tracer.cutout(&CutoutEvent {
            generation: overlay.generation,
            at: self.env.now(),
            cause,
            hole: cutout.hole(),
            viewport: cutout.viewport(),
        });
        self.on_update.clone().map(|observer| (observer, bbox))
    }

    fn fade_in(&mut self) {
        let Phase::Highlighting(overlay) = &mut self.phase else {
            return;
        };
        if overlay.shown {
            return;
        }
        overlay.shown = true;
        overlay.opacity = self.config.opacity;
        self.env.set_style(
            &overlay.node,
            style::OPACITY,
            &format!("{}", self.config.opacity),
        );
        self.tracer.fade_in(&FadeInEvent {
            generation: overlay.generation,
            at: self.env.now(),
            opacity: self.config.opacity,
        });
    }

    fn begin_clear(
        &mut self,
        weak: Weak<RefCell<Self>>,
        on_done: Option<ClearObserver>,
        notes: &mut Notifications,
    ) {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => {
                notes.clears.extend(self.on_clear.take());
                notes.clears.extend(on_done);
            }
            Phase::FadingOut { overlay, mut pending } => {
                pending.extend(on_done);
                self.phase = Phase::FadingOut { overlay, pending };
            }
            Phase::Highlighting(mut overlay) => {
                overlay.geometry.dispose();
                overlay.target = None;

                // Writing zero over zero, or with no duration, starts no
                // transition, so no completion signal would ever arrive.
                let immediate = overlay.opacity == 0.0 || self.config.fade_duration == 0;
                self.tracer.fade_out(&FadeOutEvent {
                    generation: overlay.generation,
                    at: self.env.now(),
                    immediate,
                });

                if immediate {
                    self.dispose_overlay(overlay, RemovalReason::Immediate);
                    notes.clears.extend(self.on_clear.take());
                    notes.clears.extend(on_done);
                } else {
                    overlay.fade_out = self.env.on_transition_end(
                        &overlay.node,
                        style::OPACITY,
                        handler(&weak, overlay.generation, Signal::FadeOutFinished),
                    );
                    self.env.set_style(&overlay.node, style::OPACITY, "0");
                    overlay.opacity = 0.0;
                    self.phase = Phase::FadingOut {
                        overlay,
                        pending: on_done.into_iter().collect(),
                    };
                }
            }
        }
    }

    fn finish_fade_out(&mut self, notes: &mut Notifications) {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::FadingOut { overlay, pending } => {
                self.dispose_overlay(overlay, RemovalReason::FadeOutFinished);
                notes.clears.extend(self.on_clear.take());
                notes.clears.extend(pending);
            }
            other => self.phase = other,
        }
    }

    /// Removes any overlay at once, without waiting for a transition.
    fn remove_overlay(&mut self, reason: RemovalReason, notes: &mut Notifications) {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => {}
            Phase::Highlighting(overlay) => {
                self.dispose_overlay(overlay, reason);
                notes.clears.extend(self.on_clear.take());
            }
            Phase::FadingOut { overlay, pending } => {
                self.dispose_overlay(overlay, reason);
                notes.clears.extend(self.on_clear.take());
                notes.clears.extend(pending);
            }
        }
    }

    /// Releases every subscription of `overlay` and detaches its node.
    fn dispose_overlay(&mut self, mut overlay: Overlay<E>, reason: RemovalReason) {
        overlay.geometry.dispose();
        overlay.scroll.dispose();
        overlay.resize.dispose();
        overlay.fade_in.dispose();
        overlay.fade_out.dispose();
        self.env.detach(&overlay.node);
        self.tracer.overlay_removed(&OverlayRemovedEvent {
            generation: overlay.generation,
            at: self.env.now(),
            reason,
        });
    }

    /// Writes changed configuration fields to the live overlay.
    ///
    /// Returns `true` if an overlay exists.
    fn restyle(&mut self, changes: ConfigChanges) -> bool {
        let (overlay, highlighting) = match &mut self.phase {
            Phase::Idle => return false,
            Phase::Highlighting(overlay) => (overlay, true),
            Phase::FadingOut { overlay, .. } => (overlay, false),
        };
        let (env, config) = (&self.env, &self.config);
        if changes.background_color {
            env.set_style(&overlay.node, style::BACKGROUND_COLOR, &config.background_color);
        }
        if changes.z_index {
            env.set_style(&overlay.node, style::Z_INDEX, &format!("{}", config.z_index));
        }
        if changes.fade_duration {
            env.set_style(&overlay.node, style::TRANSITION, &config.transition());
        }
        // A pending fade-in picks up the new opacity on its own, and a
        // fading overlay stays at zero.
        if changes.opacity && highlighting && overlay.shown {
            env.set_style(&overlay.node, style::OPACITY, &format!("{}", config.opacity));
            overlay.opacity = config.opacity;
        }
        true
    }
}
