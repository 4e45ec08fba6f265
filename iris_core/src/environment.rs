// Copyright 2026 the Iris Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for page integrations.
//!
//! Iris splits page-specific work into *backend* crates. Each backend
//! implements [`Environment`], which gives the controller:
//!
//! - **Nodes**: create, attach, detach, and style the overlay node.
//! - **Geometry**: the viewport size and a target's bounding box.
//! - **Notifications**: viewport scroll and resize, per-element geometry
//!   changes, and per-node transition completion.
//! - **Deferral**: running a task one scheduler tick later.
//! - **Time**: a monotonic clock for trace timestamps.
//!
//! # Crate boundaries
//!
//! `iris_core` owns the state machine, the cutout geometry, and this
//! contract. `iris_backend_web` implements it over the DOM;
//! `iris_headless` implements it over an in-memory page for tests.
//!
//! # Re-entrancy
//!
//! Implementations must never invoke a [`Handler`] from inside one of the
//! trait methods. Handlers run later, from the platform's event dispatch,
//! after the controller call that registered them has returned.

use alloc::boxed::Box;

use kurbo::{Rect, Size};

use crate::error::EnvironmentError;
use crate::subscription::Subscription;
use crate::time::HostTime;

/// A callback registered with the environment.
pub type Handler = Box<dyn FnMut()>;

/// Style properties the controller writes to the overlay node.
pub mod style {
    /// `position`.
    pub const POSITION: &str = "position";
    /// `top`.
    pub const TOP: &str = "top";
    /// `left`.
    pub const LEFT: &str = "left";
    /// `width`.
    pub const WIDTH: &str = "width";
    /// `height`.
    pub const HEIGHT: &str = "height";
    /// `background-color`.
    pub const BACKGROUND_COLOR: &str = "background-color";
    /// `opacity`.
    pub const OPACITY: &str = "opacity";
    /// `z-index`.
    pub const Z_INDEX: &str = "z-index";
    /// `transition`.
    pub const TRANSITION: &str = "transition";
    /// `pointer-events`.
    pub const POINTER_EVENTS: &str = "pointer-events";
    /// `clip-path`.
    pub const CLIP_PATH: &str = "clip-path";
}

/// Viewport notifications the controller listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewportEvent {
    /// The page, or a scroll container inside it, scrolled.
    Scroll,
    /// The viewport changed size.
    Resize,
}

impl ViewportEvent {
    /// Returns the DOM event type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::Resize => "resize",
        }
    }
}

/// A page capable of hosting a highlight overlay.
///
/// See the [module docs](self) for the re-entrancy rule every implementation
/// must follow.
pub trait Environment {
    /// Handle to an overlay node created by this environment.
    type Node: Clone + 'static;
    /// Handle to an externally owned element. Only its geometry is read.
    type Target: Clone + 'static;

    /// Verifies that the environment can host an overlay.
    ///
    /// Called once when a controller is constructed.
    fn check(&self) -> Result<(), EnvironmentError>;

    /// Returns the current monotonic time.
    fn now(&self) -> HostTime;

    /// Returns the current viewport size in CSS pixels.
    fn viewport(&self) -> Size;

    /// Returns the target's bounding box in viewport coordinates, or `None`
    /// if the target is not attached to the page.
    fn bounding_box(&self, target: &Self::Target) -> Option<Rect>;

    /// Creates a detached overlay node.
    fn create_node(&self) -> Self::Node;

    /// Attaches `node` to the page.
    ///
    /// Styles written before this call must be committed by the time it
    /// returns, so that a later style change animates from them.
    fn attach(&self, node: &Self::Node);

    /// Removes `node` from the page. Removing a detached node does nothing.
    fn detach(&self, node: &Self::Node);

    /// Sets one style property on `node`.
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);

    /// Calls `handler` on every occurrence of `event`.
    fn listen_viewport(&self, event: ViewportEvent, handler: Handler) -> Subscription;

    /// Calls `handler` whenever the rendered size of `target` changes.
    fn observe_geometry(&self, target: &Self::Target, handler: Handler) -> Subscription;

    /// Calls `handler` when a transition of `property` on `node` finishes.
    ///
    /// Only a transition that ends at the value written last counts; late
    /// notifications from a transition a later write replaced are dropped.
    fn on_transition_end(
        &self,
        node: &Self::Node,
        property: &'static str,
        handler: Handler,
    ) -> Subscription;

    /// Calls `handler` once, one scheduler tick from now.
    fn defer(&self, handler: Handler) -> Subscription;
}
