// Copyright 2026 the Iris Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`Environment`] over the live DOM.
//!
//! The overlay is a `<div>` appended to `document.body`. Targets are any
//! [`Element`]; their geometry comes from `getBoundingClientRect()`.
//!
//! Every registration wraps the controller's handler in a
//! [`Closure`] and hands back a [`Subscription`] that owns it. Disposing the
//! subscription unregisters the listener and frees the closure.

use alloc::boxed::Box;
use alloc::string::String;

use iris_core::cutout::rect_from_box;
use iris_core::environment::{Environment, Handler, ViewportEvent, style};
use iris_core::error::EnvironmentError;
use iris_core::subscription::Subscription;
use iris_core::time::HostTime;
use kurbo::{Rect, Size};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element, HtmlElement, TransitionEvent, Window};

use crate::globals::{self, ResizeObserver};

/// The browser page, implementing [`Environment`].
#[derive(Clone)]
pub struct DomEnvironment {
    window: Window,
    document: Document,
}

impl core::fmt::Debug for DomEnvironment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomEnvironment")
            .field("window", &"Window")
            .field("document", &"Document")
            .finish()
    }
}

impl DomEnvironment {
    /// Binds to the global window and its document.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError::NoWindow`] outside a browser main thread
    /// and [`EnvironmentError::NoDocument`] when the window has no document.
    pub fn new() -> Result<Self, EnvironmentError> {
        let window = web_sys::window().ok_or(EnvironmentError::NoWindow)?;
        let document = window.document().ok_or(EnvironmentError::NoDocument)?;
        Ok(Self { window, document })
    }

    fn body(&self) -> Option<HtmlElement> {
        self.document.body()
    }

    /// Forces a style recalculation for `node`, committing pending style
    /// writes so that the next change starts a transition from them.
    /// Returns the computed opacity.
    fn flush(&self, node: &HtmlElement) -> Option<String> {
        let computed = self.window.get_computed_style(node).ok()??;
        computed.get_property_value(style::OPACITY).ok()
    }
}

/// Returns `true` when a transitioned property's computed value has reached
/// the inline value written last.
pub(crate) fn settled(computed: Option<&str>, inline: Option<&str>) -> bool {
    computed.is_some() && computed == inline
}

impl Environment for DomEnvironment {
    type Node = HtmlElement;
    type Target = Element;

    fn check(&self) -> Result<(), EnvironmentError> {
        self.body().map(|_| ()).ok_or(EnvironmentError::NoBody)
    }

    fn now(&self) -> HostTime {
        crate::now()
    }

    fn viewport(&self) -> Size {
        let dimension = |value: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
            value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
        };
        Size::new(
            dimension(self.window.inner_width()),
            dimension(self.window.inner_height()),
        )
    }

    fn bounding_box(&self, target: &Element) -> Option<Rect> {
        if !target.is_connected() {
            return None;
        }
        let r = target.get_bounding_client_rect();
        Some(rect_from_box(r.left(), r.top(), r.width(), r.height()))
    }

    fn create_node(&self) -> HtmlElement {
        self.document
            .create_element("div")
            .expect("create_element failed")
            .unchecked_into()
    }

    fn attach(&self, node: &HtmlElement) {
        if let Some(body) = self.body() {
            let _ = body.append_child(node);
            let _ = self.flush(node);
        }
    }

    fn detach(&self, node: &HtmlElement) {
        node.remove();
    }

    fn set_style(&self, node: &HtmlElement, property: &str, value: &str) {
        let _ = node.style().set_property(property, value);
        // Two opacity writes in one frame would otherwise collapse into one,
        // and no transition would run between them.
        if property == style::OPACITY && node.is_connected() {
            let _ = self.flush(node);
        }
    }

    fn listen_viewport(&self, event: ViewportEvent, handler: Handler) -> Subscription {
        let closure = Closure::wrap(handler);
        // Capture, so scrolls of nested containers are seen too.
        let capture = event == ViewportEvent::Scroll;
        let window = self.window.clone();
        let _ = window.add_event_listener_with_callback_and_bool(
            event.as_str(),
            closure.as_ref().unchecked_ref(),
            capture,
        );
        Subscription::new(move || {
            let _ = window.remove_event_listener_with_callback_and_bool(
                event.as_str(),
                closure.as_ref().unchecked_ref(),
                capture,
            );
        })
    }

    fn observe_geometry(&self, target: &Element, mut handler: Handler) -> Subscription {
        // The first callback reports the size at `observe` time.
        let mut primed = false;
        let closure = Closure::wrap(Box::new(move || {
            if primed {
                handler();
            }
            primed = true;
        }) as Box<dyn FnMut()>);
        let Ok(observer) = ResizeObserver::new(closure.as_ref()) else {
            return Subscription::inert();
        };
        observer.observe(target);
        Subscription::new(move || {
            observer.disconnect();
            drop(closure);
        })
    }

    fn on_transition_end(
        &self,
        node: &HtmlElement,
        property: &'static str,
        mut handler: Handler,
    ) -> Subscription {
        let env = self.clone();
        let watched = node.clone();
        let closure = Closure::wrap(Box::new(move |event: TransitionEvent| {
            if event.property_name() != property {
                return;
            }
            // Events from an earlier transition that a later write replaced
            // arrive while the property is still moving toward the new value.
            let computed = env.flush(&watched);
            let inline = watched.style().get_property_value(property).ok();
            if settled(computed.as_deref(), inline.as_deref()) {
                handler();
            }
        }) as Box<dyn FnMut(TransitionEvent)>);

        let node = node.clone();
        for kind in ["transitionend", "transitioncancel"] {
            let _ = node.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        }
        Subscription::new(move || {
            for kind in ["transitionend", "transitioncancel"] {
                let _ = node
                    .remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            }
        })
    }

    fn defer(&self, handler: Handler) -> Subscription {
        let closure = Closure::wrap(handler);
        let id = globals::set_timeout(closure.as_ref(), 0);
        Subscription::new(move || {
            globals::clear_timeout(id);
            drop(closure);
        })
    }
}
