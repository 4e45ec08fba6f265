// Copyright 2026 the Iris Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory page environment for driving `iris_core` without a browser.
//!
//! [`HeadlessEnvironment`] implements [`Environment`] over a simulated page:
//! elements with settable rectangles, overlay nodes with a style map, and a
//! registry of listeners. Nothing happens on its own. Tests advance the page
//! explicitly:
//!
//! - [`run_deferred`](HeadlessEnvironment::run_deferred) runs tasks queued
//!   with [`Environment::defer`] (the one-tick fade-in).
//! - [`finish_transitions`](HeadlessEnvironment::finish_transitions) ends
//!   every running style transition and dispatches `transitionend`.
//! - [`scroll_by`](HeadlessEnvironment::scroll_by),
//!   [`resize_viewport`](HeadlessEnvironment::resize_viewport), and
//!   [`resize_element`](HeadlessEnvironment::resize_element) dispatch the
//!   corresponding notifications.
//!
//! Style transitions follow the browser rule closely enough for lifecycle
//! tests: a change to a property on an attached node starts a transition
//! only if the node's `transition` style names that property with a
//! non-zero duration. Styles written before [`Environment::attach`] never
//! animate.
//!
//! The environment is a cheap handle (`Clone`) to shared page state, so a
//! test keeps one copy while the controller owns another.

#![no_std]

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;

use iris_core::environment::{Environment, Handler, ViewportEvent, style};
use iris_core::error::EnvironmentError;
use iris_core::subscription::Subscription;
use iris_core::time::{Duration, HostTime};
use kurbo::{Rect, Size, Vec2};

#[cfg(test)]
mod tests;

/// Handle to a page element (a highlight target).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub u32);

/// Handle to an overlay node created through [`Environment::create_node`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

/// The kind of notification a listener is registered for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Viewport scroll.
    Scroll,
    /// Viewport resize.
    Resize,
    /// Element geometry.
    Geometry,
    /// Node transition end.
    TransitionEnd,
    /// Deferred task.
    Deferred,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Source {
    Viewport(ViewportEvent),
    Geometry(ElementId),
    TransitionEnd(NodeId, &'static str),
    Deferred,
}

impl Source {
    fn kind(self) -> ListenerKind {
        match self {
            Self::Viewport(ViewportEvent::Scroll) => ListenerKind::Scroll,
            Self::Viewport(ViewportEvent::Resize) => ListenerKind::Resize,
            Self::Geometry(_) => ListenerKind::Geometry,
            Self::TransitionEnd(..) => ListenerKind::TransitionEnd,
            Self::Deferred => ListenerKind::Deferred,
        }
    }
}

struct Listener {
    source: Source,
    handler: Rc<RefCell<Handler>>,
}

#[derive(Debug)]
struct ElementState {
    rect: Rect,
    attached: bool,
}

#[derive(Debug, Default)]
struct NodeState {
    styles: BTreeMap<String, String>,
    attached: bool,
    /// Properties with a running transition.
    transitioning: Vec<&'static str>,
}

struct Page {
    unavailable: Option<EnvironmentError>,
    clock: HostTime,
    viewport: Size,
    next_id: u32,
    elements: BTreeMap<ElementId, ElementState>,
    nodes: BTreeMap<NodeId, NodeState>,
    next_listener: u64,
    listeners: BTreeMap<u64, Listener>,
}

/// A simulated page implementing [`Environment`].
#[derive(Clone)]
pub struct HeadlessEnvironment {
    page: Rc<RefCell<Page>>,
}

impl core::fmt::Debug for HeadlessEnvironment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let page = self.page.borrow();
        f.debug_struct("HeadlessEnvironment")
            .field("viewport", &page.viewport)
            .field("elements", &page.elements.len())
            .field("nodes", &page.nodes.len())
            .field("listeners", &page.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Default for HeadlessEnvironment {
    fn default() -> Self {
        Self::new(Size::new(1024.0, 768.0))
    }
}

impl HeadlessEnvironment {
    /// Creates an empty page with the given viewport size.
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self {
            page: Rc::new(RefCell::new(Page {
                unavailable: None,
                clock: HostTime(0),
                viewport,
                next_id: 0,
                elements: BTreeMap::new(),
                nodes: BTreeMap::new(),
                next_listener: 0,
                listeners: BTreeMap::new(),
            })),
        }
    }

    /// Creates a page whose [`Environment::check`] fails with `error`.
    #[must_use]
    pub fn unavailable(error: EnvironmentError) -> Self {
        let env = Self::default();
        env.page.borrow_mut().unavailable = Some(error);
        env
    }

    // -- Elements --

    /// Adds an attached element with the given bounding box.
    pub fn add_element(&self, rect: Rect) -> ElementId {
        let mut page = self.page.borrow_mut();
        let id = ElementId(page.alloc_id());
        page.elements.insert(
            id,
            ElementState {
                rect,
                attached: true,
            },
        );
        id
    }

    /// Moves an element without notifying anyone, as a layout shift that
    /// does not change the element's size would.
    pub fn move_element(&self, el: ElementId, rect: Rect) {
        if let Some(state) = self.page.borrow_mut().elements.get_mut(&el) {
            state.rect = rect;
        }
    }

    /// Changes an element's box and notifies its geometry observers.
    ///
    /// Returns the number of handlers called.
    pub fn resize_element(&self, el: ElementId, rect: Rect) -> usize {
        self.move_element(el, rect);
        self.dispatch(|source| source == Source::Geometry(el), false)
    }

    /// Removes an element from the page. Its geometry becomes unreadable.
    pub fn detach_element(&self, el: ElementId) {
        if let Some(state) = self.page.borrow_mut().elements.get_mut(&el) {
            state.attached = false;
        }
    }

    // -- Viewport --

    /// Scrolls the page by `delta`, shifting every element the opposite way,
    /// and notifies scroll listeners.
    pub fn scroll_by(&self, delta: Vec2) -> usize {
        for state in self.page.borrow_mut().elements.values_mut() {
            state.rect = state.rect - delta;
        }
        self.dispatch(
            |source| source == Source::Viewport(ViewportEvent::Scroll),
            false,
        )
    }

    /// Changes the viewport size and notifies resize listeners.
    pub fn resize_viewport(&self, size: Size) -> usize {
        self.page.borrow_mut().viewport = size;
        self.dispatch(
            |source| source == Source::Viewport(ViewportEvent::Resize),
            false,
        )
    }

    // -- Scheduling --

    /// Runs every queued deferred task. Returns how many ran.
    pub fn run_deferred(&self) -> usize {
        self.dispatch(|source| source == Source::Deferred, true)
    }

    /// Ends every running transition and dispatches the matching
    /// transition-end listeners. Returns how many transitions ended.
    pub fn finish_transitions(&self) -> usize {
        let finished: Vec<(NodeId, &'static str)> = {
            let mut page = self.page.borrow_mut();
            page.nodes
                .iter_mut()
                .flat_map(|(&id, node)| {
                    core::mem::take(&mut node.transitioning)
                        .into_iter()
                        .map(move |property| (id, property))
                })
                .collect()
        };
        for &(node, property) in &finished {
            self.dispatch(
                |source| source == Source::TransitionEnd(node, property),
                false,
            );
        }
        finished.len()
    }

    /// Advances the clock.
    pub fn advance(&self, by: Duration) {
        let mut page = self.page.borrow_mut();
        page.clock = page.clock + by;
    }

    // -- Inspection --

    /// Returns the overlay nodes currently attached to the page.
    #[must_use]
    pub fn attached_nodes(&self) -> Vec<NodeId> {
        self.page
            .borrow()
            .nodes
            .iter()
            .filter(|(_, node)| node.attached)
            .map(|(&id, _)| id)
            .collect()
    }

    /// Returns the single attached overlay node, if exactly one exists.
    #[must_use]
    pub fn overlay(&self) -> Option<NodeId> {
        match self.attached_nodes().as_slice() {
            [node] => Some(*node),
            _ => None,
        }
    }

    /// Returns a style property of `node`.
    #[must_use]
    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.page
            .borrow()
            .nodes
            .get(&node)
            .and_then(|n| n.styles.get(property).cloned())
    }

    /// Returns `true` while `property` on `node` is transitioning.
    #[must_use]
    pub fn is_transitioning(&self, node: NodeId, property: &str) -> bool {
        self.page
            .borrow()
            .nodes
            .get(&node)
            .is_some_and(|n| n.transitioning.contains(&property))
    }

    /// Returns the number of live listeners of `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: ListenerKind) -> usize {
        self.page
            .borrow()
            .listeners
            .values()
            .filter(|l| l.source.kind() == kind)
            .count()
    }

    /// Returns the number of live listeners of every kind.
    #[must_use]
    pub fn total_listeners(&self) -> usize {
        self.page.borrow().listeners.len()
    }

    // -- Internals --

    fn register(&self, source: Source, handler: Handler) -> Subscription {
        let id = {
            let mut page = self.page.borrow_mut();
            let id = page.next_listener;
            page.next_listener += 1;
            page.listeners.insert(
                id,
                Listener {
                    source,
                    handler: Rc::new(RefCell::new(handler)),
                },
            );
            id
        };
        let page: Weak<RefCell<Page>> = Rc::downgrade(&self.page);
        Subscription::new(move || {
            if let Some(page) = page.upgrade() {
                page.borrow_mut().listeners.remove(&id);
            }
        })
    }

    /// Calls every listener whose source matches. One-shot listeners are
    /// unregistered before they run.
    fn dispatch(&self, matches: impl Fn(Source) -> bool, once: bool) -> usize {
        let candidates: Vec<(u64, Rc<RefCell<Handler>>)> = self
            .page
            .borrow()
            .listeners
            .iter()
            .filter(|(_, l)| matches(l.source))
            .map(|(&id, l)| (id, Rc::clone(&l.handler)))
            .collect();

        let mut called = 0;
        for (id, handler) in candidates {
            // An earlier handler may have disposed this one.
            let alive = {
                let mut page = self.page.borrow_mut();
                if once {
                    page.listeners.remove(&id).is_some()
                } else {
                    page.listeners.contains_key(&id)
                }
            };
            if alive {
                handler.borrow_mut()();
                called += 1;
            }
        }
        called
    }
}

impl Page {
    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Returns the duration in milliseconds a `transition` value gives
/// `property`, e.g. `"opacity 300ms ease"` gives `opacity` 300.
fn transition_millis(transition: &str, property: &str) -> u32 {
    transition
        .split(',')
        .filter_map(|part| {
            let mut tokens = part.split_whitespace();
            let name = tokens.next()?;
            let millis = tokens.next()?.strip_suffix("ms")?.parse().ok()?;
            (name == property || name == "all").then_some(millis)
        })
        .next()
        .unwrap_or(0)
}

impl Environment for HeadlessEnvironment {
    type Node = NodeId;
    type Target = ElementId;

    fn check(&self) -> Result<(), EnvironmentError> {
        match self.page.borrow().unavailable {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn now(&self) -> HostTime {
        self.page.borrow().clock
    }

    fn viewport(&self) -> Size {
        self.page.borrow().viewport
    }

    fn bounding_box(&self, target: &ElementId) -> Option<Rect> {
        self.page
            .borrow()
            .elements
            .get(target)
            .filter(|el| el.attached)
            .map(|el| el.rect)
    }

    fn create_node(&self) -> NodeId {
        let mut page = self.page.borrow_mut();
        let id = NodeId(page.alloc_id());
        page.nodes.insert(id, NodeState::default());
        id
    }

    fn attach(&self, node: &NodeId) {
        if let Some(state) = self.page.borrow_mut().nodes.get_mut(node) {
            state.attached = true;
        }
    }

    fn detach(&self, node: &NodeId) {
        if let Some(state) = self.page.borrow_mut().nodes.get_mut(node) {
            state.attached = false;
            state.transitioning.clear();
        }
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) {
        let mut page = self.page.borrow_mut();
        let Some(state) = page.nodes.get_mut(node) else {
            return;
        };
        let previous = state.styles.insert(property.to_string(), value.to_string());
        let changed = previous.as_deref() != Some(value);
        if !(state.attached && changed) {
            return;
        }
        let millis = state
            .styles
            .get(style::TRANSITION)
            .map_or(0, |t| transition_millis(t, property));
        if millis > 0 && property == style::OPACITY && !state.transitioning.contains(&style::OPACITY)
        {
            state.transitioning.push(style::OPACITY);
        }
    }

    fn listen_viewport(&self, event: ViewportEvent, handler: Handler) -> Subscription {
        self.register(Source::Viewport(event), handler)
    }

    fn observe_geometry(&self, target: &ElementId, handler: Handler) -> Subscription {
        self.register(Source::Geometry(*target), handler)
    }

    fn on_transition_end(
        &self,
        node: &NodeId,
        property: &'static str,
        handler: Handler,
    ) -> Subscription {
        self.register(Source::TransitionEnd(*node, property), handler)
    }

    fn defer(&self, handler: Handler) -> Subscription {
        self.register(Source::Deferred, handler)
    }
}
