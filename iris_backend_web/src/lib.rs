// Copyright 2026 the Iris Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser backend for iris.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`DomEnvironment`]: the overlay `<div>`, element geometry, and window,
//!   `ResizeObserver`, and transition events
//! - [`ConsoleSink`]: lifecycle logging to the browser console
//! - [`Iris`]: the class exported to JavaScript through `wasm-bindgen`
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Delivers lifecycle events to installed
//!   sinks, including [`ConsoleSink`].

#![no_std]

extern crate alloc;

mod console;
mod dom;
mod globals;
mod js;

pub use console::ConsoleSink;
pub use dom::DomEnvironment;
pub use iris_core::environment::Environment;
pub use js::Iris;

use iris_core::time::HostTime;

/// Returns the current host time from `performance.now()`.
#[must_use]
pub fn now() -> HostTime {
    HostTime::from_millis_f64(globals::performance_now())
}
