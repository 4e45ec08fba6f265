// Copyright 2026 the Iris Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Direct bindings to browser globals.
//!
//! `performance.now`, the timer pair, and `ResizeObserver` are bound directly
//! rather than through `web_sys::Window`, so calling them needs no window
//! lookup and `ResizeObserver` needs no unstable `web-sys` feature.

use wasm_bindgen::prelude::*;
use web_sys::Element;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "setTimeout")]
    pub(crate) fn set_timeout(callback: &JsValue, millis: i32) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    pub(crate) fn clear_timeout(id: i32);

    /// A `ResizeObserver` instance.
    pub(crate) type ResizeObserver;

    /// Fails where the global is missing.
    #[wasm_bindgen(constructor, catch)]
    pub(crate) fn new(callback: &JsValue) -> Result<ResizeObserver, JsValue>;

    #[wasm_bindgen(method)]
    pub(crate) fn observe(this: &ResizeObserver, target: &Element);

    #[wasm_bindgen(method)]
    pub(crate) fn disconnect(this: &ResizeObserver);
}
