// Copyright 2026 the Iris Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The JavaScript-facing `Iris` class.
//!
//! ```js
//! const iris = new Iris({ backgroundColor: "rgba(0, 0, 0, 0.5)", fadeDuration: 200 });
//! iris.highlight(card, (box) => console.log(box.left, box.top), () => console.log("gone"));
//! iris.options = { opacity: 0.4 };
//! iris.clear(() => console.log("cleared"));
//! ```
//!
//! Option objects are read field by field. Unknown fields and fields of the
//! wrong type are ignored. `animationDuration` is accepted as an alias of
//! `fadeDuration`.

use alloc::string::ToString;

use iris_core::controller::{HighlightController, Observers};
use iris_core::{Config, ConfigPatch};
use js_sys::{Function, Object, Reflect};
use kurbo::Rect;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::console::ConsoleSink;
use crate::dom::DomEnvironment;

/// Highlights one element at a time by dimming the rest of the page.
#[wasm_bindgen(js_name = Iris)]
pub struct Iris {
    controller: HighlightController<DomEnvironment>,
}

impl core::fmt::Debug for Iris {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Iris")
            .field("controller", &self.controller)
            .finish()
    }
}

#[wasm_bindgen(js_class = Iris)]
impl Iris {
    /// Creates a highlighter with `options` merged over the defaults.
    ///
    /// # Errors
    ///
    /// Throws an `Error` outside a browser page.
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<Object>) -> Result<Self, JsValue> {
        let patch = options.as_deref().map(patch_from_js).unwrap_or_default();
        DomEnvironment::new()
            .and_then(|env| HighlightController::new(env, &patch))
            .map(|controller| Self { controller })
            .map_err(|err| js_sys::Error::new(&err.to_string()).into())
    }

    /// Highlights `element`, replacing any previous highlight.
    ///
    /// `on_update` receives `{ left, top, width, height }` each time the
    /// cutout moves. `on_clear` runs once when this highlight is gone.
    pub fn highlight(
        &self,
        element: Element,
        on_update: Option<Function>,
        on_clear: Option<Function>,
    ) {
        let mut observers = Observers::new();
        if let Some(f) = on_update {
            observers = observers.on_update(move |bbox| {
                let _ = f.call1(&JsValue::NULL, &box_to_js(bbox));
            });
        }
        if let Some(f) = on_clear {
            observers = observers.on_clear(move || {
                let _ = f.call0(&JsValue::NULL);
            });
        }
        self.controller.highlight_with(element, observers);
    }

    /// Fades out the current highlight, then calls `on_done`.
    pub fn clear(&self, on_done: Option<Function>) {
        match on_done {
            Some(f) => self.controller.clear_with(move || {
                let _ = f.call0(&JsValue::NULL);
            }),
            None => self.controller.clear(),
        }
    }

    /// The current options.
    #[wasm_bindgen(getter)]
    pub fn options(&self) -> Object {
        config_to_js(&self.controller.config())
    }

    /// Merges new options and restyles a live overlay.
    #[wasm_bindgen(setter)]
    pub fn set_options(&self, options: Object) {
        self.controller.set_config(&patch_from_js(&options));
    }

    /// `true` while an overlay is on the page.
    #[wasm_bindgen(getter, js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.controller.is_active()
    }

    /// Logs lifecycle events to the console.
    ///
    /// Only effective in builds with the `trace` feature.
    #[wasm_bindgen(js_name = enableLogging)]
    pub fn enable_logging(&self) {
        self.controller.set_trace_sink(alloc::boxed::Box::new(ConsoleSink::new()));
    }
}

fn get(object: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(object, &JsValue::from_str(key))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
}

fn set(object: &Object, key: &str, value: impl Into<JsValue>) {
    let _ = Reflect::set(object, &JsValue::from_str(key), &value.into());
}

/// Reads a partial configuration from a JS options object.
pub(crate) fn patch_from_js(object: &JsValue) -> ConfigPatch {
    ConfigPatch {
        background_color: get(object, "backgroundColor").and_then(|v| v.as_string()),
        opacity: get(object, "opacity").and_then(|v| v.as_f64()),
        z_index: get(object, "zIndex")
            .and_then(|v| v.as_f64())
            .and_then(z_index_from_f64),
        fade_duration: get(object, "fadeDuration")
            .or_else(|| get(object, "animationDuration"))
            .and_then(|v| v.as_f64())
            .and_then(millis_from_f64),
    }
}

fn config_to_js(config: &Config) -> Object {
    let object = Object::new();
    set(&object, "backgroundColor", config.background_color.as_str());
    set(&object, "opacity", config.opacity);
    set(&object, "zIndex", config.z_index);
    set(&object, "fadeDuration", config.fade_duration);
    object
}

fn box_to_js(bbox: Rect) -> Object {
    let object = Object::new();
    set(&object, "left", bbox.x0);
    set(&object, "top", bbox.y0);
    set(&object, "width", bbox.width());
    set(&object, "height", bbox.height());
    object
}

/// Converts a JS number to a stacking order. Fractions are truncated;
/// non-finite and out-of-range values are rejected.
#[expect(
    clippy::cast_possible_truncation,
    reason = "range is checked before the cast"
)]
pub(crate) fn z_index_from_f64(value: f64) -> Option<i32> {
    (value.is_finite()
        && value > f64::from(i32::MIN) - 1.0
        && value < f64::from(i32::MAX) + 1.0)
        .then_some(value as i32)
}

/// Converts a JS number of milliseconds to a fade duration, rounding to the
/// nearest millisecond. Negative values clamp to zero; non-finite values are
/// rejected.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is clamped to the u32 range before the cast"
)]
pub(crate) fn millis_from_f64(value: f64) -> Option<u32> {
    value
        .is_finite()
        .then(|| (value.clamp(0.0, f64::from(u32::MAX)) + 0.5) as u32)
}
