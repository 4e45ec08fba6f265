// Copyright 2026 the Iris Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web demo: highlight cards and tune the overlay while it is live.
//!
//! Builds a grid of six cards, shortcut buttons for cards 1, 3, and 5, a clear
//! button, and controls for color, opacity, and fade duration. Clicking a
//! card highlights it; moving a control merges the new value into the
//! running controller's configuration.
//!
//! Build with: `wasm-pack build --target web demos/web_cards`
//!
//! Then serve `demos/web_cards/` and open `index.html` in a browser.

#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;

use iris_backend_web::{ConsoleSink, DomEnvironment};
use iris_core::controller::{HighlightController, Observers};
use iris_core::ConfigPatch;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, HtmlElement, HtmlInputElement};

const CARD_COUNT: usize = 6;
const CARD_COLORS: [&str; CARD_COUNT] = [
    "#f44336", "#4caf50", "#2196f3", "#ffc107", "#9c27b0", "#009688",
];

type Controller = Rc<HighlightController<DomEnvironment>>;

struct Controls {
    color: HtmlInputElement,
    opacity: HtmlInputElement,
    opacity_value: HtmlElement,
    duration: HtmlInputElement,
}

/// Entry point for the cards demo.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() -> Result<(), JsValue> {
    let env = DomEnvironment::new().map_err(|e| JsValue::from_str(&format!("{e}")))?;
    let document = web_sys::window()
        .expect("window")
        .document()
        .expect("document");

    let controller: Controller = Rc::new(
        HighlightController::new(env, &ConfigPatch::new())
            .map_err(|e| JsValue::from_str(&format!("{e}")))?,
    );
    controller.set_trace_sink(Box::new(ConsoleSink::new()));

    let shell = element(&document, "main")?;
    style(
        &shell,
        "max-width: 960px; margin: 40px auto; font-family: system-ui, sans-serif; display: grid; gap: 20px;",
    )?;
    document.body().expect("body").append_child(&shell)?;

    let status = element(&document, "p")?;
    status.set_text_content(Some("Click a card to highlight it."));
    shell.append_child(&status)?;

    let controls = create_controls(&document, &shell)?;
    let buttons = element(&document, "div")?;
    style(&buttons, "display: flex; gap: 8px;")?;
    shell.append_child(&buttons)?;

    let grid = element(&document, "div")?;
    style(
        &grid,
        "display: grid; grid-template-columns: repeat(3, 1fr); gap: 24px;",
    )?;
    shell.append_child(&grid)?;

    for (i, color) in CARD_COLORS.iter().enumerate() {
        let card = element(&document, "div")?;
        card.set_id(&format!("card{}", i + 1));
        card.set_text_content(Some(&format!("Card {}", i + 1)));
        style(
            &card,
            &format!(
                "height: 140px; border-radius: 12px; background: {color}; color: white; display: flex; align-items: center; justify-content: center; font-size: 20px; cursor: pointer;"
            ),
        )?;
        grid.append_child(&card)?;
        on(&card, "click", {
            let controller = Rc::clone(&controller);
            let status = status.clone();
            let target: Element = card.clone().into();
            move || highlight(&controller, &status, target.clone())
        })?;
    }

    for n in [1, 3, 5] {
        let button = element(&document, "button")?;
        button.set_text_content(Some(&format!("Highlight card {n}")));
        buttons.append_child(&button)?;
        on(&button, "click", {
            let controller = Rc::clone(&controller);
            let status = status.clone();
            let document = document.clone();
            move || {
                if let Some(card) = document.get_element_by_id(&format!("card{n}")) {
                    highlight(&controller, &status, card);
                }
            }
        })?;
    }

    let clear = element(&document, "button")?;
    clear.set_text_content(Some("Clear"));
    buttons.append_child(&clear)?;
    on(&clear, "click", {
        let controller = Rc::clone(&controller);
        let status = status.clone();
        move || {
            let status = status.clone();
            controller.clear_with(move || status.set_text_content(Some("Cleared.")));
        }
    })?;

    let controls = Rc::new(controls);
    on(&controls.opacity, "input", {
        let controls = Rc::clone(&controls);
        move || {
            controls
                .opacity_value
                .set_text_content(Some(&controls.opacity.value()));
        }
    })?;
    for input in [&controls.color, &controls.opacity, &controls.duration] {
        on(input, "change", {
            let controls = Rc::clone(&controls);
            let controller = Rc::clone(&controller);
            move || controller.set_config(&read_controls(&controls))
        })?;
    }
    controller.set_config(&read_controls(&controls));

    // The controller lives as long as the page.
    core::mem::forget(controller);
    Ok(())
}

fn highlight(controller: &Controller, status: &HtmlElement, target: Element) {
    let name = target.id();
    let updates = status.clone();
    let cleared = status.clone();
    controller.highlight_with(
        target,
        Observers::new()
            .on_update(move |bbox| {
                updates.set_text_content(Some(&format!(
                    "Highlighting {name}: {}x{} at ({}, {})",
                    bbox.width(),
                    bbox.height(),
                    bbox.x0,
                    bbox.y0,
                )));
            })
            .on_clear(move || cleared.set_text_content(Some("Highlight removed."))),
    );
}

fn read_controls(controls: &Controls) -> ConfigPatch {
    let mut patch = ConfigPatch::new();
    let opacity = controls.opacity.value().parse::<f64>().ok();
    if let Some(opacity) = opacity {
        patch = patch.opacity(opacity);
    }
    if let Some(color) = hex_to_rgba(&controls.color.value(), opacity.unwrap_or(0.7)) {
        patch = patch.background_color(color);
    }
    if let Ok(millis) = controls.duration.value().parse::<u32>() {
        patch = patch.fade_duration(millis);
    }
    patch
}

/// Converts `#rrggbb` to an `rgba()` color with the given alpha.
fn hex_to_rgba(hex: &str, alpha: f64) -> Option<String> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some(format!(
        "rgba({}, {}, {}, {alpha})",
        channel(0)?,
        channel(2)?,
        channel(4)?
    ))
}

fn create_controls(doc: &Document, host: &HtmlElement) -> Result<Controls, JsValue> {
    let row = element(doc, "div")?;
    style(
        &row,
        "display: flex; gap: 16px; align-items: center; flex-wrap: wrap;",
    )?;
    host.append_child(&row)?;

    let color = add_input(doc, &row, "Color", "color", "#000000")?;
    let opacity = add_input(doc, &row, "Opacity", "range", "0.7")?;
    opacity.set_min("0");
    opacity.set_max("1");
    opacity.set_step("0.05");
    let opacity_value = element(doc, "span")?;
    opacity_value.set_text_content(Some("0.7"));
    row.append_child(&opacity_value)?;
    let duration = add_input(doc, &row, "Fade (ms)", "number", "300")?;
    duration.set_min("0");
    duration.set_step("50");

    Ok(Controls {
        color,
        opacity,
        opacity_value,
        duration,
    })
}

fn add_input(
    doc: &Document,
    host: &HtmlElement,
    label: &str,
    kind: &str,
    value: &str,
) -> Result<HtmlInputElement, JsValue> {
    let wrap = element(doc, "label")?;
    style(&wrap, "display: inline-flex; gap: 8px; align-items: center;")?;
    let text = element(doc, "span")?;
    text.set_text_content(Some(label));
    let input: HtmlInputElement = doc.create_element("input")?.unchecked_into();
    input.set_type(kind);
    input.set_value(value);
    wrap.append_child(&text)?;
    wrap.append_child(&input)?;
    host.append_child(&wrap)?;
    Ok(input)
}

/// Registers `callback` for `event` on `target` for the page's lifetime.
fn on(
    target: &web_sys::EventTarget,
    event: &str,
    mut callback: impl FnMut() + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move |_event: Event| callback()) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn element(doc: &Document, tag: &str) -> Result<HtmlElement, JsValue> {
    Ok(doc.create_element(tag)?.unchecked_into())
}

fn style(el: &Element, css: &str) -> Result<(), JsValue> {
    el.set_attribute("style", css)
}

#[cfg(test)]
mod tests {
    use super::hex_to_rgba;

    #[test]
    fn hex_colors_become_rgba() {
        assert_eq!(
            hex_to_rgba("#ff8000", 0.5).as_deref(),
            Some("rgba(255, 128, 0, 0.5)")
        );
        assert_eq!(
            hex_to_rgba("#000000", 0.7).as_deref(),
            Some("rgba(0, 0, 0, 0.7)")
        );
    }

    #[test]
    fn malformed_hex_is_rejected() {
        assert_eq!(hex_to_rgba("ff8000", 0.5), None);
        assert_eq!(hex_to_rgba("#ff80", 0.5), None);
        assert_eq!(hex_to_rgba("#gg0000", 0.5), None);
    }
}
