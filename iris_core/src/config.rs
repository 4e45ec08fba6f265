// Copyright 2026 the Iris Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay appearance and fade timing.
//!
//! [`Config`] is the full record the controller styles the overlay from.
//! [`ConfigPatch`] carries a partial update: every `None` field leaves the
//! corresponding [`Config`] field untouched when merged with
//! [`Config::apply`].

use alloc::borrow::ToOwned;
use alloc::format;
use alloc::string::String;

/// Default overlay color.
pub const DEFAULT_BACKGROUND: &str = "rgba(0, 0, 0, 0.7)";

/// Configuration for the overlay drawn by a
/// [`HighlightController`](crate::controller::HighlightController).
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// CSS color of the shading layer.
    pub background_color: String,
    /// Opacity the overlay fades in to (0.0–1.0).
    pub opacity: f64,
    /// Stacking order of the overlay.
    pub z_index: i32,
    /// Duration of the fade-in and fade-out, in milliseconds.
    pub fade_duration: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            background_color: DEFAULT_BACKGROUND.to_owned(),
            opacity: 0.7,
            z_index: 9999,
            fade_duration: 300,
        }
    }
}

impl Config {
    /// Returns the defaults with `patch` merged over them.
    #[must_use]
    pub fn with_patch(patch: &ConfigPatch) -> Self {
        let mut config = Self::default();
        config.apply(patch);
        config
    }

    /// Returns the CSS `transition` value for the overlay's opacity fade.
    #[must_use]
    pub fn transition(&self) -> String {
        format!("opacity {}ms ease", self.fade_duration)
    }

    /// Merges `patch` into this configuration and reports which fields
    /// actually changed.
    ///
    /// Opacity is clamped to `[0, 1]`; a non-finite opacity is ignored.
    pub fn apply(&mut self, patch: &ConfigPatch) -> ConfigChanges {
        let mut changes = ConfigChanges::default();

        if let Some(color) = &patch.background_color
            && *color != self.background_color
        {
            self.background_color.clone_from(color);
            changes.background_color = true;
        }
        if let Some(opacity) = patch.opacity
            && opacity.is_finite()
        {
            let opacity = opacity.clamp(0.0, 1.0);
            if opacity != self.opacity {
                self.opacity = opacity;
                changes.opacity = true;
            }
        }
        if let Some(z_index) = patch.z_index
            && z_index != self.z_index
        {
            self.z_index = z_index;
            changes.z_index = true;
        }
        if let Some(fade_duration) = patch.fade_duration
            && fade_duration != self.fade_duration
        {
            self.fade_duration = fade_duration;
            changes.fade_duration = true;
        }

        changes
    }
}

/// A partial [`Config`] update.
///
/// Build one with the chained setters:
///
/// ```
/// use iris_core::ConfigPatch;
///
/// let patch = ConfigPatch::new().opacity(0.4).fade_duration(10);
/// assert_eq!(patch.opacity, Some(0.4));
/// assert!(patch.background_color.is_none());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigPatch {
    /// New overlay color.
    pub background_color: Option<String>,
    /// New target opacity.
    pub opacity: Option<f64>,
    /// New stacking order.
    pub z_index: Option<i32>,
    /// New fade duration in milliseconds.
    pub fade_duration: Option<u32>,
}

impl ConfigPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the overlay color.
    #[must_use]
    pub fn background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    /// Sets the target opacity.
    #[must_use]
    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Sets the stacking order.
    #[must_use]
    pub fn z_index(mut self, z_index: i32) -> Self {
        self.z_index = Some(z_index);
        self
    }

    /// Sets the fade duration in milliseconds.
    #[must_use]
    pub fn fade_duration(mut self, millis: u32) -> Self {
        self.fade_duration = Some(millis);
        self
    }

    /// Returns `true` if the patch sets no field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.background_color.is_none()
            && self.opacity.is_none()
            && self.z_index.is_none()
            && self.fade_duration.is_none()
    }
}

/// Which [`Config`] fields a [`Config::apply`] call changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConfigChanges {
    /// `background_color` changed.
    pub background_color: bool,
    /// `opacity` changed.
    pub opacity: bool,
    /// `z_index` changed.
    pub z_index: bool,
    /// `fade_duration` changed.
    pub fade_duration: bool,
}

impl ConfigChanges {
    /// Returns `true` if any field changed.
    #[must_use]
    pub fn any(self) -> bool {
        self.background_color || self.opacity || self.z_index || self.fade_duration
    }
}
