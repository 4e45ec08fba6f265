// Copyright 2026 the Iris Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction-time environment errors.

use core::fmt;

/// The environment cannot host an overlay.
///
/// Returned by [`HighlightController::new`](crate::HighlightController::new)
/// and by backend constructors. A failed construction leaves nothing behind
/// to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvironmentError {
    /// There is no global window.
    NoWindow,
    /// The window has no document.
    NoDocument,
    /// The document has no body to attach the overlay to.
    NoBody,
}

impl fmt::Display for EnvironmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWindow => write!(f, "Iris only works in browser environments (no window)"),
            Self::NoDocument => {
                write!(f, "Iris only works in browser environments (no document)")
            }
            Self::NoBody => write!(f, "Iris needs a document body to attach the overlay to"),
        }
    }
}

impl core::error::Error for EnvironmentError {}
