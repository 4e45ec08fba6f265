// Copyright 2026 the Iris Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Disposers for environment subscriptions.
//!
//! Every registration an [`Environment`](crate::environment::Environment)
//! performs (an event listener, an element observer, a deferred task) hands
//! back a [`Subscription`]. Disposing it undoes the registration. Disposal is
//! idempotent, and dropping an undisposed subscription disposes it, so a
//! double-teardown path can never unregister twice.

use alloc::boxed::Box;

/// An active registration that is released exactly once.
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce()>>,
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

impl Subscription {
    /// Creates a subscription that runs `dispose` when released.
    #[must_use]
    pub fn new(dispose: impl FnOnce() + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    /// Creates a subscription with nothing to release.
    ///
    /// Backends return this when the platform lacks the requested
    /// notification source.
    #[must_use]
    pub fn inert() -> Self {
        Self { dispose: None }
    }

    /// Returns `true` until the subscription has been disposed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.dispose.is_some()
    }

    /// Releases the registration. Later calls do nothing.
    pub fn dispose(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}
