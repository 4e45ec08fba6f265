// Copyright 2026 the Iris Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay lifecycle and cutout tracking for single-element highlighting.
//!
//! `iris_core` dims a page with one full-viewport overlay and keeps a
//! rectangular cutout aligned with a single target element. It is `no_std`
//! compatible (with `alloc`) and knows nothing about any concrete page: all
//! platform work goes through the [`Environment`](environment::Environment)
//! trait, which backend crates implement.
//!
//! # Architecture
//!
//! ```text
//!   highlight(target) ──► HighlightController ──► Environment
//!                              │   ▲                   │
//!                              │   └── Handler ◄───────┘  scroll / resize /
//!                              ▼                           geometry / transitionend
//!                        Cutout::new(viewport, box) ──► clip-path polygon
//! ```
//!
//! **[`controller`]**: The [`HighlightController`](controller::HighlightController)
//! state machine (`Idle → Highlighting → FadingOut → Idle`).
//!
//! **[`environment`]**: The backend contract: node creation, style writes,
//! geometry reads, and event subscriptions.
//!
//! **[`subscription`]**: Idempotent disposers returned by every
//! subscription the environment hands out.
//!
//! **[`cutout`]**: The "viewport minus target" polygon and its CSS form.
//!
//! **[`config`]**: Overlay appearance and fade timing, with partial updates.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and lifecycle event
//! types, with a zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! **[`time`]**: Microsecond host time used to stamp trace events.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod config;
pub mod controller;
pub mod cutout;
pub mod environment;
pub mod error;
pub mod subscription;
pub mod time;
pub mod trace;

pub use config::{Config, ConfigPatch};
pub use controller::HighlightController;
pub use error::EnvironmentError;
