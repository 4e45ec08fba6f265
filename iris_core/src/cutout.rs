// Copyright 2026 the Iris Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The overlay's clip region: the whole viewport minus the target rectangle.
//!
//! The region is expressed as one closed polygon so that it fits in a single
//! CSS `clip-path: polygon(...)` value. The path runs:
//!
//! ```text
//!   (0,0) ──► (W,0)          outer boundary, clockwise on screen
//!     ▲          │
//!     │          ▼
//!   (0,H) ◄── (W,H)
//!     │
//!   back to (0,0), then along the seam to (l,t)
//!   (l,t) ──► (l,b) ──► (r,b) ──► (r,t) ──► (l,t)   counter-clockwise
//!   and back along the seam to (0,0)
//! ```
//!
//! The seam is traversed once in each direction, so it contributes no area.
//! The inner rectangle winds opposite to the outer boundary, so it is excluded
//! under both the `nonzero` and `evenodd` fill rules.

use alloc::string::String;
use core::fmt::Write as _;

use kurbo::{Point, Rect, Size};

/// Number of vertices in a [`Cutout`] polygon.
pub const POLYGON_LEN: usize = 10;

/// A viewport-sized region with a rectangular hole.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cutout {
    viewport: Size,
    hole: Rect,
}

impl Cutout {
    /// Creates a cutout exposing `hole` inside a viewport of the given size.
    ///
    /// `hole` is in viewport coordinates and is normalized so that its edges
    /// are ordered; it is not clamped to the viewport.
    #[must_use]
    pub fn new(viewport: Size, hole: Rect) -> Self {
        Self {
            viewport,
            hole: hole.abs(),
        }
    }

    /// Returns the viewport size this cutout was computed for.
    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Returns the exposed rectangle.
    #[must_use]
    pub fn hole(&self) -> Rect {
        self.hole
    }

    /// Returns the polygon vertices in drawing order.
    #[must_use]
    pub fn points(&self) -> [Point; POLYGON_LEN] {
        let Size { width, height } = self.viewport;
        let Rect { x0, y0, x1, y1 } = self.hole;
        [
            Point::new(0.0, 0.0),
            Point::new(width, 0.0),
            Point::new(width, height),
            Point::new(0.0, height),
            Point::new(0.0, 0.0),
            Point::new(x0, y0),
            Point::new(x0, y1),
            Point::new(x1, y1),
            Point::new(x1, y0),
            Point::new(x0, y0),
        ]
    }

    /// Formats the polygon as a CSS `clip-path` value.
    ///
    /// ```
    /// use iris_core::cutout::Cutout;
    /// use kurbo::{Rect, Size};
    ///
    /// let cutout = Cutout::new(Size::new(800.0, 600.0), Rect::new(50.0, 50.0, 250.0, 150.0));
    /// assert!(cutout.to_css().contains("50px 50px"));
    /// ```
    #[must_use]
    pub fn to_css(&self) -> String {
        let mut css = String::from("polygon(");
        for (i, p) in self.points().iter().enumerate() {
            if i > 0 {
                css.push_str(", ");
            }
            let _ = write!(css, "{}px {}px", p.x, p.y);
        }
        css.push(')');
        css
    }
}

/// Builds a rectangle from the `left, top, width, height` quadruple that
/// bounding-box APIs report.
#[must_use]
pub fn rect_from_box(left: f64, top: f64, width: f64, height: f64) -> Rect {
    Rect::from_origin_size((left, top), (width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Twice the signed area of a closed ring (shoelace formula).
    fn signed_area2(ring: &[Point]) -> f64 {
        ring.windows(2)
            .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
            .sum()
    }

    #[test]
    fn css_references_target_origin() {
        let cutout = Cutout::new(
            Size::new(1024.0, 768.0),
            rect_from_box(50.0, 50.0, 200.0, 100.0),
        );
        let css = cutout.to_css();
        assert!(css.starts_with("polygon(0px 0px, 1024px 0px"), "{css}");
        assert!(css.contains("50px 50px, 50px 150px, 250px 150px, 250px 50px"), "{css}");
        assert!(css.ends_with("50px 50px)"), "{css}");
    }

    #[test]
    fn hole_matches_box() {
        let rect = rect_from_box(12.5, 40.0, 0.0, 30.0);
        let cutout = Cutout::new(Size::new(300.0, 200.0), rect);
        assert_eq!(cutout.hole(), rect);
        assert_eq!(cutout.viewport(), Size::new(300.0, 200.0));
    }

    #[test]
    fn inner_ring_winds_opposite_to_outer() {
        let cutout = Cutout::new(Size::new(400.0, 300.0), Rect::new(10.0, 20.0, 110.0, 70.0));
        let pts = cutout.points();
        let outer = signed_area2(&pts[0..5]);
        let inner = signed_area2(&pts[5..10]);
        assert!(outer * inner < 0.0, "outer {outer} and inner {inner} share a winding");
        // Net enclosed area is the viewport minus the hole.
        let total = (outer + inner) / 2.0;
        assert_eq!(total, 400.0 * 300.0 - 100.0 * 50.0);
    }

    #[test]
    fn seam_joins_outer_start_and_inner_start() {
        let cutout = Cutout::new(Size::new(400.0, 300.0), Rect::new(10.0, 20.0, 110.0, 70.0));
        let pts = cutout.points();
        assert_eq!(pts[0], pts[4]);
        assert_eq!(pts[5], pts[9]);
        assert_eq!(pts[5], Point::new(10.0, 20.0));
    }

    #[test]
    fn inverted_rect_is_normalized() {
        let cutout = Cutout::new(Size::new(100.0, 100.0), Rect::new(60.0, 60.0, 20.0, 20.0));
        assert_eq!(cutout.hole(), Rect::new(20.0, 20.0, 60.0, 60.0));
    }
}
