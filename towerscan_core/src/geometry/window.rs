// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned bounding windows.

use crate::geometry::point::Point2;

/// An axis-aligned window (bounding box). The invariant `min.x <= max.x &&
/// min.y <= max.y` is maintained by every constructor and mutator — callers
/// never observe a window whose corners are crossed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window {
    min: Point2,
    max: Point2,
}

impl Window {
    /// Builds a window from two arbitrary corner points, normalizing so the
    /// returned window's `min`/`max` are true corners regardless of the
    /// order the caller supplied them in.
    #[must_use]
    pub fn new(p1: Point2, p2: Point2) -> Self {
        Self {
            min: Point2::new(p1.x.min(p2.x), p1.y.min(p2.y)),
            max: Point2::new(p1.x.max(p2.x), p1.y.max(p2.y)),
        }
    }

    /// An empty window (degenerate, `min == max == (0, 0)`).
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            min: Point2::new(0.0, 0.0),
            max: Point2::new(0.0, 0.0),
        }
    }

    /// The minimum (bottom-left) corner.
    #[must_use]
    pub const fn min(&self) -> Point2 {
        self.min
    }

    /// The maximum (top-right) corner.
    #[must_use]
    pub const fn max(&self) -> Point2 {
        self.max
    }

    /// Width and height of the window.
    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        (self.max.x - self.min.x, self.max.y - self.min.y)
    }

    /// Center of the window.
    #[must_use]
    pub fn center(&self) -> Point2 {
        Point2::new((self.min.x + self.max.x) * 0.5, (self.min.y + self.max.y) * 0.5)
    }

    /// True if the window has zero area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }

    /// True iff `p` lies within the window, inclusive of the boundary.
    #[must_use]
    pub fn contains_point(&self, p: Point2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Returns a window expanded by `by` on every side (shrunk if `by` is
    /// negative; may become empty).
    #[must_use]
    pub fn expand(&self, by: f64) -> Self {
        Self::new(
            Point2::new(self.min.x - by, self.min.y - by),
            Point2::new(self.max.x + by, self.max.y + by),
        )
    }

    /// Intersection of two windows; [`Window::empty`] if they are disjoint.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let min = Point2::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y));
        let max = Point2::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y));
        if min.x > max.x || min.y > max.y {
            Self::empty()
        } else {
            Self { min, max }
        }
    }

    /// Conversion to `kurbo::Rect` for rasterization/rendering callers.
    #[must_use]
    pub fn to_kurbo_rect(self) -> kurbo::Rect {
        kurbo::Rect::new(self.min.x, self.min.y, self.max.x, self.max.y)
    }
}

impl From<kurbo::Rect> for Window {
    fn from(r: kurbo::Rect) -> Self {
        Self::new(Point2::new(r.x0, r.y0), Point2::new(r.x1, r.y1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_crossed_corners() {
        let w = Window::new(Point2::new(3.0, 3.0), Point2::new(1.0, -1.0));
        assert_eq!(w.min(), Point2::new(1.0, -1.0));
        assert_eq!(w.max(), Point2::new(3.0, 3.0));
    }

    #[test]
    fn contains_point_is_inclusive_of_boundary() {
        let w = Window::new(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
        assert!(w.contains_point(Point2::new(0.0, 0.0)));
        assert!(w.contains_point(Point2::new(10.0, 10.0)));
        assert!(!w.contains_point(Point2::new(10.1, 5.0)));
    }

    #[test]
    fn intersection_of_disjoint_windows_is_empty() {
        let a = Window::new(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        let b = Window::new(Point2::new(5.0, 5.0), Point2::new(6.0, 6.0));
        assert!(a.intersection(&b).is_empty());
    }

    #[test]
    fn intersection_of_overlapping_windows() {
        let a = Window::new(Point2::new(0.0, 0.0), Point2::new(4.0, 4.0));
        let b = Window::new(Point2::new(2.0, 2.0), Point2::new(6.0, 6.0));
        let i = a.intersection(&b);
        assert_eq!(i.min(), Point2::new(2.0, 2.0));
        assert_eq!(i.max(), Point2::new(4.0, 4.0));
    }

    #[test]
    fn expand_grows_on_every_side() {
        let w = Window::new(Point2::new(1.0, 1.0), Point2::new(2.0, 2.0));
        let grown = w.expand(1.0);
        assert_eq!(grown.min(), Point2::new(0.0, 0.0));
        assert_eq!(grown.max(), Point2::new(3.0, 3.0));
    }
}
