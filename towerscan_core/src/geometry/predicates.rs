// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Free-standing geometric predicates: point/segment distance, line
//! intersection, window arithmetic, segment buffering, and a generic
//! `transform` entry point applied polymorphically over geometry.

use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::geometry::point::Point2;
use crate::geometry::segment::Segment;
use crate::geometry::window::Window;
use crate::transform::{Order, Transform};

/// Distance from a point to a segment, clamped so the closest point is
/// always on the segment (never on its infinite extension).
#[must_use]
pub fn dist_point_to_segment(p: Point2, s: Segment) -> f64 {
    let dx = s.p2.x - s.p1.x;
    let dy = s.p2.y - s.p1.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(&s.p1);
    }
    let t = ((p.x - s.p1.x) * dx + (p.y - s.p1.y) * dy) / len_sq;
    let t_clamped = t.clamp(0.0, 1.0);
    let closest = Point2::new(s.p1.x + t_clamped * dx, s.p1.y + t_clamped * dy);
    p.distance(&closest)
}

/// Intersection point of the infinite lines through `l1` and `l2`. Fails
/// cleanly (`Error::NumericFailure`) if the lines are parallel (including
/// coincident) — the 2x2 linear system for the intersection is singular.
pub fn intersect_lines(l1: Segment, l2: Segment) -> Result<Point2> {
    let (x1, y1, x2, y2) = (l1.p1.x, l1.p1.y, l1.p2.x, l1.p2.y);
    let (x3, y3, x4, y4) = (l2.p1.x, l2.p1.y, l2.p2.x, l2.p2.y);
    let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if denom.abs() < 1e-12 {
        return Err(Error::NumericFailure("lines are parallel; intersection system is singular".into()));
    }
    let a = x1 * y2 - y1 * x2;
    let b = x3 * y4 - y3 * x4;
    let px = (a * (x3 - x4) - (x1 - x2) * b) / denom;
    let py = (a * (y3 - y4) - (y1 - y2) * b) / denom;
    Ok(Point2::new(px, py))
}

/// Expands a window by `by` on every side. A thin free-function wrapper
/// over [`Window::expand`].
#[must_use]
pub fn expand_window(w: Window, by: f64) -> Window {
    w.expand(by)
}

/// Intersection of two windows; empty if they are disjoint.
#[must_use]
pub fn window_intersection(w1: Window, w2: Window) -> Window {
    w1.intersection(&w2)
}

/// Builds the rectangular buffer polygon of half-width `width / 2.0`
/// perpendicular to `segment`, returned as four corner points in winding
/// order (not closed — the caller repeats the first point to close it).
#[must_use]
pub fn line_buffer(segment: Segment, width: f64) -> [Point2; 4] {
    let dx = segment.p2.x - segment.p1.x;
    let dy = segment.p2.y - segment.p1.y;
    let len = (dx * dx + dy * dy).sqrt();
    let half = width * 0.5;
    if len == 0.0 {
        return [segment.p1, segment.p1, segment.p2, segment.p2];
    }
    // Unit normal, perpendicular to the segment direction.
    let nx = -dy / len * half;
    let ny = dx / len * half;
    [
        Point2::new(segment.p1.x + nx, segment.p1.y + ny),
        Point2::new(segment.p2.x + nx, segment.p2.y + ny),
        Point2::new(segment.p2.x - nx, segment.p2.y - ny),
        Point2::new(segment.p1.x - nx, segment.p1.y - ny),
    ]
}

/// Applies a transform to a single point, polymorphically over the
/// geometry kind. This is the point-level leaf that `Segment`/`Window`
/// overloads build on (a `Segment` transforms by transforming both
/// endpoints; a `Window` by transforming its corners and renormalizing).
pub fn transform_point(p: Point2, trf: &dyn Transform, order: Order) -> Result<Point2> {
    trf.transform(p, order)
}

/// Transforms every endpoint of a segment.
pub fn transform_segment(s: Segment, trf: &dyn Transform, order: Order) -> Result<Segment> {
    Ok(Segment::new(trf.transform(s.p1, order)?, trf.transform(s.p2, order)?))
}

/// Transforms a window's corners and renormalizes the result (a rotation
/// can turn an axis-aligned window into one whose mapped corners are no
/// longer in min/max order; [`Window::new`] restores the invariant).
pub fn transform_window(w: Window, trf: &dyn Transform, order: Order) -> Result<Window> {
    let min = trf.transform(w.min(), order)?;
    let max = trf.transform(w.max(), order)?;
    Ok(Window::new(min, max))
}

/// Transforms a list of points in place, as a batch.
pub fn transform_points(pts: &[Point2], trf: &dyn Transform, order: Order) -> Result<Vec<Point2>> {
    pts.iter().map(|&p| trf.transform(p, order)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Translation;

    #[test]
    fn dist_point_to_segment_clamps_to_endpoint() {
        let s = Segment::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));
        let p = Point2::new(-3.0, 4.0);
        assert!((dist_point_to_segment(p, s) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn dist_point_to_segment_perpendicular_case() {
        let s = Segment::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));
        let p = Point2::new(5.0, 3.0);
        assert!((dist_point_to_segment(p, s) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn intersect_lines_crossing_at_origin() {
        let l1 = Segment::new(Point2::new(-1.0, 0.0), Point2::new(1.0, 0.0));
        let l2 = Segment::new(Point2::new(0.0, -1.0), Point2::new(0.0, 1.0));
        let p = intersect_lines(l1, l2).unwrap();
        assert!(p.x.abs() < 1e-9 && p.y.abs() < 1e-9);
    }

    #[test]
    fn intersect_lines_parallel_fails() {
        let l1 = Segment::new(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0));
        let l2 = Segment::new(Point2::new(0.0, 1.0), Point2::new(1.0, 1.0));
        assert!(matches!(intersect_lines(l1, l2), Err(Error::NumericFailure(_))));
    }

    #[test]
    fn line_buffer_is_perpendicular_and_half_width() {
        let s = Segment::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));
        let corners = line_buffer(s, 4.0);
        assert!((corners[0].y - 2.0).abs() < 1e-9);
        assert!((corners[2].y + 2.0).abs() < 1e-9);
    }

    #[test]
    fn transform_segment_applies_to_both_endpoints() {
        let trf = Translation::new(1.0, 2.0);
        let s = Segment::new(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        let out = transform_segment(s, &trf, Order::Direct).unwrap();
        assert_eq!(out.p1, Point2::new(1.0, 2.0));
        assert_eq!(out.p2, Point2::new(2.0, 3.0));
    }
}
