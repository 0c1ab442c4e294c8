// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Groups of segments produced by the line detector's distance-based
//! grouping pass.

use alloc::vec::Vec;

use crate::geometry::point::Point2;
use crate::geometry::segment::Segment;
use crate::geometry::window::Window;

/// A group of segments considered to belong to the same physical line (or
/// line-like structure), with a cached bounding window and centroid.
///
/// The cache is only ever recomputed by [`LineGroup::push`]/[`LineGroup::new`]
/// — nothing else in this type mutates the member list, matching the
/// contract that only the grouper (`towerscan_imaging::linedetector::
/// group_lines_by_dist`) ever builds or extends a `LineGroup`.
#[derive(Clone, Debug, PartialEq)]
pub struct LineGroup {
    segments: Vec<Segment>,
    bounding_window: Window,
    centroid: Point2,
}

impl LineGroup {
    /// Builds a group from its member segments. Panics if `segments` is
    /// empty — a group with no members is not a meaningful value.
    #[must_use]
    pub fn new(segments: Vec<Segment>) -> Self {
        assert!(!segments.is_empty(), "a LineGroup must have at least one segment");
        let mut group = Self {
            segments,
            bounding_window: Window::empty(),
            centroid: Point2::new(0.0, 0.0),
        };
        group.recompute_cache();
        group
    }

    /// Appends a segment to the group and refreshes the cache.
    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
        self.recompute_cache();
    }

    /// The group's member segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The smallest window containing every member segment.
    #[must_use]
    pub const fn bounding_window(&self) -> Window {
        self.bounding_window
    }

    /// The centroid of every segment endpoint in the group.
    #[must_use]
    pub const fn centroid(&self) -> Point2 {
        self.centroid
    }

    fn recompute_cache(&mut self) {
        let mut window = self.segments[0].bounding_window();
        let mut sum = Point2::new(0.0, 0.0);
        let mut count = 0.0_f64;
        for segment in &self.segments {
            let segment_window = segment.bounding_window();
            window = Window::new(
                Point2::new(window.min().x.min(segment_window.min().x), window.min().y.min(segment_window.min().y)),
                Point2::new(window.max().x.max(segment_window.max().x), window.max().y.max(segment_window.max().y)),
            );
            for p in [segment.p1, segment.p2] {
                sum.x += p.x;
                sum.y += p.y;
                count += 1.0;
            }
        }
        self.bounding_window = window;
        self.centroid = Point2::new(sum.x / count, sum.y / count);
    }
}
