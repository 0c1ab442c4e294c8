// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line segments between two [`Point2`] endpoints.

use crate::geometry::point::Point2;
use crate::geometry::window::Window;
use crate::numeric::vector::{angle_ox, angle_oy};

/// A directed segment between two endpoints, the unit the line detector and
/// the grouping/joining algorithms operate on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// First endpoint.
    pub p1: Point2,
    /// Second endpoint.
    pub p2: Point2,
}

impl Segment {
    /// Builds a segment from its two endpoints.
    #[must_use]
    pub const fn new(p1: Point2, p2: Point2) -> Self {
        Self { p1, p2 }
    }

    /// Segment length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.p1.distance(&self.p2)
    }

    /// Angle, in radians, between the segment and the positive `x` axis.
    #[must_use]
    pub fn angle_ox(&self) -> f64 {
        angle_ox(self.p2.x - self.p1.x, self.p2.y - self.p1.y)
    }

    /// Angle, in radians, between the segment and the positive `y` axis.
    #[must_use]
    pub fn angle_oy(&self) -> f64 {
        angle_oy(self.p2.x - self.p1.x, self.p2.y - self.p1.y)
    }

    /// Midpoint of the segment.
    #[must_use]
    pub fn midpoint(&self) -> Point2 {
        Point2::new((self.p1.x + self.p2.x) * 0.5, (self.p1.y + self.p2.y) * 0.5)
    }

    /// Smallest axis-aligned window containing both endpoints.
    #[must_use]
    pub fn bounding_window(&self) -> Window {
        Window::new(self.p1, self.p2)
    }
}
