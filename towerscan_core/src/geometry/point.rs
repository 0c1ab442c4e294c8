// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 2D and 3D points.

/// A point in the plane, generic over its scalar type. `f64` is the working
/// representation used by every geometric and transform computation;
/// integer instantiations (`Point2<i32>`, `Point2<u32>`) are for callers
/// indexing pixels.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
pub struct Point2<T = f64> {
    /// Horizontal coordinate.
    pub x: T,
    /// Vertical coordinate.
    pub y: T,
}

impl<T> Point2<T> {
    /// Builds a point from its coordinates.
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl Point2<f64> {
    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<Point2<f64>> for kurbo::Point {
    fn from(p: Point2<f64>) -> Self {
        kurbo::Point::new(p.x, p.y)
    }
}

impl From<kurbo::Point> for Point2<f64> {
    fn from(p: kurbo::Point) -> Self {
        Self::new(p.x, p.y)
    }
}

/// A point in space, generic over its scalar type. No `kurbo` type covers
/// 3D, so this is a plain hand-written counterpart to [`Point2`].
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
pub struct Point3<T = f64> {
    /// First coordinate.
    pub x: T,
    /// Second coordinate.
    pub y: T,
    /// Third coordinate.
    pub z: T,
}

impl<T> Point3<T> {
    /// Builds a point from its coordinates.
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
}

impl Point3<f64> {
    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point2_distance_is_pythagorean() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn point2_round_trips_through_kurbo() {
        let p = Point2::new(1.5, -2.5);
        let k: kurbo::Point = p.into();
        let back: Point2<f64> = k.into();
        assert_eq!(p, back);
    }

    #[test]
    fn point3_distance_is_pythagorean() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(2.0, 3.0, 6.0);
        assert!((a.distance(&b) - 7.0).abs() < 1e-12);
    }
}
