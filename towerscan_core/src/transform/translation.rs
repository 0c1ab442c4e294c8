// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pure translation, the simplest transform in the family.

use crate::error::Result;
use crate::geometry::point::Point2;
use crate::transform::{fit_report, validate_fit_input, FitReport, Order, Transform};

/// A pure translation `(tx, ty)`. One point correspondence determines it
/// exactly; more are averaged in the least-squares sense.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Translation {
    tx: f64,
    ty: f64,
}

impl Translation {
    /// Builds a translation directly from its offsets.
    #[must_use]
    pub const fn new(tx: f64, ty: f64) -> Self {
        Self { tx, ty }
    }

    /// The identity translation.
    #[must_use]
    pub const fn identity() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl Default for Translation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform for Translation {
    fn compute(&mut self, pts_src: &[Point2], pts_dst: &[Point2]) -> Result<FitReport> {
        validate_fit_input(pts_src, pts_dst, self.minimum_points())?;
        let n = pts_src.len() as f64;
        let (mut sum_x, mut sum_y) = (0.0, 0.0);
        for (src, dst) in pts_src.iter().zip(pts_dst.iter()) {
            sum_x += dst.x - src.x;
            sum_y += dst.y - src.y;
        }
        let fitted = Self::new(sum_x / n, sum_y / n);
        let report = fit_report(&fitted, pts_src, pts_dst)?;
        *self = fitted;
        Ok(report)
    }

    fn transform(&self, point_in: Point2, order: Order) -> Result<Point2> {
        Ok(match order {
            Order::Direct => Point2::new(point_in.x + self.tx, point_in.y + self.ty),
            Order::Inverse => Point2::new(point_in.x - self.tx, point_in.y - self.ty),
        })
    }

    fn is_null(&self) -> bool {
        self.tx.abs() < 1e-9 && self.ty.abs() < 1e-9
    }

    fn minimum_points(&self) -> usize {
        1
    }
}
