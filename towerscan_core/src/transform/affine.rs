// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Affine transform: `x' = a*x + b*y + tx`, `y' = c*x + d*y + ty`, 6
//! unknowns, general (non-uniform) scale + shear + rotation + translation.

use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::geometry::point::Point2;
use crate::numeric::matrix::Matrix;
use crate::numeric::solve::solve_least_squares;
use crate::transform::{fit_report, validate_fit_input, FitReport, Order, Transform};

/// A general affine transform, 6 unknowns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    tx: f64,
    ty: f64,
}

impl Affine {
    /// Builds a transform directly from its coefficients.
    #[must_use]
    pub const fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    /// The identity transform.
    #[must_use]
    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Recovered `x` scale, `s_x = ||(a, c)||`.
    #[must_use]
    pub fn scale_x(&self) -> f64 {
        (self.a * self.a + self.c * self.c).sqrt()
    }

    /// Recovered `y` scale, `s_y = ||(b, d)||`.
    #[must_use]
    pub fn scale_y(&self) -> f64 {
        (self.b * self.b + self.d * self.d).sqrt()
    }

    /// Recovered rotation, `theta = 0.5 * (atan2(c, a) + atan2(-b, d))`.
    #[must_use]
    pub fn rotation(&self) -> f64 {
        0.5 * (self.c.atan2(self.a) + (-self.b).atan2(self.d))
    }

    fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform for Affine {
    fn compute(&mut self, pts_src: &[Point2], pts_dst: &[Point2]) -> Result<FitReport> {
        validate_fit_input(pts_src, pts_dst, self.minimum_points())?;
        let n = pts_src.len();
        let mut rows = Vec::with_capacity(n * 2 * 6);
        let mut rhs = Vec::with_capacity(n * 2);
        for (src, dst) in pts_src.iter().zip(pts_dst.iter()) {
            rows.extend_from_slice(&[src.x, src.y, 0.0, 0.0, 1.0, 0.0]);
            rhs.push(dst.x);
            rows.extend_from_slice(&[0.0, 0.0, src.x, src.y, 0.0, 1.0]);
            rhs.push(dst.y);
        }
        let a_matrix = Matrix::from_row_major(n * 2, 6, rows)?;
        let x = solve_least_squares(&a_matrix, &rhs)?;
        let fitted = Self::new(x[0], x[1], x[2], x[3], x[4], x[5]);
        let report = fit_report(&fitted, pts_src, pts_dst)?;
        *self = fitted;
        Ok(report)
    }

    fn transform(&self, point_in: Point2, order: Order) -> Result<Point2> {
        match order {
            Order::Direct => Ok(Point2::new(
                self.a * point_in.x + self.b * point_in.y + self.tx,
                self.c * point_in.x + self.d * point_in.y + self.ty,
            )),
            Order::Inverse => {
                let det = self.determinant();
                if det.abs() < f64::EPSILON {
                    return Err(Error::NumericFailure("affine transform is not invertible".into()));
                }
                let inv_det = 1.0 / det;
                let ia = self.d * inv_det;
                let ib = -self.b * inv_det;
                let ic = -self.c * inv_det;
                let id = self.a * inv_det;
                let dx = point_in.x - self.tx;
                let dy = point_in.y - self.ty;
                Ok(Point2::new(ia * dx + ib * dy, ic * dx + id * dy))
            }
        }
    }

    fn is_null(&self) -> bool {
        (self.a - 1.0).abs() < 1e-9
            && self.b.abs() < 1e-9
            && self.c.abs() < 1e-9
            && (self.d - 1.0).abs() < 1e-9
            && self.tx.abs() < 1e-9
            && self.ty.abs() < 1e-9
    }

    fn minimum_points(&self) -> usize {
        3
    }
}
