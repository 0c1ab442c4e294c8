// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Helmert-2D (similarity) transform: uniform scale, rotation, and
//! translation, `x' = a*x - b*y + tx`, `y' = b*x + a*y + ty` with
//! `a = s*cos(theta)`, `b = s*sin(theta)`.

use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::geometry::point::Point2;
use crate::numeric::matrix::Matrix;
use crate::numeric::solve::solve_least_squares;
use crate::transform::{fit_report, validate_fit_input, FitReport, Order, Transform};

/// A Helmert-2D similarity transform: uniform scale + rotation +
/// translation, 4 unknowns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Helmert2d {
    a: f64,
    b: f64,
    tx: f64,
    ty: f64,
}

impl Helmert2d {
    /// Builds a transform directly from its coefficients.
    #[must_use]
    pub const fn new(a: f64, b: f64, tx: f64, ty: f64) -> Self {
        Self { a, b, tx, ty }
    }

    /// The identity transform.
    #[must_use]
    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Recovered scale `s = sqrt(a^2 + b^2)`.
    #[must_use]
    pub fn scale(&self) -> f64 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    /// Recovered rotation angle `theta = atan2(b, a)`, in radians.
    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.b.atan2(self.a)
    }

    fn determinant(&self) -> f64 {
        self.a * self.a + self.b * self.b
    }
}

impl Default for Helmert2d {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform for Helmert2d {
    fn compute(&mut self, pts_src: &[Point2], pts_dst: &[Point2]) -> Result<FitReport> {
        validate_fit_input(pts_src, pts_dst, self.minimum_points())?;
        let n = pts_src.len();
        let mut rows = Vec::with_capacity(n * 2 * 4);
        let mut rhs = Vec::with_capacity(n * 2);
        for (src, dst) in pts_src.iter().zip(pts_dst.iter()) {
            rows.extend_from_slice(&[src.x, -src.y, 1.0, 0.0]);
            rhs.push(dst.x);
            rows.extend_from_slice(&[src.y, src.x, 0.0, 1.0]);
            rhs.push(dst.y);
        }
        let a_matrix = Matrix::from_row_major(n * 2, 4, rows)?;
        let x = solve_least_squares(&a_matrix, &rhs)?;
        let fitted = Self::new(x[0], x[1], x[2], x[3]);
        let report = fit_report(&fitted, pts_src, pts_dst)?;
        self.a = fitted.a;
        self.b = fitted.b;
        self.tx = fitted.tx;
        self.ty = fitted.ty;
        Ok(report)
    }

    fn transform(&self, point_in: Point2, order: Order) -> Result<Point2> {
        match order {
            Order::Direct => Ok(Point2::new(
                self.a * point_in.x - self.b * point_in.y + self.tx,
                self.b * point_in.x + self.a * point_in.y + self.ty,
            )),
            Order::Inverse => {
                let det = self.determinant();
                if det.abs() < f64::EPSILON {
                    return Err(Error::NumericFailure("Helmert-2D transform is not invertible".into()));
                }
                let a_inv = self.a / det;
                let b_inv = -self.b / det;
                let tx_inv = -(self.a * self.tx + self.b * self.ty) / det;
                let ty_inv = (self.b * self.tx - self.a * self.ty) / det;
                Ok(Point2::new(
                    a_inv * point_in.x - b_inv * point_in.y + tx_inv,
                    b_inv * point_in.x + a_inv * point_in.y + ty_inv,
                ))
            }
        }
    }

    fn is_null(&self) -> bool {
        (self.a - 1.0).abs() < 1e-9 && self.b.abs() < 1e-9 && self.tx.abs() < 1e-9 && self.ty.abs() < 1e-9
    }

    fn minimum_points(&self) -> usize {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_null() {
        assert!(Helmert2d::identity().is_null());
    }

    #[test]
    fn recovers_pure_rotation() {
        let src = [Point2::new(1.0, 0.0), Point2::new(0.0, 1.0), Point2::new(-1.0, 0.0)];
        // 90 degree rotation, counter-clockwise.
        let dst = [Point2::new(0.0, 1.0), Point2::new(-1.0, 0.0), Point2::new(0.0, -1.0)];
        let mut t = Helmert2d::identity();
        let report = t.compute(&src, &dst).unwrap();
        assert!(report.rmse < 1e-6);
        assert!((t.rotation() - core::f64::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((t.scale() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn forward_then_inverse_round_trips() {
        let t = Helmert2d::new(0.5, 0.8, 3.0, -1.0);
        let p = Point2::new(2.0, 5.0);
        let fwd = t.transform(p, Order::Direct).unwrap();
        let back = t.transform(fwd, Order::Inverse).unwrap();
        assert!((back.x - p.x).abs() < 1e-9 && (back.y - p.y).abs() < 1e-9);
    }
}
