// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Projective (homography) transform: 8 unknowns with the conventional
//! `h33 = 1` normalization, fit via the direct linear transform.

use alloc::vec::Vec;
use core::cell::RefCell;

use crate::error::{Error, Result};
use crate::geometry::point::Point2;
use crate::numeric::matrix::Matrix;
use crate::numeric::solve::solve_least_squares;
use crate::transform::{fit_report, validate_fit_input, FitReport, Order, Transform};

/// A projective transform (planar homography), 8 unknowns with `h33`
/// fixed at `1`.
///
/// The inverse is a general 3x3 matrix inverse, the one case in this
/// family where the fit is expensive enough to be worth caching; the
/// cache is a `RefCell` (this type is therefore not `Sync`, so it is not
/// usable with [`crate::transform::transform_parallel`]) invalidated on
/// every successful [`Transform::compute`].
#[derive(Debug)]
pub struct Projective {
    h: Matrix,
    inverse: RefCell<Option<Matrix>>,
}

impl Clone for Projective {
    fn clone(&self) -> Self {
        Self {
            h: self.h.clone(),
            inverse: RefCell::new(self.inverse.borrow().clone()),
        }
    }
}

impl PartialEq for Projective {
    fn eq(&self, other: &Self) -> bool {
        self.h == other.h
    }
}

impl Projective {
    /// Builds a transform directly from its 8 coefficients (row-major
    /// `h11, h12, h13, h21, h22, h23, h31, h32`); `h33` is fixed at `1`.
    #[must_use]
    pub fn new(coeffs: [f64; 8]) -> Self {
        let [h11, h12, h13, h21, h22, h23, h31, h32] = coeffs;
        let h = Matrix::from_row_major(3, 3, alloc::vec![h11, h12, h13, h21, h22, h23, h31, h32, 1.0])
            .expect("9 elements for a 3x3 matrix");
        Self { h, inverse: RefCell::new(None) }
    }

    /// The identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self::new([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0])
    }

    fn apply_matrix(h: &Matrix, p: Point2) -> Point2 {
        let w = h[(2, 0)] * p.x + h[(2, 1)] * p.y + h[(2, 2)];
        Point2::new(
            (h[(0, 0)] * p.x + h[(0, 1)] * p.y + h[(0, 2)]) / w,
            (h[(1, 0)] * p.x + h[(1, 1)] * p.y + h[(1, 2)]) / w,
        )
    }
}

impl Default for Projective {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform for Projective {
    fn compute(&mut self, pts_src: &[Point2], pts_dst: &[Point2]) -> Result<FitReport> {
        validate_fit_input(pts_src, pts_dst, self.minimum_points())?;
        let n = pts_src.len();
        let mut rows = Vec::with_capacity(n * 2 * 8);
        let mut rhs = Vec::with_capacity(n * 2);
        for (src, dst) in pts_src.iter().zip(pts_dst.iter()) {
            rows.extend_from_slice(&[src.x, src.y, 1.0, 0.0, 0.0, 0.0, -src.x * dst.x, -src.y * dst.x]);
            rhs.push(dst.x);
            rows.extend_from_slice(&[0.0, 0.0, 0.0, src.x, src.y, 1.0, -src.x * dst.y, -src.y * dst.y]);
            rhs.push(dst.y);
        }
        let a_matrix = Matrix::from_row_major(n * 2, 8, rows)?;
        let x = solve_least_squares(&a_matrix, &rhs)?;
        let fitted = Self::new([x[0], x[1], x[2], x[3], x[4], x[5], x[6], x[7]]);
        let report = fit_report(&fitted, pts_src, pts_dst)?;
        self.h = fitted.h;
        *self.inverse.borrow_mut() = None;
        Ok(report)
    }

    fn transform(&self, point_in: Point2, order: Order) -> Result<Point2> {
        match order {
            Order::Direct => Ok(Self::apply_matrix(&self.h, point_in)),
            Order::Inverse => {
                if self.inverse.borrow().is_none() {
                    let inv = self.h.inverse()?;
                    *self.inverse.borrow_mut() = Some(inv);
                }
                let borrowed = self.inverse.borrow();
                let inv = borrowed.as_ref().expect("just populated above");
                Ok(Self::apply_matrix(inv, point_in))
            }
        }
    }

    fn is_null(&self) -> bool {
        self.h == Matrix::identity(3)
    }

    fn minimum_points(&self) -> usize {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_null() {
        assert!(Projective::identity().is_null());
    }

    #[test]
    fn maps_unit_square_to_quadrilateral() {
        let src = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let dst = [
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(3.0, 3.0),
            Point2::new(-1.0, 2.0),
        ];
        let mut t = Projective::identity();
        let report = t.compute(&src, &dst).unwrap();
        assert!(report.rmse < 1e-5);
        for (s, d) in src.iter().zip(dst.iter()) {
            let mapped = t.transform(*s, Order::Direct).unwrap();
            assert!((mapped.x - d.x).abs() < 1e-5);
            assert!((mapped.y - d.y).abs() < 1e-5);
        }
    }

    #[test]
    fn forward_then_inverse_round_trips() {
        let src = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let dst = [
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(3.0, 3.0),
            Point2::new(-1.0, 2.0),
        ];
        let mut t = Projective::identity();
        t.compute(&src, &dst).unwrap();
        let p = Point2::new(0.3, 0.6);
        let fwd = t.transform(p, Order::Direct).unwrap();
        let back = t.transform(fwd, Order::Inverse).unwrap();
        assert!((back.x - p.x).abs() < 1e-6 && (back.y - p.y).abs() < 1e-6);
    }
}
