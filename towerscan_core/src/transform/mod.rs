// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The planar transform family: one [`Transform`] trait, four concrete
//! fits (translation, Helmert-2D, affine, projective), and
//! [`TransformChain`] composition.

mod affine;
mod chain;
mod helmert2d;
mod projective;
mod translation;

pub use affine::Affine;
pub use chain::TransformChain;
pub use helmert2d::Helmert2d;
pub use projective::Projective;
pub use translation::Translation;

use alloc::vec::Vec;

#[cfg(feature = "std")]
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::geometry::point::Point2;

/// Direction a [`Transform`] is applied in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    /// Source → destination.
    Direct,
    /// Destination → source.
    Inverse,
}

/// The outcome of a successful [`Transform::compute`] fit.
#[derive(Clone, Debug, PartialEq)]
pub struct FitReport {
    /// Per-point residual magnitude `||trf(src_i) - dst_i||`.
    pub residuals: Vec<f64>,
    /// Root-mean-square error across the fit, `sqrt(sum(residual^2) / (d *
    /// (n - m)))` with `d = 2` and `m` the transform's minimum point
    /// count. Zero when `n == m` (a fit with no spare degrees of freedom
    /// has nothing to average an error over).
    pub rmse: f64,
}

/// The interface every planar transform in this crate implements: fitting
/// from point correspondences, applying forward/inverse, and reporting
/// whether the transform is (numerically) the identity.
pub trait Transform {
    /// Fits the transform's parameters to minimize squared residuals
    /// between `trf(pts_src_i)` and `pts_dst_i`. Fails with
    /// `Error::InsufficientPoints` if fewer than [`Transform::minimum_points`]
    /// correspondences are given, `Error::SizeMismatch` if the two lists
    /// differ in length. On any numeric failure the transform's previous
    /// state (if any) is left intact and `Error::NumericFailure` is
    /// returned.
    fn compute(&mut self, pts_src: &[Point2], pts_dst: &[Point2]) -> Result<FitReport>;

    /// Applies the transform to a single point, in the given direction.
    fn transform(&self, point_in: Point2, order: Order) -> Result<Point2>;

    /// Applies the transform to a list of points, in the given direction.
    /// The default implementation maps [`Transform::transform`] over each
    /// point sequentially; [`TransformBase::transform_parallel`]-style
    /// fan-out is opt-in (the `std` feature) since it needs a thread pool.
    fn transform_batch(&self, pts_in: &[Point2], order: Order) -> Result<Vec<Point2>> {
        pts_in.iter().map(|&p| self.transform(p, order)).collect()
    }

    /// True iff the transform is the identity, within numerical tolerance.
    fn is_null(&self) -> bool;

    /// The minimum number of point correspondences `compute` needs.
    fn minimum_points(&self) -> usize;
}

/// Applies `transform_batch` using a work-stealing parallel-for instead of
/// a sequential loop. Requires the `std` feature (needs a thread pool).
#[cfg(feature = "std")]
pub fn transform_parallel<T: Transform + Sync>(trf: &T, pts_in: &[Point2], order: Order) -> Result<Vec<Point2>> {
    pts_in.par_iter().map(|&p| trf.transform(p, order)).collect()
}

/// Shared RMSE/residual computation used by every concrete fit: given the
/// already-fitted transform, the correspondences it was fit from, and its
/// `minimum_points()`, computes the [`FitReport`].
pub(crate) fn fit_report(trf: &dyn Transform, pts_src: &[Point2], pts_dst: &[Point2]) -> Result<FitReport> {
    let n = pts_src.len();
    let m = trf.minimum_points();
    let mut residuals = Vec::with_capacity(n);
    let mut sum_sq = 0.0_f64;
    for (src, dst) in pts_src.iter().zip(pts_dst.iter()) {
        let mapped = trf.transform(*src, Order::Direct)?;
        let r = mapped.distance(dst);
        sum_sq += r * r;
        residuals.push(r);
    }
    let denom = 2.0 * (n.saturating_sub(m)) as f64;
    let rmse = if denom > 0.0 { (sum_sq / denom).sqrt() } else { 0.0 };
    Ok(FitReport { residuals, rmse })
}

pub(crate) fn validate_fit_input(pts_src: &[Point2], pts_dst: &[Point2], minimum_points: usize) -> Result<()> {
    if pts_src.len() != pts_dst.len() {
        return Err(Error::SizeMismatch {
            lhs: pts_src.len(),
            rhs: pts_dst.len(),
        });
    }
    if pts_src.len() < minimum_points {
        return Err(Error::InsufficientPoints {
            needed: minimum_points,
            got: pts_src.len(),
        });
    }
    Ok(())
}
