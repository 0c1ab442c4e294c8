// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Least-squares solving via the SVD pseudo-inverse.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::numeric::matrix::Matrix;
use crate::numeric::svd::svd;

/// Solves `A x = b` in the least-squares sense, returning the `x` that
/// minimizes `||A x - b||_2` (Moore-Penrose pseudo-inverse semantics).
///
/// Singular values below `0.5 * sqrt(m + n + 1) * sigma_max * f64::EPSILON`
/// are treated as zero and contribute nothing to the solution, per the
/// conventional SVD truncation threshold.
pub fn solve_least_squares(a: &Matrix, b: &[f64]) -> Result<Vec<f64>> {
    let m = a.rows();
    let n = a.cols();
    if b.len() != m {
        return Err(Error::SizeMismatch { lhs: m, rhs: b.len() });
    }
    if m == 0 || n == 0 {
        return Err(Error::DataEmpty("least-squares solve received an empty system".into()));
    }

    let decomposition = svd(a)?;
    let sigma_max = decomposition.s.first().copied().unwrap_or(0.0);
    let threshold = 0.5 * ((m + n + 1) as f64).sqrt() * sigma_max * f64::EPSILON;

    // x = V * Sigma^+ * U^T * b
    let mut utb = vec![0.0_f64; n];
    for j in 0..n {
        let mut acc = 0.0;
        for i in 0..m {
            acc += decomposition.u[(i, j)] * b[i];
        }
        utb[j] = acc;
    }

    let mut scaled = vec![0.0_f64; n];
    for j in 0..n {
        scaled[j] = if decomposition.s[j] > threshold {
            utb[j] / decomposition.s[j]
        } else {
            0.0
        };
    }

    let mut x = vec![0.0_f64; n];
    for i in 0..n {
        let mut acc = 0.0;
        for j in 0..n {
            acc += decomposition.v[(i, j)] * scaled[j];
        }
        x[i] = acc;
    }

    Ok(x)
}
