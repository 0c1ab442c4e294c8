// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Normalized 8-point fundamental matrix estimation and a RANSAC wrapper
//! around it, used by the matcher's RANSAC `getGoodMatches` mode.

use towerscan_core::feature::{KeyPointSet, Match};
use towerscan_core::geometry::Point2;
use towerscan_core::numeric::{solve_least_squares, svd, Matrix};

/// A minimal, self-contained splitmix64 generator: RANSAC only needs
/// uniform index sampling, not a general-purpose PRNG, so no external
/// dependency is pulled in for it.
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn index_below(&mut self, bound: usize) -> usize {
        (self.next_u64() as usize) % bound
    }
}

fn normalize(points: &[Point2]) -> (Vec<Point2>, Matrix) {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.y).sum::<f64>() / n;
    let mean_dist = points.iter().map(|p| ((p.x - mean_x).powi(2) + (p.y - mean_y).powi(2)).sqrt()).sum::<f64>() / n;
    let scale = if mean_dist > 1e-12 { core::f64::consts::SQRT_2 / mean_dist } else { 1.0 };

    let normalized = points.iter().map(|p| Point2::new((p.x - mean_x) * scale, (p.y - mean_y) * scale)).collect();
    let t = Matrix::from_row_major(3, 3, vec![scale, 0.0, -scale * mean_x, 0.0, scale, -scale * mean_y, 0.0, 0.0, 1.0])
        .expect("3x3 literal matches its shape");
    (normalized, t)
}

/// Estimates the fundamental matrix from `n >= 8` correspondences via the
/// normalized 8-point algorithm, enforcing the rank-2 constraint.
pub fn estimate_fundamental_8point(correspondences: &[(Point2, Point2)]) -> Option<Matrix> {
    if correspondences.len() < 8 {
        return None;
    }
    let (src, dst): (Vec<Point2>, Vec<Point2>) = correspondences.iter().copied().unzip();
    let (src_n, t1) = normalize(&src);
    let (dst_n, t2) = normalize(&dst);

    // Build A^T A directly (9x9) rather than the n x 9 design matrix, so
    // the null-space solve works via `svd` regardless of how many
    // correspondences were supplied (svd here requires rows >= cols).
    let mut ata = Matrix::zeros(9, 9);
    for (p, q) in src_n.iter().zip(dst_n.iter()) {
        let row = [p.x * q.x, p.y * q.x, q.x, p.x * q.y, p.y * q.y, q.y, p.x, p.y, 1.0];
        for i in 0..9 {
            for j in 0..9 {
                ata[(i, j)] += row[i] * row[j];
            }
        }
    }

    let decomposition = svd(&ata).ok()?;
    let last = decomposition.v.cols() - 1;
    let h: Vec<f64> = (0..9).map(|i| decomposition.v[(i, last)]).collect();
    let f0 = Matrix::from_row_major(3, 3, h).ok()?;

    // Rank-2 constraint: zero the smallest singular value of F0.
    let inner = svd(&f0).ok()?;
    let mut s = inner.s.clone();
    if let Some(last) = s.last_mut() {
        *last = 0.0;
    }
    let sigma = Matrix::from_row_major(3, 3, vec![s[0], 0.0, 0.0, 0.0, s[1], 0.0, 0.0, 0.0, s[2]]).ok()?;
    let f_rank2 = inner.u.matmul(&sigma).ok()?.matmul(&inner.v.transpose()).ok()?;

    let f = t2.transpose().matmul(&f_rank2).ok()?.matmul(&t1).ok()?;
    Some(f)
}

fn sampson_distance(f: &Matrix, p: Point2, q: Point2) -> f64 {
    let x1 = [p.x, p.y, 1.0];
    let x2 = [q.x, q.y, 1.0];
    let fx1 = [
        f[(0, 0)] * x1[0] + f[(0, 1)] * x1[1] + f[(0, 2)] * x1[2],
        f[(1, 0)] * x1[0] + f[(1, 1)] * x1[1] + f[(1, 2)] * x1[2],
        f[(2, 0)] * x1[0] + f[(2, 1)] * x1[1] + f[(2, 2)] * x1[2],
    ];
    let ftx2 = [
        f[(0, 0)] * x2[0] + f[(1, 0)] * x2[1] + f[(2, 0)] * x2[2],
        f[(0, 1)] * x2[0] + f[(1, 1)] * x2[1] + f[(2, 1)] * x2[2],
        f[(0, 2)] * x2[0] + f[(1, 2)] * x2[1] + f[(2, 2)] * x2[2],
    ];
    let x2tfx1 = x2[0] * fx1[0] + x2[1] * fx1[1] + x2[2] * fx1[2];
    let denom = fx1[0].powi(2) + fx1[1].powi(2) + ftx2[0].powi(2) + ftx2[1].powi(2);
    if denom < 1e-12 {
        f64::INFINITY
    } else {
        x2tfx1 * x2tfx1 / denom
    }
}

const MAX_RANSAC_ITERATIONS: usize = 500;

/// RANSAC-fits a fundamental matrix to `matches`, returning the fitted
/// matrix and a boolean inlier mask in `matches`' order. `distance` is the
/// Sampson-distance inlier threshold; `confidence` drives the adaptive
/// iteration count (standard `N = log(1-p) / log(1-w^s)` schedule, capped
/// at [`MAX_RANSAC_ITERATIONS`]).
#[must_use]
pub fn ransac_fundamental(matches: &[Match], query: &KeyPointSet, train: &KeyPointSet, distance: f64, confidence: f64) -> Option<(Matrix, Vec<bool>)> {
    if matches.len() < 8 {
        return None;
    }
    let correspondences: Vec<(Point2, Point2)> = matches
        .iter()
        .map(|m| (query.keypoints()[m.query_index].position, train.keypoints()[m.train_index].position))
        .collect();

    let mut rng = SplitMix64::new(0xC0FF_EE00_D15E_A5E5);
    let mut best_inliers = 0usize;
    let mut best_f: Option<Matrix> = None;
    let mut best_mask = vec![false; matches.len()];

    let mut required_iterations = MAX_RANSAC_ITERATIONS;
    let mut iteration = 0;
    while iteration < required_iterations.min(MAX_RANSAC_ITERATIONS) {
        iteration += 1;
        let mut sample_indices = Vec::with_capacity(8);
        while sample_indices.len() < 8 {
            let candidate = rng.index_below(correspondences.len());
            if !sample_indices.contains(&candidate) {
                sample_indices.push(candidate);
            }
        }
        let sample: Vec<(Point2, Point2)> = sample_indices.iter().map(|&i| correspondences[i]).collect();
        let Some(f) = estimate_fundamental_8point(&sample) else { continue };

        let mask: Vec<bool> = correspondences.iter().map(|&(p, q)| sampson_distance(&f, p, q) <= distance * distance).collect();
        let inlier_count = mask.iter().filter(|&&b| b).count();
        if inlier_count > best_inliers {
            best_inliers = inlier_count;
            best_f = Some(f);
            best_mask = mask;

            let inlier_ratio = (inlier_count as f64 / correspondences.len() as f64).max(1e-3);
            let denom = (1.0 - inlier_ratio.powi(8)).ln();
            if denom < 0.0 {
                let estimate = ((1.0 - confidence).ln() / denom).ceil();
                if estimate.is_finite() && estimate >= 1.0 {
                    required_iterations = (estimate as usize).min(MAX_RANSAC_ITERATIONS);
                }
            }
        }
    }

    best_f.map(|f| (f, best_mask))
}

/// Exposed for callers that want least-squares affine prealignment of the
/// inlier set before a transform fit; shares the core crate's solver
/// rather than re-deriving a normal-equations solve here.
pub fn refine_inlier_centroid(points: &[Point2]) -> Option<Point2> {
    if points.is_empty() {
        return None;
    }
    let a = Matrix::from_row_major(points.len(), 1, vec![1.0; points.len()]).ok()?;
    let bx: Vec<f64> = points.iter().map(|p| p.x).collect();
    let by: Vec<f64> = points.iter().map(|p| p.y).collect();
    let x = solve_least_squares(&a, &bx).ok()?;
    let y = solve_least_squares(&a, &by).ok()?;
    Some(Point2::new(x[0], y[0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use towerscan_core::feature::KeyPoint;

    fn identity_homography_correspondences() -> Vec<(Point2, Point2)> {
        (0..12)
            .map(|i| {
                let x = (i as f64) * 3.0;
                let y = ((i * 7) % 11) as f64;
                (Point2::new(x, y), Point2::new(x + 2.0, y - 1.0))
            })
            .collect()
    }

    #[test]
    fn estimate_fundamental_needs_at_least_8_points() {
        let correspondences = identity_homography_correspondences();
        assert!(estimate_fundamental_8point(&correspondences[..7]).is_none());
        assert!(estimate_fundamental_8point(&correspondences).is_some());
    }

    #[test]
    fn fundamental_matrix_has_rank_two() {
        let correspondences = identity_homography_correspondences();
        let f = estimate_fundamental_8point(&correspondences).unwrap();
        let det = f.determinant().unwrap();
        assert!(det.abs() < 1e-6, "rank-2 constraint should zero the determinant, got {det}");
    }

    #[test]
    fn ransac_recovers_a_fundamental_matrix_with_outliers() {
        let mut correspondences = identity_homography_correspondences();
        correspondences.push((Point2::new(0.0, 0.0), Point2::new(500.0, 500.0)));
        correspondences.push((Point2::new(1.0, 1.0), Point2::new(-500.0, 500.0)));

        let query = KeyPointSet::from_points(correspondences.iter().map(|&(p, _)| KeyPoint::new(p, 1.0, 1.0, 0.0)).collect());
        let train = KeyPointSet::from_points(correspondences.iter().map(|&(_, q)| KeyPoint::new(q, 1.0, 1.0, 0.0)).collect());
        let matches: Vec<Match> = (0..correspondences.len()).map(|i| Match::new(i, i, 0.0)).collect();

        let (_, inliers) = ransac_fundamental(&matches, &query, &train, 1.0, 0.99).unwrap();
        assert!(inliers.iter().filter(|&&b| b).count() >= correspondences.len() - 2);
    }
}
