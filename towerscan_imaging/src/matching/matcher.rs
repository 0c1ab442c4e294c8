// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Brute-force descriptor matching, `getGoodMatches` filter modes, and the
//! ratio+symmetry `RobustMatching` combinator.

use towerscan_core::feature::{DescriptorMatrix, KeyPointSet, Match, MatchList};

use crate::matching::fundamental::ransac_fundamental;

/// Which distance metric a [`Matcher`] scores candidate pairs under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatcherKind {
    /// Sum of absolute differences.
    L1,
    /// Euclidean distance.
    L2,
    /// Popcount of the XOR between binarized descriptor rows; intended for
    /// binary descriptors, but works over any row by thresholding at zero.
    Hamming,
}

fn distance(kind: MatcherKind, a: &[f32], b: &[f32]) -> f32 {
    match kind {
        MatcherKind::L1 => a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum(),
        MatcherKind::L2 => a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f32>().sqrt(),
        MatcherKind::Hamming => a.iter().zip(b).filter(|(x, y)| (**x > 0.0) != (**y > 0.0)).count() as f32,
    }
}

/// Brute-force descriptor matcher.
#[derive(Clone, Copy, Debug)]
pub struct Matcher {
    kind: MatcherKind,
}

impl Matcher {
    /// Builds a matcher under the given metric.
    #[must_use]
    pub const fn new(kind: MatcherKind) -> Self {
        Self { kind }
    }

    /// Writes the unfiltered match list: for every query row, the single
    /// best-scoring train row.
    #[must_use]
    pub fn match_descriptors(&self, query: &DescriptorMatrix, train: &DescriptorMatrix) -> MatchList {
        let mut matches = Vec::with_capacity(query.rows());
        for q in 0..query.rows() {
            let mut best = (0usize, f32::INFINITY);
            for t in 0..train.rows() {
                let d = distance(self.kind, query.row(q), train.row(t));
                if d < best.1 {
                    best = (t, d);
                }
            }
            if best.1.is_finite() {
                matches.push(Match::new(q, best.0, best.1));
            }
        }
        MatchList::from_matches(matches)
    }

    /// Like [`Self::match_descriptors`] but returns, per query row, its two
    /// best train-row distances (used by ratio-test filtering).
    fn match_with_second_best(&self, query: &DescriptorMatrix, train: &DescriptorMatrix) -> Vec<(Match, f32)> {
        let mut out = Vec::with_capacity(query.rows());
        for q in 0..query.rows() {
            let (mut best, mut second) = ((0usize, f32::INFINITY), f32::INFINITY);
            for t in 0..train.rows() {
                let d = distance(self.kind, query.row(q), train.row(t));
                if d < best.1 {
                    second = best.1;
                    best = (t, d);
                } else if d < second {
                    second = d;
                }
            }
            if best.1.is_finite() {
                out.push((Match::new(q, best.0, best.1), second));
            }
        }
        out
    }
}

/// Selects which of the three `getGoodMatches` filters to apply.
#[derive(Clone, Copy, Debug)]
pub enum GoodMatchMode {
    /// Keep the best `ratio * n` matches by ascending distance.
    TopRatio {
        /// Fraction of matches to keep, in `(0, 1]`.
        ratio: f64,
    },
    /// Keep matches with `distance <= min_distance * factor` (the minimum
    /// distance taken over the whole unfiltered list).
    Lowe {
        /// Multiplier applied to the list's minimum distance. Default
        /// is `3.0`.
        factor: f32,
    },
    /// Keep matches RANSAC judges inliers of a fundamental-matrix fit.
    Ransac {
        /// Sampson-distance inlier threshold.
        distance: f64,
        /// Target confidence driving the adaptive iteration count.
        confidence: f64,
    },
}

impl Matcher {
    /// Applies one of the three `getGoodMatches` filters to the unfiltered
    /// match list between `query` and `train`.
    #[must_use]
    pub fn get_good_matches(&self, query_desc: &DescriptorMatrix, train_desc: &DescriptorMatrix, query_kp: &KeyPointSet, train_kp: &KeyPointSet, mode: GoodMatchMode) -> MatchList {
        let all = self.match_descriptors(query_desc, train_desc);
        match mode {
            GoodMatchMode::TopRatio { ratio } => {
                let mut sorted = all.matches().to_vec();
                sorted.sort_by(|a, b| a.distance.partial_cmp(&b.distance).expect("distances are never NaN"));
                let keep = ((sorted.len() as f64) * ratio).round().max(0.0) as usize;
                sorted.truncate(keep);
                MatchList::from_matches(sorted)
            }
            GoodMatchMode::Lowe { factor } => {
                let min_distance = all.matches().iter().map(|m| m.distance).fold(f32::INFINITY, f32::min);
                let threshold = min_distance * factor;
                let kept: Vec<Match> = all.matches().iter().copied().filter(|m| m.distance <= threshold).collect();
                MatchList::from_matches(kept)
            }
            GoodMatchMode::Ransac { distance, confidence } => match ransac_fundamental(all.matches(), query_kp, train_kp, distance, confidence) {
                Some((_, inlier_mask)) => {
                    let kept: Vec<Match> = all.matches().iter().zip(inlier_mask).filter_map(|(m, keep)| keep.then_some(*m)).collect();
                    MatchList::from_matches(kept)
                }
                None => MatchList::new(),
            },
        }
    }
}

/// Which cross-checks [`RobustMatcher`] applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RobustMode {
    /// Ratio test only.
    Fast,
    /// Both cross-direction matches, the symmetry test, and the ratio
    /// test.
    Full,
}

/// Combines the ratio test (`dist0 < ratio * dist1`) with a symmetry test
/// (a match survives only if it is the mutual best match in both
/// directions).
#[derive(Clone, Copy, Debug)]
pub struct RobustMatcher {
    matcher: Matcher,
    ratio: f64,
}

impl RobustMatcher {
    /// Builds a robust matcher with the default ratio-test threshold of `0.8`.
    #[must_use]
    pub const fn new(matcher: Matcher) -> Self {
        Self { matcher, ratio: 0.8 }
    }

    /// Overrides the ratio-test threshold.
    #[must_use]
    pub const fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio;
        self
    }

    fn ratio_filtered(&self, query: &DescriptorMatrix, train: &DescriptorMatrix) -> Vec<Match> {
        self.matcher
            .match_with_second_best(query, train)
            .into_iter()
            .filter(|(m, second)| (m.distance as f64) < self.ratio * (*second as f64))
            .map(|(m, _)| m)
            .collect()
    }

    /// Runs the matcher, returning matches that pass the configured
    /// [`RobustMode`].
    #[must_use]
    pub fn match_robust(&self, desc_a: &DescriptorMatrix, desc_b: &DescriptorMatrix, mode: RobustMode) -> MatchList {
        let forward = self.ratio_filtered(desc_a, desc_b);
        if mode == RobustMode::Fast {
            return MatchList::from_matches(forward);
        }
        let backward = self.ratio_filtered(desc_b, desc_a);
        let symmetric: Vec<Match> = forward
            .into_iter()
            .filter(|f| backward.iter().any(|b| b.query_index == f.train_index && b.train_index == f.query_index))
            .collect();
        MatchList::from_matches(symmetric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptors(rows: &[[f32; 2]]) -> DescriptorMatrix {
        DescriptorMatrix::from_row_major(rows.len(), 2, rows.iter().flatten().copied().collect()).unwrap()
    }

    #[test]
    fn match_descriptors_picks_nearest_row() {
        let query = descriptors(&[[0.0, 0.0]]);
        let train = descriptors(&[[10.0, 10.0], [0.1, 0.1]]);
        let matcher = Matcher::new(MatcherKind::L2);
        let matches = matcher.match_descriptors(&query, &train);
        assert_eq!(matches.matches()[0].train_index, 1);
    }

    #[test]
    fn top_ratio_keeps_the_requested_fraction() {
        let query = descriptors(&[[0.0, 0.0], [5.0, 5.0], [9.0, 9.0], [20.0, 20.0]]);
        let train = descriptors(&[[0.0, 0.0], [5.0, 5.0], [9.0, 9.0], [20.0, 20.0]]);
        let matcher = Matcher::new(MatcherKind::L2);
        let kp = KeyPointSet::new();
        let good = matcher.get_good_matches(&query, &train, &kp, &kp, GoodMatchMode::TopRatio { ratio: 0.5 });
        assert_eq!(good.len(), 2);
    }

    #[test]
    fn lowe_filter_keeps_only_near_minimal_distances() {
        let query = descriptors(&[[0.0, 0.0], [100.0, 100.0]]);
        let train = descriptors(&[[0.0, 0.0], [200.0, 200.0]]);
        let matcher = Matcher::new(MatcherKind::L2);
        let kp = KeyPointSet::new();
        let good = matcher.get_good_matches(&query, &train, &kp, &kp, GoodMatchMode::Lowe { factor: 1.5 });
        assert!(good.len() <= 2);
        assert!(!good.is_empty());
    }

    #[test]
    fn robust_matcher_symmetry_rejects_non_mutual_matches() {
        // Two query points both prefer the same single train point: only
        // one direction can be mutual, so the full mode drops the other.
        let desc_a = descriptors(&[[0.0, 0.0], [0.01, 0.01]]);
        let desc_b = descriptors(&[[0.0, 0.0]]);
        let robust = RobustMatcher::new(Matcher::new(MatcherKind::L2)).with_ratio(0.99);
        let result = robust.match_robust(&desc_a, &desc_b, RobustMode::Full);
        assert!(result.len() <= 1);
    }

    #[test]
    fn robust_matcher_fast_mode_skips_symmetry() {
        let desc_a = descriptors(&[[0.0, 0.0], [0.01, 0.01]]);
        let desc_b = descriptors(&[[0.0, 0.0]]);
        let robust = RobustMatcher::new(Matcher::new(MatcherKind::L2)).with_ratio(0.99);
        let result = robust.match_robust(&desc_a, &desc_b, RobustMode::Fast);
        assert_eq!(result.len(), 2);
    }
}
