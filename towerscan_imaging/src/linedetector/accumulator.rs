// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared rho/theta Hough accumulator, used by every Hough-family strategy
//! in this module.

use towerscan_core::geometry::{Point2, Segment};
use towerscan_core::PixelFormat;
use towerscan_core::RasterBuffer;

pub const THETA_STEPS: usize = 180;
const RHO_STEP: f64 = 1.0;

pub struct Accumulator {
    pub bins: Vec<u32>,
    pub theta_steps: usize,
    pub rho_bins: usize,
    pub rho_offset: f64,
    pub edge_points: Vec<Point2>,
}

fn edge_points(raster: &RasterBuffer) -> Vec<Point2> {
    assert_eq!(raster.format(), PixelFormat::Gray8, "the line detector expects a binary edge-map frame");
    let w = raster.width() as i64;
    let bytes = raster.as_bytes();
    bytes
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v > 127)
        .map(|(i, _)| {
            let i = i as i64;
            Point2::new((i % w) as f64, (i / w) as f64)
        })
        .collect()
}

/// Builds the rho/theta accumulator for `raster`'s edge pixels (any pixel
/// with value `> 127`, per `Binarize`/`Canny`'s conventions).
pub fn accumulate(raster: &RasterBuffer) -> Accumulator {
    let points = edge_points(raster);
    let diag = ((raster.width() as f64).powi(2) + (raster.height() as f64).powi(2)).sqrt();
    let rho_offset = diag;
    let rho_bins = ((2.0 * diag) / RHO_STEP).ceil() as usize + 1;
    let mut bins = vec![0u32; THETA_STEPS * rho_bins];

    let cos_table: Vec<f64> = (0..THETA_STEPS).map(|t| (t as f64 * core::f64::consts::PI / THETA_STEPS as f64).cos()).collect();
    let sin_table: Vec<f64> = (0..THETA_STEPS).map(|t| (t as f64 * core::f64::consts::PI / THETA_STEPS as f64).sin()).collect();

    for p in &points {
        for theta_idx in 0..THETA_STEPS {
            let rho = p.x * cos_table[theta_idx] + p.y * sin_table[theta_idx];
            let rho_idx = ((rho + rho_offset) / RHO_STEP).round() as usize;
            if rho_idx < rho_bins {
                bins[theta_idx * rho_bins + rho_idx] += 1;
            }
        }
    }

    Accumulator { bins, theta_steps: THETA_STEPS, rho_bins, rho_offset, edge_points: points }
}

impl Accumulator {
    pub fn theta_of(&self, theta_idx: usize) -> f64 {
        theta_idx as f64 * core::f64::consts::PI / self.theta_steps as f64
    }

    pub fn rho_of(&self, rho_idx: usize) -> f64 {
        rho_idx as f64 * RHO_STEP - self.rho_offset
    }

    pub fn weight_at(&self, theta_idx: usize, rho_idx: usize) -> u32 {
        self.bins[theta_idx * self.rho_bins + rho_idx]
    }

    /// Peaks at or above `threshold`, sorted by descending weight, with a
    /// simple non-maximum suppression over a small rho/theta window so
    /// neighboring bins of the same physical line are not reported twice.
    pub fn peaks(&self, threshold: u32) -> Vec<(usize, usize, u32)> {
        let mut candidates: Vec<(usize, usize, u32)> = Vec::new();
        for theta_idx in 0..self.theta_steps {
            for rho_idx in 0..self.rho_bins {
                let weight = self.weight_at(theta_idx, rho_idx);
                if weight >= threshold {
                    candidates.push((theta_idx, rho_idx, weight));
                }
            }
        }
        candidates.sort_by(|a, b| b.2.cmp(&a.2));

        let mut accepted: Vec<(usize, usize, u32)> = Vec::new();
        'candidate: for candidate in candidates {
            for &(at, ar, _) in &accepted {
                let theta_close = (candidate.0 as i64 - at as i64).unsigned_abs() <= 4;
                let rho_close = (candidate.1 as i64 - ar as i64).unsigned_abs() <= 4;
                if theta_close && rho_close {
                    continue 'candidate;
                }
            }
            accepted.push(candidate);
        }
        accepted
    }

    /// Reconstructs the segment a peak represents by projecting every edge
    /// point within `tolerance` of the line onto the line's direction and
    /// spanning the extreme projections.
    pub fn extract_segment(&self, theta_idx: usize, rho_idx: usize, tolerance: f64) -> Option<Segment> {
        let theta = self.theta_of(theta_idx);
        let rho = self.rho_of(rho_idx);
        let (cos_t, sin_t) = (theta.cos(), theta.sin());
        let direction = (-sin_t, cos_t);

        let mut min_t = f64::INFINITY;
        let mut max_t = f64::NEG_INFINITY;
        let mut found = false;
        for p in &self.edge_points {
            let dist = (p.x * cos_t + p.y * sin_t - rho).abs();
            if dist <= tolerance {
                let t = p.x * direction.0 + p.y * direction.1;
                min_t = min_t.min(t);
                max_t = max_t.max(t);
                found = true;
            }
        }
        if !found {
            return None;
        }
        let base = Point2::new(rho * cos_t, rho * sin_t);
        let p1 = Point2::new(base.x + min_t * direction.0, base.y + min_t * direction.1);
        let p2 = Point2::new(base.x + max_t * direction.0, base.y + max_t * direction.1);
        Some(Segment::new(p1, p2))
    }

    /// Like [`Self::extract_segment`] but splits the matching points into
    /// separate runs whenever a gap along the line exceeds `max_gap`,
    /// discarding runs shorter than `min_length`. Models the "probabilistic"
    /// Hough behavior of emitting several shorter segments per line.
    pub fn extract_segments_probabilistic(&self, theta_idx: usize, rho_idx: usize, tolerance: f64, min_length: f64, max_gap: f64) -> Vec<Segment> {
        let theta = self.theta_of(theta_idx);
        let rho = self.rho_of(rho_idx);
        let (cos_t, sin_t) = (theta.cos(), theta.sin());
        let direction = (-sin_t, cos_t);

        let mut ts: Vec<f64> = self
            .edge_points
            .iter()
            .filter(|p| (p.x * cos_t + p.y * sin_t - rho).abs() <= tolerance)
            .map(|p| p.x * direction.0 + p.y * direction.1)
            .collect();
        ts.sort_by(|a, b| a.partial_cmp(b).expect("coordinates are never NaN"));

        let base = Point2::new(rho * cos_t, rho * sin_t);
        let mut segments = Vec::new();
        let mut run_start = match ts.first() {
            Some(&t) => t,
            None => return segments,
        };
        let mut run_end = run_start;
        for &t in ts.iter().skip(1) {
            if t - run_end > max_gap {
                if run_end - run_start >= min_length {
                    segments.push(Segment::new(
                        Point2::new(base.x + run_start * direction.0, base.y + run_start * direction.1),
                        Point2::new(base.x + run_end * direction.0, base.y + run_end * direction.1),
                    ));
                }
                run_start = t;
            }
            run_end = t;
        }
        if run_end - run_start >= min_length {
            segments.push(Segment::new(
                Point2::new(base.x + run_start * direction.0, base.y + run_start * direction.1),
                Point2::new(base.x + run_end * direction.0, base.y + run_end * direction.1),
            ));
        }
        segments
    }
}
