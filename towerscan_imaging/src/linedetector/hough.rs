// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The classical, probabilistic, and fast Hough-transform strategies.

use towerscan_core::geometry::Segment;
use towerscan_core::RasterBuffer;

use crate::linedetector::accumulator::accumulate;
use crate::linedetector::{AngleRange, LineDetector};
use crate::pipeline::Status;

const LINE_TOLERANCE: f64 = 1.5;

fn filtered(segments: Vec<Segment>, angle_range: Option<AngleRange>) -> Vec<Segment> {
    match angle_range {
        None => segments,
        Some(range) => segments.into_iter().filter(|s| range.contains(s.angle_ox())).collect(),
    }
}

/// Classical Hough transform: one segment per accumulator peak above
/// `accumulator_threshold`.
#[derive(Clone, Debug, Default)]
pub struct Hough {
    accumulator_threshold: u32,
    lines: Vec<Segment>,
}

impl Hough {
    /// Builds a classical Hough detector requiring at least
    /// `accumulator_threshold` votes for a line to be reported.
    #[must_use]
    pub const fn new(accumulator_threshold: u32) -> Self {
        Self { accumulator_threshold, lines: Vec::new() }
    }
}

impl LineDetector for Hough {
    fn run_with_angle_range(&mut self, raster: &RasterBuffer, angle_range: Option<AngleRange>) -> Status {
        let acc = accumulate(raster);
        let segments: Vec<Segment> = acc
            .peaks(self.accumulator_threshold)
            .into_iter()
            .filter_map(|(theta_idx, rho_idx, _)| acc.extract_segment(theta_idx, rho_idx, LINE_TOLERANCE))
            .collect();
        self.lines = filtered(segments, angle_range);
        Status::Ok
    }

    fn lines(&self) -> &[Segment] {
        &self.lines
    }
}

/// Probabilistic Hough transform: peaks above `accumulator_threshold` are
/// further split into runs of contiguous edge support, each run becoming
/// its own segment if it clears `min_line_length`; gaps wider than
/// `max_line_gap` break a run in two.
#[derive(Clone, Debug, Default)]
pub struct HoughP {
    accumulator_threshold: u32,
    min_line_length: f64,
    max_line_gap: f64,
    lines: Vec<Segment>,
}

impl HoughP {
    /// Builds a probabilistic Hough detector.
    #[must_use]
    pub const fn new(accumulator_threshold: u32, min_line_length: f64, max_line_gap: f64) -> Self {
        Self { accumulator_threshold, min_line_length, max_line_gap, lines: Vec::new() }
    }
}

impl LineDetector for HoughP {
    fn run_with_angle_range(&mut self, raster: &RasterBuffer, angle_range: Option<AngleRange>) -> Status {
        let acc = accumulate(raster);
        let mut segments = Vec::new();
        for (theta_idx, rho_idx, _) in acc.peaks(self.accumulator_threshold) {
            segments.extend(acc.extract_segments_probabilistic(theta_idx, rho_idx, LINE_TOLERANCE, self.min_line_length, self.max_line_gap));
        }
        self.lines = filtered(segments, angle_range);
        Status::Ok
    }

    fn lines(&self) -> &[Segment] {
        &self.lines
    }
}

// The original "fast Hough" driver hard-codes these two constants inside a
// private `getLocalExtr`; whether they were meant to be tunable is unclear,
// so they stay internal rather than becoming public knobs on `HoughFast`.
const FAST_HOUGH_MIN_WEIGHT: u32 = 8;
const FAST_HOUGH_MAX_COUNT: usize = 64;

/// Fast Hough variant with no tunable accumulator threshold: candidate
/// lines are local maxima of the accumulator gated by an internal minimum
/// weight and capped to an internal maximum candidate count.
#[derive(Clone, Debug, Default)]
pub struct HoughFast {
    lines: Vec<Segment>,
}

impl HoughFast {
    /// Builds a fast Hough detector.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    fn get_local_extr(acc: &crate::linedetector::accumulator::Accumulator) -> Vec<(usize, usize, u32)> {
        let mut extrema = Vec::new();
        for theta_idx in 0..acc.theta_steps {
            for rho_idx in 0..acc.rho_bins {
                let weight = acc.weight_at(theta_idx, rho_idx);
                if weight < FAST_HOUGH_MIN_WEIGHT {
                    continue;
                }
                let mut is_max = true;
                for dt in -1i64..=1 {
                    for dr in -1i64..=1 {
                        if dt == 0 && dr == 0 {
                            continue;
                        }
                        let nt = theta_idx as i64 + dt;
                        let nr = rho_idx as i64 + dr;
                        if nt < 0 || nr < 0 || nt as usize >= acc.theta_steps || nr as usize >= acc.rho_bins {
                            continue;
                        }
                        if acc.weight_at(nt as usize, nr as usize) > weight {
                            is_max = false;
                        }
                    }
                }
                if is_max {
                    extrema.push((theta_idx, rho_idx, weight));
                }
            }
        }
        extrema.sort_by(|a, b| b.2.cmp(&a.2));
        extrema.truncate(FAST_HOUGH_MAX_COUNT);
        extrema
    }
}

impl LineDetector for HoughFast {
    fn run_with_angle_range(&mut self, raster: &RasterBuffer, angle_range: Option<AngleRange>) -> Status {
        let acc = accumulate(raster);
        let segments: Vec<Segment> = Self::get_local_extr(&acc)
            .into_iter()
            .filter_map(|(theta_idx, rho_idx, _)| acc.extract_segment(theta_idx, rho_idx, LINE_TOLERANCE))
            .collect();
        self.lines = filtered(segments, angle_range);
        Status::Ok
    }

    fn lines(&self) -> &[Segment] {
        &self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use towerscan_core::PixelFormat;

    fn horizontal_edge_raster(width: u32, height: u32, y: u32) -> RasterBuffer {
        let mut data = vec![0u8; (width * height) as usize];
        for x in 0..width {
            data[(y * width + x) as usize] = 255;
        }
        RasterBuffer::new(width, height, PixelFormat::Gray8, data).unwrap()
    }

    #[test]
    fn hough_detects_a_horizontal_line() {
        let raster = horizontal_edge_raster(40, 20, 10);
        let mut detector = Hough::new(20);
        detector.run(&raster);
        assert!(!detector.lines().is_empty());
        let angle = detector.lines()[0].angle_ox();
        assert!(angle.abs() < 0.1 || (angle.abs() - core::f64::consts::PI).abs() < 0.1);
    }

    #[test]
    fn angle_range_rejects_a_perpendicular_line() {
        let raster = horizontal_edge_raster(40, 20, 10);
        let mut detector = Hough::new(20);
        let range = AngleRange::new(core::f64::consts::FRAC_PI_2, 0.1);
        detector.run_with_angle_range(&raster, Some(range));
        assert!(detector.lines().is_empty());
    }

    #[test]
    fn hough_fast_finds_the_same_dominant_line() {
        let raster = horizontal_edge_raster(40, 20, 10);
        let mut detector = HoughFast::new();
        detector.run(&raster);
        assert!(!detector.lines().is_empty());
    }

    #[test]
    fn hough_p_splits_on_a_wide_gap() {
        let width = 60u32;
        let mut data = vec![0u8; (width * 20) as usize];
        for x in 0..20u32 {
            data[(10 * width + x) as usize] = 255;
        }
        for x in 40..60u32 {
            data[(10 * width + x) as usize] = 255;
        }
        let raster = RasterBuffer::new(width, 20, PixelFormat::Gray8, data).unwrap();
        let mut detector = HoughP::new(15, 5.0, 2.0);
        detector.run(&raster);
        assert!(detector.lines().len() >= 2);
    }
}
