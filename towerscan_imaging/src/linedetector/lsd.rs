// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line Segment Detector: groups pixels into regions of coherent gradient
//! orientation and fits a segment to each region.

use towerscan_core::geometry::{Point2, Segment};
use towerscan_core::numeric::angle_ox;
use towerscan_core::{PixelFormat, RasterBuffer};

use crate::linedetector::{AngleRange, LineDetector};
use crate::pipeline::Status;

/// `LSD`'s region-growing refine mode. Only the standard mode is exposed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RefineMode {
    /// Merge adjacent regions whose orientations agree within the region
    /// growing tolerance, then re-fit.
    #[default]
    Standard,
}

const GRADIENT_THRESHOLD: f64 = 40.0;
const ORIENTATION_TOLERANCE: f64 = core::f64::consts::PI / 8.0;
const MIN_REGION_SIZE: usize = 6;

struct GradientField {
    width: i64,
    height: i64,
    magnitude: Vec<f64>,
    orientation: Vec<f64>,
}

fn sobel_at(bytes: &[u8], w: i64, h: i64, x: i64, y: i64) -> (f64, f64) {
    let at = |dx: i64, dy: i64| {
        let sx = (x + dx).clamp(0, w - 1);
        let sy = (y + dy).clamp(0, h - 1);
        f64::from(bytes[(sy * w + sx) as usize])
    };
    let gx = -at(-1, -1) - 2.0 * at(-1, 0) - at(-1, 1) + at(1, -1) + 2.0 * at(1, 0) + at(1, 1);
    let gy = -at(-1, -1) - 2.0 * at(0, -1) - at(1, -1) + at(-1, 1) + 2.0 * at(0, 1) + at(1, 1);
    (gx, gy)
}

fn compute_gradient_field(raster: &RasterBuffer) -> GradientField {
    let (w, h) = (raster.width() as i64, raster.height() as i64);
    let bytes = raster.as_bytes();
    let mut magnitude = vec![0.0; (w * h) as usize];
    let mut orientation = vec![0.0; (w * h) as usize];
    for y in 0..h {
        for x in 0..w {
            let (gx, gy) = sobel_at(bytes, w, h, x, y);
            let idx = (y * w + x) as usize;
            magnitude[idx] = gx.hypot(gy);
            // The gradient is perpendicular to the edge the pixel lies on.
            orientation[idx] = angle_ox(-gy, gx);
        }
    }
    GradientField { width: w, height: h, magnitude, orientation }
}

fn grow_region(field: &GradientField, visited: &mut [bool], seed: usize) -> Vec<usize> {
    let mut region = Vec::new();
    let mut stack = vec![seed];
    visited[seed] = true;
    let seed_orientation = field.orientation[seed];

    while let Some(idx) = stack.pop() {
        region.push(idx);
        let x = (idx as i64) % field.width;
        let y = (idx as i64) / field.width;
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || nx >= field.width || ny < 0 || ny >= field.height {
                    continue;
                }
                let nidx = (ny * field.width + nx) as usize;
                if visited[nidx] || field.magnitude[nidx] < GRADIENT_THRESHOLD {
                    continue;
                }
                let diff = angular_distance(field.orientation[nidx], seed_orientation);
                if diff <= ORIENTATION_TOLERANCE {
                    visited[nidx] = true;
                    stack.push(nidx);
                }
            }
        }
    }
    region
}

fn angular_distance(a: f64, b: f64) -> f64 {
    let pi = core::f64::consts::PI;
    let tau = 2.0 * pi;
    let mut diff = (a - b).rem_euclid(tau);
    if diff > pi {
        diff = tau - diff;
    }
    diff
}

/// Fits a segment to a set of points via their principal axis (the
/// eigenvector of largest variance of the centered point cloud, found in
/// closed form for 2D via the standard covariance double-angle formula),
/// then spans the extreme projections onto that axis.
fn fit_segment(points: &[Point2]) -> Option<Segment> {
    if points.len() < MIN_REGION_SIZE {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.y).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for p in points {
        let dx = p.x - mean_x;
        let dy = p.y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    let theta = 0.5 * (2.0 * sxy).atan2(sxx - syy);
    let direction = (theta.cos(), theta.sin());

    let mut min_t = f64::INFINITY;
    let mut max_t = f64::NEG_INFINITY;
    for p in points {
        let t = (p.x - mean_x) * direction.0 + (p.y - mean_y) * direction.1;
        min_t = min_t.min(t);
        max_t = max_t.max(t);
    }
    let p1 = Point2::new(mean_x + min_t * direction.0, mean_y + min_t * direction.1);
    let p2 = Point2::new(mean_x + max_t * direction.0, mean_y + max_t * direction.1);
    Some(Segment::new(p1, p2))
}

/// Gradient-alignment line segment detector.
#[derive(Clone, Debug, Default)]
pub struct Lsd {
    refine: RefineMode,
    lines: Vec<Segment>,
}

impl Lsd {
    /// Builds an LSD detector with the given refine mode.
    #[must_use]
    pub const fn new(refine: RefineMode) -> Self {
        Self { refine, lines: Vec::new() }
    }
}

impl LineDetector for Lsd {
    fn run_with_angle_range(&mut self, raster: &RasterBuffer, angle_range: Option<AngleRange>) -> Status {
        if raster.format() != PixelFormat::Gray8 {
            return Status::Failure;
        }
        let field = compute_gradient_field(raster);
        let mut visited = vec![false; field.magnitude.len()];
        let mut regions: Vec<Vec<usize>> = Vec::new();

        for idx in 0..field.magnitude.len() {
            if visited[idx] || field.magnitude[idx] < GRADIENT_THRESHOLD {
                continue;
            }
            regions.push(grow_region(&field, &mut visited, idx));
        }

        // Standard refine mode: merge neighboring regions whose fitted
        // segments are themselves near-collinear before the final fit.
        if self.refine == RefineMode::Standard {
            regions = merge_collinear_regions(&field, regions);
        }

        let segments: Vec<Segment> = regions
            .iter()
            .filter_map(|region| {
                let points: Vec<Point2> = region
                    .iter()
                    .map(|&idx| Point2::new((idx as i64 % field.width) as f64, (idx as i64 / field.width) as f64))
                    .collect();
                fit_segment(&points)
            })
            .collect();

        self.lines = match angle_range {
            None => segments,
            Some(range) => segments.into_iter().filter(|s| range.contains(s.angle_ox())).collect(),
        };
        Status::Ok
    }

    fn lines(&self) -> &[Segment] {
        &self.lines
    }
}

fn merge_collinear_regions(field: &GradientField, regions: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
    let fitted: Vec<Option<Segment>> = regions
        .iter()
        .map(|region| {
            let points: Vec<Point2> = region
                .iter()
                .map(|&idx| Point2::new((idx as i64 % field.width) as f64, (idx as i64 / field.width) as f64))
                .collect();
            fit_segment(&points)
        })
        .collect();

    let mut merged: Vec<Vec<usize>> = Vec::new();
    let mut used = vec![false; regions.len()];
    for i in 0..regions.len() {
        if used[i] {
            continue;
        }
        let mut group = regions[i].clone();
        used[i] = true;
        if let Some(seg_i) = fitted[i] {
            for j in (i + 1)..regions.len() {
                if used[j] {
                    continue;
                }
                if let Some(seg_j) = fitted[j] {
                    let diff = angular_distance(seg_i.angle_ox(), seg_j.angle_ox());
                    let diff = diff.min(core::f64::consts::PI - diff);
                    if diff <= ORIENTATION_TOLERANCE {
                        group.extend(regions[j].iter().copied());
                        used[j] = true;
                    }
                }
            }
        }
        merged.push(group);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lsd_rejects_non_grayscale_input() {
        let raster = RasterBuffer::zeros(4, 4, PixelFormat::Rgb8);
        let mut detector = Lsd::default();
        assert_eq!(detector.run(&raster), Status::Failure);
    }

    #[test]
    fn lsd_finds_a_strong_vertical_edge() {
        let width = 20u32;
        let height = 20u32;
        let mut data = vec![0u8; (width * height) as usize];
        for y in 0..height {
            for x in 10..width {
                data[(y * width + x) as usize] = 255;
            }
        }
        let raster = RasterBuffer::new(width, height, PixelFormat::Gray8, data).unwrap();
        let mut detector = Lsd::new(RefineMode::Standard);
        detector.run(&raster);
        assert!(!detector.lines().is_empty());
    }
}
