// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A Harris-corner keypoint detector.

use towerscan_core::feature::{KeyPoint, KeyPointSet};
use towerscan_core::geometry::Point2;
use towerscan_core::numeric::angle_ox;
use towerscan_core::RasterBuffer;

use crate::matching::KeypointDetector;
use crate::raster_io::to_grayscale;

const HARRIS_K: f64 = 0.04;
const WINDOW_RADIUS: i64 = 2;
const NMS_RADIUS: i64 = 3;
/// Diameter of the fixed structure-tensor window, reported as every
/// keypoint's `scale` since this detector has no notion of scale space.
const WINDOW_DIAMETER: f64 = (2 * WINDOW_RADIUS + 1) as f64;

/// Detects corners via the Harris response `det(M) - k * trace(M)^2` of the
/// local structure tensor, with non-maximum suppression over a fixed
/// neighborhood.
#[derive(Clone, Copy, Debug)]
pub struct HarrisDetector {
    response_threshold: f64,
    max_keypoints: usize,
}

impl HarrisDetector {
    /// Builds a detector keeping corners above `response_threshold`,
    /// capped at the `max_keypoints` strongest.
    #[must_use]
    pub const fn new(response_threshold: f64, max_keypoints: usize) -> Self {
        Self { response_threshold, max_keypoints }
    }
}

impl Default for HarrisDetector {
    fn default() -> Self {
        Self::new(1.0e4, 500)
    }
}

fn gradients(bytes: &[u8], w: i64, h: i64) -> (Vec<f64>, Vec<f64>) {
    let at = |x: i64, y: i64| f64::from(bytes[(y.clamp(0, h - 1) * w + x.clamp(0, w - 1)) as usize]);
    let mut gx = vec![0.0; (w * h) as usize];
    let mut gy = vec![0.0; (w * h) as usize];
    for y in 0..h {
        for x in 0..w {
            gx[(y * w + x) as usize] = (at(x + 1, y) - at(x - 1, y)) * 0.5;
            gy[(y * w + x) as usize] = (at(x, y + 1) - at(x, y - 1)) * 0.5;
        }
    }
    (gx, gy)
}

impl KeypointDetector for HarrisDetector {
    fn detect(&self, raster: &RasterBuffer, mask: Option<&RasterBuffer>) -> KeyPointSet {
        let gray = to_grayscale(raster);
        let (w, h) = (gray.width() as i64, gray.height() as i64);
        let bytes = gray.as_bytes();
        let (gx, gy) = gradients(bytes, w, h);

        let mut response = vec![0.0_f64; (w * h) as usize];
        for y in 0..h {
            for x in 0..w {
                let mut sxx = 0.0;
                let mut syy = 0.0;
                let mut sxy = 0.0;
                for dy in -WINDOW_RADIUS..=WINDOW_RADIUS {
                    for dx in -WINDOW_RADIUS..=WINDOW_RADIUS {
                        let (sx, sy) = ((x + dx).clamp(0, w - 1), (y + dy).clamp(0, h - 1));
                        let idx = (sy * w + sx) as usize;
                        sxx += gx[idx] * gx[idx];
                        syy += gy[idx] * gy[idx];
                        sxy += gx[idx] * gy[idx];
                    }
                }
                let det = sxx * syy - sxy * sxy;
                let trace = sxx + syy;
                response[(y * w + x) as usize] = det - HARRIS_K * trace * trace;
            }
        }

        let mask_allows = |x: i64, y: i64| match mask {
            None => true,
            Some(m) => m.as_bytes()[(y * w + x) as usize] != 0,
        };

        let mut candidates: Vec<(i64, i64, f64)> = Vec::new();
        for y in 0..h {
            for x in 0..w {
                let r = response[(y * w + x) as usize];
                if r < self.response_threshold || !mask_allows(x, y) {
                    continue;
                }
                let mut is_max = true;
                'search: for dy in -NMS_RADIUS..=NMS_RADIUS {
                    for dx in -NMS_RADIUS..=NMS_RADIUS {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let (nx, ny) = (x + dx, y + dy);
                        if nx < 0 || nx >= w || ny < 0 || ny >= h {
                            continue;
                        }
                        if response[(ny * w + nx) as usize] > r {
                            is_max = false;
                            break 'search;
                        }
                    }
                }
                if is_max {
                    candidates.push((x, y, r));
                }
            }
        }
        candidates.sort_by(|a, b| b.2.partial_cmp(&a.2).expect("Harris responses are never NaN"));
        candidates.truncate(self.max_keypoints);

        let points = candidates
            .into_iter()
            .map(|(x, y, r)| {
                let idx = (y * w + x) as usize;
                let angle = angle_ox(gx[idx], gy[idx]);
                KeyPoint::new(Point2::new(x as f64, y as f64), WINDOW_DIAMETER, r, angle)
            })
            .collect();
        KeyPointSet::from_points(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use towerscan_core::PixelFormat;

    #[test]
    fn finds_the_corner_of_a_bright_square() {
        let width = 20u32;
        let mut data = vec![0u8; (width * 20) as usize];
        for y in 5..15u32 {
            for x in 5..15u32 {
                data[(y * width + x) as usize] = 255;
            }
        }
        let raster = RasterBuffer::new(width, 20, PixelFormat::Gray8, data).unwrap();
        let detector = HarrisDetector::new(100.0, 10);
        let keypoints = detector.detect(&raster, None);
        assert!(!keypoints.is_empty());
    }

    #[test]
    fn mask_excludes_keypoints_outside_it() {
        let width = 20u32;
        let mut data = vec![0u8; (width * 20) as usize];
        for y in 5..15u32 {
            for x in 5..15u32 {
                data[(y * width + x) as usize] = 255;
            }
        }
        let raster = RasterBuffer::new(width, 20, PixelFormat::Gray8, data).unwrap();
        let mut mask_data = vec![0u8; (width * 20) as usize];
        for y in 0..20u32 {
            for x in 0..10u32 {
                mask_data[(y * width + x) as usize] = 255;
            }
        }
        let mask = RasterBuffer::new(width, 20, PixelFormat::Gray8, mask_data).unwrap();
        let detector = HarrisDetector::new(100.0, 10);
        let keypoints = detector.detect(&raster, Some(&mask));
        assert!(keypoints.keypoints().iter().all(|k| k.position.x < 10.0));
    }
}
