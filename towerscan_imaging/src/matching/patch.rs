// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A normalized local-intensity-patch descriptor.

use towerscan_core::feature::{DescriptorMatrix, KeyPointSet};
use towerscan_core::RasterBuffer;

use crate::matching::DescriptorExtractor;
use crate::raster_io::to_grayscale;

/// Describes a keypoint by its mean/variance-normalized square intensity
/// patch, flattened to a vector. Normalization makes the descriptor
/// invariant to affine brightness/contrast changes between frames.
#[derive(Clone, Copy, Debug)]
pub struct PatchDescriptor {
    radius: u32,
}

impl PatchDescriptor {
    /// Builds a descriptor extractor sampling a `(2*radius+1)^2` patch.
    #[must_use]
    pub const fn new(radius: u32) -> Self {
        Self { radius }
    }

    /// Descriptor dimensionality for this extractor.
    #[must_use]
    pub const fn dims(&self) -> usize {
        let side = 2 * self.radius as usize + 1;
        side * side
    }
}

impl DescriptorExtractor for PatchDescriptor {
    fn describe(&self, raster: &RasterBuffer, keypoints: &KeyPointSet) -> DescriptorMatrix {
        let gray = to_grayscale(raster);
        let (w, h) = (gray.width() as i64, gray.height() as i64);
        let bytes = gray.as_bytes();
        let radius = self.radius as i64;
        let dims = self.dims();

        let mut data = Vec::with_capacity(keypoints.len() * dims);
        for keypoint in keypoints.keypoints() {
            let (cx, cy) = (keypoint.position.x.round() as i64, keypoint.position.y.round() as i64);
            let mut patch = Vec::with_capacity(dims);
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    let (sx, sy) = ((cx + dx).clamp(0, w - 1), (cy + dy).clamp(0, h - 1));
                    patch.push(f32::from(bytes[(sy * w + sx) as usize]));
                }
            }
            let mean = patch.iter().sum::<f32>() / patch.len() as f32;
            let variance = patch.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / patch.len() as f32;
            let stddev = variance.sqrt().max(1e-6);
            for v in &mut patch {
                *v = (*v - mean) / stddev;
            }
            data.extend(patch);
        }
        DescriptorMatrix::from_row_major(keypoints.len(), dims, data)
            .expect("one row of `dims` elements was pushed per keypoint")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use towerscan_core::feature::{KeyPoint, KeyPointSet};
    use towerscan_core::geometry::Point2;
    use towerscan_core::PixelFormat;

    #[test]
    fn patch_descriptor_is_normalized() {
        let raster = RasterBuffer::new(10, 10, PixelFormat::Gray8, vec![128u8; 100]).unwrap();
        let keypoints = KeyPointSet::from_points(vec![KeyPoint::new(Point2::new(5.0, 5.0), 5.0, 1.0, 0.0)]);
        let extractor = PatchDescriptor::new(2);
        let descriptors = extractor.describe(&raster, &keypoints);
        assert_eq!(descriptors.rows(), 1);
        assert_eq!(descriptors.cols(), 25);
        // A constant patch has zero variance; every entry stays at zero
        // after normalization instead of dividing by zero.
        assert!(descriptors.row(0).iter().all(|&v| v.abs() < 1e-3));
    }

    #[test]
    fn empty_keypoint_set_yields_empty_descriptors() {
        let raster = RasterBuffer::zeros(10, 10, PixelFormat::Gray8);
        let extractor = PatchDescriptor::new(2);
        let descriptors = extractor.describe(&raster, &KeyPointSet::new());
        assert_eq!(descriptors.rows(), 0);
    }
}
