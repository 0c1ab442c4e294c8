// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keypoint detection, description, matching, and persistence.

pub mod fundamental;
pub mod harris;
pub mod matcher;
pub mod patch;
pub mod persistence;

pub use harris::HarrisDetector;
pub use matcher::{GoodMatchMode, Matcher, MatcherKind, RobustMatcher, RobustMode};
pub use patch::PatchDescriptor;

use towerscan_core::geometry::Window;
use towerscan_core::feature::{DescriptorMatrix, KeyPoint, KeyPointSet};
use towerscan_core::RasterBuffer;

use crate::pipeline::Status;
use crate::raster_io::to_grayscale;

/// A keypoint detection strategy.
pub trait KeypointDetector {
    /// Detects keypoints in `raster`, optionally restricted to pixels where
    /// `mask` is non-zero.
    fn detect(&self, raster: &RasterBuffer, mask: Option<&RasterBuffer>) -> KeyPointSet;
}

/// A descriptor extraction strategy.
pub trait DescriptorExtractor {
    /// Extracts one descriptor row per keypoint, in the same order as
    /// `keypoints.keypoints()`.
    fn describe(&self, raster: &RasterBuffer, keypoints: &KeyPointSet) -> DescriptorMatrix;
}

/// Adapter pairing a keypoint detector with a descriptor extractor,
/// holding the most recent detection/extraction results.
pub struct DetectorDescriptor<D, E> {
    detector: D,
    extractor: E,
    keypoints: KeyPointSet,
    descriptors: DescriptorMatrix,
}

impl<D: KeypointDetector, E: DescriptorExtractor> DetectorDescriptor<D, E> {
    /// Builds an adapter from a detector and an extractor.
    pub fn new(detector: D, extractor: E) -> Self {
        Self { detector, extractor, keypoints: KeyPointSet::new(), descriptors: DescriptorMatrix::default() }
    }

    /// Runs the detector, replacing the internal keypoint list, and
    /// returns the number of keypoints found.
    pub fn detect_key_points(&mut self, raster: &RasterBuffer, mask: Option<&RasterBuffer>) -> usize {
        self.keypoints = self.detector.detect(raster, mask);
        self.keypoints.len()
    }

    /// Runs the extractor over the current keypoint list, replacing the
    /// internal descriptor matrix.
    pub fn calc_descriptor(&mut self, raster: &RasterBuffer) {
        self.descriptors = self.extractor.describe(raster, &self.keypoints);
    }

    /// The most recently detected keypoints.
    #[must_use]
    pub fn keypoints(&self) -> &KeyPointSet {
        &self.keypoints
    }

    /// The most recently extracted descriptors.
    #[must_use]
    pub fn descriptors(&self) -> &DescriptorMatrix {
        &self.descriptors
    }

    /// Removes keypoints outside `window`, crops `raster` to `window`, and
    /// re-extracts descriptors from the cropped raster. Returns the cropped
    /// raster and a status reflecting whether the crop succeeded.
    pub fn filter(&mut self, raster: &RasterBuffer, window: Window) -> (RasterBuffer, Status) {
        let gray = to_grayscale(raster);
        let (min, max) = (window.min(), window.max());
        let (x0, y0) = (min.x.max(0.0) as u32, min.y.max(0.0) as u32);
        let (x1, y1) = ((max.x as u32).min(gray.width()), (max.y as u32).min(gray.height()));
        if x1 <= x0 || y1 <= y0 {
            return (gray, Status::Failure);
        }
        let crop_width = x1 - x0;
        let crop_height = y1 - y0;
        let src = gray.as_bytes();
        let mut cropped_bytes = Vec::with_capacity((crop_width * crop_height) as usize);
        for y in y0..y1 {
            let row_start = (y * gray.width() + x0) as usize;
            cropped_bytes.extend_from_slice(&src[row_start..row_start + crop_width as usize]);
        }
        let cropped = RasterBuffer::new(crop_width, crop_height, towerscan_core::PixelFormat::Gray8, cropped_bytes)
            .expect("crop dimensions and byte count agree by construction");

        let retained: Vec<KeyPoint> = self
            .keypoints
            .keypoints()
            .iter()
            .filter(|k| window.contains_point(k.position))
            .map(|k| KeyPoint::new(
                towerscan_core::geometry::Point2::new(k.position.x - x0 as f64, k.position.y - y0 as f64),
                k.scale,
                k.response,
                k.angle,
            ))
            .collect();
        self.keypoints = KeyPointSet::from_points(retained);
        self.descriptors = self.extractor.describe(&cropped, &self.keypoints);
        (cropped, Status::Ok)
    }
}
