// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keypoint/descriptor/match data records. Population (actually running a
//! detector/extractor/matcher over a raster) is `towerscan_imaging::matching`;
//! this module only defines the records those population routines fill in.

use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::geometry::point::Point2;

/// A detected keypoint: location, the neighborhood size it was detected
/// at, plus the strength/response the detector assigned it (used to rank
/// and threshold keypoints).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyPoint {
    /// Sub-pixel location in the source raster.
    pub position: Point2,
    /// Diameter (in pixels) of the neighborhood the detector scored, e.g.
    /// the window size of a fixed-scale detector or the octave-scaled
    /// patch size of a scale-space one.
    pub scale: f64,
    /// Detector-specific response/strength (e.g. a corner score).
    pub response: f64,
    /// Dominant orientation in radians, if the detector assigns one (`0.0`
    /// otherwise).
    pub angle: f64,
}

impl KeyPoint {
    /// Builds a keypoint.
    #[must_use]
    pub const fn new(position: Point2, scale: f64, response: f64, angle: f64) -> Self {
        Self { position, scale, response, angle }
    }
}

/// A set of keypoints detected in one raster.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyPointSet {
    points: Vec<KeyPoint>,
}

impl KeyPointSet {
    /// An empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Builds a set from already-detected keypoints.
    #[must_use]
    pub const fn from_points(points: Vec<KeyPoint>) -> Self {
        Self { points }
    }

    /// The keypoints, in detector order — descriptor row `i` in a
    /// [`DescriptorMatrix`] built from this set always corresponds to
    /// `keypoints()[i]`.
    #[must_use]
    pub fn keypoints(&self) -> &[KeyPoint] {
        &self.points
    }

    /// Number of keypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True iff the set has no keypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A dense matrix of descriptor rows, one row per keypoint in the
/// [`KeyPointSet`] it was extracted from. Row `i` describes keypoint `i`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DescriptorMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl DescriptorMatrix {
    /// Builds a descriptor matrix from row-major data. Returns
    /// `Error::InvalidArgument` if `data.len() != rows * cols`.
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidArgument(alloc::format!(
                "expected {} elements for a {rows}x{cols} descriptor matrix, got {}",
                rows * cols,
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Number of descriptor rows (one per keypoint).
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Descriptor length (dimensionality).
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// The descriptor row for keypoint `i`.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }
}

/// One correspondence between a keypoint in a "query" set and a keypoint
/// in a "train" set, with the match distance the matcher scored it at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Match {
    /// Index into the query `KeyPointSet`.
    pub query_index: usize,
    /// Index into the train `KeyPointSet`.
    pub train_index: usize,
    /// Distance under the matcher's chosen metric (lower is a better
    /// match).
    pub distance: f32,
}

impl Match {
    /// Builds a match.
    #[must_use]
    pub const fn new(query_index: usize, train_index: usize, distance: f32) -> Self {
        Self { query_index, train_index, distance }
    }
}

/// A list of matches between two previously-computed keypoint sets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchList {
    matches: Vec<Match>,
}

impl MatchList {
    /// An empty match list.
    #[must_use]
    pub const fn new() -> Self {
        Self { matches: Vec::new() }
    }

    /// Builds a match list from already-computed matches.
    #[must_use]
    pub const fn from_matches(matches: Vec<Match>) -> Self {
        Self { matches }
    }

    /// The matches.
    #[must_use]
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Number of matches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// True iff there are no matches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}
