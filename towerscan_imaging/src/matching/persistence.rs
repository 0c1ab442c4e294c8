// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Self-describing on-disk persistence for keypoints and descriptors.

use std::path::Path;

use serde::{Deserialize, Serialize};
use towerscan_core::feature::{DescriptorMatrix, KeyPoint, KeyPointSet};
use towerscan_core::geometry::Point2;

use crate::error::Result;

/// One keypoint row. `octave`/`class_id` have no in-memory counterpart on
/// [`KeyPoint`] (this detector family never assigns a scale-space octave or
/// a class label) and round-trip as `0`; they're carried so files written
/// by this format remain structurally compatible with the documented
/// field set.
#[derive(Serialize, Deserialize)]
struct StoredKeyPoint {
    x: f64,
    y: f64,
    size: f64,
    angle: f64,
    response: f64,
    octave: i32,
    class_id: i32,
}

#[derive(Serialize, Deserialize)]
struct StoredFeatures {
    #[serde(rename = "detector-type")]
    detector_type: String,
    #[serde(rename = "descriptor-type")]
    descriptor_type: String,
    n: usize,
    keypoints: Vec<StoredKeyPoint>,
    descriptor_dtype: String,
    descriptor_shape: (usize, usize),
    descriptor_bytes: Vec<f32>,
}

/// Writes `keypoints`/`descriptors` to `path` as a structured (JSON)
/// key-value file, tagged with the detector/descriptor that produced them.
pub fn save(
    path: impl AsRef<Path>,
    detector_type: &str,
    descriptor_type: &str,
    keypoints: &KeyPointSet,
    descriptors: &DescriptorMatrix,
) -> Result<()> {
    let stored = StoredFeatures {
        detector_type: detector_type.to_owned(),
        descriptor_type: descriptor_type.to_owned(),
        n: keypoints.len(),
        keypoints: keypoints
            .keypoints()
            .iter()
            .map(|k| StoredKeyPoint {
                x: k.position.x,
                y: k.position.y,
                size: k.scale,
                angle: k.angle,
                response: k.response,
                octave: 0,
                class_id: 0,
            })
            .collect(),
        descriptor_dtype: "f32".to_owned(),
        descriptor_shape: (descriptors.rows(), descriptors.cols()),
        descriptor_bytes: (0..descriptors.rows()).flat_map(|r| descriptors.row(r).to_vec()).collect(),
    };
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, &stored)?;
    Ok(())
}

/// Reads a keypoint/descriptor pair back from `path`, along with the
/// detector/descriptor type tags they were saved under.
pub fn load(path: impl AsRef<Path>) -> Result<(String, String, KeyPointSet, DescriptorMatrix)> {
    let file = std::fs::File::open(path)?;
    let stored: StoredFeatures = serde_json::from_reader(file)?;
    let keypoints = KeyPointSet::from_points(
        stored
            .keypoints
            .into_iter()
            .map(|k| KeyPoint::new(Point2::new(k.x, k.y), k.size, k.response, k.angle))
            .collect(),
    );
    let (rows, cols) = stored.descriptor_shape;
    let descriptors = DescriptorMatrix::from_row_major(rows, cols, stored.descriptor_bytes)?;
    Ok((stored.detector_type, stored.descriptor_type, keypoints, descriptors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_a_temp_file() {
        let dir = std::env::temp_dir().join(format!("towerscan-features-test-{}", std::process::id()));
        let keypoints = KeyPointSet::from_points(vec![KeyPoint::new(Point2::new(1.0, 2.0), 3.0, 0.5, 0.1)]);
        let descriptors = DescriptorMatrix::from_row_major(1, 2, vec![0.25, 0.75]).unwrap();
        save(&dir, "harris", "patch", &keypoints, &descriptors).unwrap();
        let (detector_type, descriptor_type, loaded_kp, loaded_desc) = load(&dir).unwrap();
        assert_eq!(detector_type, "harris");
        assert_eq!(descriptor_type, "patch");
        assert_eq!(loaded_kp.len(), 1);
        assert_eq!(loaded_kp.keypoints()[0].position, Point2::new(1.0, 2.0));
        assert_eq!(loaded_kp.keypoints()[0].scale, 3.0);
        assert_eq!(loaded_desc.row(0), &[0.25, 0.75]);
        let _ = std::fs::remove_file(&dir);
    }
}
