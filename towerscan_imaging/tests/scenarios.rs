// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end scenarios 4-5: an imaging-pipeline run and a line-detector
//! angular filter, exercised through the public `towerscan_imaging` API.

use towerscan_core::{PixelFormat, RasterBuffer};
use towerscan_imaging::linedetector::{AngleRange, Hough, LineDetector};
use towerscan_imaging::pipeline::ops::{Binarize, Normalize};
use towerscan_imaging::pipeline::{ImagingProcesses, Status};

/// Scenario 4: a normalize→binarize pipeline on an 8-bit grayscale frame
/// with values `[0, 10, 20, 30, 255]` and threshold 128 produces
/// `[0, 0, 0, 0, 255]` (not inverted) and `[255, 255, 255, 255, 0]`
/// (inverted).
#[test]
fn normalize_then_binarize_pipeline() {
    let input = RasterBuffer::new(5, 1, PixelFormat::Gray8, vec![0, 10, 20, 30, 255]).unwrap();

    let mut pipeline = ImagingProcesses::new();
    pipeline.push(Box::new(Normalize::new(0, 255)));
    pipeline.push(Box::new(Binarize::new(128, 255, false)));
    let mut out = RasterBuffer::zeros(1, 1, PixelFormat::Gray8);
    assert_eq!(pipeline.run(&input, &mut out), Status::Ok);
    assert_eq!(out.as_bytes(), &[0, 0, 0, 0, 255]);

    let mut inverted_pipeline = ImagingProcesses::new();
    inverted_pipeline.push(Box::new(Normalize::new(0, 255)));
    inverted_pipeline.push(Box::new(Binarize::new(128, 255, true)));
    let mut inverted_out = RasterBuffer::zeros(1, 1, PixelFormat::Gray8);
    assert_eq!(inverted_pipeline.run(&input, &mut inverted_out), Status::Ok);
    assert_eq!(inverted_out.as_bytes(), &[255, 255, 255, 255, 0]);
}

/// Scenario 5: a synthetic raster with two drawn segments, one horizontal
/// and one at 45°; `run(raster, angleRange=(0, 0.1))` returns only the
/// horizontal segment.
#[test]
fn line_detector_angular_filter_keeps_only_horizontal() {
    let (width, height) = (40u32, 40u32);
    let mut data = vec![0u8; (width * height) as usize];
    for x in 0..width {
        data[(10 * width + x) as usize] = 255;
    }
    for step in 0..width.min(height) {
        data[(step * width + step) as usize] = 255;
    }
    let raster = RasterBuffer::new(width, height, PixelFormat::Gray8, data).unwrap();

    let mut unfiltered = Hough::new(20);
    unfiltered.run(&raster);
    assert!(unfiltered.lines().len() >= 2);

    let mut detector = Hough::new(20);
    let range = AngleRange::new(0.0, 0.1);
    let status = detector.run_with_angle_range(&raster, Some(range));
    assert_eq!(status, Status::Ok);
    assert!(!detector.lines().is_empty());
    for line in detector.lines() {
        assert!(range.contains(line.angle_ox()));
    }
}
