// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The image-processing pipeline, line detector, and feature matching for
//! aerial power-line vision, built atop `towerscan_core`'s math and
//! geometry layer.
//!
//! # Architecture
//!
//! **[`raster_io`]** — decode/encode between [`towerscan_core::RasterBuffer`]
//! and real image files (PNG/JPEG/TIFF/BMP), via the `image` crate.
//!
//! **[`pipeline`]** — the [`pipeline::ImageProcess`] interface, the ordered
//! [`pipeline::ImagingProcesses`] container, and the concrete ops
//! ([`pipeline::ops`]): normalize, binarize, histogram equalization,
//! Gaussian/bilateral/median blur, Sobel, Canny, morphology, resize,
//! thinning, and a user-function adapter.
//!
//! **[`linedetector`]** — the [`linedetector::LineDetector`] strategy
//! interface ([`linedetector::Hough`], [`linedetector::HoughP`],
//! [`linedetector::HoughFast`], [`linedetector::Lsd`]), the shared angular
//! filter, and the distance-based grouping/joining/pruning algorithms.
//!
//! **[`matching`]** — keypoint detection, descriptor extraction, matching
//! (brute force + robust cross-match), and on-disk persistence.

pub mod error;
pub mod linedetector;
pub mod matching;
pub mod pipeline;
pub mod raster_io;

pub use error::{Error, Result};
