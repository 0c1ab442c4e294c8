// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Numeric kernels, geometric entities, and transform algebra for aerial
//! power-line vision.
//!
//! `towerscan_core` is the math foundation shared by the image-processing
//! pipeline, the line detector, and the video-stream driver. It is `no_std`
//! compatible (with `alloc`): none of the types here need an allocator-free
//! embedded target specifically, but keeping the math layer `no_std` keeps
//! it free of any accidental dependency on file I/O or threading, which
//! belong in the crates above it.
//!
//! # Architecture
//!
//! ```text
//!   numeric::{matrix, svd, solve, vector, rotation}
//!             │
//!             ▼
//!   geometry::{point, segment, window, line_group}
//!             │
//!             ▼
//!   transform::{translation, helmert2d, affine, projective, chain}
//! ```
//!
//! **[`numeric`]** — dynamic matrices, SVD, least-squares solve, vector
//! operations, rotation matrices.
//!
//! **[`geometry`]** — points, segments, axis-aligned windows, line groups,
//! and the predicates (`dist_point_to_segment`, `intersect_lines`, …) that
//! operate on them.
//!
//! **[`transform`]** — the planar transform family (translation, Helmert-2D,
//! affine, projective) behind one [`transform::Transform`] trait, plus
//! [`transform::TransformChain`] composition.
//!
//! **[`feature`]** — keypoint/descriptor/match data records (population is
//! `towerscan_imaging::matching`).
//!
//! **[`video`]** — status/skip-policy/frame-sizing enums shared by
//! `towerscan_video`.
//!
//! **[`raster`]** — the shared, reference-counted pixel-buffer handle;
//! decode/encode is `towerscan_imaging::raster_io`.
//!
//! # Crate features
//!
//! - `std` (disabled by default): enables `std` support in `kurbo` and
//!   `thiserror`, and enables [`transform::transform_parallel`] (backed by
//!   `rayon`, which needs a thread pool).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod error;
pub mod feature;
pub mod geometry;
pub mod numeric;
pub mod raster;
pub mod transform;
pub mod video;

pub use error::Error;
pub use raster::{PixelFormat, RasterBuffer};
