// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for the imaging crate: wraps [`towerscan_core::Error`] and
//! adds the I/O-flavored variants decode/encode can fail with.

/// Errors surfaced by `towerscan_imaging`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Propagated from the math/geometry/transform core.
    #[error(transparent)]
    Core(#[from] towerscan_core::Error),

    /// An image file could not be decoded.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// An image file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A keypoint/descriptor persistence file could not be read or
    /// written.
    #[error("failed to (de)serialize feature data: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
