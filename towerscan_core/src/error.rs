// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The error categories surfaced by the core.

use alloc::string::String;

/// Errors surfaced by `towerscan_core` and the crates built on it.
///
/// Propagation policy: hot paths (pipeline ops, transform fits, matcher
/// calls) return `Result<_, Error>` explicitly. Invariant violations that a
/// caller cannot have triggered through documented inputs (a malformed
/// compile-time constant, an internal slice-length mismatch) panic instead,
/// matching the rest of the core.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A parameter is outside its documented domain (e.g. a negative kernel
    /// size).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Fewer point correspondences were supplied than a transform's
    /// `minimum_points()`.
    #[error("insufficient points: need at least {needed}, got {got}")]
    InsufficientPoints {
        /// The transform's `minimum_points()`.
        needed: usize,
        /// The number of correspondences actually supplied.
        got: usize,
    },

    /// Source and destination point lists differ in length.
    #[error("size mismatch: {lhs} source points vs {rhs} destination points")]
    SizeMismatch {
        /// Length of the source point list.
        lhs: usize,
        /// Length of the destination point list.
        rhs: usize,
    },

    /// An SVD failed to converge within its iteration cap, or a matrix
    /// required to be invertible was numerically singular.
    #[error("numeric failure: {0}")]
    NumericFailure(String),

    /// A file could not be found, opened, or decoded, or a video container
    /// could not be opened.
    #[error("I/O failure: {0}")]
    IoFailure(String),

    /// An operation received an empty raster or empty point list where a
    /// non-empty one is required.
    #[error("data empty: {0}")]
    DataEmpty(String),

    /// An operation was invoked on a composite object that doesn't support
    /// it (e.g. `compute` on a `TransformChain`).
    #[error("not applicable: {0}")]
    NotApplicable(String),
}

/// Convenience alias used throughout the core.
pub type Result<T> = core::result::Result<T, Error>;
