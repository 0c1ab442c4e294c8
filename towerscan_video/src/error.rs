// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for the video crate: wraps [`towerscan_imaging::Error`] and
//! adds the source-lifecycle failures specific to [`crate::source`].

/// Errors surfaced by `towerscan_video`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Propagated from the imaging crate (which itself wraps
    /// `towerscan_core::Error`).
    #[error(transparent)]
    Imaging(#[from] towerscan_imaging::error::Error),

    /// A video/image-list source could not be opened (no frames found, or
    /// the path does not exist).
    #[error("failed to open video source: {0}")]
    Open(String),

    /// A method that requires the source to be `Running` (or `Paused`) was
    /// called while it was in another lifecycle state.
    #[error("invalid state transition: {0}")]
    InvalidState(String),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;
