// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The pull-based video-stream driver for aerial power-line vision: a
//! sequential frame source with skip policies, blur rejection,
//! rescaling/cropping, and a listener/observer contract, sitting atop
//! `towerscan_core`'s status/policy enums and `towerscan_imaging`'s
//! decode/grayscale helpers.
//!
//! # Architecture
//!
//! **[`source`]** — the [`source::VideoSource`] trait and
//! [`source::ImageListSource`], a file-backed implementation.
//!
//! **[`listener`]** — the [`listener::VideoListener`] observer contract,
//! replacing raw function-pointer callbacks.
//!
//! **[`keyboard`]** — pluggable interactive control for
//! [`source::VideoSource::run`] (ESC/`+`/`-`/space), off by default.

pub mod error;
pub mod keyboard;
pub mod listener;
pub mod source;

pub use error::{Error, Result};
pub use listener::{NoopListener, Position, VideoListener};
pub use source::{ImageListSource, VideoSource};
