// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dynamic linear algebra, SVD, least-squares solving, vector algebra, and
//! rotation matrices. This module has no notion of pixels, frames, or
//! geometry entities; [`crate::geometry`] is built on top of it.

pub mod matrix;
pub mod rotation;
pub mod solve;
pub mod svd;
pub mod vector;

pub use matrix::Matrix;
pub use rotation::rotation_matrix_zyx;
pub use solve::solve_least_squares;
pub use svd::{svd, Svd};
pub use vector::{angle_ox, angle_oy, azimut, cross3, dot, module};
