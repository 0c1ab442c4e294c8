// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rotation matrices built from Euler angles, used by the 3D photogrammetric
//! transforms (Helmert-3D) to turn omega/phi/kappa angles into a rotation
//! matrix.

use alloc::vec;

use crate::numeric::matrix::Matrix;

/// Builds the 3x3 rotation matrix for intrinsic `Z * Y * X` Euler angles
/// (yaw about `z`, then pitch about `y`, then roll about `x`), each in
/// radians. This is the composition order `Rz(yaw) * Ry(pitch) * Rx(roll)`.
#[must_use]
pub fn rotation_matrix_zyx(roll: f64, pitch: f64, yaw: f64) -> Matrix {
    let rz = rotation_z(yaw);
    let ry = rotation_y(pitch);
    let rx = rotation_x(roll);
    rz.matmul(&ry)
        .and_then(|ryz| ryz.matmul(&rx))
        .expect("3x3 matmuls never fail on size")
}

/// Rotation about the `x` axis.
#[must_use]
pub fn rotation_x(theta: f64) -> Matrix {
    let (s, c) = theta.sin_cos();
    Matrix::from_row_major(3, 3, vec![1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c])
        .expect("9 elements for a 3x3 matrix")
}

/// Rotation about the `y` axis.
#[must_use]
pub fn rotation_y(theta: f64) -> Matrix {
    let (s, c) = theta.sin_cos();
    Matrix::from_row_major(3, 3, vec![c, 0.0, s, 0.0, 1.0, 0.0, -s, 0.0, c])
        .expect("9 elements for a 3x3 matrix")
}

/// Rotation about the `z` axis.
#[must_use]
pub fn rotation_z(theta: f64) -> Matrix {
    let (s, c) = theta.sin_cos();
    Matrix::from_row_major(3, 3, vec![c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0])
        .expect("9 elements for a 3x3 matrix")
}

/// Builds the 2x2 rotation matrix for a planar rotation of `theta` radians,
/// counter-clockwise, used by the Helmert-2D and affine transforms.
#[must_use]
pub fn rotation_matrix_2d(theta: f64) -> Matrix {
    let (s, c) = theta.sin_cos();
    Matrix::from_row_major(2, 2, vec![c, -s, s, c]).expect("4 elements for a 2x2 matrix")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_x_at_zero_is_identity() {
        assert_eq!(rotation_x(0.0), Matrix::identity(3));
    }

    #[test]
    fn rotation_z_quarter_turn_maps_x_to_y() {
        let r = rotation_z(core::f64::consts::FRAC_PI_2);
        assert!((r[(0, 0)]).abs() < 1e-9);
        assert!((r[(1, 0)] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rotation_matrix_2d_is_orthogonal() {
        let r = rotation_matrix_2d(0.7);
        let rt = r.transpose();
        let product = r.matmul(&rt).unwrap();
        for i in 0..2 {
            for j in 0..2 {
                let expect = if i == j { 1.0 } else { 0.0 };
                assert!((product[(i, j)] - expect).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn rotation_matrix_zyx_at_zero_is_identity() {
        let r = rotation_matrix_zyx(0.0, 0.0, 0.0);
        assert_eq!(r, Matrix::identity(3));
    }
}
