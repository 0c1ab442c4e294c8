// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end scenarios 1-3: transform-algebra fit/forward/inverse
//! behavior, exercised through the public `towerscan_core` API rather than
//! as unit tests on the concrete transform types.

use towerscan_core::geometry::Point2;
use towerscan_core::transform::{Affine, Order, Projective, Transform};

/// Scenario 1: affine identity round-trip. Source points `{(0,0), (1,0),
/// (0,1), (1,1)}`, destination equal to source. `compute` succeeds,
/// reports RMSE = 0, and recovers the identity parameters.
#[test]
fn affine_identity_round_trip() {
    let src = [
        Point2::new(0.0, 0.0),
        Point2::new(1.0, 0.0),
        Point2::new(0.0, 1.0),
        Point2::new(1.0, 1.0),
    ];
    let dst = src;
    let mut t = Affine::identity();
    let report = t.compute(&src, &dst).unwrap();
    assert_eq!(report.rmse, 0.0);
    assert!(t.is_null());
    assert!((t.scale_x() - 1.0).abs() < 1e-9);
    assert!((t.scale_y() - 1.0).abs() < 1e-9);
    assert!(t.rotation().abs() < 1e-9);
}

/// Scenario 2: affine pure rotation 90°. src = `{(1,0), (0,1), (-1,0),
/// (0,-1)}`, dst = `{(0,1), (-1,0), (0,-1), (1,0)}`. Recovered `rotation()`
/// is ~pi/2, `scaleX()` and `scaleY()` are ~1.
#[test]
fn affine_pure_rotation_90_degrees() {
    let src = [
        Point2::new(1.0, 0.0),
        Point2::new(0.0, 1.0),
        Point2::new(-1.0, 0.0),
        Point2::new(0.0, -1.0),
    ];
    let dst = [
        Point2::new(0.0, 1.0),
        Point2::new(-1.0, 0.0),
        Point2::new(0.0, -1.0),
        Point2::new(1.0, 0.0),
    ];
    let mut t = Affine::identity();
    let report = t.compute(&src, &dst).unwrap();
    assert!(report.rmse < 1e-6);
    assert!((t.rotation() - core::f64::consts::FRAC_PI_2).abs() < 1e-6);
    assert!((t.scale_x() - 1.0).abs() < 1e-6);
    assert!((t.scale_y() - 1.0).abs() < 1e-6);
}

/// Scenario 3: projective square-to-quadrilateral. src = corners of the
/// unit square; dst = `{(0,0), (2,0), (2.5,2), (0,2)}`. `compute`
/// succeeds; transforming `(0.5, 0.5)` yields the expected interior point,
/// and the inverse maps it back within 1e-9.
#[test]
fn projective_square_to_quadrilateral() {
    let src = [
        Point2::new(0.0, 0.0),
        Point2::new(1.0, 0.0),
        Point2::new(1.0, 1.0),
        Point2::new(0.0, 1.0),
    ];
    let dst = [
        Point2::new(0.0, 0.0),
        Point2::new(2.0, 0.0),
        Point2::new(2.5, 2.0),
        Point2::new(0.0, 2.0),
    ];
    let mut t = Projective::identity();
    let report = t.compute(&src, &dst).unwrap();
    assert!(report.rmse < 1e-6);

    for (s, d) in src.iter().zip(dst.iter()) {
        let mapped = t.transform(*s, Order::Direct).unwrap();
        assert!((mapped.x - d.x).abs() < 1e-6);
        assert!((mapped.y - d.y).abs() < 1e-6);
    }

    let interior = Point2::new(0.5, 0.5);
    let forward = t.transform(interior, Order::Direct).unwrap();
    let back = t.transform(forward, Order::Inverse).unwrap();
    assert!((back.x - interior.x).abs() < 1e-9);
    assert!((back.y - interior.y).abs() < 1e-9);
}
