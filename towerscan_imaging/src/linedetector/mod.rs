// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line detection: four strategies over a shared angular filter, plus the
//! distance-based grouping/joining/pruning algorithms that turn raw
//! segments into [`towerscan_core::geometry::LineGroup`]s.

mod accumulator;
pub mod grouping;
pub mod hough;
pub mod lsd;

pub use grouping::{del_lines_group_by_size, group_lines_by_dist, join_lines_by_dist};
pub use hough::{Hough, HoughFast, HoughP};
pub use lsd::Lsd;

use towerscan_core::geometry::Segment;
use towerscan_core::RasterBuffer;

use crate::pipeline::Status;

/// Restricts accepted segments to those whose orientation falls within
/// `tolerance` radians of `center`, measured modulo `pi` since a segment's
/// orientation and its reverse describe the same line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleRange {
    /// Center orientation, radians.
    pub center: f64,
    /// Half-width of the accepted band, radians.
    pub tolerance: f64,
}

impl AngleRange {
    /// Builds an angle range.
    #[must_use]
    pub const fn new(center: f64, tolerance: f64) -> Self {
        Self { center, tolerance }
    }

    /// True iff `angle` (any representative, not necessarily reduced) lies
    /// within the accepted band.
    #[must_use]
    pub fn contains(&self, angle: f64) -> bool {
        angular_distance_mod_pi(angle, self.center) <= self.tolerance
    }
}

/// Smallest angular separation between two undirected orientations,
/// considered modulo `pi`.
#[must_use]
pub fn angular_distance_mod_pi(a: f64, b: f64) -> f64 {
    let pi = core::f64::consts::PI;
    let mut diff = (a - b).rem_euclid(pi);
    if diff > pi / 2.0 {
        diff = pi - diff;
    }
    diff
}

/// Simple RGB drawing color for [`LineDetector::draw_lines`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

/// How a drawn line is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineStyle {
    /// A single-pixel-wide solid stroke.
    Solid,
    /// Alternating on/off runs along the segment.
    Dashed,
}

/// Detects straight line segments in a raster.
///
/// `run`/`run_with_angle_range` replace any previously detected lines;
/// `draw_lines` is read-only and must not mutate detector state.
pub trait LineDetector {
    /// Runs detection with no angular restriction.
    fn run(&mut self, raster: &RasterBuffer) -> Status {
        self.run_with_angle_range(raster, None)
    }

    /// Runs detection, discarding any segment whose orientation falls
    /// outside `angle_range` when given.
    fn run_with_angle_range(&mut self, raster: &RasterBuffer, angle_range: Option<AngleRange>) -> Status;

    /// The segments published by the most recent `run`.
    fn lines(&self) -> &[Segment];

    /// Renders the detector's current lines onto `canvas`. Does not mutate
    /// the detector.
    fn draw_lines(&self, canvas: &mut RasterBuffer, color: Color, thickness: u32, style: LineStyle) -> Status {
        draw_segments(canvas, self.lines(), color, thickness, style)
    }
}

/// Shared Bresenham-based rasterizer used by every [`LineDetector::draw_lines`]
/// default implementation.
pub fn draw_segments(canvas: &mut RasterBuffer, segments: &[Segment], color: Color, thickness: u32, style: LineStyle) -> Status {
    use towerscan_core::PixelFormat;

    if canvas.format() != PixelFormat::Rgb8 {
        return Status::Failure;
    }
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);
    let buf = canvas.make_mut();
    let radius = (thickness / 2).max(0) as i64;

    for segment in segments {
        let (mut x0, mut y0) = (segment.p1.x.round() as i64, segment.p1.y.round() as i64);
        let (x1, y1) = (segment.p2.x.round() as i64, segment.p2.y.round() as i64);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut step = 0;
        loop {
            let paint = match style {
                LineStyle::Solid => true,
                LineStyle::Dashed => (step / 4) % 2 == 0,
            };
            if paint {
                for oy in -radius..=radius {
                    for ox in -radius..=radius {
                        let (px, py) = (x0 + ox, y0 + oy);
                        if px >= 0 && px < w && py >= 0 && py < h {
                            let offset = ((py * w + px) * 3) as usize;
                            buf[offset] = color.r;
                            buf[offset + 1] = color.g;
                            buf[offset + 2] = color.b;
                        }
                    }
                }
            }
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
            step += 1;
        }
    }
    Status::Ok
}
