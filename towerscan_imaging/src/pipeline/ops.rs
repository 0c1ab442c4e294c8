// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Concrete [`ImageProcess`] operations.

use towerscan_core::{PixelFormat, RasterBuffer};

use crate::pipeline::{ImageProcess, ProcessType, Status};
use crate::raster_io::{to_dynamic_image, to_grayscale};

fn mean_stddev(bytes: &[u8]) -> (f64, f64) {
    let n = bytes.len() as f64;
    let mean = bytes.iter().map(|&b| f64::from(b)).sum::<f64>() / n;
    let variance = bytes.iter().map(|&b| (f64::from(b) - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Linearly rescales pixel values so the input's observed `[min, max]`
/// maps onto `[lower, upper]`. A constant input maps entirely to `lower`.
#[derive(Clone, Copy, Debug)]
pub struct Normalize {
    lower: u8,
    upper: u8,
}

impl Normalize {
    /// Builds a normalize op targeting `[lower, upper]`.
    #[must_use]
    pub const fn new(lower: u8, upper: u8) -> Self {
        Self { lower, upper }
    }
}

impl ImageProcess for Normalize {
    fn process_type(&self) -> ProcessType {
        ProcessType::Normalize
    }

    fn run(&self, in_raster: &RasterBuffer, out: &mut RasterBuffer) -> Status {
        let gray = to_grayscale(in_raster);
        let bytes = gray.as_bytes();
        let (min, max) = bytes.iter().fold((255u8, 0u8), |(lo, hi), &b| (lo.min(b), hi.max(b)));
        let span = f64::from(max) - f64::from(min);
        let (lower, upper) = (f64::from(self.lower), f64::from(self.upper));
        let mapped: Vec<u8> = bytes
            .iter()
            .map(|&b| {
                if span == 0.0 {
                    self.lower
                } else {
                    (lower + (f64::from(b) - f64::from(min)) * (upper - lower) / span).round().clamp(0.0, 255.0) as u8
                }
            })
            .collect();
        *out = RasterBuffer::new(gray.width(), gray.height(), PixelFormat::Gray8, mapped)
            .expect("same length as the source grayscale raster");
        Status::Ok
    }
}

/// Thresholds to a two-level image. If `threshold == 0 && max_value == 0`,
/// the threshold is derived as `mean + stddev` over the whole frame.
#[derive(Clone, Copy, Debug)]
pub struct Binarize {
    threshold: u8,
    max_value: u8,
    invert: bool,
}

impl Binarize {
    /// Builds a binarize op.
    #[must_use]
    pub const fn new(threshold: u8, max_value: u8, invert: bool) -> Self {
        Self { threshold, max_value, invert }
    }
}

impl ImageProcess for Binarize {
    fn process_type(&self) -> ProcessType {
        ProcessType::Binarize
    }

    fn run(&self, in_raster: &RasterBuffer, out: &mut RasterBuffer) -> Status {
        let gray = to_grayscale(in_raster);
        let bytes = gray.as_bytes();
        let (threshold, max_value) = if self.threshold == 0 && self.max_value == 0 {
            let (mean, stddev) = mean_stddev(bytes);
            ((mean + stddev).clamp(0.0, 255.0) as u8, 255)
        } else {
            (self.threshold, self.max_value)
        };
        let mapped: Vec<u8> = bytes
            .iter()
            .map(|&b| {
                let above = b > threshold;
                if above != self.invert { max_value } else { 0 }
            })
            .collect();
        *out = RasterBuffer::new(gray.width(), gray.height(), PixelFormat::Gray8, mapped)
            .expect("same length as the source grayscale raster");
        Status::Ok
    }
}

/// Histogram equalization over a single-channel 8-bit frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct EqualizeHistogram;

impl ImageProcess for EqualizeHistogram {
    fn process_type(&self) -> ProcessType {
        ProcessType::EqualizeHistogram
    }

    fn run(&self, in_raster: &RasterBuffer, out: &mut RasterBuffer) -> Status {
        let gray = to_grayscale(in_raster);
        let image = to_dynamic_image(&gray).to_luma8();
        let equalized = imageproc::contrast::equalize_histogram(&image);
        *out = RasterBuffer::new(equalized.width(), equalized.height(), PixelFormat::Gray8, equalized.into_raw())
            .expect("imageproc::contrast::equalize_histogram preserves image dimensions");
        Status::Ok
    }
}

/// How an op should treat samples that fall outside the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BorderMode {
    /// Clamp to the nearest edge pixel.
    Replicate,
    /// Mirror across the edge.
    Reflect,
    /// A fixed constant value.
    Constant(u8),
}

fn sample(bytes: &[u8], width: i64, height: i64, x: i64, y: i64, border: BorderMode) -> f64 {
    let (cx, cy) = match border {
        BorderMode::Replicate => (x.clamp(0, width - 1), y.clamp(0, height - 1)),
        BorderMode::Reflect => (reflect(x, width), reflect(y, height)),
        BorderMode::Constant(value) => {
            if x < 0 || x >= width || y < 0 || y >= height {
                return f64::from(value);
            }
            (x, y)
        }
    };
    f64::from(bytes[(cy * width + cx) as usize])
}

fn reflect(v: i64, len: i64) -> i64 {
    if len <= 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let mut m = v.rem_euclid(period);
    if m >= len {
        m = period - m;
    }
    m
}

fn gaussian_kernel_1d(sigma: f64, radius: usize) -> Vec<f64> {
    let mut kernel: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (-(x * x) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Separable Gaussian smoothing.
#[derive(Clone, Copy, Debug)]
pub struct GaussianBlur {
    kernel_size: u32,
    sigma_x: f64,
    sigma_y: f64,
    border: BorderMode,
}

impl GaussianBlur {
    /// Builds a Gaussian blur op. `kernel_size` must be odd.
    #[must_use]
    pub const fn new(kernel_size: u32, sigma_x: f64, sigma_y: f64, border: BorderMode) -> Self {
        Self { kernel_size, sigma_x, sigma_y, border }
    }
}

impl ImageProcess for GaussianBlur {
    fn process_type(&self) -> ProcessType {
        ProcessType::GaussianBlur
    }

    fn run(&self, in_raster: &RasterBuffer, out: &mut RasterBuffer) -> Status {
        let gray = to_grayscale(in_raster);
        let (w, h) = (gray.width() as i64, gray.height() as i64);
        let radius = (self.kernel_size / 2).max(1) as usize;
        let kx = gaussian_kernel_1d(self.sigma_x.max(1e-6), radius);
        let ky = gaussian_kernel_1d(self.sigma_y.max(1e-6), radius);
        let bytes = gray.as_bytes();

        let mut horizontal = vec![0.0_f64; bytes.len()];
        for y in 0..h {
            for x in 0..w {
                let mut acc = 0.0;
                for (i, &k) in kx.iter().enumerate() {
                    let dx = i as i64 - radius as i64;
                    acc += k * sample(bytes, w, h, x + dx, y, self.border);
                }
                horizontal[(y * w + x) as usize] = acc;
            }
        }
        let mut out_bytes = vec![0u8; bytes.len()];
        for y in 0..h {
            for x in 0..w {
                let mut acc = 0.0;
                for (i, &k) in ky.iter().enumerate() {
                    let dy = i as i64 - radius as i64;
                    let sy = (y + dy).clamp(0, h - 1);
                    acc += k * horizontal[(sy * w + x) as usize];
                }
                out_bytes[(y * w + x) as usize] = acc.round().clamp(0.0, 255.0) as u8;
            }
        }
        *out = RasterBuffer::new(gray.width(), gray.height(), PixelFormat::Gray8, out_bytes)
            .expect("same length as the source grayscale raster");
        Status::Ok
    }
}

/// Edge-preserving smoothing: each output pixel is a weighted average of
/// its spatial neighborhood, weighted by both spatial distance and
/// intensity similarity.
#[derive(Clone, Copy, Debug)]
pub struct BilateralFilter {
    diameter: u32,
    sigma_color: f64,
    sigma_space: f64,
}

impl BilateralFilter {
    /// Builds a bilateral filter op.
    #[must_use]
    pub const fn new(diameter: u32, sigma_color: f64, sigma_space: f64) -> Self {
        Self { diameter, sigma_color, sigma_space }
    }
}

impl ImageProcess for BilateralFilter {
    fn process_type(&self) -> ProcessType {
        ProcessType::BilateralFilter
    }

    fn run(&self, in_raster: &RasterBuffer, out: &mut RasterBuffer) -> Status {
        let gray = to_grayscale(in_raster);
        let (w, h) = (gray.width() as i64, gray.height() as i64);
        let radius = (self.diameter / 2).max(1) as i64;
        let bytes = gray.as_bytes();
        let mut out_bytes = vec![0u8; bytes.len()];
        for y in 0..h {
            for x in 0..w {
                let center = sample(bytes, w, h, x, y, BorderMode::Replicate);
                let mut weight_sum = 0.0;
                let mut value_sum = 0.0;
                for dy in -radius..=radius {
                    for dx in -radius..=radius {
                        let neighbor = sample(bytes, w, h, x + dx, y + dy, BorderMode::Replicate);
                        let spatial = -((dx * dx + dy * dy) as f64) / (2.0 * self.sigma_space * self.sigma_space);
                        let range = -((neighbor - center).powi(2)) / (2.0 * self.sigma_color * self.sigma_color);
                        let weight = (spatial + range).exp();
                        weight_sum += weight;
                        value_sum += weight * neighbor;
                    }
                }
                out_bytes[(y * w + x) as usize] = (value_sum / weight_sum).round().clamp(0.0, 255.0) as u8;
            }
        }
        *out = RasterBuffer::new(gray.width(), gray.height(), PixelFormat::Gray8, out_bytes)
            .expect("same length as the source grayscale raster");
        Status::Ok
    }
}

/// Median smoothing over a square neighborhood.
#[derive(Clone, Copy, Debug)]
pub struct MedianBlur {
    kernel_size: u32,
}

impl MedianBlur {
    /// Builds a median blur op. `kernel_size` must be odd.
    #[must_use]
    pub const fn new(kernel_size: u32) -> Self {
        Self { kernel_size }
    }
}

impl ImageProcess for MedianBlur {
    fn process_type(&self) -> ProcessType {
        ProcessType::MedianBlur
    }

    fn run(&self, in_raster: &RasterBuffer, out: &mut RasterBuffer) -> Status {
        let gray = to_grayscale(in_raster);
        let image = to_dynamic_image(&gray).to_luma8();
        let radius = (self.kernel_size / 2).max(1);
        let blurred = imageproc::filter::median_filter(&image, radius, radius);
        *out = RasterBuffer::new(blurred.width(), blurred.height(), PixelFormat::Gray8, blurred.into_raw())
            .expect("imageproc::filter::median_filter preserves image dimensions");
        Status::Ok
    }
}

/// Output numeric representation for [`Sobel`]'s gradient magnitude:
/// `U8` clamps/casts directly, `AbsF32AsU8` takes the absolute value
/// before casting, which is the common choice for edge visualization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SobelOutputDtype {
    /// Cast the signed gradient directly, clamping to `[0, 255]`.
    U8,
    /// Cast `abs(gradient)`, clamping to `[0, 255]`.
    AbsF32AsU8,
}

/// Sobel derivative. `dx`/`dy` select whether the horizontal/vertical
/// kernel is applied (both may be set, combined via magnitude).
#[derive(Clone, Copy, Debug)]
pub struct Sobel {
    dx: bool,
    dy: bool,
    scale: f64,
    delta: f64,
    output_dtype: SobelOutputDtype,
}

impl Sobel {
    /// Builds a Sobel op. `kernel_size` is currently fixed at the
    /// standard 3x3 kernel regardless of the value passed in by callers
    /// who don't need a larger aperture.
    #[must_use]
    pub const fn new(dx: bool, dy: bool, scale: f64, delta: f64, output_dtype: SobelOutputDtype) -> Self {
        Self { dx, dy, scale, delta, output_dtype }
    }
}

const SOBEL_X: [[f64; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_Y: [[f64; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

fn convolve3x3(bytes: &[u8], w: i64, h: i64, x: i64, y: i64, kernel: &[[f64; 3]; 3]) -> f64 {
    let mut acc = 0.0;
    for (ky, row) in kernel.iter().enumerate() {
        for (kx, &weight) in row.iter().enumerate() {
            let sx = x + kx as i64 - 1;
            let sy = y + ky as i64 - 1;
            acc += weight * sample(bytes, w, h, sx, sy, BorderMode::Replicate);
        }
    }
    acc
}

impl ImageProcess for Sobel {
    fn process_type(&self) -> ProcessType {
        ProcessType::Sobel
    }

    fn run(&self, in_raster: &RasterBuffer, out: &mut RasterBuffer) -> Status {
        let gray = to_grayscale(in_raster);
        let (w, h) = (gray.width() as i64, gray.height() as i64);
        let bytes = gray.as_bytes();
        let mut out_bytes = vec![0u8; bytes.len()];
        for y in 0..h {
            for x in 0..w {
                let gx = if self.dx { convolve3x3(bytes, w, h, x, y, &SOBEL_X) } else { 0.0 };
                let gy = if self.dy { convolve3x3(bytes, w, h, x, y, &SOBEL_Y) } else { 0.0 };
                let raw = if self.dx && self.dy { gx.hypot(gy) } else { gx + gy };
                let scaled = raw * self.scale + self.delta;
                let value = match self.output_dtype {
                    SobelOutputDtype::U8 => scaled,
                    SobelOutputDtype::AbsF32AsU8 => scaled.abs(),
                };
                out_bytes[(y * w + x) as usize] = value.round().clamp(0.0, 255.0) as u8;
            }
        }
        *out = RasterBuffer::new(gray.width(), gray.height(), PixelFormat::Gray8, out_bytes)
            .expect("same length as the source grayscale raster");
        Status::Ok
    }
}

/// Canny edge detection. If both thresholds are zero, they are derived
/// from the mean/stddev of the input frame.
#[derive(Clone, Copy, Debug)]
pub struct Canny {
    threshold1: f32,
    threshold2: f32,
}

impl Canny {
    /// Builds a Canny op. `aperture` is accepted for interface
    /// compatibility but `imageproc::edges::canny` always uses a fixed
    /// 3x3 Sobel aperture internally.
    #[must_use]
    pub const fn new(threshold1: f32, threshold2: f32, _aperture: u32) -> Self {
        Self { threshold1, threshold2 }
    }
}

impl ImageProcess for Canny {
    fn process_type(&self) -> ProcessType {
        ProcessType::Canny
    }

    fn run(&self, in_raster: &RasterBuffer, out: &mut RasterBuffer) -> Status {
        let gray = to_grayscale(in_raster);
        let image = to_dynamic_image(&gray).to_luma8();
        let (t1, t2) = if self.threshold1 == 0.0 && self.threshold2 == 0.0 {
            let (mean, stddev) = mean_stddev(gray.as_bytes());
            ((mean - stddev).max(0.0) as f32, (mean + stddev) as f32)
        } else {
            (self.threshold1, self.threshold2)
        };
        let edges = imageproc::edges::canny(&image, t1, t2);
        *out = RasterBuffer::new(edges.width(), edges.height(), PixelFormat::Gray8, edges.into_raw())
            .expect("imageproc::edges::canny preserves image dimensions");
        Status::Ok
    }
}

/// Structuring-element shape for the morphology family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StructuringElement {
    /// A full `size x size` rectangle.
    Rect,
    /// A `+`-shaped cross of `size`.
    Cross,
    /// An approximately elliptical mask inscribed in `size x size`.
    Ellipse,
}

impl StructuringElement {
    fn mask(self, size: u32) -> Vec<(i64, i64)> {
        let radius = (size / 2) as i64;
        let mut offsets = Vec::new();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let include = match self {
                    Self::Rect => true,
                    Self::Cross => dx == 0 || dy == 0,
                    Self::Ellipse => {
                        let rx = radius.max(1) as f64;
                        let ry = radius.max(1) as f64;
                        (dx as f64 / rx).powi(2) + (dy as f64 / ry).powi(2) <= 1.0
                    }
                };
                if include {
                    offsets.push((dx, dy));
                }
            }
        }
        offsets
    }
}

/// Which of the seven morphological transforms a [`Morphology`] op
/// performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MorphOp {
    /// Min over the structuring element.
    Erode,
    /// Max over the structuring element.
    Dilate,
    /// Erode then dilate — removes small bright specks.
    Opening,
    /// Dilate then erode — closes small dark gaps.
    Closing,
    /// Dilate minus erode — outlines.
    MorphGradient,
    /// Input minus opening — bright features smaller than the element.
    TopHat,
    /// Closing minus input — dark features smaller than the element.
    BlackHat,
}

/// A morphological transform.
#[derive(Clone, Copy, Debug)]
pub struct Morphology {
    op: MorphOp,
    shape: StructuringElement,
    size: u32,
    iterations: u32,
}

impl Morphology {
    /// Builds a morphology op. The anchor is always the structuring
    /// element's center and the border is replicated, matching the common
    /// default in the rest of the ecosystem.
    #[must_use]
    pub const fn new(op: MorphOp, shape: StructuringElement, size: u32, iterations: u32) -> Self {
        Self { op, shape, size, iterations }
    }

    fn erode_once(bytes: &[u8], w: i64, h: i64, mask: &[(i64, i64)]) -> Vec<u8> {
        (0..h)
            .flat_map(|y| {
                (0..w).map(move |x| {
                    mask.iter()
                        .map(|&(dx, dy)| sample(bytes, w, h, x + dx, y + dy, BorderMode::Replicate) as u8)
                        .min()
                        .unwrap_or(0)
                })
            })
            .collect()
    }

    fn dilate_once(bytes: &[u8], w: i64, h: i64, mask: &[(i64, i64)]) -> Vec<u8> {
        (0..h)
            .flat_map(|y| {
                (0..w).map(move |x| {
                    mask.iter()
                        .map(|&(dx, dy)| sample(bytes, w, h, x + dx, y + dy, BorderMode::Replicate) as u8)
                        .max()
                        .unwrap_or(0)
                })
            })
            .collect()
    }
}

impl ImageProcess for Morphology {
    fn process_type(&self) -> ProcessType {
        ProcessType::Morphology
    }

    fn run(&self, in_raster: &RasterBuffer, out: &mut RasterBuffer) -> Status {
        let gray = to_grayscale(in_raster);
        let (w, h) = (gray.width() as i64, gray.height() as i64);
        let mask = self.shape.mask(self.size);
        let original = gray.as_bytes().to_vec();

        let run_erode = |bytes: &[u8]| {
            let mut current = bytes.to_vec();
            for _ in 0..self.iterations.max(1) {
                current = Self::erode_once(&current, w, h, &mask);
            }
            current
        };
        let run_dilate = |bytes: &[u8]| {
            let mut current = bytes.to_vec();
            for _ in 0..self.iterations.max(1) {
                current = Self::dilate_once(&current, w, h, &mask);
            }
            current
        };

        let result = match self.op {
            MorphOp::Erode => run_erode(&original),
            MorphOp::Dilate => run_dilate(&original),
            MorphOp::Opening => run_dilate(&run_erode(&original)),
            MorphOp::Closing => run_erode(&run_dilate(&original)),
            MorphOp::MorphGradient => {
                let dilated = run_dilate(&original);
                let eroded = run_erode(&original);
                dilated.iter().zip(eroded.iter()).map(|(&d, &e)| d.saturating_sub(e)).collect()
            }
            MorphOp::TopHat => {
                let opened = run_dilate(&run_erode(&original));
                original.iter().zip(opened.iter()).map(|(&i, &o)| i.saturating_sub(o)).collect()
            }
            MorphOp::BlackHat => {
                let closed = run_erode(&run_dilate(&original));
                closed.iter().zip(original.iter()).map(|(&c, &i)| c.saturating_sub(i)).collect()
            }
        };
        *out = RasterBuffer::new(gray.width(), gray.height(), PixelFormat::Gray8, result)
            .expect("same length as the source grayscale raster");
        Status::Ok
    }
}

/// Which of the three resize modes is active; exactly one applies.
#[derive(Clone, Copy, Debug)]
pub enum ResizeMode {
    /// Explicit output dimensions.
    Absolute {
        /// Target width.
        width: u32,
        /// Target height.
        height: u32,
    },
    /// A uniform scale factor.
    Scale(f64),
}

/// Resizes the raster, using `image`'s Lanczos3 resampler.
#[derive(Clone, Copy, Debug)]
pub struct Resize {
    mode: ResizeMode,
}

impl Resize {
    /// Builds a resize op.
    #[must_use]
    pub const fn new(mode: ResizeMode) -> Self {
        Self { mode }
    }
}

impl ImageProcess for Resize {
    fn process_type(&self) -> ProcessType {
        ProcessType::Resize
    }

    fn run(&self, in_raster: &RasterBuffer, out: &mut RasterBuffer) -> Status {
        let dynamic = to_dynamic_image(in_raster);
        let (target_w, target_h) = match self.mode {
            ResizeMode::Absolute { width, height } => (width, height),
            ResizeMode::Scale(factor) => (
                ((dynamic.width() as f64) * factor).round().max(1.0) as u32,
                ((dynamic.height() as f64) * factor).round().max(1.0) as u32,
            ),
        };
        let resized = dynamic.resize_exact(target_w, target_h, image::imageops::FilterType::Lanczos3);
        *out = crate::raster_io::from_dynamic_image(&resized);
        Status::Ok
    }
}

/// Iterative parallel thinning algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThinningAlgorithm {
    /// Zhang-Suen (1984).
    ZhangSuen,
    /// Guo-Hall (1989).
    GuoHall,
}

/// Reduces a binary foreground to a 1-pixel-wide skeleton. Input is
/// treated as binary: any pixel `> 127` is foreground. Iterates until a
/// pass removes no pixels or a safety cap of 100 passes is reached.
#[derive(Clone, Copy, Debug)]
pub struct Thinning {
    algorithm: ThinningAlgorithm,
}

impl Thinning {
    /// Builds a thinning op.
    #[must_use]
    pub const fn new(algorithm: ThinningAlgorithm) -> Self {
        Self { algorithm }
    }

    fn neighbors(grid: &[bool], w: i64, h: i64, x: i64, y: i64) -> [bool; 8] {
        let at = |dx: i64, dy: i64| {
            let (sx, sy) = (x + dx, y + dy);
            sx >= 0 && sx < w && sy >= 0 && sy < h && grid[(sy * w + sx) as usize]
        };
        // p2..p9 clockwise from north, standard Zhang-Suen numbering.
        [at(0, -1), at(1, -1), at(1, 0), at(1, 1), at(0, 1), at(-1, 1), at(-1, 0), at(-1, -1)]
    }

    fn transitions(p: &[bool; 8]) -> u32 {
        let mut count = 0;
        for i in 0..8 {
            if !p[i] && p[(i + 1) % 8] {
                count += 1;
            }
        }
        count
    }
}

impl ImageProcess for Thinning {
    fn process_type(&self) -> ProcessType {
        ProcessType::Thinning
    }

    fn run(&self, in_raster: &RasterBuffer, out: &mut RasterBuffer) -> Status {
        let gray = to_grayscale(in_raster);
        let (w, h) = (gray.width() as i64, gray.height() as i64);
        let mut grid: Vec<bool> = gray.as_bytes().iter().map(|&b| b > 127).collect();

        for _pass in 0..100 {
            let mut changed = false;
            for sub_iteration in 0..2 {
                let mut to_clear = Vec::new();
                for y in 0..h {
                    for x in 0..w {
                        let idx = (y * w + x) as usize;
                        if !grid[idx] {
                            continue;
                        }
                        let p = Self::neighbors(&grid, w, h, x, y);
                        let black_neighbors = p.iter().filter(|&&v| v).count();
                        if !(2..=6).contains(&black_neighbors) {
                            continue;
                        }
                        if Self::transitions(&p) != 1 {
                            continue;
                        }
                        let (c1, c2) = match (self.algorithm, sub_iteration) {
                            (ThinningAlgorithm::ZhangSuen, 0) => (!(p[0] && p[2] && p[4]), !(p[2] && p[4] && p[6])),
                            (ThinningAlgorithm::ZhangSuen, _) => (!(p[0] && p[2] && p[6]), !(p[0] && p[4] && p[6])),
                            (ThinningAlgorithm::GuoHall, 0) => {
                                (!(p[0] && p[2]) || !p[6], !(p[2] && p[4]) || !p[0])
                            }
                            (ThinningAlgorithm::GuoHall, _) => {
                                (!(p[4] && p[6]) || !p[2], !(p[0] && p[6]) || !p[4])
                            }
                        };
                        if c1 && c2 {
                            to_clear.push(idx);
                        }
                    }
                }
                if !to_clear.is_empty() {
                    changed = true;
                    for idx in to_clear {
                        grid[idx] = false;
                    }
                }
            }
            if !changed {
                break;
            }
        }

        let bytes: Vec<u8> = grid.iter().map(|&on| if on { 255 } else { 0 }).collect();
        *out = RasterBuffer::new(gray.width(), gray.height(), PixelFormat::Gray8, bytes)
            .expect("same length as the source grayscale raster");
        Status::Ok
    }
}

/// Wraps a user-supplied callable as an opaque [`ImageProcess`].
pub struct FunctionProcess {
    name: &'static str,
    func: Box<dyn Fn(&RasterBuffer, &mut RasterBuffer) -> Status + Send + Sync>,
}

impl FunctionProcess {
    /// Builds a function process. `name` is used only for logging.
    #[must_use]
    pub fn new(name: &'static str, func: impl Fn(&RasterBuffer, &mut RasterBuffer) -> Status + Send + Sync + 'static) -> Self {
        Self { name, func: Box::new(func) }
    }
}

impl core::fmt::Debug for FunctionProcess {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FunctionProcess").field("name", &self.name).finish_non_exhaustive()
    }
}

impl ImageProcess for FunctionProcess {
    fn process_type(&self) -> ProcessType {
        ProcessType::Function
    }

    fn run(&self, in_raster: &RasterBuffer, out: &mut RasterBuffer) -> Status {
        (self.func)(in_raster, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, height: u32, data: Vec<u8>) -> RasterBuffer {
        RasterBuffer::new(width, height, PixelFormat::Gray8, data).unwrap()
    }

    #[test]
    fn normalize_stretches_to_full_range() {
        let input = gray(4, 1, vec![50, 60, 70, 80]);
        let op = Normalize::new(0, 255);
        let mut out = RasterBuffer::zeros(1, 1, PixelFormat::Gray8);
        op.run(&input, &mut out);
        assert_eq!(out.as_bytes()[0], 0);
        assert_eq!(out.as_bytes()[3], 255);
    }

    #[test]
    fn binarize_separates_above_and_below_threshold() {
        let input = gray(2, 1, vec![10, 200]);
        let op = Binarize::new(100, 255, false);
        let mut out = RasterBuffer::zeros(1, 1, PixelFormat::Gray8);
        op.run(&input, &mut out);
        assert_eq!(out.as_bytes(), &[0, 255]);
    }

    #[test]
    fn binarize_invert_flips_output() {
        let input = gray(2, 1, vec![10, 200]);
        let op = Binarize::new(100, 255, true);
        let mut out = RasterBuffer::zeros(1, 1, PixelFormat::Gray8);
        op.run(&input, &mut out);
        assert_eq!(out.as_bytes(), &[255, 0]);
    }

    #[test]
    fn equalize_histogram_preserves_shape() {
        let input = gray(2, 2, vec![0, 64, 128, 255]);
        let op = EqualizeHistogram;
        let mut out = RasterBuffer::zeros(1, 1, PixelFormat::Gray8);
        op.run(&input, &mut out);
        assert_eq!(out.width(), 2);
        assert_eq!(out.height(), 2);
    }

    #[test]
    fn gaussian_blur_smooths_an_impulse() {
        let mut data = vec![0u8; 25];
        data[12] = 255;
        let input = gray(5, 5, data);
        let op = GaussianBlur::new(3, 1.0, 1.0, BorderMode::Replicate);
        let mut out = RasterBuffer::zeros(1, 1, PixelFormat::Gray8);
        op.run(&input, &mut out);
        assert!(out.as_bytes()[12] < 255);
        assert!(out.as_bytes()[12] > 0);
    }

    #[test]
    fn median_blur_removes_salt_and_pepper() {
        let mut data = vec![100u8; 9];
        data[4] = 0;
        let input = gray(3, 3, data);
        let op = MedianBlur::new(3);
        let mut out = RasterBuffer::zeros(1, 1, PixelFormat::Gray8);
        op.run(&input, &mut out);
        assert_eq!(out.as_bytes()[4], 100);
    }

    #[test]
    fn dilate_grows_and_erode_shrinks() {
        let mut data = vec![0u8; 25];
        data[12] = 255;
        let input = gray(5, 5, data);
        let dilate = Morphology::new(MorphOp::Dilate, StructuringElement::Cross, 3, 1);
        let mut out = RasterBuffer::zeros(1, 1, PixelFormat::Gray8);
        dilate.run(&input, &mut out);
        let lit: usize = out.as_bytes().iter().filter(|&&b| b == 255).count();
        assert!(lit > 1);

        let erode = Morphology::new(MorphOp::Erode, StructuringElement::Cross, 3, 1);
        erode.run(&input, &mut out);
        assert!(out.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn resize_absolute_changes_dimensions() {
        let input = gray(4, 4, vec![128; 16]);
        let op = Resize::new(ResizeMode::Absolute { width: 2, height: 2 });
        let mut out = RasterBuffer::zeros(1, 1, PixelFormat::Gray8);
        op.run(&input, &mut out);
        assert_eq!(out.width(), 2);
        assert_eq!(out.height(), 2);
    }

    #[test]
    fn thinning_reduces_a_filled_square_to_fewer_pixels() {
        let mut data = vec![0u8; 49];
        for y in 1..6 {
            for x in 1..6 {
                data[y * 7 + x] = 255;
            }
        }
        let input = gray(7, 7, data.clone());
        let op = Thinning::new(ThinningAlgorithm::ZhangSuen);
        let mut out = RasterBuffer::zeros(1, 1, PixelFormat::Gray8);
        op.run(&input, &mut out);
        let before = data.iter().filter(|&&b| b == 255).count();
        let after = out.as_bytes().iter().filter(|&&b| b == 255).count();
        assert!(after < before);
        assert!(after > 0);
    }

    #[test]
    fn function_process_runs_the_closure() {
        let op = FunctionProcess::new("invert", |input, out| {
            let inverted: Vec<u8> = input.as_bytes().iter().map(|&b| 255 - b).collect();
            *out = RasterBuffer::new(input.width(), input.height(), input.format(), inverted).unwrap();
            Status::Ok
        });
        let input = gray(2, 1, vec![10, 250]);
        let mut out = RasterBuffer::zeros(1, 1, PixelFormat::Gray8);
        op.run(&input, &mut out);
        assert_eq!(out.as_bytes(), &[245, 5]);
    }
}
