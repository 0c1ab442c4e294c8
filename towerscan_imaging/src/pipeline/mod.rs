// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The image-processing pipeline: stateless [`ImageProcess`] ops composed
//! into an ordered [`ImagingProcesses`] container, the same shape as the
//! teacher's `RenderPlan { items: Vec<RenderItem> }`.

pub mod ops;

use towerscan_core::RasterBuffer;

/// Tags what kind of operation a concrete [`ImageProcess`] is, for
/// logging/introspection; it carries no behavior of its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessType {
    /// Linear rescale of pixel values.
    Normalize,
    /// Threshold to a two-level image.
    Binarize,
    /// Histogram equalization.
    EqualizeHistogram,
    /// Gaussian smoothing.
    GaussianBlur,
    /// Edge-preserving smoothing.
    BilateralFilter,
    /// Median smoothing.
    MedianBlur,
    /// Sobel gradient.
    Sobel,
    /// Canny edge detection.
    Canny,
    /// A morphological operation (erode/dilate/opening/closing/gradient/
    /// top-hat/black-hat).
    Morphology,
    /// Resize (absolute size or scale factor).
    Resize,
    /// Iterative skeletonization.
    Thinning,
    /// A user-supplied opaque callable.
    Function,
}

/// Whether a pipeline run succeeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// `out` was written successfully.
    Ok,
    /// The op failed; `out`'s contents are unspecified.
    Failure,
}

/// A stateless image-processing operation.
///
/// `run` may alias `in_raster` and `out_raster` being the same underlying
/// storage (implementations that can't operate in place internally copy
/// first); `out_raster`'s shape/dtype are determined by the op, callers
/// must not pre-impose one. A single `ImageProcess` instance must not be
/// invoked concurrently on shared state — distinct instances of the same
/// op may run in parallel (matching `Normalize::default().run(...)` in one
/// thread and another `Normalize::default()` in another being fine, two
/// threads sharing one `Normalize` instance not being fine).
pub trait ImageProcess {
    /// The process's type tag.
    fn process_type(&self) -> ProcessType;

    /// Runs the op, writing the result into `out`.
    fn run(&self, in_raster: &RasterBuffer, out: &mut RasterBuffer) -> Status;
}

/// An ordered sequence of [`ImageProcess`] handles, run in order with
/// internal double buffering. On any op returning [`Status::Failure`] the
/// pipeline aborts immediately and downstream ops do not run.
#[derive(Default)]
pub struct ImagingProcesses {
    items: Vec<Box<dyn ImageProcess>>,
}

impl ImagingProcesses {
    /// An empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends an op to the end of the pipeline.
    pub fn push(&mut self, process: Box<dyn ImageProcess>) {
        self.items.push(process);
    }

    /// Number of ops in the pipeline.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True iff the pipeline has no ops.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Runs every op in order, double-buffering between them. `in_raster`
    /// is left untouched; the final result is written to `out`. Aborts
    /// and returns [`Status::Failure`] at the first op that fails.
    pub fn run(&self, in_raster: &RasterBuffer, out: &mut RasterBuffer) -> Status {
        if in_raster.width() == 0 || in_raster.height() == 0 {
            log::error!(
                "pipeline aborted: {}",
                towerscan_core::Error::DataEmpty("input raster has zero extent".into())
            );
            return Status::Failure;
        }
        if self.items.is_empty() {
            *out = in_raster.clone();
            return Status::Ok;
        }
        let mut current = in_raster.clone();
        let mut scratch = in_raster.clone();
        for item in &self.items {
            match item.run(&current, &mut scratch) {
                Status::Ok => core::mem::swap(&mut current, &mut scratch),
                Status::Failure => {
                    log::error!("pipeline aborted: {:?} returned Failure", item.process_type());
                    return Status::Failure;
                }
            }
        }
        *out = current;
        Status::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ops::Normalize;
    use towerscan_core::PixelFormat;

    #[test]
    fn empty_pipeline_passes_input_through() {
        let pipeline = ImagingProcesses::new();
        let input = RasterBuffer::new(2, 1, PixelFormat::Gray8, vec![10, 200]).unwrap();
        let mut out = RasterBuffer::zeros(1, 1, PixelFormat::Gray8);
        assert_eq!(pipeline.run(&input, &mut out), Status::Ok);
        assert_eq!(out.as_bytes(), input.as_bytes());
    }

    #[test]
    fn empty_raster_fails_instead_of_running_ops() {
        let mut pipeline = ImagingProcesses::new();
        pipeline.push(Box::new(Normalize::new(0, 255)));
        let empty = RasterBuffer::zeros(0, 0, PixelFormat::Gray8);
        let mut out = RasterBuffer::zeros(1, 1, PixelFormat::Gray8);
        assert_eq!(pipeline.run(&empty, &mut out), Status::Failure);
    }

    #[test]
    fn pipeline_runs_ops_in_order() {
        let mut pipeline = ImagingProcesses::new();
        pipeline.push(Box::new(Normalize::new(0, 255)));
        pipeline.push(Box::new(Normalize::new(0, 100)));
        let input = RasterBuffer::new(2, 1, PixelFormat::Gray8, vec![0, 255]).unwrap();
        let mut out = RasterBuffer::zeros(1, 1, PixelFormat::Gray8);
        assert_eq!(pipeline.run(&input, &mut out), Status::Ok);
        assert_eq!(out.as_bytes(), &[0, 100]);
    }
}
