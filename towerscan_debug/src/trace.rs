// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for a pipeline/line-detector/video-stream run.
//!
//! [`TraceSink`] is a trait with one method per event, all defaulted to a
//! no-op, so a consumer only implements the events it cares about. Alongside
//! `TraceSink`, ordinary `log::debug!`/`info!`/`warn!`/`error!` calls inside
//! `towerscan_imaging` and `towerscan_video` give a consumer who only wants
//! `env_logger`-style output a path that doesn't need a `TraceSink` at all.

/// Why a video frame was skipped rather than delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The active skip policy (stride) excluded this frame.
    Policy,
    /// Blur rejection discarded this frame (Laplacian variance below the
    /// floor).
    Blur,
}

/// Emitted when an `ImageProcess` op begins running inside an
/// `ImagingProcesses` pipeline.
#[derive(Clone, Copy, Debug)]
pub struct StageBeginEvent {
    /// Index of the frame this pipeline run is processing, if known.
    pub frame_index: Option<u64>,
    /// Position of this op within the pipeline.
    pub stage_index: usize,
    /// The op's process-type name.
    pub stage_name: &'static str,
}

/// Emitted when an `ImageProcess` op finishes running.
#[derive(Clone, Copy, Debug)]
pub struct StageEndEvent {
    /// Index of the frame this pipeline run is processing, if known.
    pub frame_index: Option<u64>,
    /// Position of this op within the pipeline.
    pub stage_index: usize,
    /// The op's process-type name.
    pub stage_name: &'static str,
    /// Whether the op reported success.
    pub ok: bool,
}

/// Emitted once per frame a video source reads (before sizing).
#[derive(Clone, Copy, Debug)]
pub struct FrameReadEvent {
    /// Zero-based frame index.
    pub frame_index: u64,
    /// Elapsed position in milliseconds.
    pub position_ms: f64,
}

/// Emitted once per frame a video source discards rather than delivers.
#[derive(Clone, Copy, Debug)]
pub struct FrameSkipEvent {
    /// Index of the frame that was skipped.
    pub frame_index: u64,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Emitted after a `Transform::compute` call, success or failure.
#[derive(Clone, Copy, Debug)]
pub struct TransformFitEvent {
    /// The transform's kind name (`"translation"`, `"helmert2d"`, …).
    pub kind: &'static str,
    /// Number of point correspondences the fit was attempted with.
    pub point_count: usize,
    /// Reported RMSE, `NaN` if the fit failed.
    pub rmse: f64,
    /// Whether the fit succeeded.
    pub success: bool,
}

/// Emitted after a `LineDetector::run` call.
#[derive(Clone, Copy, Debug)]
pub struct LineDetectEvent {
    /// The strategy's name (`"hough"`, `"hough_p"`, `"hough_fast"`, `"lsd"`).
    pub strategy: &'static str,
    /// Number of segments published after the angular filter.
    pub segment_count: usize,
}

/// Emitted after a `Matcher::match_descriptors`/`get_good_matches` call.
#[derive(Clone, Copy, Debug)]
pub struct MatchEvent {
    /// Keypoints in the query set.
    pub query_count: usize,
    /// Keypoints in the train set.
    pub train_count: usize,
    /// Matches produced.
    pub match_count: usize,
}

/// Receives diagnostic events from a pipeline/line-detector/video-stream
/// run. All methods default to a no-op; implement only what you need.
pub trait TraceSink {
    /// Called when a pipeline stage begins.
    fn on_stage_begin(&mut self, e: &StageBeginEvent) {
        _ = e;
    }

    /// Called when a pipeline stage ends.
    fn on_stage_end(&mut self, e: &StageEndEvent) {
        _ = e;
    }

    /// Called when a video source reads a frame.
    fn on_frame_read(&mut self, e: &FrameReadEvent) {
        _ = e;
    }

    /// Called when a video source skips a frame.
    fn on_frame_skip(&mut self, e: &FrameSkipEvent) {
        _ = e;
    }

    /// Called after a transform fit, success or failure.
    fn on_transform_fit(&mut self, e: &TransformFitEvent) {
        _ = e;
    }

    /// Called after a line-detector run.
    fn on_line_detect(&mut self, e: &LineDetectEvent) {
        _ = e;
    }

    /// Called after a matcher run.
    fn on_match(&mut self, e: &MatchEvent) {
        _ = e;
    }
}

/// A [`TraceSink`] that discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}
