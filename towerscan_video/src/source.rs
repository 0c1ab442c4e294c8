// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The pull-based video driver: [`VideoSource`], a status/skip/blur-aware
//! frame iterator, and [`ImageListSource`], a file-backed implementation
//! over a sequential list of still-image frames (grounded on
//! `examples/original_source/src/VideoStream.h`'s `nextFrame`/`run`/
//! `setSkipFrames`/`setSkipBlurryFrames` contract — re-architected away
//! from raw `cv::VideoCapture` + function-pointer callbacks).

use std::path::{Path, PathBuf};
use std::time::Duration;

use towerscan_core::video::{FrameSizing, SkipPolicy, VideoStatus};
use towerscan_core::{PixelFormat, RasterBuffer};
use towerscan_imaging::raster_io;

use crate::error::{Error, Result};
use crate::keyboard::{KeyboardController, VideoCommand};
use crate::listener::{NoopListener, Position, VideoListener};

/// Laplacian-variance floor below which a frame is considered too blurry
/// to keep (an empirically chosen floor).
pub const BLUR_VARIANCE_FLOOR: f64 = 70.0;

/// A sequential, pull-based source of video frames.
///
/// Implementors expose the read-only stream metadata (`fps`,
/// `frame_count`, `frame_size`), the configurable policies (skip,
/// blur-rejection, frame sizing), and the pull methods (`next_frame`,
/// `run`). State transitions:
///
/// ```text
///   Start ──run()──▶ Running ⇆ Paused
///                      │
///                      ├──stop()──▶ Stopping ──▶ Stopped
///                      └──EOF────▶ Finalized
/// ```
pub trait VideoSource {
    /// Frames per second reported by the source.
    fn fps(&self) -> f64;

    /// Total number of frames in the source.
    fn frame_count(&self) -> u64;

    /// Native frame size `(width, height)`.
    fn frame_size(&self) -> (u32, u32);

    /// Current lifecycle status.
    fn status(&self) -> VideoStatus;

    /// Current playback position, in both frames and milliseconds.
    fn position(&self) -> Position;

    /// Sets the skip policy used by subsequent `next_frame` calls.
    fn set_skip_policy(&mut self, policy: SkipPolicy);

    /// The active skip policy.
    fn skip_policy(&self) -> SkipPolicy;

    /// Enables or disables blur rejection (Laplacian-variance floor).
    fn set_blur_rejection(&mut self, enabled: bool);

    /// True iff blur rejection is enabled.
    fn blur_rejection(&self) -> bool;

    /// Sets how delivered frames are sized.
    fn set_frame_sizing(&mut self, sizing: FrameSizing);

    /// The active frame-sizing mode.
    fn frame_sizing(&self) -> FrameSizing;

    /// Registers the listener that observes this source's frame loop.
    /// Replaces any previously registered listener.
    fn set_listener(&mut self, listener: Box<dyn VideoListener>);

    /// Advances according to the active skip policy and blur-rejection
    /// flag, returning the next frame, or `None` at end of stream.
    /// Does not dispatch listener callbacks — use [`VideoSource::run`]
    /// for the full observed loop, or call this directly for manual,
    /// non-interactive iteration.
    fn next_frame(&mut self) -> Result<Option<RasterBuffer>>;

    /// Pauses a `Running` source.
    fn pause(&mut self);

    /// Resumes a `Paused` source back to `Running`.
    fn resume(&mut self);

    /// Requests a stop. Cooperative: takes effect at the next loop
    /// iteration boundary, not immediately.
    fn stop(&mut self);

    /// Runs the frame loop to completion (EOF) or until stopped,
    /// dispatching `on_position_change` → `on_read` → `on_show` per
    /// frame and polling `keyboard` once per iteration for interactive
    /// control. Pass [`crate::keyboard::NoopController`] to disable
    /// keyboard handling entirely.
    fn run(&mut self, keyboard: &mut dyn KeyboardController) -> Result<()>;
}

/// A [`VideoSource`] backed by a sequential list of still-image files,
/// treating each file as one frame (the data model's "file-backed or
/// synthetic image list" handle).
pub struct ImageListSource {
    paths: Vec<PathBuf>,
    fps: f64,
    frame_size: (u32, u32),
    next_candidate: u64,
    delivered: u64,
    status: VideoStatus,
    skip_policy: SkipPolicy,
    blur_rejection: bool,
    frame_sizing: FrameSizing,
    listener: Box<dyn VideoListener>,
}

impl std::fmt::Debug for ImageListSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageListSource")
            .field("frame_count", &self.paths.len())
            .field("fps", &self.fps)
            .field("frame_size", &self.frame_size)
            .field("status", &self.status)
            .field("skip_policy", &self.skip_policy)
            .field("blur_rejection", &self.blur_rejection)
            .field("frame_sizing", &self.frame_sizing)
            .finish_non_exhaustive()
    }
}

impl ImageListSource {
    /// Opens a source from an explicit, already-ordered list of image
    /// paths. Fails with `Error::Open` if the list is empty or the first
    /// frame cannot be decoded (used to establish `frame_size`).
    pub fn open(paths: Vec<PathBuf>, fps: f64) -> Result<Self> {
        if paths.is_empty() {
            return Err(Error::Open("empty frame list".into()));
        }
        let first = raster_io::read_raster(&paths[0]).map_err(Error::Imaging)?;
        Ok(Self {
            frame_size: (first.width(), first.height()),
            paths,
            fps,
            next_candidate: 0,
            delivered: 0,
            status: VideoStatus::Start,
            skip_policy: SkipPolicy::NoSkip,
            blur_rejection: false,
            frame_sizing: FrameSizing::Original,
            listener: Box::new(NoopListener),
        })
    }

    /// Opens a source from every file directly inside `dir`, sorted by
    /// file name, treating the directory as an ordered frame sequence.
    pub fn open_dir(dir: impl AsRef<Path>, fps: f64) -> Result<Self> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir.as_ref())
            .map_err(|e| Error::Open(format!("{}: {e}", dir.as_ref().display())))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.is_file())
            .collect();
        paths.sort();
        Self::open(paths, fps)
    }

    fn step_frames(&self) -> u64 {
        match self.skip_policy {
            SkipPolicy::NoSkip => 1,
            SkipPolicy::SkipFrames(n) => u64::from(n).max(1),
            SkipPolicy::SkipMillis(ms) => {
                let frame_duration_ms = 1000.0 / self.fps;
                let n = (f64::from(ms) / frame_duration_ms).round() as u64;
                n.max(1)
            }
        }
    }

    fn size_frame(&self, frame: &RasterBuffer) -> RasterBuffer {
        match self.frame_sizing {
            FrameSizing::Original => frame.clone(),
            FrameSizing::Resize { width, height, preserve_aspect } => {
                let (tw, th) = if preserve_aspect {
                    let scale = f64::from(width) / f64::from(frame.width());
                    (width, (f64::from(frame.height()) * scale).round().max(1.0) as u32)
                } else {
                    (width, height)
                };
                let mut out = RasterBuffer::zeros(tw, th, frame.format());
                let op = towerscan_imaging::pipeline::ops::Resize::new(
                    towerscan_imaging::pipeline::ops::ResizeMode::Absolute { width: tw, height: th },
                );
                let _ = towerscan_imaging::pipeline::ImageProcess::run(&op, frame, &mut out);
                out
            }
            FrameSizing::Crop { width, height } => crop_centered(frame, width, height),
        }
    }
}

fn crop_centered(frame: &RasterBuffer, width: u32, height: u32) -> RasterBuffer {
    let bpp = frame.format().bytes_per_pixel();
    let cw = width.min(frame.width());
    let ch = height.min(frame.height());
    let x0 = (frame.width() - cw) / 2;
    let y0 = (frame.height() - ch) / 2;
    let mut out_bytes = vec![0u8; cw as usize * ch as usize * bpp];
    let src = frame.as_bytes();
    for row in 0..ch {
        let src_start = ((y0 + row) as usize * frame.width() as usize + x0 as usize) * bpp;
        let dst_start = row as usize * cw as usize * bpp;
        let len = cw as usize * bpp;
        out_bytes[dst_start..dst_start + len].copy_from_slice(&src[src_start..src_start + len]);
    }
    RasterBuffer::new(cw, ch, frame.format(), out_bytes)
        .expect("cropped length matches cropped dimensions by construction")
}

fn laplacian_variance(frame: &RasterBuffer) -> f64 {
    let gray = raster_io::to_grayscale(frame);
    let (w, h) = (gray.width() as i64, gray.height() as i64);
    let bytes = gray.as_bytes();
    if w < 3 || h < 3 {
        return f64::INFINITY;
    }
    let sample = |x: i64, y: i64| -> f64 {
        let x = x.clamp(0, w - 1);
        let y = y.clamp(0, h - 1);
        f64::from(bytes[(y * w + x) as usize])
    };
    let mut values = Vec::with_capacity((w * h) as usize);
    for y in 0..h {
        for x in 0..w {
            let center = sample(x, y);
            let lap = sample(x - 1, y) + sample(x + 1, y) + sample(x, y - 1) + sample(x, y + 1) - 4.0 * center;
            values.push(lap);
        }
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

impl VideoSource for ImageListSource {
    fn fps(&self) -> f64 {
        self.fps
    }

    fn frame_count(&self) -> u64 {
        self.paths.len() as u64
    }

    fn frame_size(&self) -> (u32, u32) {
        self.frame_size
    }

    fn status(&self) -> VideoStatus {
        self.status
    }

    fn position(&self) -> Position {
        Position {
            frame: self.delivered,
            millis: self.delivered as f64 * 1000.0 / self.fps,
        }
    }

    fn set_skip_policy(&mut self, policy: SkipPolicy) {
        self.skip_policy = policy;
    }

    fn skip_policy(&self) -> SkipPolicy {
        self.skip_policy
    }

    fn set_blur_rejection(&mut self, enabled: bool) {
        self.blur_rejection = enabled;
    }

    fn blur_rejection(&self) -> bool {
        self.blur_rejection
    }

    fn set_frame_sizing(&mut self, sizing: FrameSizing) {
        self.frame_sizing = sizing;
    }

    fn frame_sizing(&self) -> FrameSizing {
        self.frame_sizing
    }

    fn set_listener(&mut self, listener: Box<dyn VideoListener>) {
        self.listener = listener;
    }

    fn next_frame(&mut self) -> Result<Option<RasterBuffer>> {
        if matches!(self.status, VideoStatus::Finalized | VideoStatus::Stopped) {
            return Ok(None);
        }
        if self.status == VideoStatus::Start {
            self.status = VideoStatus::Running;
        }

        loop {
            if self.next_candidate >= self.frame_count() {
                self.status = VideoStatus::Finalized;
                return Ok(None);
            }
            let raw = raster_io::read_raster(&self.paths[self.next_candidate as usize]).map_err(Error::Imaging)?;
            let index = self.next_candidate;

            if self.blur_rejection && laplacian_variance(&raw) < BLUR_VARIANCE_FLOOR {
                log::debug!("skipping blurry frame {index}");
                self.next_candidate += 1;
                continue;
            }

            self.delivered = index;
            self.next_candidate = index + self.step_frames();
            return Ok(Some(raw));
        }
    }

    fn pause(&mut self) {
        if self.status == VideoStatus::Running {
            self.status = VideoStatus::Paused;
        }
    }

    fn resume(&mut self) {
        if self.status == VideoStatus::Paused {
            self.status = VideoStatus::Running;
        }
    }

    fn stop(&mut self) {
        if matches!(self.status, VideoStatus::Running | VideoStatus::Paused) {
            self.status = VideoStatus::Stopping;
        }
    }

    fn run(&mut self, keyboard: &mut dyn KeyboardController) -> Result<()> {
        let frame_budget = Duration::from_secs_f64((1.0 / self.fps).max(0.0));
        self.listener.on_initialize();

        loop {
            if self.status == VideoStatus::Stopping {
                self.status = VideoStatus::Stopped;
                self.listener.on_stop();
                return Ok(());
            }

            if let Some(command) = keyboard.poll(frame_budget) {
                match command {
                    VideoCommand::Stop => {
                        self.stop();
                        continue;
                    }
                    VideoCommand::TogglePause => {
                        if self.status == VideoStatus::Paused {
                            self.resume();
                            self.listener.on_resume();
                        } else if self.status == VideoStatus::Running {
                            self.pause();
                            self.listener.on_pause();
                        }
                    }
                    VideoCommand::IncreaseSkip => self.bump_skip(1),
                    VideoCommand::DecreaseSkip => self.bump_skip(-1),
                }
            }

            if self.status == VideoStatus::Paused {
                continue;
            }

            match self.next_frame()? {
                Some(raw) => {
                    self.listener.on_position_change(self.position());
                    self.listener.on_read(&raw);
                    let sized = self.size_frame(&raw);
                    self.listener.on_show(&sized);
                }
                None => {
                    self.listener.on_finish();
                    return Ok(());
                }
            }
        }
    }
}

impl ImageListSource {
    fn bump_skip(&mut self, delta: i64) {
        self.skip_policy = match self.skip_policy {
            SkipPolicy::NoSkip => {
                if delta > 0 {
                    SkipPolicy::SkipFrames(1)
                } else {
                    SkipPolicy::NoSkip
                }
            }
            SkipPolicy::SkipFrames(n) => {
                let next = (i64::from(n) + delta).max(0);
                if next == 0 { SkipPolicy::NoSkip } else { SkipPolicy::SkipFrames(next as u32) }
            }
            SkipPolicy::SkipMillis(ms) => {
                let next = (i64::from(ms) + delta * 10).max(0);
                SkipPolicy::SkipMillis(next as u32)
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::NoopController;
    use image::{ImageBuffer, Luma};

    fn make_frames(dir: &Path, count: usize) -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(count);
        for i in 0..count {
            let path = dir.join(format!("frame_{i:04}.png"));
            let img: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_pixel(4, 4, Luma([128]));
            img.save(&path).unwrap();
            paths.push(path);
        }
        paths
    }

    #[test]
    fn skip_frames_policy_matches_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let paths = make_frames(dir.path(), 100);
        let mut source = ImageListSource::open(paths, 25.0).unwrap();
        source.set_skip_policy(SkipPolicy::SkipFrames(5));

        let mut positions = Vec::new();
        while let Some(_frame) = source.next_frame().unwrap() {
            positions.push(source.position().frame);
        }
        assert_eq!(positions.len(), 20);
        assert_eq!(positions[0], 0);
        assert_eq!(positions[1], 5);
        assert_eq!(*positions.last().unwrap(), 95);
    }

    #[test]
    fn skip_millis_below_frame_duration_is_no_skip() {
        let dir = tempfile::tempdir().unwrap();
        let paths = make_frames(dir.path(), 10);
        let mut source = ImageListSource::open(paths, 25.0).unwrap(); // 40ms/frame
        source.set_skip_policy(SkipPolicy::SkipMillis(10));

        let mut positions = Vec::new();
        while let Some(_frame) = source.next_frame().unwrap() {
            positions.push(source.position().frame);
        }
        assert_eq!(positions, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn finalizes_at_end_of_stream() {
        let dir = tempfile::tempdir().unwrap();
        let paths = make_frames(dir.path(), 3);
        let mut source = ImageListSource::open(paths, 25.0).unwrap();
        assert_eq!(source.status(), VideoStatus::Start);
        while source.next_frame().unwrap().is_some() {}
        assert_eq!(source.status(), VideoStatus::Finalized);
    }

    #[test]
    fn run_dispatches_listener_events_in_order() {
        use std::sync::{Arc, Mutex};

        struct Recording(Arc<Mutex<Vec<&'static str>>>);
        impl VideoListener for Recording {
            fn on_initialize(&mut self) {
                self.0.lock().unwrap().push("init");
            }
            fn on_position_change(&mut self, _position: Position) {
                self.0.lock().unwrap().push("position");
            }
            fn on_read(&mut self, _frame: &RasterBuffer) {
                self.0.lock().unwrap().push("read");
            }
            fn on_show(&mut self, _frame: &RasterBuffer) {
                self.0.lock().unwrap().push("show");
            }
            fn on_finish(&mut self) {
                self.0.lock().unwrap().push("finish");
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let paths = make_frames(dir.path(), 2);
        let mut source = ImageListSource::open(paths, 25.0).unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        source.set_listener(Box::new(Recording(events.clone())));
        let mut keyboard = NoopController;
        source.run(&mut keyboard).unwrap();

        assert_eq!(source.status(), VideoStatus::Finalized);
        let log = events.lock().unwrap();
        assert_eq!(
            &log[..],
            ["init", "position", "read", "show", "position", "read", "show", "finish"]
        );
    }

    #[test]
    fn crop_centers_and_clamps_to_source_bounds() {
        let frame = RasterBuffer::new(4, 4, PixelFormat::Gray8, (0u8..16).collect()).unwrap();
        let cropped = crop_centered(&frame, 2, 2);
        assert_eq!((cropped.width(), cropped.height()), (2, 2));
        let oversized = crop_centered(&frame, 10, 10);
        assert_eq!((oversized.width(), oversized.height()), (4, 4));
    }
}
