// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per
//! event to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use crate::trace::{
    FrameReadEvent, FrameSkipEvent, LineDetectEvent, MatchEvent, StageBeginEvent, StageEndEvent,
    TraceSink, TransformFitEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self { writer: Box::new(std::io::stderr()) }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_stage_begin(&mut self, e: &StageBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[stage:begin] frame={:?} #{} {}",
            e.frame_index, e.stage_index, e.stage_name,
        );
    }

    fn on_stage_end(&mut self, e: &StageEndEvent) {
        let _ = writeln!(
            self.writer,
            "[stage:end] frame={:?} #{} {} ok={}",
            e.frame_index, e.stage_index, e.stage_name, e.ok,
        );
    }

    fn on_frame_read(&mut self, e: &FrameReadEvent) {
        let _ = writeln!(
            self.writer,
            "[frame:read] frame={} pos={:.1}ms",
            e.frame_index, e.position_ms,
        );
    }

    fn on_frame_skip(&mut self, e: &FrameSkipEvent) {
        let _ = writeln!(
            self.writer,
            "[frame:skip] frame={} reason={:?}",
            e.frame_index, e.reason,
        );
    }

    fn on_transform_fit(&mut self, e: &TransformFitEvent) {
        let _ = writeln!(
            self.writer,
            "[transform:fit] {} n={} rmse={:.6} success={}",
            e.kind, e.point_count, e.rmse, e.success,
        );
    }

    fn on_line_detect(&mut self, e: &LineDetectEvent) {
        let _ = writeln!(
            self.writer,
            "[line:detect] {} segments={}",
            e.strategy, e.segment_count,
        );
    }

    fn on_match(&mut self, e: &MatchEvent) {
        let _ = writeln!(
            self.writer,
            "[match] query={} train={} matches={}",
            e.query_count, e.train_count, e.match_count,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_print_stage_begin() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_stage_begin(&StageBeginEvent {
            frame_index: Some(3),
            stage_index: 1,
            stage_name: "GaussianBlur",
        });
        let output = String::from_utf8(sink.writer).unwrap();
        assert!(output.contains("[stage:begin]"), "got: {output}");
        assert!(output.contains("GaussianBlur"), "got: {output}");
    }

    #[test]
    fn pretty_print_transform_fit() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_transform_fit(&TransformFitEvent {
            kind: "affine",
            point_count: 4,
            rmse: 0.0,
            success: true,
        });
        let output = String::from_utf8(sink.writer).unwrap();
        assert!(output.contains("[transform:fit] affine n=4"), "got: {output}");
    }
}
