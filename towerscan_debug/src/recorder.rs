// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as tagged little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use crate::trace::{
    FrameReadEvent, FrameSkipEvent, LineDetectEvent, MatchEvent, SkipReason, StageBeginEvent,
    StageEndEvent, TraceSink, TransformFitEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_STAGE_BEGIN: u8 = 1;
const TAG_STAGE_END: u8 = 2;
const TAG_FRAME_READ: u8 = 3;
const TAG_FRAME_SKIP: u8 = 4;
const TAG_TRANSFORM_FIT: u8 = 5;
const TAG_LINE_DETECT: u8 = 6;
const TAG_MATCH: u8 = 7;

const MAX_STR_LEN: usize = u16::MAX as usize;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_option_u64(&mut self, v: Option<u64>) {
        match v {
            Some(val) => {
                self.write_u8(1);
                self.write_u64(val);
            }
            None => {
                self.write_u8(0);
                self.write_u64(0);
            }
        }
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_str(&mut self, s: &str) {
        let len = s.len().min(MAX_STR_LEN);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "len clamped to u16::MAX above"
        )]
        self.write_u16(len as u16);
        self.buf.extend_from_slice(&s.as_bytes()[..len]);
    }

    fn write_skip_reason(&mut self, r: SkipReason) {
        self.write_u8(match r {
            SkipReason::Policy => 0,
            SkipReason::Blur => 1,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_stage_begin(&mut self, e: &StageBeginEvent) {
        self.write_u8(TAG_STAGE_BEGIN);
        self.write_option_u64(e.frame_index);
        self.write_u64(e.stage_index as u64);
        self.write_str(e.stage_name);
    }

    fn on_stage_end(&mut self, e: &StageEndEvent) {
        self.write_u8(TAG_STAGE_END);
        self.write_option_u64(e.frame_index);
        self.write_u64(e.stage_index as u64);
        self.write_str(e.stage_name);
        self.write_bool(e.ok);
    }

    fn on_frame_read(&mut self, e: &FrameReadEvent) {
        self.write_u8(TAG_FRAME_READ);
        self.write_u64(e.frame_index);
        self.write_f64(e.position_ms);
    }

    fn on_frame_skip(&mut self, e: &FrameSkipEvent) {
        self.write_u8(TAG_FRAME_SKIP);
        self.write_u64(e.frame_index);
        self.write_skip_reason(e.reason);
    }

    fn on_transform_fit(&mut self, e: &TransformFitEvent) {
        self.write_u8(TAG_TRANSFORM_FIT);
        self.write_str(e.kind);
        self.write_u64(e.point_count as u64);
        self.write_f64(e.rmse);
        self.write_bool(e.success);
    }

    fn on_line_detect(&mut self, e: &LineDetectEvent) {
        self.write_u8(TAG_LINE_DETECT);
        self.write_str(e.strategy);
        self.write_u64(e.segment_count as u64);
    }

    fn on_match(&mut self, e: &MatchEvent) {
        self.write_u8(TAG_MATCH);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "keypoint counts capped at u32::MAX for recording"
        )]
        {
            self.write_u32(e.query_count.min(u32::MAX as usize) as u32);
            self.write_u32(e.train_count.min(u32::MAX as usize) as u32);
            self.write_u32(e.match_count.min(u32::MAX as usize) as u32);
        }
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A pipeline stage began.
    StageBegin {
        /// Frame index, if known.
        frame_index: Option<u64>,
        /// Position within the pipeline.
        stage_index: u64,
        /// Process-type name.
        stage_name: String,
    },
    /// A pipeline stage ended.
    StageEnd {
        /// Frame index, if known.
        frame_index: Option<u64>,
        /// Position within the pipeline.
        stage_index: u64,
        /// Process-type name.
        stage_name: String,
        /// Whether the stage reported success.
        ok: bool,
    },
    /// A frame was read from a video source.
    FrameRead {
        /// Zero-based frame index.
        frame_index: u64,
        /// Elapsed position in milliseconds.
        position_ms: f64,
    },
    /// A frame was skipped rather than delivered.
    FrameSkip {
        /// Index of the skipped frame.
        frame_index: u64,
        /// Why it was skipped.
        reason: SkipReason,
    },
    /// A transform fit completed, success or failure.
    TransformFit {
        /// Transform kind name.
        kind: String,
        /// Number of point correspondences.
        point_count: u64,
        /// Reported RMSE.
        rmse: f64,
        /// Whether the fit succeeded.
        success: bool,
    },
    /// A line-detector run completed.
    LineDetect {
        /// Strategy name.
        strategy: String,
        /// Segments published after the angular filter.
        segment_count: u64,
    },
    /// A matcher run completed.
    Match {
        /// Keypoints in the query set.
        query_count: u32,
        /// Keypoints in the train set.
        train_count: u32,
        /// Matches produced.
        match_count: u32,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u16(&mut self) -> Option<u16> {
        if self.remaining() < 2 {
            return None;
        }
        let v = u16::from_le_bytes(self.data[self.pos..self.pos + 2].try_into().ok()?);
        self.pos += 2;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_f64(&mut self) -> Option<f64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = f64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_option_u64(&mut self) -> Option<Option<u64>> {
        let present = self.read_u8()?;
        let val = self.read_u64()?;
        Some(if present != 0 { Some(val) } else { None })
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_str(&mut self) -> Option<String> {
        let len = self.read_u16()? as usize;
        if self.remaining() < len {
            return None;
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Some(String::from_utf8_lossy(bytes).into_owned())
    }

    fn read_skip_reason(&mut self) -> Option<SkipReason> {
        Some(match self.read_u8()? {
            0 => SkipReason::Policy,
            _ => SkipReason::Blur,
        })
    }

    fn decode_stage_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::StageBegin {
            frame_index: self.read_option_u64()?,
            stage_index: self.read_u64()?,
            stage_name: self.read_str()?,
        })
    }

    fn decode_stage_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::StageEnd {
            frame_index: self.read_option_u64()?,
            stage_index: self.read_u64()?,
            stage_name: self.read_str()?,
            ok: self.read_bool()?,
        })
    }

    fn decode_frame_read(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameRead {
            frame_index: self.read_u64()?,
            position_ms: self.read_f64()?,
        })
    }

    fn decode_frame_skip(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameSkip {
            frame_index: self.read_u64()?,
            reason: self.read_skip_reason()?,
        })
    }

    fn decode_transform_fit(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TransformFit {
            kind: self.read_str()?,
            point_count: self.read_u64()?,
            rmse: self.read_f64()?,
            success: self.read_bool()?,
        })
    }

    fn decode_line_detect(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::LineDetect {
            strategy: self.read_str()?,
            segment_count: self.read_u64()?,
        })
    }

    fn decode_match(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Match {
            query_count: self.read_u32()?,
            train_count: self.read_u32()?,
            match_count: self.read_u32()?,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_STAGE_BEGIN => self.decode_stage_begin(),
            TAG_STAGE_END => self.decode_stage_end(),
            TAG_FRAME_READ => self.decode_frame_read(),
            TAG_FRAME_SKIP => self.decode_frame_skip(),
            TAG_TRANSFORM_FIT => self.decode_transform_fit(),
            TAG_LINE_DETECT => self.decode_line_detect(),
            TAG_MATCH => self.decode_match(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_stage_events() {
        let mut rec = RecorderSink::new();
        rec.on_stage_begin(&StageBeginEvent {
            frame_index: Some(3),
            stage_index: 1,
            stage_name: "GaussianBlur",
        });
        rec.on_stage_end(&StageEndEvent {
            frame_index: Some(3),
            stage_index: 1,
            stage_name: "GaussianBlur",
            ok: true,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 2);
        match &events[0] {
            RecordedEvent::StageBegin {
                frame_index,
                stage_index,
                stage_name,
            } => {
                assert_eq!(*frame_index, Some(3));
                assert_eq!(*stage_index, 1);
                assert_eq!(stage_name, "GaussianBlur");
            }
            other => panic!("expected StageBegin, got {other:?}"),
        }
        match &events[1] {
            RecordedEvent::StageEnd { ok, .. } => assert!(*ok),
            other => panic!("expected StageEnd, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_frame_read_and_skip() {
        let mut rec = RecorderSink::new();
        rec.on_frame_read(&FrameReadEvent {
            frame_index: 12,
            position_ms: 400.0,
        });
        rec.on_frame_skip(&FrameSkipEvent {
            frame_index: 13,
            reason: SkipReason::Blur,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 2);
        match &events[0] {
            RecordedEvent::FrameRead {
                frame_index,
                position_ms,
            } => {
                assert_eq!(*frame_index, 12);
                assert!((*position_ms - 400.0).abs() < f64::EPSILON);
            }
            other => panic!("expected FrameRead, got {other:?}"),
        }
        match &events[1] {
            RecordedEvent::FrameSkip {
                frame_index,
                reason,
            } => {
                assert_eq!(*frame_index, 13);
                assert_eq!(*reason, SkipReason::Blur);
            }
            other => panic!("expected FrameSkip, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_transform_fit() {
        let mut rec = RecorderSink::new();
        rec.on_transform_fit(&TransformFitEvent {
            kind: "affine",
            point_count: 6,
            rmse: 0.42,
            success: true,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 1);
        match &events[0] {
            RecordedEvent::TransformFit {
                kind,
                point_count,
                rmse,
                success,
            } => {
                assert_eq!(kind, "affine");
                assert_eq!(*point_count, 6);
                assert!((*rmse - 0.42).abs() < 1e-9);
                assert!(*success);
            }
            other => panic!("expected TransformFit, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_line_detect_and_match() {
        let mut rec = RecorderSink::new();
        rec.on_line_detect(&LineDetectEvent {
            strategy: "hough_p",
            segment_count: 9,
        });
        rec.on_match(&MatchEvent {
            query_count: 50,
            train_count: 48,
            match_count: 30,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 2);
        match &events[0] {
            RecordedEvent::LineDetect {
                strategy,
                segment_count,
            } => {
                assert_eq!(strategy, "hough_p");
                assert_eq!(*segment_count, 9);
            }
            other => panic!("expected LineDetect, got {other:?}"),
        }
        match &events[1] {
            RecordedEvent::Match {
                query_count,
                train_count,
                match_count,
            } => {
                assert_eq!(*query_count, 50);
                assert_eq!(*train_count, 48);
                assert_eq!(*match_count, 30);
            }
            other => panic!("expected Match, got {other:?}"),
        }
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }

    #[test]
    fn round_trip_multiple_events_preserves_order() {
        let mut rec = RecorderSink::new();
        rec.on_stage_begin(&StageBeginEvent {
            frame_index: None,
            stage_index: 0,
            stage_name: "Resize",
        });
        rec.on_frame_read(&FrameReadEvent {
            frame_index: 0,
            position_ms: 0.0,
        });
        rec.on_line_detect(&LineDetectEvent {
            strategy: "lsd",
            segment_count: 3,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], RecordedEvent::StageBegin { .. }));
        assert!(matches!(events[1], RecordedEvent::FrameRead { .. }));
        assert!(matches!(events[2], RecordedEvent::LineDetect { .. }));
    }
}
