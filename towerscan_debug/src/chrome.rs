// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Stage events have no frame-relative timestamp of their own; they are laid
/// out on a synthetic microsecond axis by event order so begin/end pairs
/// nest correctly in the viewer.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut synthetic_us: f64 = 0.0;
    let mut tick = || {
        synthetic_us += 1.0;
        synthetic_us
    };

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::StageBegin {
                frame_index,
                stage_index,
                stage_name,
            } => {
                events.push(json!({
                    "ph": "B",
                    "name": stage_name,
                    "cat": "Pipeline",
                    "ts": tick(),
                    "pid": 0,
                    "tid": stage_index,
                    "args": {
                        "frame_index": frame_index,
                    }
                }));
            }
            RecordedEvent::StageEnd {
                frame_index,
                stage_index,
                stage_name,
                ok,
            } => {
                events.push(json!({
                    "ph": "E",
                    "name": stage_name,
                    "cat": "Pipeline",
                    "ts": tick(),
                    "pid": 0,
                    "tid": stage_index,
                    "args": {
                        "frame_index": frame_index,
                        "ok": ok,
                    }
                }));
            }
            RecordedEvent::FrameRead {
                frame_index,
                position_ms,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": "FrameRead",
                    "cat": "Video",
                    "ts": position_ms * 1000.0,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": frame_index,
                    }
                }));
            }
            RecordedEvent::FrameSkip {
                frame_index,
                reason,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": "FrameSkip",
                    "cat": "Video",
                    "ts": tick(),
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": frame_index,
                        "reason": format!("{reason:?}"),
                    }
                }));
            }
            RecordedEvent::TransformFit {
                kind,
                point_count,
                rmse,
                success,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": "TransformFit",
                    "cat": "Registration",
                    "ts": tick(),
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "kind": kind,
                        "point_count": point_count,
                        "rmse": rmse,
                        "success": success,
                    }
                }));
            }
            RecordedEvent::LineDetect {
                strategy,
                segment_count,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": "LineDetect",
                    "cat": "Detection",
                    "ts": tick(),
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "strategy": strategy,
                        "segment_count": segment_count,
                    }
                }));
            }
            RecordedEvent::Match {
                query_count,
                train_count,
                match_count,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": "Match",
                    "cat": "Detection",
                    "ts": tick(),
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "query_count": query_count,
                        "train_count": train_count,
                        "match_count": match_count,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use crate::trace::{FrameReadEvent, StageBeginEvent, StageEndEvent, TraceSink};

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_stage_begin(&StageBeginEvent {
            frame_index: Some(0),
            stage_index: 0,
            stage_name: "GaussianBlur",
        });
        rec.on_stage_end(&StageEndEvent {
            frame_index: Some(0),
            stage_index: 0,
            stage_name: "GaussianBlur",
            ok: true,
        });
        rec.on_frame_read(&FrameReadEvent {
            frame_index: 1,
            position_ms: 33.3,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[0]["name"], "GaussianBlur");

        assert_eq!(parsed[1]["ph"], "E");
        assert_eq!(parsed[1]["name"], "GaussianBlur");

        assert_eq!(parsed[2]["ph"], "i");
        assert_eq!(parsed[2]["name"], "FrameRead");
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
