// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The video source's observer contract.
//!
//! [`VideoListener`] replaces raw function-pointer + `void*` user-data
//! callbacks (`ReadCallback`, `PositionChangeCallback`, `ShowCallback`)
//! with a polymorphic listener object, the same shape as
//! `towerscan_debug`'s `TraceSink`: one method per event, all defaulted to
//! a no-op so a listener only needs to implement the events it cares
//! about. A source calls its listener's methods directly from the frame
//! loop — it never spawns a thread to do so.

use towerscan_core::RasterBuffer;

/// The source's position, reported in both units simultaneously: frames
/// and milliseconds are both queryable at any time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    /// Zero-based frame index.
    pub frame: u64,
    /// Elapsed time in milliseconds, derived from `frame` and the
    /// source's fps.
    pub millis: f64,
}

/// Observes a [`crate::source::VideoSource`]'s lifecycle and frame stream.
///
/// Registered once via [`crate::source::VideoSource::set_listener`].
/// Callback order per frame is fixed: `on_position_change` →
/// `on_read` → `on_show`.
pub trait VideoListener {
    /// Called once when [`crate::source::VideoSource::run`] begins,
    /// before any frame is delivered.
    fn on_initialize(&mut self) {}

    /// Called once per delivered frame, after the position has already
    /// advanced (see `on_position_change`) and before `on_show`.
    fn on_read(&mut self, frame: &RasterBuffer) {
        _ = frame;
    }

    /// Called once per delivered frame, before `on_read`, with the new
    /// position.
    fn on_position_change(&mut self, position: Position) {
        _ = position;
    }

    /// Called once per delivered frame, after `on_read`, with the frame
    /// sized per the source's active [`towerscan_core::video::FrameSizing`].
    fn on_show(&mut self, frame: &RasterBuffer) {
        _ = frame;
    }

    /// Called when the source transitions from `Running` to `Paused`.
    fn on_pause(&mut self) {}

    /// Called when the source transitions from `Paused` back to `Running`.
    fn on_resume(&mut self) {}

    /// Called when `stop()` has taken effect (`Stopping` → `Stopped`).
    fn on_stop(&mut self) {}

    /// Called once, when the source reaches end of stream
    /// (`Running`/`Paused` → `Finalized`).
    fn on_finish(&mut self) {}
}

/// A [`VideoListener`] that discards every event. The default listener
/// when a caller does not need to observe the frame loop.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopListener;

impl VideoListener for NoopListener {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_listener_accepts_every_event() {
        let mut listener = NoopListener;
        let frame = RasterBuffer::zeros(1, 1, towerscan_core::PixelFormat::Gray8);
        listener.on_initialize();
        listener.on_position_change(Position { frame: 0, millis: 0.0 });
        listener.on_read(&frame);
        listener.on_show(&frame);
        listener.on_pause();
        listener.on_resume();
        listener.on_stop();
        listener.on_finish();
    }
}
