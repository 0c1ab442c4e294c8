// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pluggable interactive keyboard control for [`crate::source::VideoSource::run`].
//!
//! Canonical controls (ESC stops, `+`/`-` change the skip magnitude,
//! space toggles pause) are one concrete implementation of
//! [`KeyboardController`], not a hard-wired part of the frame loop — a
//! non-interactive consumer (a batch driver, a test) can pass
//! [`NoopController`] instead and the loop never polls for input.

use std::time::Duration;

/// One action a [`KeyboardController`] can request of the frame loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoCommand {
    /// Stop the stream (`stop()`).
    Stop,
    /// Toggle between `Running` and `Paused`.
    TogglePause,
    /// Increase the skip magnitude (more frames/milliseconds skipped).
    IncreaseSkip,
    /// Decrease the skip magnitude.
    DecreaseSkip,
}

/// Polled once per frame loop iteration; blocks for at most `budget`
/// (bounded by the target fps) before returning.
pub trait KeyboardController {
    /// Polls for a pending command, waiting at most `budget`. Returns
    /// `None` if no command arrived in time.
    fn poll(&mut self, budget: Duration) -> Option<VideoCommand>;
}

/// A [`KeyboardController`] that never produces a command and never
/// blocks. The default for non-interactive consumers.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopController;

impl KeyboardController for NoopController {
    fn poll(&mut self, _budget: Duration) -> Option<VideoCommand> {
        None
    }
}

/// A [`KeyboardController`] backed by `crossterm`, implementing the
/// canonical controls: ESC stops, `+` increases skip magnitude, `-`
/// decreases it, space toggles pause.
///
/// Requires the `interactive` feature.
#[cfg(feature = "interactive")]
#[derive(Clone, Copy, Debug, Default)]
pub struct CrosstermController;

#[cfg(feature = "interactive")]
impl KeyboardController for CrosstermController {
    fn poll(&mut self, budget: Duration) -> Option<VideoCommand> {
        use crossterm::event::{self, Event, KeyCode};

        if !event::poll(budget).unwrap_or(false) {
            return None;
        }
        match event::read().ok()? {
            Event::Key(key) => match key.code {
                KeyCode::Esc => Some(VideoCommand::Stop),
                KeyCode::Char('+') => Some(VideoCommand::IncreaseSkip),
                KeyCode::Char('-') => Some(VideoCommand::DecreaseSkip),
                KeyCode::Char(' ') => Some(VideoCommand::TogglePause),
                _ => None,
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_controller_never_produces_a_command() {
        let mut controller = NoopController;
        assert_eq!(controller.poll(Duration::from_millis(0)), None);
    }
}
