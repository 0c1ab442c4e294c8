// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structured diagnostics for `towerscan` runs: a [`trace::TraceSink`]
//! trait plus three implementations.
//!
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event
//!   output, for interactive debugging.
//! - [`recorder::RecorderSink`] — compact binary recording with
//!   [`recorder::decode`] for offline playback.
//! - [`chrome::export`] — writes Chrome Trace Event Format JSON from
//!   recorded bytes, viewable in `chrome://tracing`/Perfetto.

pub mod chrome;
pub mod pretty;
pub mod recorder;
pub mod trace;

pub use trace::{NoopSink, TraceSink};
