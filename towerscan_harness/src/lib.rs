// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reusable detection-quality metrics and grading for batch-processing
//! harnesses.

#![no_std]

extern crate alloc;

use alloc::string::String;

/// How many point correspondences a transform fit, or how many segments a
/// line detector found, had to work with. Mirrors the way fit quality
/// expectations loosen as support drops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintLevel {
    /// Plenty of correspondences/segments; tight thresholds apply.
    WellConstrained,
    /// Workable but thin support.
    Marginal,
    /// Minimal support; only gross errors should be flagged.
    Sparse,
}

/// Per-frame quality sample fed into [`QualityTracker::observe`].
#[derive(Clone, Copy, Debug)]
pub struct QualitySample {
    /// How well-supported this frame's fit/detection was.
    pub constraint: ConstraintLevel,
    /// Transform RMSE in pixels for this frame (or an equivalent line-fit
    /// residual).
    pub rmse_px: f64,
    /// The transform fit failed outright (e.g. degenerate correspondences).
    pub fit_failed: bool,
    /// The line detector or matcher returned zero results for this frame.
    pub detection_empty: bool,
}

/// Letter grade for detection/registration quality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grade {
    /// Tight residuals and low miss rate.
    A,
    /// Good fit with moderate misses.
    B,
    /// Degraded but usable.
    C,
    /// Poor fit.
    D,
}

impl Grade {
    /// Returns a short label for report rendering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

/// Aggregated report returned by [`QualityTracker::observe`].
#[derive(Clone, Copy, Debug)]
pub struct Report {
    /// Current grade.
    pub grade: Grade,
    /// Misses per 1000 observed frames.
    pub miss_rate_per_1000: f64,
    /// Current frame's RMSE in pixels.
    pub rmse_px: f64,
    /// Total frames observed.
    pub total_frames: u64,
    /// Total misses observed.
    pub missed_frames: u64,
}

/// Rolling quality tracker with fixed-size per-frame RMSE history.
#[derive(Debug)]
pub struct QualityTracker<const N: usize> {
    rmse_px: [f64; N],
    cursor: usize,
    total_frames: u64,
    missed_frames: u64,
}

impl<const N: usize> Default for QualityTracker<N> {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl<const N: usize> QualityTracker<N> {
    /// Creates a tracker with `seed_rmse_px` prefilled in the ring buffer.
    #[must_use]
    pub const fn new(seed_rmse_px: f64) -> Self {
        Self {
            rmse_px: [seed_rmse_px; N],
            cursor: 0,
            total_frames: 0,
            missed_frames: 0,
        }
    }

    /// Observes one frame and returns an updated report.
    #[must_use]
    pub fn observe(&mut self, sample: QualitySample) -> Report {
        self.total_frames = self.total_frames.saturating_add(1);
        self.rmse_px[self.cursor % N] = sample.rmse_px;
        self.cursor = (self.cursor + 1) % N;

        if sample.fit_failed || sample.detection_empty {
            self.missed_frames = self.missed_frames.saturating_add(1);
        }

        let miss_rate = if self.total_frames == 0 {
            0.0
        } else {
            self.missed_frames as f64 * 1000.0 / self.total_frames as f64
        };

        let grade = grade_for(sample.constraint, sample.rmse_px.abs(), miss_rate);

        Report {
            grade,
            miss_rate_per_1000: miss_rate,
            rmse_px: sample.rmse_px,
            total_frames: self.total_frames,
            missed_frames: self.missed_frames,
        }
    }

    /// Returns ring-buffer per-frame RMSE oldest→newest.
    #[must_use]
    pub fn rmse_history(&self) -> [f64; N] {
        let mut out = [0.0; N];
        let mut i = 0;
        while i < N {
            let idx = (self.cursor + i) % N;
            out[i] = self.rmse_px[idx];
            i += 1;
        }
        out
    }

    /// Returns an ASCII sparkline over `rmse_history()`.
    #[must_use]
    pub fn sparkline_ascii(&self, min_px: f64, max_px: f64) -> String {
        const LEVELS: &[u8] = b" .:-=+*#%@";
        let mut out = String::with_capacity(N);
        let mut i = 0;
        while i < N {
            let idx = (self.cursor + i) % N;
            let v = self.rmse_px[idx].clamp(min_px, max_px);
            let t = (v - min_px) / (max_px - min_px);
            #[expect(
                clippy::cast_possible_truncation,
                reason = "index is clamped to ASCII level count"
            )]
            let level = (t * (LEVELS.len() as f64 - 1.0) + 0.5) as usize;
            out.push(LEVELS[level] as char);
            i += 1;
        }
        out
    }
}

fn grade_for(
    constraint: ConstraintLevel,
    rmse_abs_px: f64,
    miss_rate_per_1000: f64,
) -> Grade {
    let (a_rmse, b_rmse, c_rmse, a_miss, b_miss, c_miss) = match constraint {
        ConstraintLevel::WellConstrained => (0.5, 1.0, 2.0, 1.0, 5.0, 15.0),
        ConstraintLevel::Marginal => (1.0, 2.0, 4.0, 3.0, 10.0, 25.0),
        ConstraintLevel::Sparse => (2.0, 4.0, 8.0, 10.0, 30.0, 80.0),
    };

    if rmse_abs_px < a_rmse && miss_rate_per_1000 < a_miss {
        Grade::A
    } else if rmse_abs_px < b_rmse && miss_rate_per_1000 < b_miss {
        Grade::B
    } else if rmse_abs_px < c_rmse && miss_rate_per_1000 < c_miss {
        Grade::C
    } else {
        Grade::D
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_rate_accumulates() {
        let mut t = QualityTracker::<8>::new(0.5);
        let mut i = 0;
        while i < 10 {
            let report = t.observe(QualitySample {
                constraint: ConstraintLevel::Sparse,
                rmse_px: 1.0,
                fit_failed: i < 2,
                detection_empty: false,
            });
            if i == 9 {
                assert!((report.miss_rate_per_1000 - 200.0).abs() < 1e-6);
            }
            i += 1;
        }
    }

    #[test]
    fn well_constrained_thresholds_are_stricter() {
        let mut t = QualityTracker::<4>::new(0.5);
        let well = t.observe(QualitySample {
            constraint: ConstraintLevel::WellConstrained,
            rmse_px: 1.5,
            fit_failed: false,
            detection_empty: false,
        });
        assert_eq!(well.grade, Grade::C);

        let marginal = t.observe(QualitySample {
            constraint: ConstraintLevel::Marginal,
            rmse_px: 1.5,
            fit_failed: false,
            detection_empty: false,
        });
        assert_eq!(marginal.grade, Grade::B);
    }

    #[test]
    fn sparkline_has_one_char_per_slot() {
        let mut t = QualityTracker::<6>::new(0.0);
        for rmse in [0.0, 1.0, 2.0, 3.0, 4.0, 5.0] {
            t.observe(QualitySample {
                constraint: ConstraintLevel::Marginal,
                rmse_px: rmse,
                fit_failed: false,
                detection_empty: false,
            });
        }
        let spark = t.sparkline_ascii(0.0, 5.0);
        assert_eq!(spark.chars().count(), 6);
    }
}
