// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometric entities (points, segments, windows, line groups) and the
//! predicates that operate on them. Built directly on [`crate::numeric`]
//! and on `kurbo` for the planar primitives.

pub mod line_group;
pub mod point;
pub mod predicates;
pub mod segment;
pub mod window;

pub use line_group::LineGroup;
pub use point::{Point2, Point3};
pub use segment::Segment;
pub use window::Window;
