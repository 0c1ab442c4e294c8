// Copyright 2026 the Towerscan Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sequential composition of transforms.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::geometry::point::Point2;
use crate::transform::{FitReport, Order, Transform};

/// An ordered sequence of transforms, applied one after another. `compute`
/// is not supported on a chain — fitting one composite transform from
/// point correspondences is not well-posed without knowing how to split
/// the fit across its members — so it always fails with
/// `Error::NotApplicable`; only `transform`/`transform_batch` work.
#[derive(Default)]
pub struct TransformChain {
    members: Vec<Box<dyn Transform>>,
}

impl TransformChain {
    /// An empty chain (acts as the identity).
    #[must_use]
    pub fn new() -> Self {
        Self { members: Vec::new() }
    }

    /// Appends a transform to the end of the chain.
    pub fn push(&mut self, trf: Box<dyn Transform>) {
        self.members.push(trf);
    }

    /// The chain's members, in application order.
    #[must_use]
    pub fn members(&self) -> &[Box<dyn Transform>] {
        &self.members
    }
}

impl Transform for TransformChain {
    fn compute(&mut self, _pts_src: &[Point2], _pts_dst: &[Point2]) -> Result<FitReport> {
        Err(Error::NotApplicable("compute is not supported on a TransformChain".into()))
    }

    fn transform(&self, point_in: Point2, order: Order) -> Result<Point2> {
        let mut p = point_in;
        match order {
            Order::Direct => {
                for member in &self.members {
                    p = member.transform(p, Order::Direct)?;
                }
            }
            Order::Inverse => {
                for member in self.members.iter().rev() {
                    p = member.transform(p, Order::Inverse)?;
                }
            }
        }
        Ok(p)
    }

    fn is_null(&self) -> bool {
        self.members.iter().all(|m| m.is_null())
    }

    fn minimum_points(&self) -> usize {
        0
    }
}
