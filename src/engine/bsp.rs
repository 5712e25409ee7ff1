// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

use super::{BooleanEngine, KernelFailure};
use crate::geometry::{Csg, KernelError, Polyhedron};
use crate::model::{BooleanOp, CsgMesh};
use tracing::debug;

/// Boolean engine on top of the BSP kernel.
///
/// Bodies are folded left to right with the requested operation; the result is
/// welded and split into connected lumps.
#[derive(Debug, Default, Clone, Copy)]
pub struct BspBooleanEngine;

impl BspBooleanEngine {
    pub fn new() -> Self {
        Self
    }
}

impl BooleanEngine for BspBooleanEngine {
    fn compute(&mut self, mesh: CsgMesh, op: BooleanOp) -> Result<Vec<Polyhedron>, KernelFailure> {
        let bodies = mesh.into_bodies();
        debug!(bodies = bodies.len(), %op, "bsp boolean");

        let mut iter = bodies.iter();
        let Some(first) = iter.next() else {
            return Ok(Vec::new());
        };
        let mut acc = Csg::from_polyhedron(first).map_err(|e| failure(e, None))?;

        for body in iter {
            let operand = match Csg::from_polyhedron(body) {
                Ok(operand) => operand,
                Err(e) => return Err(failure(e, Some(acc))),
            };
            let previous = acc.clone();
            let next = match op {
                BooleanOp::Union => acc.union(operand),
                BooleanOp::Difference => acc.difference(operand),
                BooleanOp::Intersection => acc.intersection(operand),
            };
            acc = next.map_err(|e| failure(e, Some(previous)))?;
        }
        Ok(acc.into_polyhedron().split_lumps())
    }
}

fn failure(error: KernelError, partial: Option<Csg>) -> KernelFailure {
    KernelFailure {
        message: error.to_string(),
        partial: partial
            .map(|csg| csg.into_polyhedron().split_lumps())
            .unwrap_or_default(),
    }
}
