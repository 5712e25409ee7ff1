// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! 3D boolean evaluation

use super::{OperationBudget, ProgressEvent, ProgressSink};
use crate::engine::{BooleanEngine, GeometryKernelWarning};
use crate::error::Result;
use crate::geometry::Polyhedron;
use crate::model::{BooleanOp, SolidObject};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Lumps produced by the boolean step
#[derive(Debug, Clone)]
pub struct BooleanResult {
    pub components: Vec<Polyhedron>,
    /// Set when the kernel failed and `components` is partial
    pub warning: Option<GeometryKernelWarning>,
    pub elapsed: Duration,
}

impl BooleanResult {
    pub fn lump_count(&self) -> usize {
        self.components.len()
    }
}

/// Check the budget, materialize the tree and reduce it with one terminal UNION.
///
/// Without boolean nodes the single materialized body is passed through and
/// the engine is never called. Kernel failures become a warning on the result.
pub fn evaluate_solid(
    object: SolidObject,
    budget: &OperationBudget,
    engine: &mut dyn BooleanEngine,
    sink: &mut dyn ProgressSink,
) -> Result<BooleanResult> {
    let nbool = object.nbool();
    sink.report(ProgressEvent::TreeCompleted { nbool });
    budget.check(nbool)?;

    if nbool > 0 {
        sink.report(ProgressEvent::BooleanStarted);
    }

    let start = Instant::now();
    let (components, warning) = match object.create_mesh() {
        Err(e) => (Vec::new(), Some(e.to_string())),
        Ok(mesh) if nbool == 0 => (mesh.into_bodies(), None),
        Ok(mesh) => {
            debug!(bodies = mesh.body_count(), faces = mesh.face_count(), "terminal union");
            match engine.compute(mesh, BooleanOp::Union) {
                Ok(lumps) => (lumps, None),
                Err(failure) => (failure.partial, Some(failure.message)),
            }
        }
    };
    let elapsed = start.elapsed();

    let warning = warning.map(|message| {
        warn!(%message, "boolean kernel failure, continuing with partial result");
        sink.report(ProgressEvent::KernelWarning {
            message: message.clone(),
        });
        GeometryKernelWarning { message }
    });

    if nbool > 0 {
        sink.report(ProgressEvent::BooleanCompleted { elapsed });
    }
    sink.report(ProgressEvent::ResultLumps {
        count: components.len(),
    });

    Ok(BooleanResult {
        components,
        warning,
        elapsed,
    })
}
