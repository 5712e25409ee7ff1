// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! 2D boolean evaluation

use super::{OperationBudget, ProgressEvent, ProgressSink};
use crate::engine::ClipEngine;
use crate::error::Result;
use crate::geometry::PolygonSet;
use crate::model::{BooleanOp, ShapeObject};
use geo::MultiPolygon;
use std::time::{Duration, Instant};

/// Polygons produced by the 2D boolean step
#[derive(Debug, Clone)]
pub struct ProfileResult {
    pub polygons: PolygonSet,
    pub elapsed: Duration,
}

/// 2D counterpart of [`evaluate_solid`](super::evaluate_solid)
pub fn evaluate_shape(
    object: ShapeObject,
    budget: &OperationBudget,
    engine: &mut dyn ClipEngine,
    sink: &mut dyn ProgressSink,
) -> Result<ProfileResult> {
    let nbool = object.nbool();
    sink.report(ProgressEvent::TreeCompleted { nbool });
    budget.check(nbool)?;

    if nbool > 0 {
        sink.report(ProgressEvent::BooleanStarted);
    }

    let start = Instant::now();
    let profile = object.create_profile();
    let polygons = if nbool == 0 {
        let polygons = profile.parts.into_iter().flat_map(|part| part.0).collect();
        PolygonSet::from(MultiPolygon::new(polygons))
    } else {
        engine.compute(profile, BooleanOp::Union)
    };
    let elapsed = start.elapsed();

    if nbool > 0 {
        sink.report(ProgressEvent::BooleanCompleted { elapsed });
    }
    sink.report(ProgressEvent::ResultProfiles {
        count: polygons.len(),
    });
    Ok(ProfileResult { polygons, elapsed })
}
